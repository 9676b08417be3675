//! The fixed set of institutional offices that sign off on clearances.
//!
//! Department columns in `request_clearances` and `student_clearance` are
//! addressed exclusively through the accessors below, so a column name can
//! only ever come from this closed set -- never from caller-supplied text.

use serde::{Deserialize, Serialize};

/// An institutional office that must sign off on a clearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Registrar,
    Guidance,
    Mis,
    Library,
    Cashier,
    Business,
    Engineering,
    Criminology,
}

/// Every department, in clearance-form display order.
pub const ALL_DEPARTMENTS: &[Department] = &[
    Department::Registrar,
    Department::Guidance,
    Department::Mis,
    Department::Library,
    Department::Cashier,
    Department::Business,
    Department::Engineering,
    Department::Criminology,
];

impl Department {
    /// Convert from a path/body string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "registrar" => Ok(Self::Registrar),
            "guidance" => Ok(Self::Guidance),
            "mis" => Ok(Self::Mis),
            "library" => Ok(Self::Library),
            "cashier" => Ok(Self::Cashier),
            "business" | "business and technology" => Ok(Self::Business),
            "engineering" | "engineering and architecture" => Ok(Self::Engineering),
            "criminology" | "criminal justice" => Ok(Self::Criminology),
            _ => Err(format!(
                "Invalid department '{s}'. Must be one of: {}",
                ALL_DEPARTMENTS
                    .iter()
                    .map(|d| d.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }

    /// Canonical lowercase name, as stored and routed.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Registrar => "registrar",
            Self::Guidance => "guidance",
            Self::Mis => "mis",
            Self::Library => "library",
            Self::Cashier => "cashier",
            Self::Business => "business",
            Self::Engineering => "engineering",
            Self::Criminology => "criminology",
        }
    }

    /// Column holding this department's clearance status.
    pub fn status_column(&self) -> &'static str {
        match self {
            Self::Registrar => "registrar_status",
            Self::Guidance => "guidance_status",
            Self::Mis => "mis_status",
            Self::Library => "library_status",
            Self::Cashier => "cashier_status",
            Self::Business => "business_status",
            Self::Engineering => "engineering_status",
            Self::Criminology => "criminology_status",
        }
    }

    /// Column holding this department's rejection/hold reason.
    pub fn reason_column(&self) -> &'static str {
        match self {
            Self::Registrar => "registrar_reason",
            Self::Guidance => "guidance_reason",
            Self::Mis => "mis_reason",
            Self::Library => "library_reason",
            Self::Cashier => "cashier_reason",
            Self::Business => "business_reason",
            Self::Engineering => "engineering_reason",
            Self::Criminology => "criminology_reason",
        }
    }

    /// Column holding this department's approval timestamp.
    pub fn approved_at_column(&self) -> &'static str {
        match self {
            Self::Registrar => "registrar_approved_at",
            Self::Guidance => "guidance_approved_at",
            Self::Mis => "mis_approved_at",
            Self::Library => "library_approved_at",
            Self::Cashier => "cashier_approved_at",
            Self::Business => "business_approved_at",
            Self::Engineering => "engineering_approved_at",
            Self::Criminology => "criminology_approved_at",
        }
    }

    /// Column holding this department's rejection timestamp
    /// (student-scoped clearances only).
    pub fn rejected_at_column(&self) -> &'static str {
        match self {
            Self::Registrar => "registrar_rejected_at",
            Self::Guidance => "guidance_rejected_at",
            Self::Mis => "mis_rejected_at",
            Self::Library => "library_rejected_at",
            Self::Cashier => "cashier_rejected_at",
            Self::Business => "business_rejected_at",
            Self::Engineering => "engineering_rejected_at",
            Self::Criminology => "criminology_rejected_at",
        }
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_departments() {
        for dept in ALL_DEPARTMENTS {
            assert_eq!(Department::from_str_value(dept.as_str()).unwrap(), *dept);
        }
    }

    #[test]
    fn test_display_aliases_accepted() {
        assert_eq!(
            Department::from_str_value("engineering and architecture").unwrap(),
            Department::Engineering
        );
        assert_eq!(
            Department::from_str_value("criminal justice").unwrap(),
            Department::Criminology
        );
        assert_eq!(
            Department::from_str_value("business and technology").unwrap(),
            Department::Business
        );
    }

    #[test]
    fn test_unknown_department_rejected() {
        let err = Department::from_str_value("athletics").unwrap_err();
        assert!(err.contains("Invalid department"));
    }

    #[test]
    fn test_column_names_derive_from_canonical_name() {
        for dept in ALL_DEPARTMENTS {
            assert_eq!(dept.status_column(), format!("{}_status", dept.as_str()));
            assert_eq!(dept.reason_column(), format!("{}_reason", dept.as_str()));
            assert_eq!(
                dept.approved_at_column(),
                format!("{}_approved_at", dept.as_str())
            );
            assert_eq!(
                dept.rejected_at_column(),
                format!("{}_rejected_at", dept.as_str())
            );
        }
    }
}
