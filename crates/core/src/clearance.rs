//! Clearance aggregation: per-department statuses folded into an overall
//! verdict, plus the expiry rules for a granted clearance.
//!
//! Everything here is side-effect-free and evaluated against pre-loaded
//! data. Callers inject `now` so the expiry predicate stays deterministic
//! under test.

use chrono::Months;
use serde::{Deserialize, Serialize};

use crate::department::Department;
use crate::types::Timestamp;

/// Number of months a fully-approved clearance stays valid.
pub const VALIDITY_MONTHS: u32 = 6;

/// Notification kind logged when a student's clearance becomes complete.
pub const NOTIFICATION_CLEARANCE_COMPLETE: &str = "clearance_complete";

/// Per-department sign-off state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceStatus {
    Pending,
    Approved,
    Rejected,
}

impl ClearanceStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!(
                "Invalid status '{s}'. Must be one of: pending, approved, rejected"
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

/// One department's slice of a clearance row.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentState {
    pub department: Department,
    pub status: ClearanceStatus,
    pub reason: Option<String>,
    pub approved_at: Option<Timestamp>,
    pub rejected_at: Option<Timestamp>,
}

/// True iff every department in `required` is approved in `statuses`.
///
/// Departments outside the required set are ignored, whatever their state;
/// a required department missing from `statuses` counts as not approved.
pub fn all_approved(
    statuses: &[(Department, ClearanceStatus)],
    required: &[Department],
) -> bool {
    required.iter().all(|dept| {
        statuses
            .iter()
            .any(|(d, s)| d == dept && *s == ClearanceStatus::Approved)
    })
}

/// True iff any department in `statuses` is rejected.
///
/// Request-scoped clearances use this over the whole row: a single
/// rejection sinks the request regardless of course policy.
pub fn any_rejected(statuses: &[(Department, ClearanceStatus)]) -> bool {
    statuses
        .iter()
        .any(|(_, s)| *s == ClearanceStatus::Rejected)
}

/// Whether a clearance granted with `expiry` has lapsed at `now`.
///
/// A missing expiry means the clearance has never been granted (or never
/// expires until one is computed), so it is not expired.
pub fn is_expired(expiry: Option<Timestamp>, now: Timestamp) -> bool {
    match expiry {
        Some(expiry) => now > expiry,
        None => false,
    }
}

/// Expiry timestamp for a clearance granted at `now`.
pub fn expiry_after(now: Timestamp) -> Timestamp {
    now.checked_add_months(Months::new(VALIDITY_MONTHS))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn approved(depts: &[Department]) -> Vec<(Department, ClearanceStatus)> {
        depts
            .iter()
            .map(|d| (*d, ClearanceStatus::Approved))
            .collect()
    }

    #[test]
    fn test_all_approved_requires_every_required_department() {
        let required = [Department::Registrar, Department::Cashier];
        let mut statuses = approved(&[Department::Registrar]);
        assert!(!all_approved(&statuses, &required));

        statuses.push((Department::Cashier, ClearanceStatus::Approved));
        assert!(all_approved(&statuses, &required));
    }

    #[test]
    fn test_departments_outside_required_set_are_ignored() {
        let required = [Department::Registrar, Department::Cashier];
        let mut statuses = approved(&[Department::Registrar, Department::Cashier]);
        // A rejected department the policy does not require must not
        // affect the verdict.
        statuses.push((Department::Engineering, ClearanceStatus::Rejected));
        assert!(all_approved(&statuses, &required));
    }

    #[test]
    fn test_missing_required_department_is_not_approved() {
        let required = [Department::Registrar, Department::Guidance];
        let statuses = approved(&[Department::Registrar]);
        assert!(!all_approved(&statuses, &required));
    }

    #[test]
    fn test_any_rejected() {
        let mut statuses = approved(&[Department::Registrar]);
        assert!(!any_rejected(&statuses));
        statuses.push((Department::Library, ClearanceStatus::Rejected));
        assert!(any_rejected(&statuses));
    }

    #[test]
    fn test_is_expired_null_is_valid() {
        assert!(!is_expired(None, Utc::now()));
    }

    #[test]
    fn test_is_expired_future_is_valid() {
        let now = Utc::now();
        assert!(!is_expired(Some(now + Duration::days(1)), now));
    }

    #[test]
    fn test_is_expired_past_is_expired() {
        let now = Utc::now();
        assert!(is_expired(Some(now - Duration::seconds(1)), now));
    }

    #[test]
    fn test_expiry_after_adds_six_months() {
        let now = Utc::now();
        let expiry = expiry_after(now);
        assert!(expiry > now + Duration::days(150));
        assert!(expiry < now + Duration::days(200));
    }

    #[test]
    fn test_status_round_trip() {
        for s in ["pending", "approved", "rejected"] {
            assert_eq!(ClearanceStatus::from_str_value(s).unwrap().as_str(), s);
        }
        assert!(ClearanceStatus::from_str_value("flagged").is_err());
    }
}
