//! Course-keyed department policy: which offices must sign off before a
//! student (or alumni) is considered cleared.
//!
//! This is a fixed policy table, not a classifier. Course matching is by
//! exact normalized (trimmed, lowercased) string; a course appearing in no
//! list simply requires the base set.

use serde::{Deserialize, Serialize};

use crate::department::Department;

/// Account role, as stored in `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Alumni,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Convert from a database string value. Unknown role strings are
    /// treated as staff-like `Admin` so policy resolution stays total.
    pub fn from_str_value(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Self::Student,
            "alumni" => Self::Alumni,
            "super admin" | "super_admin" => Self::SuperAdmin,
            _ => Self::Admin,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Alumni => "alumni",
            Self::Admin => "admin",
            Self::SuperAdmin => "super admin",
        }
    }
}

/// Departments every non-alumni requester must clear.
pub const BASE_DEPARTMENTS: &[Department] = &[
    Department::Registrar,
    Department::Guidance,
    Department::Library,
    Department::Cashier,
];

/// Departments alumni must clear, independent of course.
pub const ALUMNI_DEPARTMENTS: &[Department] = &[Department::Registrar, Department::Cashier];

/// Courses whose students are additionally cleared by the MIS office.
const MIS_COURSES: &[&str] = &[
    "bachelor of science in information technology",
    "bachelor of science in accountancy",
    "bachelor of science in accounting technology",
    "bachelor of science in entrepreneurship",
    "bachelor of science in computer engineering",
];

/// Courses whose students are additionally cleared by the engineering
/// department.
const ENGINEERING_COURSES: &[&str] = &[
    "bachelor of science in architecture",
    "bachelor of science in civil engineering",
    "bachelor of science in electronics engineering",
    "bachelor of science in electrical engineering",
    "bachelor of science in mechanical engineering",
];

/// Courses whose students are additionally cleared by the criminology
/// department.
const CRIMINOLOGY_COURSES: &[&str] = &["bachelor of science in criminology"];

/// Resolve the ordered set of departments whose approval is mandatory for
/// the given course and role.
///
/// Pure and total: an unknown or unmatched course yields the base set.
pub fn required_departments(course: &str, role: Role) -> Vec<Department> {
    if role == Role::Alumni {
        return ALUMNI_DEPARTMENTS.to_vec();
    }

    let normalized = course.trim().to_ascii_lowercase();
    let mut required = BASE_DEPARTMENTS.to_vec();

    // At most one course-keyed extra department.
    if MIS_COURSES.contains(&normalized.as_str()) {
        required.push(Department::Mis);
    } else if ENGINEERING_COURSES.contains(&normalized.as_str()) {
        required.push(Department::Engineering);
    } else if CRIMINOLOGY_COURSES.contains(&normalized.as_str()) {
        required.push(Department::Criminology);
    }

    required
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlisted_course_requires_base_set_only() {
        let required = required_departments("bachelor of arts in philosophy", Role::Student);
        assert_eq!(required, BASE_DEPARTMENTS.to_vec());
    }

    #[test]
    fn test_empty_course_requires_base_set_only() {
        assert_eq!(
            required_departments("", Role::Student),
            BASE_DEPARTMENTS.to_vec()
        );
    }

    #[test]
    fn test_alumni_policy_is_course_independent() {
        for course in ["", "bachelor of science in criminology", "anything at all"] {
            assert_eq!(
                required_departments(course, Role::Alumni),
                vec![Department::Registrar, Department::Cashier]
            );
        }
    }

    #[test]
    fn test_information_technology_adds_mis() {
        let required = required_departments(
            "bachelor of science in information technology",
            Role::Student,
        );
        assert_eq!(*required.last().unwrap(), Department::Mis);
        assert_eq!(required.len(), BASE_DEPARTMENTS.len() + 1);
    }

    #[test]
    fn test_computer_engineering_resolves_to_mis_not_engineering() {
        let required =
            required_departments("bachelor of science in computer engineering", Role::Student);
        assert!(required.contains(&Department::Mis));
        assert!(!required.contains(&Department::Engineering));
    }

    #[test]
    fn test_civil_engineering_adds_engineering() {
        let required =
            required_departments("bachelor of science in civil engineering", Role::Student);
        assert_eq!(*required.last().unwrap(), Department::Engineering);
    }

    #[test]
    fn test_criminology_adds_criminology() {
        let required = required_departments("bachelor of science in criminology", Role::Student);
        assert_eq!(*required.last().unwrap(), Department::Criminology);
    }

    #[test]
    fn test_course_matching_normalizes_case_and_whitespace() {
        let required = required_departments(
            "  Bachelor of Science in Information Technology  ",
            Role::Student,
        );
        assert!(required.contains(&Department::Mis));
    }

    #[test]
    fn test_partial_course_name_does_not_match() {
        // Matching is exact, not substring.
        let required = required_departments("information technology", Role::Student);
        assert_eq!(required, BASE_DEPARTMENTS.to_vec());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(Role::from_str_value("Student"), Role::Student);
        assert_eq!(Role::from_str_value("alumni"), Role::Alumni);
        assert_eq!(Role::from_str_value("super admin"), Role::SuperAdmin);
        assert_eq!(Role::from_str_value("registrar staff"), Role::Admin);
    }
}
