//! Clearance row models: request-scoped and student-scoped.
//!
//! Both tables carry one column group per department in the fixed office
//! set. The accessor methods fold those column groups back into
//! `(Department, ClearanceStatus)` pairs for the aggregation functions in
//! `docuflow_core::clearance`; unparsable status text degrades to pending
//! rather than poisoning the whole row.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docuflow_core::clearance::{ClearanceStatus, DepartmentState};
use docuflow_core::department::{Department, ALL_DEPARTMENTS};
use docuflow_core::types::{DbId, Timestamp};

/// A row from the `request_clearances` table: per-transaction sign-offs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RequestClearance {
    pub id: DbId,
    pub request_id: DbId,
    pub registrar_status: String,
    pub registrar_reason: Option<String>,
    pub registrar_approved_at: Option<Timestamp>,
    pub guidance_status: String,
    pub guidance_reason: Option<String>,
    pub guidance_approved_at: Option<Timestamp>,
    pub mis_status: String,
    pub mis_reason: Option<String>,
    pub mis_approved_at: Option<Timestamp>,
    pub library_status: String,
    pub library_reason: Option<String>,
    pub library_approved_at: Option<Timestamp>,
    pub cashier_status: String,
    pub cashier_reason: Option<String>,
    pub cashier_approved_at: Option<Timestamp>,
    pub business_status: String,
    pub business_reason: Option<String>,
    pub business_approved_at: Option<Timestamp>,
    pub engineering_status: String,
    pub engineering_reason: Option<String>,
    pub engineering_approved_at: Option<Timestamp>,
    pub criminology_status: String,
    pub criminology_reason: Option<String>,
    pub criminology_approved_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl RequestClearance {
    fn status_text(&self, department: Department) -> &str {
        match department {
            Department::Registrar => &self.registrar_status,
            Department::Guidance => &self.guidance_status,
            Department::Mis => &self.mis_status,
            Department::Library => &self.library_status,
            Department::Cashier => &self.cashier_status,
            Department::Business => &self.business_status,
            Department::Engineering => &self.engineering_status,
            Department::Criminology => &self.criminology_status,
        }
    }

    /// Per-department statuses for aggregate evaluation.
    pub fn department_statuses(&self) -> Vec<(Department, ClearanceStatus)> {
        ALL_DEPARTMENTS
            .iter()
            .map(|dept| {
                let status = ClearanceStatus::from_str_value(self.status_text(*dept))
                    .unwrap_or(ClearanceStatus::Pending);
                (*dept, status)
            })
            .collect()
    }
}

/// A row from the `student_clearance` table: lifetime/semester sign-offs.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentClearance {
    pub id: DbId,
    pub student_id: DbId,
    pub registrar_status: String,
    pub registrar_reason: Option<String>,
    pub registrar_approved_at: Option<Timestamp>,
    pub registrar_rejected_at: Option<Timestamp>,
    pub guidance_status: String,
    pub guidance_reason: Option<String>,
    pub guidance_approved_at: Option<Timestamp>,
    pub guidance_rejected_at: Option<Timestamp>,
    pub mis_status: String,
    pub mis_reason: Option<String>,
    pub mis_approved_at: Option<Timestamp>,
    pub mis_rejected_at: Option<Timestamp>,
    pub library_status: String,
    pub library_reason: Option<String>,
    pub library_approved_at: Option<Timestamp>,
    pub library_rejected_at: Option<Timestamp>,
    pub cashier_status: String,
    pub cashier_reason: Option<String>,
    pub cashier_approved_at: Option<Timestamp>,
    pub cashier_rejected_at: Option<Timestamp>,
    pub business_status: String,
    pub business_reason: Option<String>,
    pub business_approved_at: Option<Timestamp>,
    pub business_rejected_at: Option<Timestamp>,
    pub engineering_status: String,
    pub engineering_reason: Option<String>,
    pub engineering_approved_at: Option<Timestamp>,
    pub engineering_rejected_at: Option<Timestamp>,
    pub criminology_status: String,
    pub criminology_reason: Option<String>,
    pub criminology_approved_at: Option<Timestamp>,
    pub criminology_rejected_at: Option<Timestamp>,
    pub last_cleared: Option<Timestamp>,
    pub clearance_expiry: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl StudentClearance {
    fn status_text(&self, department: Department) -> &str {
        match department {
            Department::Registrar => &self.registrar_status,
            Department::Guidance => &self.guidance_status,
            Department::Mis => &self.mis_status,
            Department::Library => &self.library_status,
            Department::Cashier => &self.cashier_status,
            Department::Business => &self.business_status,
            Department::Engineering => &self.engineering_status,
            Department::Criminology => &self.criminology_status,
        }
    }

    /// Per-department statuses for aggregate evaluation.
    pub fn department_statuses(&self) -> Vec<(Department, ClearanceStatus)> {
        ALL_DEPARTMENTS
            .iter()
            .map(|dept| {
                let status = ClearanceStatus::from_str_value(self.status_text(*dept))
                    .unwrap_or(ClearanceStatus::Pending);
                (*dept, status)
            })
            .collect()
    }

    /// The full column group for one department.
    pub fn department_state(&self, department: Department) -> DepartmentState {
        let (reason, approved_at, rejected_at) = match department {
            Department::Registrar => (
                self.registrar_reason.clone(),
                self.registrar_approved_at,
                self.registrar_rejected_at,
            ),
            Department::Guidance => (
                self.guidance_reason.clone(),
                self.guidance_approved_at,
                self.guidance_rejected_at,
            ),
            Department::Mis => (self.mis_reason.clone(), self.mis_approved_at, self.mis_rejected_at),
            Department::Library => (
                self.library_reason.clone(),
                self.library_approved_at,
                self.library_rejected_at,
            ),
            Department::Cashier => (
                self.cashier_reason.clone(),
                self.cashier_approved_at,
                self.cashier_rejected_at,
            ),
            Department::Business => (
                self.business_reason.clone(),
                self.business_approved_at,
                self.business_rejected_at,
            ),
            Department::Engineering => (
                self.engineering_reason.clone(),
                self.engineering_approved_at,
                self.engineering_rejected_at,
            ),
            Department::Criminology => (
                self.criminology_reason.clone(),
                self.criminology_approved_at,
                self.criminology_rejected_at,
            ),
        };
        DepartmentState {
            department,
            status: ClearanceStatus::from_str_value(self.status_text(department))
                .unwrap_or(ClearanceStatus::Pending),
            reason,
            approved_at,
            rejected_at,
        }
    }
}

/// Student listing row: account fields left-joined with the clearance
/// statuses (students without a row yet show all-NULL statuses).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentClearanceListRow {
    pub student_id: DbId,
    pub username: String,
    pub email: Option<String>,
    pub course: Option<String>,
    pub role: String,
    pub registrar_status: Option<String>,
    pub guidance_status: Option<String>,
    pub mis_status: Option<String>,
    pub library_status: Option<String>,
    pub cashier_status: Option<String>,
    pub business_status: Option<String>,
    pub engineering_status: Option<String>,
    pub criminology_status: Option<String>,
    pub last_cleared: Option<Timestamp>,
    pub clearance_expiry: Option<Timestamp>,
}

/// HTTP body for a department clearance update.
#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentUpdateBody {
    pub status: String,
    pub reason: Option<String>,
}

/// Result of a request-scoped department update.
#[derive(Debug, Clone, Serialize)]
pub struct RequestClearanceOutcome {
    pub clearance: RequestClearance,
    /// Request status after the clearance-driven transition, as stored.
    pub request_status: String,
    pub any_rejected: bool,
    pub all_approved: bool,
}

/// Result of a student-scoped department update.
#[derive(Debug, Clone, Serialize)]
pub struct StudentClearanceOutcome {
    pub clearance: StudentClearance,
    /// Whether every department required by policy is now approved.
    pub all_cleared: bool,
    /// True only on the transition into the cleared state -- the caller
    /// fires the completion notification exactly then.
    pub newly_cleared: bool,
    /// Whether an expired row was reset before the update applied.
    pub was_reset: bool,
}
