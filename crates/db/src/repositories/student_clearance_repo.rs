//! Repository for the `student_clearance` table.
//!
//! The read/update paths both evaluate expiry lazily: an expired row is
//! fully reset (every department back to pending, reasons and timestamps
//! cleared, validity window nulled) before anything else happens. Each
//! sequence runs in one transaction holding `SELECT ... FOR UPDATE` on
//! the clearance row, giving at-most-one-writer semantics per student.

use sqlx::{PgPool, Postgres, Transaction};

use docuflow_core::clearance::{self, ClearanceStatus};
use docuflow_core::department::{Department, ALL_DEPARTMENTS};
use docuflow_core::types::{DbId, Timestamp};

use crate::models::clearance::{
    StudentClearance, StudentClearanceListRow, StudentClearanceOutcome,
};

/// Column list for student_clearance queries.
const COLUMNS: &str = "id, student_id, \
    registrar_status, registrar_reason, registrar_approved_at, registrar_rejected_at, \
    guidance_status, guidance_reason, guidance_approved_at, guidance_rejected_at, \
    mis_status, mis_reason, mis_approved_at, mis_rejected_at, \
    library_status, library_reason, library_approved_at, library_rejected_at, \
    cashier_status, cashier_reason, cashier_approved_at, cashier_rejected_at, \
    business_status, business_reason, business_approved_at, business_rejected_at, \
    engineering_status, engineering_reason, engineering_approved_at, engineering_rejected_at, \
    criminology_status, criminology_reason, criminology_approved_at, criminology_rejected_at, \
    last_cleared, clearance_expiry, created_at";

pub struct StudentClearanceRepo;

impl StudentClearanceRepo {
    /// Find a student's clearance row without creating or resetting it.
    pub async fn find_by_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Option<StudentClearance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM student_clearance WHERE student_id = $1");
        sqlx::query_as::<_, StudentClearance>(&query)
            .bind(student_id)
            .fetch_optional(pool)
            .await
    }

    /// Load the current clearance for a student: lazily creates the row
    /// and resets it when expired. Returns the row and whether a reset
    /// happened.
    pub async fn load_current(
        pool: &PgPool,
        student_id: DbId,
        now: Timestamp,
    ) -> Result<(StudentClearance, bool), sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut row = Self::lock_or_create(&mut tx, student_id).await?;

        let was_reset = clearance::is_expired(row.clearance_expiry, now);
        if was_reset {
            tracing::info!(student_id, "Clearance expired, resetting to pending");
            row = Self::reset_in_tx(&mut tx, student_id).await?;
        }

        tx.commit().await?;
        Ok((row, was_reset))
    }

    /// Apply one department's update inside a single locked transaction:
    /// lazy-create, expiry reset, the column-group write, aggregate
    /// evaluation against `required`, and -- on the transition into the
    /// fully-cleared state -- the grant of the six-month validity window.
    pub async fn apply_department_update(
        pool: &PgPool,
        student_id: DbId,
        department: Department,
        status: ClearanceStatus,
        reason: Option<&str>,
        required: &[Department],
        now: Timestamp,
    ) -> Result<StudentClearanceOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let row = Self::lock_or_create(&mut tx, student_id).await?;

        let was_reset = clearance::is_expired(row.clearance_expiry, now);
        if was_reset {
            tracing::info!(student_id, "Clearance expired, resetting before update");
            Self::reset_in_tx(&mut tx, student_id).await?;
        }

        let mut row =
            Self::update_department(&mut tx, student_id, department, status, reason, now).await?;

        let all_cleared = clearance::all_approved(&row.department_statuses(), required);
        // Only the pending -> cleared edge grants a validity window; a
        // clearance that is already in its window stays untouched so
        // repeated approvals are idempotent.
        let newly_cleared = all_cleared && row.clearance_expiry.is_none();
        if newly_cleared {
            let expiry = clearance::expiry_after(now);
            let query = format!(
                "UPDATE student_clearance
                 SET last_cleared = $1, clearance_expiry = $2
                 WHERE student_id = $3
                 RETURNING {COLUMNS}"
            );
            row = sqlx::query_as::<_, StudentClearance>(&query)
                .bind(now)
                .bind(expiry)
                .bind(student_id)
                .fetch_one(&mut *tx)
                .await?;
            tracing::info!(
                student_id,
                expiry = %expiry,
                "All required departments approved, validity window granted"
            );
        }

        tx.commit().await?;

        Ok(StudentClearanceOutcome {
            clearance: row,
            all_cleared,
            newly_cleared,
            was_reset,
        })
    }

    /// All student/alumni accounts with their clearance statuses, for the
    /// department dashboards. Accounts without a clearance row show NULL
    /// statuses.
    pub async fn list_students(
        pool: &PgPool,
    ) -> Result<Vec<StudentClearanceListRow>, sqlx::Error> {
        sqlx::query_as::<_, StudentClearanceListRow>(
            "SELECT u.id AS student_id, u.username, u.email, u.course, u.role,
                    sc.registrar_status, sc.guidance_status, sc.mis_status,
                    sc.library_status, sc.cashier_status, sc.business_status,
                    sc.engineering_status, sc.criminology_status,
                    sc.last_cleared, sc.clearance_expiry
             FROM users u
             LEFT JOIN student_clearance sc ON sc.student_id = u.id
             WHERE u.role IN ('student', 'alumni')
             ORDER BY u.username ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Manual full reset (admin action). Returns `None` when the student
    /// has no clearance row yet.
    pub async fn reset(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Option<StudentClearance>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {COLUMNS} FROM student_clearance WHERE student_id = $1 FOR UPDATE"
        );
        let existing = sqlx::query_as::<_, StudentClearance>(&query)
            .bind(student_id)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_none() {
            return Ok(None);
        }

        let row = Self::reset_in_tx(&mut tx, student_id).await?;
        tx.commit().await?;
        Ok(Some(row))
    }

    /// Insert-if-missing, then lock the row for the transaction.
    async fn lock_or_create(
        tx: &mut Transaction<'_, Postgres>,
        student_id: DbId,
    ) -> Result<StudentClearance, sqlx::Error> {
        sqlx::query(
            "INSERT INTO student_clearance (student_id) VALUES ($1)
             ON CONFLICT (student_id) DO NOTHING",
        )
        .bind(student_id)
        .execute(&mut **tx)
        .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM student_clearance WHERE student_id = $1 FOR UPDATE"
        );
        sqlx::query_as::<_, StudentClearance>(&query)
            .bind(student_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Full-row reset: every department back to pending, all reasons and
    /// timestamps cleared, validity window nulled.
    async fn reset_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        student_id: DbId,
    ) -> Result<StudentClearance, sqlx::Error> {
        let set_clauses = ALL_DEPARTMENTS
            .iter()
            .map(|d| {
                format!(
                    "{} = 'pending', {} = NULL, {} = NULL, {} = NULL",
                    d.status_column(),
                    d.reason_column(),
                    d.approved_at_column(),
                    d.rejected_at_column()
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "UPDATE student_clearance
             SET {set_clauses}, last_cleared = NULL, clearance_expiry = NULL
             WHERE student_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StudentClearance>(&query)
            .bind(student_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Write one department's column group on the locked clearance row.
    /// Approval and rejection timestamps are mutually exclusive; moving
    /// back to pending clears both.
    async fn update_department(
        tx: &mut Transaction<'_, Postgres>,
        student_id: DbId,
        department: Department,
        status: ClearanceStatus,
        reason: Option<&str>,
        now: Timestamp,
    ) -> Result<StudentClearance, sqlx::Error> {
        // Column names come from the Department enum, never from input.
        let status_col = department.status_column();
        let reason_col = department.reason_column();
        let approved_col = department.approved_at_column();
        let rejected_col = department.rejected_at_column();

        let row = match status {
            ClearanceStatus::Approved => {
                let query = format!(
                    "UPDATE student_clearance
                     SET {status_col} = $1, {reason_col} = NULL,
                         {approved_col} = $2, {rejected_col} = NULL
                     WHERE student_id = $3
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, StudentClearance>(&query)
                    .bind(status.as_str())
                    .bind(now)
                    .bind(student_id)
                    .fetch_one(&mut **tx)
                    .await?
            }
            ClearanceStatus::Rejected => {
                let query = format!(
                    "UPDATE student_clearance
                     SET {status_col} = $1, {reason_col} = $2,
                         {approved_col} = NULL, {rejected_col} = $3
                     WHERE student_id = $4
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, StudentClearance>(&query)
                    .bind(status.as_str())
                    .bind(reason)
                    .bind(now)
                    .bind(student_id)
                    .fetch_one(&mut **tx)
                    .await?
            }
            ClearanceStatus::Pending => {
                let query = format!(
                    "UPDATE student_clearance
                     SET {status_col} = $1, {reason_col} = NULL,
                         {approved_col} = NULL, {rejected_col} = NULL
                     WHERE student_id = $2
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, StudentClearance>(&query)
                    .bind(status.as_str())
                    .bind(student_id)
                    .fetch_one(&mut **tx)
                    .await?
            }
        };
        Ok(row)
    }
}
