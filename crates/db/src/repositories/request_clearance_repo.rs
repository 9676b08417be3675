//! Repository for the `request_clearances` table.
//!
//! A department update and the request-status re-evaluation it triggers
//! run in one transaction holding `FOR UPDATE` locks on both the request
//! row and its clearance row, so concurrent department sign-offs cannot
//! lose each other's writes.

use sqlx::{PgPool, Postgres, Transaction};

use docuflow_core::clearance::{self, ClearanceStatus};
use docuflow_core::department::Department;
use docuflow_core::lifecycle::{transition, RequestEvent, RequestStatus};
use docuflow_core::types::{DbId, Timestamp};

use crate::models::clearance::{RequestClearance, RequestClearanceOutcome};
use crate::repositories::RequestRepo;

/// Column list for request_clearances queries.
const COLUMNS: &str = "id, request_id, \
    registrar_status, registrar_reason, registrar_approved_at, \
    guidance_status, guidance_reason, guidance_approved_at, \
    mis_status, mis_reason, mis_approved_at, \
    library_status, library_reason, library_approved_at, \
    cashier_status, cashier_reason, cashier_approved_at, \
    business_status, business_reason, business_approved_at, \
    engineering_status, engineering_reason, engineering_approved_at, \
    criminology_status, criminology_reason, criminology_approved_at, \
    created_at";

pub struct RequestClearanceRepo;

impl RequestClearanceRepo {
    /// Find the clearance row for a request.
    pub async fn find_by_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Option<RequestClearance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM request_clearances WHERE request_id = $1");
        sqlx::query_as::<_, RequestClearance>(&query)
            .bind(request_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the clearance row for a request, lazily creating it.
    pub async fn find_or_create(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<RequestClearance, sqlx::Error> {
        sqlx::query(
            "INSERT INTO request_clearances (request_id) VALUES ($1)
             ON CONFLICT (request_id) DO NOTHING",
        )
        .bind(request_id)
        .execute(pool)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM request_clearances WHERE request_id = $1");
        sqlx::query_as::<_, RequestClearance>(&query)
            .bind(request_id)
            .fetch_one(pool)
            .await
    }

    /// Apply a single-department update and re-derive the request status
    /// from the whole clearance row, in one transaction.
    ///
    /// Returns `None` when the request does not exist. Any rejection on
    /// the row sinks the request; a fully-approved row moves it to "in
    /// progress" (release still requires the explicit completion step).
    pub async fn apply_department_update(
        pool: &PgPool,
        request_id: DbId,
        department: Department,
        status: ClearanceStatus,
        reason: Option<&str>,
        now: Timestamp,
    ) -> Result<Option<RequestClearanceOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(request) = RequestRepo::find_for_update(&mut tx, request_id).await? else {
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO request_clearances (request_id) VALUES ($1)
             ON CONFLICT (request_id) DO NOTHING",
        )
        .bind(request_id)
        .execute(&mut *tx)
        .await?;

        let row = Self::update_department(&mut tx, request_id, department, status, reason, now)
            .await?;

        let statuses = row.department_statuses();
        let any_rejected = clearance::any_rejected(&statuses);
        let all_approved = statuses
            .iter()
            .all(|(_, s)| *s == ClearanceStatus::Approved);

        let event = if any_rejected {
            Some(RequestEvent::ClearanceRejected)
        } else if all_approved {
            Some(RequestEvent::ClearanceSatisfied)
        } else {
            None
        };

        let mut request_status = request.status.clone();
        if let Some(event) = event {
            match RequestStatus::from_str_value(&request.status) {
                Ok(current) => {
                    // For clearance-driven events an absent table entry
                    // means "leave the status unchanged".
                    if let Some(next) = transition(current, event) {
                        if next != current {
                            let updated =
                                RequestRepo::set_status(&mut tx, request_id, next.as_str())
                                    .await?;
                            request_status = updated.status;
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        request_id,
                        error = %err,
                        "Unparsable request status, leaving unchanged"
                    );
                }
            }
        }

        tx.commit().await?;

        Ok(Some(RequestClearanceOutcome {
            clearance: row,
            request_status,
            any_rejected,
            all_approved,
        }))
    }

    /// Write one department's column group on the locked clearance row.
    async fn update_department(
        tx: &mut Transaction<'_, Postgres>,
        request_id: DbId,
        department: Department,
        status: ClearanceStatus,
        reason: Option<&str>,
        now: Timestamp,
    ) -> Result<RequestClearance, sqlx::Error> {
        // Column names come from the Department enum, never from input.
        let status_col = department.status_column();
        let reason_col = department.reason_column();
        let approved_col = department.approved_at_column();

        let row = match status {
            ClearanceStatus::Approved => {
                let query = format!(
                    "UPDATE request_clearances
                     SET {status_col} = $1, {reason_col} = NULL, {approved_col} = $2
                     WHERE request_id = $3
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, RequestClearance>(&query)
                    .bind(status.as_str())
                    .bind(now)
                    .bind(request_id)
                    .fetch_one(&mut **tx)
                    .await?
            }
            ClearanceStatus::Rejected => {
                // Request-scoped rejections tolerate a missing reason.
                let query = format!(
                    "UPDATE request_clearances
                     SET {status_col} = $1, {reason_col} = $2, {approved_col} = NULL
                     WHERE request_id = $3
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, RequestClearance>(&query)
                    .bind(status.as_str())
                    .bind(reason)
                    .bind(request_id)
                    .fetch_one(&mut **tx)
                    .await?
            }
            ClearanceStatus::Pending => {
                let query = format!(
                    "UPDATE request_clearances
                     SET {status_col} = $1, {reason_col} = NULL, {approved_col} = NULL
                     WHERE request_id = $2
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, RequestClearance>(&query)
                    .bind(status.as_str())
                    .bind(request_id)
                    .fetch_one(&mut **tx)
                    .await?
            }
        };
        Ok(row)
    }
}
