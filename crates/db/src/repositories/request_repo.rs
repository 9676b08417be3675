//! Repository for the `requests` table and its `request_documents`
//! junction rows.
//!
//! Creation paths own a transaction: a request is never visible without
//! its junction rows and its empty `request_clearances` row, so the
//! duplicate check can't observe a half-created request.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};

use docuflow_core::types::{DbId, Timestamp};

use crate::models::request::{
    AdminRequestRow, NewCheckout, NewRequest, Request, RequestDetailRow, RequestReportRow,
    StudentRequestRow,
};

/// Column list for requests queries.
const COLUMNS: &str = "id, student_id, document_id, document_ids, status, payment, reason, \
    amount, reference_no, rejection_reason, request_rejection, submission_date, \
    release_date, completed_at";

/// Column list with the `r.` alias used by joined queries.
const ALIASED_COLUMNS: &str = "r.id, r.student_id, r.document_id, r.status, r.payment, \
    r.reason, r.amount, r.rejection_reason, r.request_rejection, r.submission_date, \
    r.release_date";

pub struct RequestRepo;

impl RequestRepo {
    /// Whether an open request for this (student, document) pair exists.
    ///
    /// Cancelled requests are hard-deleted, so presence alone is enough.
    pub async fn exists_for_student_document(
        pool: &PgPool,
        student_id: DbId,
        document_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(
                 SELECT 1 FROM requests WHERE student_id = $1 AND document_id = $2
             )",
        )
        .bind(student_id)
        .bind(document_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Create a single-document request together with its junction row and
    /// empty clearance row, as one transaction.
    pub async fn create_with_clearance(
        pool: &PgPool,
        input: &NewRequest,
    ) -> Result<Request, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO requests (student_id, document_id, reason, release_date)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, Request>(&insert_query)
            .bind(input.student_id)
            .bind(input.document_id)
            .bind(&input.reason)
            .bind(input.release_date)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO request_documents (request_id, document_id) VALUES ($1, $2)")
            .bind(request.id)
            .bind(input.document_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO request_clearances (request_id) VALUES ($1)")
            .bind(request.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(request)
    }

    /// Create one request covering a whole checkout batch: the request row
    /// with its JSON document-id list, one junction row per document, the
    /// empty clearance row, and deletion of the consumed cart items -- all
    /// in one transaction.
    pub async fn create_checkout(
        pool: &PgPool,
        input: &NewCheckout,
    ) -> Result<Request, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_query = format!(
            "INSERT INTO requests (student_id, document_ids, amount, reason)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, Request>(&insert_query)
            .bind(input.student_id)
            .bind(serde_json::json!(input.document_ids))
            .bind(input.amount)
            .bind(&input.reason)
            .fetch_one(&mut *tx)
            .await?;

        for document_id in &input.document_ids {
            sqlx::query(
                "INSERT INTO request_documents (request_id, document_id)
                 VALUES ($1, $2)
                 ON CONFLICT (request_id, document_id) DO NOTHING",
            )
            .bind(request.id)
            .bind(document_id)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("INSERT INTO request_clearances (request_id) VALUES ($1)")
            .bind(request.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM document_cart WHERE user_id = $1 AND id = ANY($2)")
            .bind(input.student_id)
            .bind(&input.cart_item_ids)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(request)
    }

    /// Find a request by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Request>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM requests WHERE id = $1");
        sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a request and lock its row for the rest of the transaction.
    pub async fn find_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Request>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM requests WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Set the payment sub-state (and the lifecycle status decided by the
    /// caller) on a locked request row.
    pub async fn update_payment(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        payment: &str,
        rejection_reason: Option<&str>,
        status: &str,
    ) -> Result<Request, sqlx::Error> {
        let query = format!(
            "UPDATE requests
             SET payment = $1, rejection_reason = $2, status = $3
             WHERE id = $4
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(payment)
            .bind(rejection_reason)
            .bind(status)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Set the lifecycle status on a locked request row.
    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        status: &str,
    ) -> Result<Request, sqlx::Error> {
        let query = format!(
            "UPDATE requests SET status = $1 WHERE id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(status)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Reject a request outright, recording the request-level reason.
    pub async fn reject(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        status: &str,
        reason: &str,
    ) -> Result<Request, sqlx::Error> {
        let query = format!(
            "UPDATE requests
             SET status = $1, request_rejection = $2
             WHERE id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(status)
            .bind(reason)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Mark a request completed.
    pub async fn complete(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        status: &str,
        completed_at: Timestamp,
    ) -> Result<Request, sqlx::Error> {
        let query = format!(
            "UPDATE requests
             SET status = $1, completed_at = $2
             WHERE id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Request>(&query)
            .bind(status)
            .bind(completed_at)
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Hard-delete a request (explicit cancel). Junction and clearance rows
    /// go with it via ON DELETE CASCADE. Returns false when absent.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// A student's requests, newest first, with document names aggregated
    /// across the junction table.
    pub async fn list_for_student(
        pool: &PgPool,
        student_id: DbId,
    ) -> Result<Vec<StudentRequestRow>, sqlx::Error> {
        let query = format!(
            "SELECT {ALIASED_COLUMNS},
                    COALESCE(STRING_AGG(DISTINCT dt.name, ', '), MIN(dt_single.name))
                        AS document_name,
                    GREATEST(COUNT(DISTINCT rd.document_id), 1) AS document_count
             FROM requests r
             LEFT JOIN request_documents rd ON rd.request_id = r.id
             LEFT JOIN document_types dt ON dt.id = rd.document_id
             LEFT JOIN document_types dt_single ON dt_single.id = r.document_id
             WHERE r.student_id = $1
             GROUP BY r.id
             ORDER BY r.submission_date DESC"
        );
        sqlx::query_as::<_, StudentRequestRow>(&query)
            .bind(student_id)
            .fetch_all(pool)
            .await
    }

    /// Admin listing of all requests with requester info and the
    /// request-scoped clearance statuses. `course_like` optionally narrows
    /// to requesters whose course matches (department staff views).
    pub async fn list_all(
        pool: &PgPool,
        course_like: Option<&str>,
    ) -> Result<Vec<AdminRequestRow>, sqlx::Error> {
        let where_clause = if course_like.is_some() {
            "WHERE LOWER(u.course) LIKE $1"
        } else {
            ""
        };
        let query = format!(
            "SELECT r.id, r.student_id, r.status, r.payment, r.reason, r.amount,
                    r.rejection_reason, r.submission_date, r.release_date,
                    COALESCE(STRING_AGG(DISTINCT dt.name, ', '), MIN(dt_single.name))
                        AS document_name,
                    GREATEST(COUNT(DISTINCT rd.document_id), 1) AS document_count,
                    u.username, u.course, u.email,
                    MIN(c.registrar_status) AS registrar_status,
                    MIN(c.guidance_status) AS guidance_status,
                    MIN(c.mis_status) AS mis_status,
                    MIN(c.library_status) AS library_status,
                    MIN(c.cashier_status) AS cashier_status,
                    MIN(c.business_status) AS business_status,
                    MIN(c.engineering_status) AS engineering_status,
                    MIN(c.criminology_status) AS criminology_status
             FROM requests r
             INNER JOIN users u ON u.id = r.student_id
             LEFT JOIN request_clearances c ON c.request_id = r.id
             LEFT JOIN request_documents rd ON rd.request_id = r.id
             LEFT JOIN document_types dt ON dt.id = rd.document_id
             LEFT JOIN document_types dt_single ON dt_single.id = r.document_id
             {where_clause}
             GROUP BY r.id, u.username, u.course, u.email
             ORDER BY r.submission_date DESC"
        );
        let mut q = sqlx::query_as::<_, AdminRequestRow>(&query);
        if let Some(pattern) = course_like {
            q = q.bind(pattern.to_string());
        }
        q.fetch_all(pool).await
    }

    /// Date-filtered reporting rows (requests joined with catalog data).
    pub async fn list_report(
        pool: &PgPool,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<RequestReportRow>, sqlx::Error> {
        sqlx::query_as::<_, RequestReportRow>(
            "SELECT r.id, r.student_id, r.document_id, r.status, r.payment, r.amount,
                    r.submission_date, r.release_date,
                    d.name AS document_name, d.fee, d.processing_time
             FROM requests r
             LEFT JOIN document_types d ON d.id = r.document_id
             WHERE ($1::date IS NULL OR r.submission_date::date >= $1)
               AND ($2::date IS NULL OR r.submission_date::date <= $2)
             ORDER BY r.submission_date DESC",
        )
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    /// Request detail merged with catalog and requester info.
    pub async fn detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RequestDetailRow>, sqlx::Error> {
        sqlx::query_as::<_, RequestDetailRow>(
            "SELECT r.id, r.student_id, r.document_id, r.status, r.payment, r.reason,
                    r.amount, r.reference_no, r.rejection_reason, r.request_rejection,
                    r.submission_date, r.release_date,
                    d.name AS document_name,
                    u.username, u.email, u.course, u.student_number
             FROM requests r
             LEFT JOIN document_types d ON d.id = r.document_id
             INNER JOIN users u ON u.id = r.student_id
             WHERE r.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
