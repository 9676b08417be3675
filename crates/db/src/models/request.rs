//! Document request models and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docuflow_core::lifecycle::{PaymentStatus, RequestStatus};
use docuflow_core::types::{DbId, Timestamp};

/// A row from the `requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Request {
    pub id: DbId,
    pub student_id: DbId,
    pub document_id: Option<DbId>,
    pub document_ids: Option<serde_json::Value>,
    pub status: String,
    pub payment: String,
    pub reason: Option<String>,
    pub amount: Option<f64>,
    pub reference_no: Option<String>,
    pub rejection_reason: Option<String>,
    pub request_rejection: Option<String>,
    pub submission_date: Timestamp,
    pub release_date: Option<NaiveDate>,
    pub completed_at: Option<Timestamp>,
}

impl Request {
    /// Parsed lifecycle status. Unparsable column values surface as an
    /// error rather than silently mapping to a state.
    pub fn status(&self) -> Result<RequestStatus, String> {
        RequestStatus::from_str_value(&self.status)
    }

    /// Parsed payment sub-state.
    pub fn payment(&self) -> Result<PaymentStatus, String> {
        PaymentStatus::from_str_value(&self.payment)
    }
}

/// Insert payload for a single-document request.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub student_id: DbId,
    pub document_id: DbId,
    pub reason: Option<String>,
    pub release_date: NaiveDate,
}

/// Insert payload for a checkout batch covering several documents.
#[derive(Debug, Clone)]
pub struct NewCheckout {
    pub student_id: DbId,
    pub document_ids: Vec<DbId>,
    pub amount: f64,
    pub reason: String,
    /// Cart rows consumed by this checkout.
    pub cart_item_ids: Vec<DbId>,
}

/// HTTP body for request creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRequestBody {
    pub student_id: DbId,
    pub document_id: DbId,
    pub reason: Option<String>,
}

/// HTTP body carrying a rejection reason.
#[derive(Debug, Clone, Deserialize)]
pub struct RejectBody {
    pub reason: Option<String>,
}

/// HTTP body for a manual status edit.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusBody {
    pub status: String,
}

/// A student's request joined with its document names.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentRequestRow {
    pub id: DbId,
    pub student_id: DbId,
    pub document_id: Option<DbId>,
    pub status: String,
    pub payment: String,
    pub reason: Option<String>,
    pub amount: Option<f64>,
    pub rejection_reason: Option<String>,
    pub request_rejection: Option<String>,
    pub submission_date: Timestamp,
    pub release_date: Option<NaiveDate>,
    pub document_name: Option<String>,
    pub document_count: i64,
}

/// Admin request listing row: request, requester, and the request-scoped
/// per-department statuses.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminRequestRow {
    pub id: DbId,
    pub student_id: DbId,
    pub status: String,
    pub payment: String,
    pub reason: Option<String>,
    pub amount: Option<f64>,
    pub rejection_reason: Option<String>,
    pub submission_date: Timestamp,
    pub release_date: Option<NaiveDate>,
    pub document_name: Option<String>,
    pub document_count: i64,
    pub username: String,
    pub course: Option<String>,
    pub email: Option<String>,
    pub registrar_status: Option<String>,
    pub guidance_status: Option<String>,
    pub mis_status: Option<String>,
    pub library_status: Option<String>,
    pub cashier_status: Option<String>,
    pub business_status: Option<String>,
    pub engineering_status: Option<String>,
    pub criminology_status: Option<String>,
}

/// Date-filtered reporting row (requests joined with catalog data).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RequestReportRow {
    pub id: DbId,
    pub student_id: DbId,
    pub document_id: Option<DbId>,
    pub status: String,
    pub payment: String,
    pub amount: Option<f64>,
    pub submission_date: Timestamp,
    pub release_date: Option<NaiveDate>,
    pub document_name: Option<String>,
    pub fee: Option<f64>,
    pub processing_time: Option<String>,
}

/// Request detail merged with catalog and requester info.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RequestDetailRow {
    pub id: DbId,
    pub student_id: DbId,
    pub document_id: Option<DbId>,
    pub status: String,
    pub payment: String,
    pub reason: Option<String>,
    pub amount: Option<f64>,
    pub reference_no: Option<String>,
    pub rejection_reason: Option<String>,
    pub request_rejection: Option<String>,
    pub submission_date: Timestamp,
    pub release_date: Option<NaiveDate>,
    pub document_name: Option<String>,
    pub username: String,
    pub email: Option<String>,
    pub course: Option<String>,
    pub student_number: Option<String>,
}
