//! Handlers for the request lifecycle: creation, payment decisions,
//! rejection, completion, cancellation, and the request read models.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use docuflow_core::types::DbId;
use docuflow_db::models::request::{CreateRequestBody, RejectBody, Request, UpdateStatusBody};
use docuflow_db::repositories::RequestRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, NotifyingResponse};
use crate::state::AppState;
use crate::workflow::requests as workflow;

/// POST /api/v1/requests
///
/// Create a single-document request. Duplicate (student, document) pairs
/// are rejected with a conflict.
pub async fn create_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateRequestBody>,
) -> AppResult<impl IntoResponse> {
    let request = workflow::create_request(&state.pool, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        request_id = request.id,
        "Request created via API"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// PUT /api/v1/requests/{request_id}/payment/approve
pub async fn approve_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (request, notification_sent) =
        workflow::approve_payment(&state.pool, &state.notifier, request_id).await?;

    tracing::info!(user_id = auth.user_id, request_id, "Payment approved via API");
    Ok(Json(NotifyingResponse {
        data: request,
        notification_sent,
    }))
}

/// PUT /api/v1/requests/{request_id}/payment/reject
///
/// Requires a non-empty reason.
pub async fn reject_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<RejectBody>,
) -> AppResult<impl IntoResponse> {
    let (request, notification_sent) = workflow::reject_payment(
        &state.pool,
        &state.notifier,
        request_id,
        input.reason.as_deref(),
    )
    .await?;

    tracing::info!(user_id = auth.user_id, request_id, "Payment rejected via API");
    Ok(Json(NotifyingResponse {
        data: request,
        notification_sent,
    }))
}

/// PUT /api/v1/requests/{request_id}/reject
pub async fn reject_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<RejectBody>,
) -> AppResult<impl IntoResponse> {
    let (request, notification_sent) = workflow::reject_request(
        &state.pool,
        &state.notifier,
        request_id,
        input.reason.as_deref(),
    )
    .await?;

    tracing::info!(user_id = auth.user_id, request_id, "Request rejected via API");
    Ok(Json(NotifyingResponse {
        data: request,
        notification_sent,
    }))
}

/// Response payload for request completion.
#[derive(Debug, Serialize)]
pub struct CompletionResponse {
    pub request: Request,
    pub pickup_date: NaiveDate,
    pub notification_sent: bool,
}

/// POST /api/v1/requests/{request_id}/complete
///
/// Fails with 422 unless the student's clearance satisfies the department
/// policy for their course/role.
pub async fn complete_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (request, pickup_date, notification_sent) =
        workflow::complete_request(&state.pool, &state.notifier, request_id).await?;

    tracing::info!(user_id = auth.user_id, request_id, "Request completed via API");
    Ok(Json(DataResponse {
        data: CompletionResponse {
            request,
            pickup_date,
            notification_sent,
        },
    }))
}

/// DELETE /api/v1/requests/{request_id}
///
/// Cancel a still-pending, unpaid request.
pub async fn cancel_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    workflow::cancel_request(&state.pool, request_id).await?;

    tracing::info!(user_id = auth.user_id, request_id, "Request cancelled via API");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/requests/{request_id}/status
///
/// Manual status edit (admin); validated against the transition table.
pub async fn update_request_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
    Json(input): Json<UpdateStatusBody>,
) -> AppResult<impl IntoResponse> {
    let request =
        workflow::update_request_status(&state.pool, request_id, &input.status).await?;

    tracing::info!(
        user_id = auth.user_id,
        request_id,
        status = %input.status,
        "Request status updated via API"
    );
    Ok(Json(DataResponse { data: request }))
}

/// GET /api/v1/students/{student_id}/requests
pub async fn list_for_student(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let requests = RequestRepo::list_for_student(&state.pool, student_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// Query parameters for the admin request listing.
#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    pub department: Option<String>,
}

/// GET /api/v1/requests
///
/// Admin listing. Department staff views narrow to the courses their
/// office clears; super admins and the campus-wide offices see all.
pub async fn list_all(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> AppResult<impl IntoResponse> {
    let course_like = if auth.role == "super admin" {
        None
    } else {
        match query.department.as_deref() {
            Some("mis") => Some("%information technology%"),
            Some("engineering") => Some("%engineering%"),
            Some("criminology") => Some("%criminology%"),
            _ => None,
        }
    };

    let requests = RequestRepo::list_all(&state.pool, course_like).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// Query parameters for the date-filtered report.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// GET /api/v1/requests/report
pub async fn report(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<impl IntoResponse> {
    let rows =
        RequestRepo::list_report(&state.pool, query.start_date, query.end_date).await?;
    Ok(Json(DataResponse { data: rows }))
}
