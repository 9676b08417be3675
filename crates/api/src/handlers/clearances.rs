//! Handlers for request-scoped clearances.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use docuflow_core::error::CoreError;
use docuflow_core::types::DbId;
use docuflow_db::models::clearance::{DepartmentUpdateBody, RequestClearance};
use docuflow_db::models::request::RequestDetailRow;
use docuflow_db::repositories::{RequestClearanceRepo, RequestRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflow::clearances as workflow;

/// Request detail merged with its clearance row.
#[derive(Debug, Serialize)]
pub struct RequestClearanceView {
    #[serde(flatten)]
    pub request: RequestDetailRow,
    pub clearance: RequestClearance,
}

/// GET /api/v1/requests/{request_id}/clearance
///
/// The clearance row is created lazily on first read.
pub async fn get_request_clearance(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = RequestRepo::detail(&state.pool, request_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Request",
                id: request_id,
            })
        })?;
    let clearance = RequestClearanceRepo::find_or_create(&state.pool, request_id).await?;

    Ok(Json(DataResponse {
        data: RequestClearanceView { request, clearance },
    }))
}

/// PUT /api/v1/requests/{request_id}/clearance/{department}
///
/// Record one department's decision on a request and re-derive the
/// request status from the whole row.
pub async fn update_request_clearance(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((request_id, department)): Path<(DbId, String)>,
    Json(input): Json<DepartmentUpdateBody>,
) -> AppResult<impl IntoResponse> {
    let outcome = workflow::update_request_clearance(
        &state.pool,
        request_id,
        &department,
        &input.status,
        input.reason.as_deref(),
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        request_id,
        department = %department,
        status = %input.status,
        "Request clearance updated via API"
    );
    Ok(Json(DataResponse { data: outcome }))
}
