//! Handlers for student-scoped clearances: the department dashboards,
//! per-student views with lazy expiry reset, department updates, manual
//! resets, and the can-request check.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use docuflow_core::clearance::{self, ClearanceStatus};
use docuflow_core::department::Department;
use docuflow_core::policy;
use docuflow_core::types::DbId;
use docuflow_db::models::clearance::{
    DepartmentUpdateBody, StudentClearance, StudentClearanceListRow,
};
use docuflow_db::repositories::StudentClearanceRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflow::clearances as workflow;

/// Listing row enriched with computed validity flags.
#[derive(Debug, Serialize)]
pub struct StudentClearanceListView {
    #[serde(flatten)]
    pub row: StudentClearanceListRow,
    pub is_expired: bool,
    pub is_valid: bool,
}

fn listing_statuses(row: &StudentClearanceListRow) -> Vec<(Department, ClearanceStatus)> {
    [
        (Department::Registrar, &row.registrar_status),
        (Department::Guidance, &row.guidance_status),
        (Department::Mis, &row.mis_status),
        (Department::Library, &row.library_status),
        (Department::Cashier, &row.cashier_status),
        (Department::Business, &row.business_status),
        (Department::Engineering, &row.engineering_status),
        (Department::Criminology, &row.criminology_status),
    ]
    .into_iter()
    .map(|(dept, status)| {
        let status = status
            .as_deref()
            .and_then(|s| ClearanceStatus::from_str_value(s).ok())
            .unwrap_or(ClearanceStatus::Pending);
        (dept, status)
    })
    .collect()
}

/// GET /api/v1/student-clearances
///
/// All students and alumni with their clearance statuses and computed
/// validity.
pub async fn list_student_clearances(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let rows = StudentClearanceRepo::list_students(&state.pool).await?;

    let students: Vec<StudentClearanceListView> = rows
        .into_iter()
        .map(|row| {
            let required = policy::required_departments(
                row.course.as_deref().unwrap_or(""),
                policy::Role::from_str_value(&row.role),
            );
            let is_expired = clearance::is_expired(row.clearance_expiry, now);
            let is_valid =
                !is_expired && clearance::all_approved(&listing_statuses(&row), &required);
            StudentClearanceListView {
                row,
                is_expired,
                is_valid,
            }
        })
        .collect();

    Ok(Json(DataResponse { data: students }))
}

/// Per-student clearance view with computed validity.
#[derive(Debug, Serialize)]
pub struct StudentClearanceView {
    #[serde(flatten)]
    pub clearance: StudentClearance,
    pub is_valid: bool,
    pub was_reset: bool,
}

/// GET /api/v1/student-clearances/{student_id}
///
/// The clearance row is created lazily, and an expired row is fully reset
/// before it is returned.
pub async fn get_student_clearance(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (_user, clearance, is_valid, was_reset) =
        workflow::student_clearance_view(&state.pool, student_id).await?;

    Ok(Json(DataResponse {
        data: StudentClearanceView {
            clearance,
            is_valid,
            was_reset,
        },
    }))
}

/// Department update response with the notification outcome.
#[derive(Debug, Serialize)]
pub struct StudentClearanceUpdateResponse {
    #[serde(flatten)]
    pub clearance: StudentClearance,
    pub all_cleared: bool,
    pub expiry_set: bool,
    pub notification_sent: bool,
}

/// PUT /api/v1/student-clearances/{student_id}/{department}
///
/// Record one department's decision. When the update completes the
/// required set, the six-month validity window is granted and the
/// clearance-complete notification fires (once per cycle).
pub async fn update_student_clearance(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((student_id, department)): Path<(DbId, String)>,
    Json(input): Json<DepartmentUpdateBody>,
) -> AppResult<impl IntoResponse> {
    let (outcome, notification_sent) = workflow::update_student_clearance(
        &state.pool,
        &state.notifier,
        student_id,
        &department,
        &input.status,
        input.reason.as_deref(),
    )
    .await?;

    tracing::info!(
        user_id = auth.user_id,
        student_id,
        department = %department,
        status = %input.status,
        all_cleared = outcome.all_cleared,
        "Student clearance updated via API"
    );
    Ok(Json(DataResponse {
        data: StudentClearanceUpdateResponse {
            clearance: outcome.clearance,
            all_cleared: outcome.all_cleared,
            expiry_set: outcome.newly_cleared,
            notification_sent,
        },
    }))
}

/// POST /api/v1/student-clearances/{student_id}/reset
///
/// Manual full reset (admin action).
pub async fn reset_student_clearance(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let clearance = workflow::reset_student_clearance(&state.pool, student_id).await?;

    tracing::info!(
        user_id = auth.user_id,
        student_id,
        "Student clearance reset via API"
    );
    Ok(Json(DataResponse { data: clearance }))
}

/// GET /api/v1/student-clearances/{student_id}/can-request
pub async fn can_request(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(student_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let verdict = workflow::can_request(&state.pool, student_id).await?;
    Ok(Json(DataResponse { data: verdict }))
}
