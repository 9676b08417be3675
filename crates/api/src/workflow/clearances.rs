//! Clearance operations: request-scoped and student-scoped department
//! updates, expiry-aware reads, manual resets, and the can-request check.

use chrono::Utc;

use docuflow_core::clearance::{
    self, ClearanceStatus, NOTIFICATION_CLEARANCE_COMPLETE,
};
use docuflow_core::department::Department;
use docuflow_core::error::CoreError;
use docuflow_core::policy;
use docuflow_core::types::{DbId, Timestamp};
use docuflow_db::models::clearance::{
    RequestClearanceOutcome, StudentClearance, StudentClearanceOutcome,
};
use docuflow_db::models::user::User;
use docuflow_db::repositories::{
    ClearanceNotificationRepo, RequestClearanceRepo, StudentClearanceRepo, UserRepo,
};
use docuflow_db::DbPool;
use docuflow_notify::NotificationGateway;

use crate::error::{AppError, AppResult};
use crate::workflow::{notify_user, retry_once};

fn parse_department(department: &str) -> AppResult<Department> {
    Department::from_str_value(department)
        .map_err(|err| AppError::Core(CoreError::Validation(err)))
}

fn parse_clearance_status(status: &str) -> AppResult<ClearanceStatus> {
    ClearanceStatus::from_str_value(status)
        .map_err(|err| AppError::Core(CoreError::Validation(err)))
}

async fn require_user(pool: &DbPool, student_id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(pool, student_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Student",
                id: student_id,
            })
        })
}

/// Apply a department decision to a request's clearance row.
///
/// A missing reason is tolerated on rejection here (unlike the
/// student-scoped variant); the reference system behaved the same way.
pub async fn update_request_clearance(
    pool: &DbPool,
    request_id: DbId,
    department: &str,
    status: &str,
    reason: Option<&str>,
) -> AppResult<RequestClearanceOutcome> {
    let department = parse_department(department)?;
    let status = parse_clearance_status(status)?;
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    let now = Utc::now();

    let outcome = retry_once(|| {
        RequestClearanceRepo::apply_department_update(
            pool, request_id, department, status, reason, now,
        )
    })
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Request",
            id: request_id,
        })
    })?;

    tracing::info!(
        request_id,
        department = %department,
        status = %status.as_str(),
        request_status = %outcome.request_status,
        "Request clearance updated"
    );
    Ok(outcome)
}

/// Apply a department decision to a student's clearance row.
///
/// Runs the locked reset/update/aggregate sequence, and on the transition
/// into the fully-cleared state fires the clearance-complete notification,
/// deduplicated through the `clearance_notifications` log.
pub async fn update_student_clearance(
    pool: &DbPool,
    notifier: &NotificationGateway,
    student_id: DbId,
    department: &str,
    status: &str,
    reason: Option<&str>,
) -> AppResult<(StudentClearanceOutcome, bool)> {
    let department = parse_department(department)?;
    let status = parse_clearance_status(status)?;
    let reason = reason.map(str::trim).filter(|r| !r.is_empty());
    if status == ClearanceStatus::Rejected && reason.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "A reason is required when rejecting a clearance".into(),
        )));
    }

    let user = require_user(pool, student_id).await?;
    let required = policy::required_departments(user.course_or_empty(), user.role());
    let now = Utc::now();

    let outcome = retry_once(|| {
        StudentClearanceRepo::apply_department_update(
            pool, student_id, department, status, reason, &required, now,
        )
    })
    .await?;

    tracing::info!(
        student_id,
        department = %department,
        status = %status.as_str(),
        all_cleared = outcome.all_cleared,
        "Student clearance updated"
    );

    let mut notified = false;
    if outcome.newly_cleared {
        notified =
            send_clearance_complete(pool, notifier, &user, &outcome.clearance).await?;
    }

    Ok((outcome, notified))
}

/// Fire the clearance-complete notification unless one was already sent
/// in this validity cycle. The log entry is written only after a
/// successful delivery, so a failed transport can be retried by a later
/// trigger.
async fn send_clearance_complete(
    pool: &DbPool,
    notifier: &NotificationGateway,
    user: &User,
    row: &StudentClearance,
) -> AppResult<bool> {
    let cycle_start = match row.last_cleared {
        Some(ts) => ts,
        None => return Ok(false),
    };

    let already_sent = ClearanceNotificationRepo::sent_since(
        pool,
        user.id,
        NOTIFICATION_CLEARANCE_COMPLETE,
        cycle_start,
    )
    .await?;
    if already_sent {
        tracing::debug!(
            student_id = user.id,
            "Clearance-complete notification already sent this cycle"
        );
        return Ok(false);
    }

    let expiry = row
        .clearance_expiry
        .map(|e| e.date_naive().to_string())
        .unwrap_or_else(|| "a later date".to_string());
    let delivered = notify_user(
        notifier,
        user,
        "Clearance complete",
        format!(
            "Hi {}, all required departments have approved your clearance. \
             It is valid until {}. You may now request documents.",
            user.username, expiry
        ),
    )
    .await;

    if delivered {
        ClearanceNotificationRepo::log(pool, user.id, NOTIFICATION_CLEARANCE_COMPLETE).await?;
    }
    Ok(delivered)
}

/// Load a student's current clearance, lazily creating the row and
/// resetting it when the validity window has lapsed.
pub async fn student_clearance_view(
    pool: &DbPool,
    student_id: DbId,
) -> AppResult<(User, StudentClearance, bool, bool)> {
    let user = require_user(pool, student_id).await?;
    let now = Utc::now();
    let (row, was_reset) = StudentClearanceRepo::load_current(pool, student_id, now).await?;

    let required = policy::required_departments(user.course_or_empty(), user.role());
    let is_valid = clearance::all_approved(&row.department_statuses(), &required)
        && !clearance::is_expired(row.clearance_expiry, now);

    Ok((user, row, is_valid, was_reset))
}

/// Manual full reset of a student's clearance (admin action).
pub async fn reset_student_clearance(
    pool: &DbPool,
    student_id: DbId,
) -> AppResult<StudentClearance> {
    let row = StudentClearanceRepo::reset(pool, student_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "StudentClearance",
                id: student_id,
            })
        })?;
    tracing::info!(student_id, "Clearance manually reset");
    Ok(row)
}

/// Why a student may not request documents right now.
#[derive(Debug, serde::Serialize)]
pub struct CanRequestVerdict {
    pub can_request: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clearance_expiry: Option<Timestamp>,
}

/// Whether a student's clearance currently permits document requests.
pub async fn can_request(pool: &DbPool, student_id: DbId) -> AppResult<CanRequestVerdict> {
    let user = require_user(pool, student_id).await?;
    let now = Utc::now();

    let Some(row) = StudentClearanceRepo::find_by_student(pool, student_id).await? else {
        return Ok(CanRequestVerdict {
            can_request: false,
            reason: Some(
                "No clearance record found. Please complete your clearance first.".into(),
            ),
            clearance_expiry: None,
        });
    };

    if clearance::is_expired(row.clearance_expiry, now) {
        return Ok(CanRequestVerdict {
            can_request: false,
            reason: Some(
                "Your clearance has expired. Please get re-approved by all departments.".into(),
            ),
            clearance_expiry: None,
        });
    }

    let required = policy::required_departments(user.course_or_empty(), user.role());
    if !clearance::all_approved(&row.department_statuses(), &required) {
        return Ok(CanRequestVerdict {
            can_request: false,
            reason: Some(
                "You must be cleared by all departments before requesting documents.".into(),
            ),
            clearance_expiry: None,
        });
    }

    Ok(CanRequestVerdict {
        can_request: true,
        reason: None,
        clearance_expiry: row.clearance_expiry,
    })
}

/// Guard used by request completion: the student's current clearance must
/// be unexpired and satisfy the department policy for their course/role.
pub async fn ensure_clearance_satisfied(
    pool: &DbPool,
    user: &User,
    now: Timestamp,
) -> AppResult<()> {
    let Some(row) = StudentClearanceRepo::find_by_student(pool, user.id).await? else {
        return Err(AppError::Core(CoreError::ClearanceNotSatisfied(
            "Student has no clearance record".into(),
        )));
    };

    if clearance::is_expired(row.clearance_expiry, now) {
        return Err(AppError::Core(CoreError::ClearanceNotSatisfied(
            "Student clearance has expired".into(),
        )));
    }

    let required = policy::required_departments(user.course_or_empty(), user.role());
    if !clearance::all_approved(&row.department_statuses(), &required) {
        return Err(AppError::Core(CoreError::ClearanceNotSatisfied(
            "Not all required departments have approved this student's clearance".into(),
        )));
    }
    Ok(())
}
