//! Request lifecycle operations: creation, payment decisions, rejection,
//! cancellation, completion, and manual status edits.

use chrono::{NaiveDate, Utc};

use docuflow_core::error::CoreError;
use docuflow_core::lifecycle::{
    can_transition, transition, PaymentStatus, RequestEvent, RequestStatus,
};
use docuflow_core::schedule;
use docuflow_core::types::DbId;
use docuflow_db::models::request::{CreateRequestBody, NewRequest, Request};
use docuflow_db::models::user::User;
use docuflow_db::repositories::{DocumentRepo, RequestRepo, UserRepo};
use docuflow_db::DbPool;
use docuflow_notify::NotificationGateway;

use crate::error::{AppError, AppResult};
use crate::workflow::{clearances, notify_user};

/// Parse a stored status column, surfacing corrupt values as internal
/// errors rather than misreading them as a state.
fn parse_status(request: &Request) -> AppResult<RequestStatus> {
    request
        .status()
        .map_err(|err| AppError::Core(CoreError::Internal(err)))
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

/// Create a single-document request.
///
/// Fails with a conflict when an open request for the same (student,
/// document) pair exists, and with not-found for unknown students or
/// documents. The request, its junction row, and its empty clearance row
/// are inserted as one transaction, so a failed insert leaves nothing for
/// later duplicate checks to trip over.
pub async fn create_request(pool: &DbPool, body: &CreateRequestBody) -> AppResult<Request> {
    require_user(pool, body.student_id).await?;

    if RequestRepo::exists_for_student_document(pool, body.student_id, body.document_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "You already requested this document".into(),
        )));
    }

    let document = DocumentRepo::find_by_id(pool, body.document_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Document",
                id: body.document_id,
            })
        })?;

    let submitted = Utc::now().date_naive();
    let release_date =
        schedule::release_date(submitted, document.processing_time.as_deref().unwrap_or(""));

    let request = RequestRepo::create_with_clearance(
        pool,
        &NewRequest {
            student_id: body.student_id,
            document_id: body.document_id,
            reason: body.reason.clone(),
            release_date,
        },
    )
    .await?;

    tracing::info!(
        request_id = request.id,
        student_id = body.student_id,
        document_id = body.document_id,
        release_date = %release_date,
        "Request created"
    );
    Ok(request)
}

/// Approve the fee payment on a request, advancing a pending request to
/// in progress. Notifies the student best-effort.
pub async fn approve_payment(
    pool: &DbPool,
    notifier: &NotificationGateway,
    request_id: DbId,
) -> AppResult<(Request, bool)> {
    let mut tx = pool.begin().await?;
    let request = RequestRepo::find_for_update(&mut tx, request_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Request",
                id: request_id,
            })
        })?;

    let current = parse_status(&request)?;
    let next = transition(current, RequestEvent::PaymentApproved).ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "Payment cannot be approved for a {} request",
            current.as_str()
        )))
    })?;

    let request = RequestRepo::update_payment(
        &mut tx,
        request_id,
        PaymentStatus::Approved.as_str(),
        None,
        next.as_str(),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(request_id, status = %next.as_str(), "Payment approved");

    let user = require_user(pool, request.student_id).await?;
    let notified = notify_user(
        notifier,
        &user,
        "Payment approved",
        format!(
            "Hi {}, your payment for request #{} has been approved. \
             Your request is now being processed.",
            user.username, request.id
        ),
    )
    .await;

    Ok((request, notified))
}

/// Reject the fee payment on a request. The request status itself is left
/// unchanged; the student can submit a corrected payment. A non-empty
/// reason is mandatory.
pub async fn reject_payment(
    pool: &DbPool,
    notifier: &NotificationGateway,
    request_id: DbId,
    reason: Option<&str>,
) -> AppResult<(Request, bool)> {
    let reason = reason.map(str::trim).unwrap_or("");
    if reason.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "A reason is required to reject a payment".into(),
        )));
    }

    let mut tx = pool.begin().await?;
    let request = RequestRepo::find_for_update(&mut tx, request_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Request",
                id: request_id,
            })
        })?;

    let current = parse_status(&request)?;
    if current.is_terminal() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Payment cannot be rejected for a {} request",
            current.as_str()
        ))));
    }

    let request = RequestRepo::update_payment(
        &mut tx,
        request_id,
        PaymentStatus::Rejected.as_str(),
        Some(reason),
        current.as_str(),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(request_id, reason, "Payment rejected");

    let user = require_user(pool, request.student_id).await?;
    let notified = notify_user(
        notifier,
        &user,
        "Payment rejected",
        format!(
            "Hi {}, the payment for your request #{} was rejected: {}. \
             Please submit a corrected payment.",
            user.username, request.id, reason
        ),
    )
    .await;

    Ok((request, notified))
}

/// Reject a request outright, recording the request-level reason.
pub async fn reject_request(
    pool: &DbPool,
    notifier: &NotificationGateway,
    request_id: DbId,
    reason: Option<&str>,
) -> AppResult<(Request, bool)> {
    let reason = reason.map(str::trim).unwrap_or("");
    if reason.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "A reason is required to reject a request".into(),
        )));
    }

    let mut tx = pool.begin().await?;
    let request = RequestRepo::find_for_update(&mut tx, request_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Request",
                id: request_id,
            })
        })?;

    let current = parse_status(&request)?;
    let next = transition(current, RequestEvent::Rejected).ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "A {} request cannot be rejected",
            current.as_str()
        )))
    })?;

    let request = RequestRepo::reject(&mut tx, request_id, next.as_str(), reason).await?;
    tx.commit().await?;

    tracing::info!(request_id, reason, "Request rejected");

    let user = require_user(pool, request.student_id).await?;
    let notified = notify_user(
        notifier,
        &user,
        "Request rejected",
        format!(
            "Hi {}, your document request #{} was rejected: {}.",
            user.username, request.id, reason
        ),
    )
    .await;

    Ok((request, notified))
}

/// Complete a request and hand the documents over.
///
/// Requires the student's current clearance to satisfy the department
/// policy for their course/role; computes a pickup-date estimate and
/// notifies the student with it. Re-completion is a conflict.
pub async fn complete_request(
    pool: &DbPool,
    notifier: &NotificationGateway,
    request_id: DbId,
) -> AppResult<(Request, NaiveDate, bool)> {
    let now = Utc::now();

    let mut tx = pool.begin().await?;
    let request = RequestRepo::find_for_update(&mut tx, request_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Request",
                id: request_id,
            })
        })?;

    let current = parse_status(&request)?;
    if current == RequestStatus::Completed {
        return Err(AppError::Core(CoreError::Conflict(
            "Request is already completed".into(),
        )));
    }
    let next = transition(current, RequestEvent::Completed).ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "A {} request cannot be completed",
            current.as_str()
        )))
    })?;

    let user = require_user(pool, request.student_id).await?;
    clearances::ensure_clearance_satisfied(pool, &user, now).await?;

    let request = RequestRepo::complete(&mut tx, request_id, next.as_str(), now).await?;
    tx.commit().await?;

    let document_name = match request.document_id {
        Some(document_id) => DocumentRepo::find_by_id(pool, document_id)
            .await?
            .map(|d| d.name)
            .unwrap_or_default(),
        None => String::new(),
    };
    let pickup = schedule::pickup_estimate(&document_name, now.date_naive());

    tracing::info!(request_id, pickup = %pickup, "Request completed");

    let what = if document_name.is_empty() {
        "your requested documents".to_string()
    } else {
        format!("your {document_name}")
    };
    let notified = notify_user(
        notifier,
        &user,
        "Documents ready for pickup",
        format!(
            "Hi {}, request #{} is complete. You may pick up {} at the registrar's \
             office on or after {}.",
            user.username, request.id, what, pickup
        ),
    )
    .await;

    Ok((request, pickup, notified))
}

/// Cancel (hard-delete) a request.
///
/// Only permitted while the request is still pending and its payment has
/// not been approved; anything later must go through rejection instead.
pub async fn cancel_request(pool: &DbPool, request_id: DbId) -> AppResult<()> {
    let request = RequestRepo::find_by_id(pool, request_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Request",
                id: request_id,
            })
        })?;

    let current = parse_status(&request)?;
    let payment = request
        .payment()
        .map_err(|err| AppError::Core(CoreError::Internal(err)))?;
    if current != RequestStatus::Pending || payment == PaymentStatus::Approved {
        return Err(AppError::Core(CoreError::Conflict(
            "Only pending, unpaid requests can be cancelled".into(),
        )));
    }

    RequestRepo::delete(pool, request_id).await?;
    tracing::info!(request_id, "Request cancelled");
    Ok(())
}

/// Manually set a request's status (admin). The edit must correspond to a
/// permitted transition; setting the current status again is a no-op.
pub async fn update_request_status(
    pool: &DbPool,
    request_id: DbId,
    status: &str,
) -> AppResult<Request> {
    let target = RequestStatus::from_str_value(status)
        .map_err(|err| AppError::Core(CoreError::Validation(err)))?;

    let mut tx = pool.begin().await?;
    let request = RequestRepo::find_for_update(&mut tx, request_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Request",
                id: request_id,
            })
        })?;

    let current = parse_status(&request)?;
    if current == target {
        return Ok(request);
    }
    if !can_transition(current, target) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Cannot move a {} request to {}",
            current.as_str(),
            target.as_str()
        ))));
    }

    let request = RequestRepo::set_status(&mut tx, request_id, target.as_str()).await?;
    tx.commit().await?;

    tracing::info!(request_id, status = %target.as_str(), "Request status updated");
    Ok(request)
}
