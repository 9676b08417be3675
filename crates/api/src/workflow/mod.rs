//! The request lifecycle controller.
//!
//! Every state-changing operation on requests, clearances, and the cart
//! goes through this module: handlers stay thin, and all status changes
//! are decided by the transition table in `docuflow_core::lifecycle` and
//! the aggregation rules in `docuflow_core::clearance`. Notifications are
//! dispatched here, after the store transaction commits, and never affect
//! the outcome of the operation that triggered them.

pub mod checkout;
pub mod clearances;
pub mod requests;

use docuflow_core::error::CoreError;
use docuflow_db::models::user::User;
use docuflow_notify::{Message, NotificationGateway, Recipient};

use crate::error::AppError;

/// Contact channels known for an account.
pub(crate) fn recipient_for(user: &User) -> Recipient {
    Recipient {
        email: user.email.clone(),
        phone: user.phone.clone(),
    }
}

/// Best-effort notification to a student's registered contact channels.
/// Returns whether anything was delivered; never errors.
pub(crate) async fn notify_user(
    notifier: &NotificationGateway,
    user: &User,
    subject: &str,
    body: String,
) -> bool {
    let recipient = recipient_for(user);
    let message = Message {
        subject: subject.to_string(),
        body,
    };
    notifier.notify(&recipient, &message).await
}

/// Re-attempt a clearance write sequence once before surfacing the
/// failure as a transient store error.
pub(crate) async fn retry_once<T, F, Fut>(op: F) -> Result<T, AppError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    match op().await {
        Ok(value) => Ok(value),
        Err(first) => {
            tracing::warn!(error = %first, "Clearance write failed, retrying once");
            op().await
                .map_err(|err| AppError::Core(CoreError::Transient(err.to_string())))
        }
    }
}
