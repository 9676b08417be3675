//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Use
//! [`DataResponse`] instead of ad-hoc `serde_json::json!({ "data": ... })`
//! to get compile-time type safety and consistent serialization.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// Envelope for operations that also attempted a notification.
///
/// `notification_sent` is informational only: delivery failures never
/// fail the operation itself.
#[derive(Debug, Serialize)]
pub struct NotifyingResponse<T: Serialize> {
    pub data: T,
    pub notification_sent: bool,
}
