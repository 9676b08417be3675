//! Clearance notification log models.

use serde::Serialize;
use sqlx::FromRow;

use docuflow_core::types::{DbId, Timestamp};

/// A row from the append-only `clearance_notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClearanceNotification {
    pub id: DbId,
    pub student_id: DbId,
    pub notification_type: String,
    pub sent_at: Timestamp,
}
