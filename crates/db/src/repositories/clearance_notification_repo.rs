//! Repository for the append-only `clearance_notifications` log.
//!
//! The log is the idempotency guard for clearance-complete messages: a
//! send is recorded after dispatch, and later callers in the same validity
//! cycle find the entry and suppress the resend.

use sqlx::PgPool;

use docuflow_core::types::{DbId, Timestamp};

use crate::models::notification::ClearanceNotification;

/// Column list for clearance_notifications queries.
const COLUMNS: &str = "id, student_id, notification_type, sent_at";

pub struct ClearanceNotificationRepo;

impl ClearanceNotificationRepo {
    /// Record that a notification of this kind was sent.
    pub async fn log(
        pool: &PgPool,
        student_id: DbId,
        notification_type: &str,
    ) -> Result<ClearanceNotification, sqlx::Error> {
        let query = format!(
            "INSERT INTO clearance_notifications (student_id, notification_type)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ClearanceNotification>(&query)
            .bind(student_id)
            .bind(notification_type)
            .fetch_one(pool)
            .await
    }

    /// Whether a notification of this kind was already sent at or after
    /// `since` (the start of the current clearance validity cycle).
    pub async fn sent_since(
        pool: &PgPool,
        student_id: DbId,
        notification_type: &str,
        since: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let (sent,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(
                 SELECT 1 FROM clearance_notifications
                 WHERE student_id = $1 AND notification_type = $2 AND sent_at >= $3
             )",
        )
        .bind(student_id)
        .bind(notification_type)
        .bind(since)
        .fetch_one(pool)
        .await?;
        Ok(sent)
    }
}
