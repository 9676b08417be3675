//! End-to-end tests for the request lifecycle controller, driven against
//! a real database with a recording notification channel.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Datelike, Duration, Utc, Weekday};
use sqlx::PgPool;

use docuflow_api::error::AppError;
use docuflow_api::workflow::{checkout, clearances, requests};
use docuflow_core::error::CoreError;
use docuflow_core::types::DbId;
use docuflow_db::models::cart::AddCartItemBody;
use docuflow_db::models::request::CreateRequestBody;
use docuflow_notify::{Channel, ChannelError, Message, NotificationGateway, Recipient};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct RecordingChannel {
    sends: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, _recipient: &Recipient, _message: &Message) -> Result<(), ChannelError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn gateway() -> (NotificationGateway, Arc<AtomicUsize>) {
    let sends = Arc::new(AtomicUsize::new(0));
    let gateway = NotificationGateway::new(vec![Box::new(RecordingChannel {
        sends: Arc::clone(&sends),
    })]);
    (gateway, sends)
}

async fn insert_student(pool: &PgPool, username: &str, course: &str) -> DbId {
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO users (username, email, course, role)
         VALUES ($1, $2, $3, 'student')
         RETURNING id",
    )
    .bind(username)
    .bind(format!("{username}@example.edu"))
    .bind(course)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

async fn insert_document(pool: &PgPool, name: &str, processing_time: &str, fee: f64) -> DbId {
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO document_types (name, processing_time, fee)
         VALUES ($1, $2, $3)
         RETURNING id",
    )
    .bind(name)
    .bind(processing_time)
    .bind(fee)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

/// Approve every department the student's course requires, one at a time.
async fn approve_full_clearance(
    pool: &PgPool,
    gateway: &NotificationGateway,
    student_id: DbId,
    course: &str,
) {
    let required = docuflow_core::policy::required_departments(
        course,
        docuflow_core::policy::Role::Student,
    );
    for dept in required {
        clearances::update_student_clearance(
            pool,
            gateway,
            student_id,
            dept.as_str(),
            "approved",
            None,
        )
        .await
        .unwrap();
    }
}

// ---------------------------------------------------------------------------
// Request creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_request_is_conflict(pool: PgPool) {
    let student_id = insert_student(&pool, "dupe", "bachelor of arts in english").await;
    let document_id = insert_document(&pool, "Transcript of Records", "5-7 working days", 250.0).await;

    let body = CreateRequestBody {
        student_id,
        document_id,
        reason: Some("enrollment".into()),
    };

    let first = requests::create_request(&pool, &body).await.unwrap();

    let err = requests::create_request(&pool, &body).await.unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Conflict(msg)) => {
        assert!(msg.contains("already requested"));
    });

    // The first request is unaffected.
    let unchanged = docuflow_db::repositories::RequestRepo::find_by_id(&pool, first.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, "pending");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_document_is_not_found(pool: PgPool) {
    let student_id = insert_student(&pool, "no-doc", "bachelor of arts in english").await;

    let err = requests::create_request(
        &pool,
        &CreateRequestBody {
            student_id,
            document_id: 9999,
            reason: None,
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::NotFound { entity: "Document", .. }));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_release_date_comes_from_processing_time_text(pool: PgPool) {
    let student_id = insert_student(&pool, "release", "bachelor of arts in english").await;
    let document_id = insert_document(&pool, "Diploma", "10 working days", 500.0).await;

    let request = requests::create_request(
        &pool,
        &CreateRequestBody {
            student_id,
            document_id,
            reason: None,
        },
    )
    .await
    .unwrap();

    let today = Utc::now().date_naive();
    assert_eq!(request.release_date, today.checked_add_days(chrono::Days::new(10)));
}

// ---------------------------------------------------------------------------
// Payment decisions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_approve_payment_advances_pending_request(pool: PgPool) {
    let (gateway, sends) = gateway();
    let student_id = insert_student(&pool, "payer", "bachelor of arts in english").await;
    let document_id = insert_document(&pool, "Certificate of Grades", "3 days", 80.0).await;
    let request = requests::create_request(
        &pool,
        &CreateRequestBody {
            student_id,
            document_id,
            reason: None,
        },
    )
    .await
    .unwrap();

    let (request, notified) = requests::approve_payment(&pool, &gateway, request.id)
        .await
        .unwrap();
    assert_eq!(request.payment, "approved");
    assert_eq!(request.status, "in progress");
    assert!(notified);
    assert_eq!(sends.load(Ordering::SeqCst), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_reject_payment_requires_reason(pool: PgPool) {
    let (gateway, sends) = gateway();
    let student_id = insert_student(&pool, "unpaid", "bachelor of arts in english").await;
    let document_id = insert_document(&pool, "Certificate of Enrollment", "2 days", 60.0).await;
    let request = requests::create_request(
        &pool,
        &CreateRequestBody {
            student_id,
            document_id,
            reason: None,
        },
    )
    .await
    .unwrap();

    let err = requests::reject_payment(&pool, &gateway, request.id, Some(""))
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Validation(_)));
    assert_eq!(sends.load(Ordering::SeqCst), 0);

    // No state mutation happened.
    let unchanged = docuflow_db::repositories::RequestRepo::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.payment, "pending");

    let (request, _) =
        requests::reject_payment(&pool, &gateway, request.id, Some("insufficient proof"))
            .await
            .unwrap();
    assert_eq!(request.payment, "rejected");
    assert_eq!(request.rejection_reason.as_deref(), Some("insufficient proof"));
    // The request status itself is untouched by a payment rejection.
    assert_eq!(request.status, "pending");
}

// ---------------------------------------------------------------------------
// Student clearance scenario
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_it_student_clearance_grants_window_and_notifies_once(pool: PgPool) {
    let (gateway, sends) = gateway();
    let course = "bachelor of science in information technology";
    let student_id = insert_student(&pool, "it-clearance", course).await;

    for dept in ["registrar", "guidance", "library", "cashier"] {
        let (outcome, notified) = clearances::update_student_clearance(
            &pool, &gateway, student_id, dept, "approved", None,
        )
        .await
        .unwrap();
        assert!(!outcome.all_cleared);
        assert!(!notified);
    }
    assert_eq!(sends.load(Ordering::SeqCst), 0);

    // The course-keyed MIS approval completes the set.
    let (outcome, notified) = clearances::update_student_clearance(
        &pool, &gateway, student_id, "mis", "approved", None,
    )
    .await
    .unwrap();
    assert!(outcome.all_cleared);
    assert!(outcome.newly_cleared);
    assert!(notified);
    assert_eq!(sends.load(Ordering::SeqCst), 1);

    let now = Utc::now();
    let expiry = outcome.clearance.clearance_expiry.unwrap();
    assert!(expiry > now + Duration::days(150));
    assert!(expiry < now + Duration::days(200));

    // Re-issuing the same approval changes nothing and sends nothing.
    let (repeat, notified) = clearances::update_student_clearance(
        &pool, &gateway, student_id, "mis", "approved", None,
    )
    .await
    .unwrap();
    assert!(repeat.all_cleared);
    assert!(!repeat.newly_cleared);
    assert!(!notified);
    assert_eq!(repeat.clearance.clearance_expiry, Some(expiry));
    assert_eq!(sends.load(Ordering::SeqCst), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_alumni_need_only_registrar_and_cashier(pool: PgPool) {
    let (gateway, sends) = gateway();
    let (student_id,): (DbId,) = sqlx::query_as(
        "INSERT INTO users (username, email, course, role)
         VALUES ('alum', 'alum@example.edu', 'bachelor of science in criminology', 'alumni')
         RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let (outcome, _) = clearances::update_student_clearance(
        &pool, &gateway, student_id, "registrar", "approved", None,
    )
    .await
    .unwrap();
    assert!(!outcome.all_cleared);

    // Cashier completes the alumni set; the course is irrelevant.
    let (outcome, notified) = clearances::update_student_clearance(
        &pool, &gateway, student_id, "cashier", "approved", None,
    )
    .await
    .unwrap();
    assert!(outcome.all_cleared);
    assert!(notified);
    assert_eq!(sends.load(Ordering::SeqCst), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_expiry_reset_allows_a_new_notification_cycle(pool: PgPool) {
    let (gateway, sends) = gateway();
    let course = "bachelor of arts in english";
    let student_id = insert_student(&pool, "recycled", course).await;

    approve_full_clearance(&pool, &gateway, student_id, course).await;
    assert_eq!(sends.load(Ordering::SeqCst), 1);

    // Lapse the window; the next update resets the row.
    sqlx::query("UPDATE student_clearance SET clearance_expiry = $1 WHERE student_id = $2")
        .bind(Utc::now() - Duration::days(1))
        .bind(student_id)
        .execute(&pool)
        .await
        .unwrap();

    let (outcome, notified) = clearances::update_student_clearance(
        &pool, &gateway, student_id, "registrar", "approved", None,
    )
    .await
    .unwrap();
    assert!(outcome.was_reset);
    assert!(!outcome.all_cleared);
    assert!(!notified);

    // Clearing every department again starts a fresh cycle and may
    // notify again.
    approve_full_clearance(&pool, &gateway, student_id, course).await;
    assert_eq!(sends.load(Ordering::SeqCst), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_student_clearance_rejection_requires_reason(pool: PgPool) {
    let (gateway, _) = gateway();
    let student_id = insert_student(&pool, "needs-reason", "bachelor of arts in english").await;

    let err = clearances::update_student_clearance(
        &pool, &gateway, student_id, "library", "rejected", None,
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Validation(_)));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_invalid_department_and_status_are_validation_errors(pool: PgPool) {
    let (gateway, _) = gateway();
    let student_id = insert_student(&pool, "bad-input", "bachelor of arts in english").await;

    let err = clearances::update_student_clearance(
        &pool, &gateway, student_id, "athletics", "approved", None,
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Validation(msg)) => {
        assert!(msg.contains("Invalid department"));
    });

    let err = clearances::update_student_clearance(
        &pool, &gateway, student_id, "registrar", "flagged", None,
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Validation(msg)) => {
        assert!(msg.contains("Invalid status"));
    });
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_completion_blocked_until_clearance_satisfied(pool: PgPool) {
    let (gateway, _) = gateway();
    let course = "bachelor of arts in english";
    let student_id = insert_student(&pool, "incomplete", course).await;
    let document_id = insert_document(&pool, "Transcript of Records", "5 days", 250.0).await;
    let request = requests::create_request(
        &pool,
        &CreateRequestBody {
            student_id,
            document_id,
            reason: None,
        },
    )
    .await
    .unwrap();
    let (request, _) = requests::approve_payment(&pool, &gateway, request.id).await.unwrap();

    // Approve all but one required department.
    for dept in ["registrar", "guidance", "library"] {
        clearances::update_student_clearance(
            &pool, &gateway, student_id, dept, "approved", None,
        )
        .await
        .unwrap();
    }

    let err = requests::complete_request(&pool, &gateway, request.id)
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::ClearanceNotSatisfied(_)));

    // Status is unchanged by the failed completion.
    let unchanged = docuflow_db::repositories::RequestRepo::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, "in progress");
    assert!(unchanged.completed_at.is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_completion_sets_pickup_date_and_rejects_repeats(pool: PgPool) {
    let (gateway, _) = gateway();
    let course = "bachelor of arts in english";
    let student_id = insert_student(&pool, "finisher", course).await;
    let document_id = insert_document(&pool, "Transcript of Records", "5 days", 250.0).await;
    let request = requests::create_request(
        &pool,
        &CreateRequestBody {
            student_id,
            document_id,
            reason: None,
        },
    )
    .await
    .unwrap();
    let (request, _) = requests::approve_payment(&pool, &gateway, request.id).await.unwrap();
    approve_full_clearance(&pool, &gateway, student_id, course).await;

    let (request, pickup, notified) =
        requests::complete_request(&pool, &gateway, request.id).await.unwrap();
    assert_eq!(request.status, "completed");
    assert!(request.completed_at.is_some());
    assert!(notified);

    // Pickup estimates never land on a weekend.
    let today = Utc::now().date_naive();
    assert!(pickup > today);
    assert!(!matches!(pickup.weekday(), Weekday::Sat | Weekday::Sun));

    let err = requests::complete_request(&pool, &gateway, request.id)
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Conflict(msg)) => {
        assert!(msg.contains("already completed"));
    });
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_expired_clearance_blocks_completion(pool: PgPool) {
    let (gateway, _) = gateway();
    let course = "bachelor of arts in english";
    let student_id = insert_student(&pool, "lapsed", course).await;
    let document_id = insert_document(&pool, "Diploma", "7 days", 500.0).await;
    let request = requests::create_request(
        &pool,
        &CreateRequestBody {
            student_id,
            document_id,
            reason: None,
        },
    )
    .await
    .unwrap();
    let (request, _) = requests::approve_payment(&pool, &gateway, request.id).await.unwrap();
    approve_full_clearance(&pool, &gateway, student_id, course).await;

    sqlx::query("UPDATE student_clearance SET clearance_expiry = $1 WHERE student_id = $2")
        .bind(Utc::now() - Duration::days(1))
        .bind(student_id)
        .execute(&pool)
        .await
        .unwrap();

    let err = requests::complete_request(&pool, &gateway, request.id)
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::ClearanceNotSatisfied(_)));
}

// ---------------------------------------------------------------------------
// Cancellation and manual status edits
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_only_while_pending_and_unpaid(pool: PgPool) {
    let (gateway, _) = gateway();
    let student_id = insert_student(&pool, "canceller", "bachelor of arts in english").await;
    let document_id = insert_document(&pool, "Certificate of Enrollment", "2 days", 60.0).await;
    let request = requests::create_request(
        &pool,
        &CreateRequestBody {
            student_id,
            document_id,
            reason: None,
        },
    )
    .await
    .unwrap();

    let (request, _) = requests::approve_payment(&pool, &gateway, request.id).await.unwrap();

    let err = requests::cancel_request(&pool, request.id).await.unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Conflict(_)));

    // A fresh, unpaid request can still be cancelled.
    let other_doc = insert_document(&pool, "Good Moral Certificate", "2 days", 50.0).await;
    let fresh = requests::create_request(
        &pool,
        &CreateRequestBody {
            student_id,
            document_id: other_doc,
            reason: None,
        },
    )
    .await
    .unwrap();
    requests::cancel_request(&pool, fresh.id).await.unwrap();
    assert!(
        docuflow_db::repositories::RequestRepo::find_by_id(&pool, fresh.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_manual_status_edit_follows_transition_table(pool: PgPool) {
    let (gateway, _) = gateway();
    let student_id = insert_student(&pool, "editor", "bachelor of arts in english").await;
    let document_id = insert_document(&pool, "Honorable Dismissal", "3 days", 120.0).await;
    let request = requests::create_request(
        &pool,
        &CreateRequestBody {
            student_id,
            document_id,
            reason: None,
        },
    )
    .await
    .unwrap();

    // pending -> approved skips in progress and is refused.
    let err = requests::update_request_status(&pool, request.id, "approved")
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Conflict(_)));

    let (request, _) = requests::approve_payment(&pool, &gateway, request.id).await.unwrap();
    let request = requests::update_request_status(&pool, request.id, "approved")
        .await
        .unwrap();
    assert_eq!(request.status, "approved");

    let err = requests::update_request_status(&pool, request.id, "bogus")
        .await
        .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Validation(_)));
}

// ---------------------------------------------------------------------------
// Cart and checkout
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_checkout_builds_one_request_and_sums_fees(pool: PgPool) {
    let student_id = insert_student(&pool, "shopper", "bachelor of arts in english").await;
    let transcript = insert_document(&pool, "Transcript of Records", "5 days", 250.0).await;
    let diploma = insert_document(&pool, "Diploma", "7 days", 500.0).await;

    let item_a = checkout::add_to_cart(
        &pool,
        &AddCartItemBody {
            user_id: student_id,
            document_id: transcript,
            reason: "employment".into(),
        },
    )
    .await
    .unwrap();
    let item_b = checkout::add_to_cart(
        &pool,
        &AddCartItemBody {
            user_id: student_id,
            document_id: diploma,
            reason: "framing".into(),
        },
    )
    .await
    .unwrap();

    // Duplicate cart entries are conflicts.
    let err = checkout::add_to_cart(
        &pool,
        &AddCartItemBody {
            user_id: student_id,
            document_id: diploma,
            reason: "again".into(),
        },
    )
    .await
    .unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Conflict(_)));

    let (request, total, count) =
        checkout::checkout(&pool, student_id, &[item_a.id, item_b.id])
            .await
            .unwrap();
    assert_eq!(count, 2);
    assert!((total - 750.0).abs() < f64::EPSILON);
    assert_eq!(request.amount, Some(750.0));
    let reason = request.reason.as_deref().unwrap();
    assert!(reason.contains("Transcript of Records: employment"));
    assert!(reason.contains("Diploma: framing"));

    // The cart is empty afterwards.
    assert!(checkout::list_cart(&pool, student_id).await.unwrap().is_empty());

    // Checking out already-consumed items fails cleanly.
    let err = checkout::checkout(&pool, student_id, &[item_a.id]).await.unwrap_err();
    assert_matches!(err, AppError::Core(CoreError::Validation(_)));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_can_request_tracks_clearance_state(pool: PgPool) {
    let (gateway, _) = gateway();
    let course = "bachelor of science in criminology";
    let student_id = insert_student(&pool, "crim", course).await;

    // No clearance row yet.
    let verdict = clearances::can_request(&pool, student_id).await.unwrap();
    assert!(!verdict.can_request);

    // Base set approved but the course-keyed department still pending.
    for dept in ["registrar", "guidance", "library", "cashier"] {
        clearances::update_student_clearance(
            &pool, &gateway, student_id, dept, "approved", None,
        )
        .await
        .unwrap();
    }
    let verdict = clearances::can_request(&pool, student_id).await.unwrap();
    assert!(!verdict.can_request);

    clearances::update_student_clearance(
        &pool, &gateway, student_id, "criminology", "approved", None,
    )
    .await
    .unwrap();
    let verdict = clearances::can_request(&pool, student_id).await.unwrap();
    assert!(verdict.can_request);
    assert!(verdict.clearance_expiry.is_some());
}
