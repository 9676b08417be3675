//! Route definitions for student-scoped clearances, merged into
//! `/student-clearances`.
//!
//! ```text
//! GET    /                              list_student_clearances
//! GET    /{student_id}                  get_student_clearance
//! PUT    /{student_id}/{department}     update_student_clearance
//! POST   /{student_id}/reset            reset_student_clearance
//! GET    /{student_id}/can-request      can_request
//! ```

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::student_clearances;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(student_clearances::list_student_clearances))
        .route(
            "/{student_id}",
            get(student_clearances::get_student_clearance),
        )
        .route(
            "/{student_id}/reset",
            post(student_clearances::reset_student_clearance),
        )
        .route(
            "/{student_id}/can-request",
            get(student_clearances::can_request),
        )
        .route(
            "/{student_id}/{department}",
            put(student_clearances::update_student_clearance),
        )
}
