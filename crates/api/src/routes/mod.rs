//! Route tree construction.

pub mod cart;
pub mod documents;
pub mod health;
pub mod requests;
pub mod student_clearances;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /requests                                      create (POST), admin list (GET)
/// /requests/report                               date-filtered report (GET)
/// /requests/{id}                                 cancel (DELETE)
/// /requests/{id}/status                          manual status edit (PUT)
/// /requests/{id}/payment/approve                 approve payment (PUT)
/// /requests/{id}/payment/reject                  reject payment (PUT)
/// /requests/{id}/reject                          reject request (PUT)
/// /requests/{id}/complete                        complete + pickup date (POST)
/// /requests/{id}/clearance                       merged detail + clearance (GET)
/// /requests/{id}/clearance/{department}          department decision (PUT)
///
/// /student-clearances                            dashboard listing (GET)
/// /student-clearances/{id}                       per-student view (GET)
/// /student-clearances/{id}/{department}          department decision (PUT)
/// /student-clearances/{id}/reset                 manual reset (POST)
/// /student-clearances/{id}/can-request           eligibility check (GET)
///
/// /students/{id}/requests                        student's own requests (GET)
///
/// /cart                                          add (POST), list (GET)
/// /cart/checkout                                 checkout (POST)
/// /cart/{item_id}                                remove (DELETE)
///
/// /documents                                     catalog listing (GET)
/// /documents/{id}                                catalog edit (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/requests", requests::router())
        .nest("/student-clearances", student_clearances::router())
        .nest("/cart", cart::router())
        .nest("/documents", documents::router())
        .route(
            "/students/{student_id}/requests",
            get(handlers::requests::list_for_student),
        )
}
