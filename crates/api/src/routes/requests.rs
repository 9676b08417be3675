//! Route definitions for the request lifecycle, merged into `/requests`.
//!
//! ```text
//! POST   /                                create_request
//! GET    /                                list_all
//! GET    /report                          report
//! DELETE /{request_id}                    cancel_request
//! PUT    /{request_id}/status             update_request_status
//! PUT    /{request_id}/payment/approve    approve_payment
//! PUT    /{request_id}/payment/reject     reject_payment
//! PUT    /{request_id}/reject             reject_request
//! POST   /{request_id}/complete           complete_request
//! GET    /{request_id}/clearance          get_request_clearance
//! PUT    /{request_id}/clearance/{department}  update_request_clearance
//! ```

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::{clearances, requests};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(requests::create_request).get(requests::list_all))
        .route("/report", get(requests::report))
        .route("/{request_id}", delete(requests::cancel_request))
        .route("/{request_id}/status", put(requests::update_request_status))
        .route(
            "/{request_id}/payment/approve",
            put(requests::approve_payment),
        )
        .route(
            "/{request_id}/payment/reject",
            put(requests::reject_payment),
        )
        .route("/{request_id}/reject", put(requests::reject_request))
        .route("/{request_id}/complete", post(requests::complete_request))
        .route(
            "/{request_id}/clearance",
            get(clearances::get_request_clearance),
        )
        .route(
            "/{request_id}/clearance/{department}",
            put(clearances::update_request_clearance),
        )
}
