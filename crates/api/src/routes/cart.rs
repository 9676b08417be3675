//! Route definitions for the document cart, merged into `/cart`.
//!
//! ```text
//! POST   /              add_to_cart
//! GET    /              list_cart
//! POST   /checkout      checkout
//! DELETE /{item_id}     remove_from_cart
//! ```

use axum::routing::{delete, post};
use axum::Router;

use crate::handlers::cart;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(cart::add_to_cart).get(cart::list_cart))
        .route("/checkout", post(cart::checkout))
        .route("/{item_id}", delete(cart::remove_from_cart))
}
