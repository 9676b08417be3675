//! Route definitions for the document catalog, merged into `/documents`.
//!
//! ```text
//! GET    /                  list_documents
//! PUT    /{document_id}     update_document
//! ```

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(documents::list_documents))
        .route("/{document_id}", put(documents::update_document))
}
