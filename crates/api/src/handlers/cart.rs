//! Handlers for the document cart and checkout.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use docuflow_core::types::DbId;
use docuflow_db::models::cart::{AddCartItemBody, CheckoutBody};
use docuflow_db::models::request::Request;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::workflow::checkout as workflow;

/// POST /api/v1/cart
pub async fn add_to_cart(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<AddCartItemBody>,
) -> AppResult<impl IntoResponse> {
    let item = workflow::add_to_cart(&state.pool, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        document_id = input.document_id,
        "Document added to cart"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// Query parameters for the cart listing.
#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub user_id: DbId,
}

/// GET /api/v1/cart?user_id=...
pub async fn list_cart(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> AppResult<impl IntoResponse> {
    let items = workflow::list_cart(&state.pool, query.user_id).await?;
    Ok(Json(DataResponse { data: items }))
}

/// DELETE /api/v1/cart/{item_id}
pub async fn remove_from_cart(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    workflow::remove_from_cart(&state.pool, item_id).await?;

    tracing::info!(user_id = auth.user_id, item_id, "Cart item removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Response payload for a successful checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub request: Request,
    pub total_documents: usize,
    pub total_amount: f64,
}

/// POST /api/v1/cart/checkout
///
/// Builds one request covering every checked-out document and consumes
/// the cart rows, atomically.
pub async fn checkout(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CheckoutBody>,
) -> AppResult<impl IntoResponse> {
    let (request, total_amount, total_documents) =
        workflow::checkout(&state.pool, input.user_id, &input.item_ids).await?;

    tracing::info!(
        user_id = auth.user_id,
        request_id = request.id,
        total_documents,
        "Checkout completed via API"
    );
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CheckoutResponse {
                request,
                total_documents,
                total_amount,
            },
        }),
    ))
}
