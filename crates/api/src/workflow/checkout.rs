//! Cart management and checkout: several catalog documents bundled into
//! one request with one payment.

use docuflow_core::error::CoreError;
use docuflow_core::types::DbId;
use docuflow_db::models::cart::{AddCartItemBody, CartItem, CartItemDetail};
use docuflow_db::models::request::{NewCheckout, Request};
use docuflow_db::repositories::{CartRepo, DocumentRepo, RequestRepo, UserRepo};
use docuflow_db::DbPool;

use crate::error::{AppError, AppResult};

/// Add a document to a user's cart. Duplicate cart entries are conflicts.
pub async fn add_to_cart(pool: &DbPool, body: &AddCartItemBody) -> AppResult<CartItem> {
    let reason = body.reason.trim();
    if reason.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "A reason is required when adding a document to the cart".into(),
        )));
    }

    UserRepo::find_by_id(pool, body.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Student",
                id: body.user_id,
            })
        })?;
    DocumentRepo::find_by_id(pool, body.document_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Document",
                id: body.document_id,
            })
        })?;

    match CartRepo::add(pool, body.user_id, body.document_id, reason).await {
        Ok(item) => Ok(item),
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => Err(
            AppError::Core(CoreError::Conflict("Document already in cart".into())),
        ),
        Err(err) => Err(err.into()),
    }
}

/// A user's cart joined with catalog details.
pub async fn list_cart(pool: &DbPool, user_id: DbId) -> AppResult<Vec<CartItemDetail>> {
    Ok(CartRepo::list_for_user(pool, user_id).await?)
}

/// Remove a single cart item.
pub async fn remove_from_cart(pool: &DbPool, item_id: DbId) -> AppResult<()> {
    if !CartRepo::remove(pool, item_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "CartItem",
            id: item_id,
        }));
    }
    Ok(())
}

/// Check out a set of cart items: one request covering every document,
/// fees summed from the catalog, cart rows consumed -- all in a single
/// transaction so a mid-checkout failure leaves both cart and requests
/// untouched.
pub async fn checkout(
    pool: &DbPool,
    user_id: DbId,
    item_ids: &[DbId],
) -> AppResult<(Request, f64, usize)> {
    if item_ids.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Invalid checkout data: no cart items given".into(),
        )));
    }

    UserRepo::find_by_id(pool, user_id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Student",
            id: user_id,
        })
    })?;

    let items = CartRepo::find_items(pool, user_id, item_ids).await?;
    if items.len() != item_ids.len() {
        return Err(AppError::Core(CoreError::Validation(
            "Some cart items were not found for this user".into(),
        )));
    }

    let total: f64 = items.iter().map(|item| item.fee).sum();
    let reason = items
        .iter()
        .map(|item| {
            format!(
                "{}: {}",
                item.document_name,
                item.reason.as_deref().unwrap_or("No reason provided")
            )
        })
        .collect::<Vec<_>>()
        .join("; ");
    let document_ids: Vec<DbId> = items.iter().map(|item| item.document_id).collect();
    let document_count = document_ids.len();

    let request = RequestRepo::create_checkout(
        pool,
        &NewCheckout {
            student_id: user_id,
            document_ids,
            amount: total,
            reason,
            cart_item_ids: item_ids.to_vec(),
        },
    )
    .await?;

    tracing::info!(
        request_id = request.id,
        user_id,
        document_count,
        total,
        "Checkout completed"
    );
    Ok((request, total, document_count))
}
