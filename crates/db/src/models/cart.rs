//! Document cart models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docuflow_core::types::{DbId, Timestamp};

/// A row from the `document_cart` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CartItem {
    pub id: DbId,
    pub user_id: DbId,
    pub document_id: DbId,
    pub reason: Option<String>,
    pub created_at: Timestamp,
}

/// Cart row joined with its catalog entry, for display and checkout.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CartItemDetail {
    pub id: DbId,
    pub document_id: DbId,
    pub document_name: String,
    pub fee: f64,
    pub category: Option<String>,
    pub reason: Option<String>,
}

/// HTTP body for adding a document to the cart.
#[derive(Debug, Clone, Deserialize)]
pub struct AddCartItemBody {
    pub user_id: DbId,
    pub document_id: DbId,
    pub reason: String,
}

/// HTTP body for checking out a set of cart items.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutBody {
    pub user_id: DbId,
    pub item_ids: Vec<DbId>,
}
