//! Repository for the `document_cart` table.

use sqlx::PgPool;

use docuflow_core::types::DbId;

use crate::models::cart::{CartItem, CartItemDetail};

/// Column list for document_cart queries.
const COLUMNS: &str = "id, user_id, document_id, reason, created_at";

/// Joined cart/catalog column list.
const DETAIL_COLUMNS: &str = "c.id, c.document_id, d.name AS document_name, d.fee, \
    d.category, c.reason";

pub struct CartRepo;

impl CartRepo {
    /// Add a document to a user's cart.
    ///
    /// The `uq_document_cart_user_document` constraint rejects duplicates;
    /// callers surface that as a conflict.
    pub async fn add(
        pool: &PgPool,
        user_id: DbId,
        document_id: DbId,
        reason: &str,
    ) -> Result<CartItem, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_cart (user_id, document_id, reason)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CartItem>(&query)
            .bind(user_id)
            .bind(document_id)
            .bind(reason)
            .fetch_one(pool)
            .await
    }

    /// List a user's cart joined with catalog details.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<CartItemDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM document_cart c
             JOIN document_types d ON d.id = c.document_id
             WHERE c.user_id = $1
             ORDER BY c.created_at ASC"
        );
        sqlx::query_as::<_, CartItemDetail>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Fetch a specific set of a user's cart items joined with catalog
    /// details (the checkout working set).
    pub async fn find_items(
        pool: &PgPool,
        user_id: DbId,
        item_ids: &[DbId],
    ) -> Result<Vec<CartItemDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM document_cart c
             JOIN document_types d ON d.id = c.document_id
             WHERE c.user_id = $1 AND c.id = ANY($2)
             ORDER BY c.created_at ASC"
        );
        sqlx::query_as::<_, CartItemDetail>(&query)
            .bind(user_id)
            .bind(item_ids)
            .fetch_all(pool)
            .await
    }

    /// Remove a cart item. Returns false when no such row existed.
    pub async fn remove(pool: &PgPool, item_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM document_cart WHERE id = $1")
            .bind(item_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
