//! Repository for the `document_types` catalog table.

use sqlx::PgPool;

use docuflow_core::types::DbId;

use crate::models::document::{DocumentType, UpdateDocumentType};

/// Column list for document_types queries.
const COLUMNS: &str = "id, name, description, processing_time, fee, category, created_at, updated_at";

pub struct DocumentRepo;

impl DocumentRepo {
    /// List the whole catalog, ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<DocumentType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM document_types ORDER BY name ASC");
        sqlx::query_as::<_, DocumentType>(&query).fetch_all(pool).await
    }

    /// Find a catalog entry by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DocumentType>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM document_types WHERE id = $1");
        sqlx::query_as::<_, DocumentType>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether another catalog entry already uses this name.
    pub async fn name_taken(
        pool: &PgPool,
        name: &str,
        exclude_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (taken,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM document_types WHERE name = $1 AND id != $2)",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;
        Ok(taken)
    }

    /// Update a catalog entry, returning the new row.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateDocumentType,
    ) -> Result<DocumentType, sqlx::Error> {
        let query = format!(
            "UPDATE document_types
             SET name = $1, description = $2, processing_time = $3,
                 fee = $4, category = $5, updated_at = NOW()
             WHERE id = $6
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentType>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.processing_time)
            .bind(input.fee)
            .bind(&input.category)
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
