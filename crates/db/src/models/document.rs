//! Document catalog models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use docuflow_core::types::{DbId, Timestamp};

/// A row from the `document_types` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DocumentType {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub processing_time: Option<String>,
    pub fee: f64,
    pub category: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for editing a catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDocumentType {
    pub name: String,
    pub description: Option<String>,
    pub processing_time: Option<String>,
    pub fee: f64,
    pub category: Option<String>,
}
