//! Handlers for the document catalog.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use docuflow_core::error::CoreError;
use docuflow_core::types::DbId;
use docuflow_db::models::document::UpdateDocumentType;
use docuflow_db::repositories::DocumentRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/documents
pub async fn list_documents(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let documents = DocumentRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// PUT /api/v1/documents/{document_id}
///
/// Edit a catalog entry; document names stay unique.
pub async fn update_document(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(document_id): Path<DbId>,
    Json(input): Json<UpdateDocumentType>,
) -> AppResult<impl IntoResponse> {
    DocumentRepo::find_by_id(&state.pool, document_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Document",
                id: document_id,
            })
        })?;

    if DocumentRepo::name_taken(&state.pool, &input.name, document_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Document with this name already exists".into(),
        )));
    }

    let document = DocumentRepo::update(&state.pool, document_id, &input).await?;

    tracing::info!(
        user_id = auth.user_id,
        document_id,
        name = %input.name,
        "Document catalog entry updated"
    );
    Ok(Json(DataResponse { data: document }))
}
