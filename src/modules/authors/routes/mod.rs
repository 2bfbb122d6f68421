use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use bookshelf_db::{Author, SharedStore};
use bookshelf_http::AppError;

use super::models::CreateAuthor;

/// GET /authors
pub async fn list_authors(State(store): State<SharedStore>) -> Result<Json<Vec<Author>>, AppError> {
    let authors = store
        .list_authors()
        .await
        .map_err(|e| AppError::operation("Failed to retrieve authors", e))?;

    tracing::info!(count = authors.len(), "retrieved authors");
    Ok(Json(authors))
}

/// POST /authors
pub async fn create_author(
    State(store): State<SharedStore>,
    payload: Result<Json<CreateAuthor>, JsonRejection>,
) -> Result<(StatusCode, Json<Author>), AppError> {
    const FAILED: &str = "Failed to create the author";

    let Json(request) = payload.map_err(|e| AppError::operation(FAILED, e))?;
    let author = store
        .create_author(request.into())
        .await
        .map_err(|e| AppError::operation(FAILED, e))?;

    tracing::info!(author_id = %author.id, "author added");
    Ok((StatusCode::CREATED, Json(author)))
}
