use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use bookshelf_db::{parse_id, Book, SharedStore};
use bookshelf_http::AppError;

use super::models::{CreateBook, UpdateBook};

/// GET /books, authors left as raw identifiers
pub async fn list_books(State(store): State<SharedStore>) -> Result<Json<Vec<Book>>, AppError> {
    let books = store
        .list_books()
        .await
        .map_err(|e| AppError::operation("Failed to retrieve books", e))?;

    tracing::info!(count = books.len(), "retrieved books");
    Ok(Json(books))
}

/// GET /books/{id}, with the author populated.
///
/// An unknown id answers 200 with a `null` body.
pub async fn get_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Option<Book>>, AppError> {
    const FAILED: &str = "Failed to retrieve book";

    let id = parse_id(&id).map_err(|e| AppError::operation(FAILED, e))?;
    let book = store
        .find_book_populated(id)
        .await
        .map_err(|e| AppError::operation(FAILED, e))?;

    tracing::info!(book_id = %id, found = book.is_some(), "retrieved book with author details");
    Ok(Json(book))
}

/// POST /books
pub async fn create_book(
    State(store): State<SharedStore>,
    payload: Result<Json<CreateBook>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    const FAILED: &str = "Failed to create the book";

    let Json(request) = payload.map_err(|e| AppError::operation(FAILED, e))?;
    let new_book = request
        .into_new_book()
        .map_err(|e| AppError::operation(FAILED, e))?;
    let book = store
        .create_book(new_book)
        .await
        .map_err(|e| AppError::operation(FAILED, e))?;

    tracing::info!(book_id = %book.id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

/// PUT /books/{id}: applies the provided fields and answers 200 with the
/// updated record, or `null` if no book has this id.
pub async fn update_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateBook>, JsonRejection>,
) -> Result<Json<Option<Book>>, AppError> {
    const FAILED: &str = "Failed to update the book";

    let id = parse_id(&id).map_err(|e| AppError::operation(FAILED, e))?;
    let Json(request) = payload.map_err(|e| AppError::operation(FAILED, e))?;
    let patch = request
        .into_patch()
        .map_err(|e| AppError::operation(FAILED, e))?;
    let book = store
        .update_book(id, patch)
        .await
        .map_err(|e| AppError::operation(FAILED, e))?;

    tracing::info!(book_id = %id, found = book.is_some(), "updated book");
    Ok(Json(book))
}

/// DELETE /books/{id}: 204 whether or not the book existed
pub async fn delete_book(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    const FAILED: &str = "Deleting book failed";

    let id = parse_id(&id).map_err(|e| AppError::operation(FAILED, e))?;
    let deleted = store
        .delete_book(id)
        .await
        .map_err(|e| AppError::operation(FAILED, e))?;

    tracing::info!(book_id = %id, deleted, "book deleted");
    Ok(StatusCode::NO_CONTENT)
}
