//! HTTP handlers for the books module

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde_json::json;
use shelf_http::{error::AppError, response::MessageResponse};

use super::models::{last_title, Book, BookId, NOT_FOUND_TITLE, TITLE_PARAM};
use super::store::{BookStore, StoreError};

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Internal(err.into())
    }
}

type QueryPairs = Vec<(String, String)>;

fn required_title(params: Result<Query<QueryPairs>, QueryRejection>) -> Result<String, AppError> {
    let Query(pairs) = params?;
    last_title(pairs).ok_or_else(|| {
        AppError::validation(
            vec![json!({ "location": "query", "field": TITLE_PARAM, "error": "missing field" })],
            "invalid request query",
        )
    })
}

/// Insert or overwrite the title for `book_id`
pub async fn create_book(
    State(store): State<BookStore>,
    path: Result<Path<BookId>, PathRejection>,
    params: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = path?;
    let title = required_title(params)?;

    let previous = store.put(id, title.clone())?;
    tracing::debug!(book_id = id, replaced = previous.is_some(), "book stored");

    Ok(Json(Book { id, title }))
}

/// Same write semantics as [`create_book`]
pub async fn update_book(
    state: State<BookStore>,
    path: Result<Path<BookId>, PathRejection>,
    params: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<Book>, AppError> {
    create_book(state, path, params).await
}

/// Every record keyed by id
pub async fn list_books(
    State(store): State<BookStore>,
) -> Result<Json<BTreeMap<BookId, String>>, AppError> {
    Ok(Json(store.snapshot()?))
}

/// Look up one record; absent ids report the placeholder title
pub async fn get_book(
    State(store): State<BookStore>,
    path: Result<Path<BookId>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = path?;
    let title = store
        .get(id)?
        .unwrap_or_else(|| NOT_FOUND_TITLE.to_string());

    Ok(Json(Book { id, title }))
}

/// Remove a record; succeeds whether or not it existed
pub async fn delete_book(
    State(store): State<BookStore>,
    path: Result<Path<BookId>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = path?;
    let removed = store.remove(id)?;
    tracing::debug!(book_id = id, removed = removed.is_some(), "book delete");

    Ok(Json(MessageResponse::new("Deleted")))
}
