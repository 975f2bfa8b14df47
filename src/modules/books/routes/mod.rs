//! `/books` handlers. Every route sits behind the bearer guard.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use bookshelf_authz::TokenService;
use bookshelf_http::{require_bearer, AppError, CurrentUser};
use serde_json::json;

use super::models::{Book, BookInput};
use super::repository::{BookError, BookRepository};

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(fields) => AppError::validation(
                fields
                    .iter()
                    .map(|field| json!({ "field": field, "error": "required" }))
                    .collect(),
                "Title and Author are required",
            ),
            BookError::NotFound(id) => AppError::not_found(format!("Book {id} not found")),
            BookError::Storage(e) => AppError::Internal(e.into()),
        }
    }
}

pub fn router(repo: BookRepository, tokens: Arc<TokenService>) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
        .route_layer(middleware::from_fn_with_state(tokens, require_bearer))
        .with_state(repo)
}

async fn list_books(State(repo): State<BookRepository>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(repo.list().await?))
}

async fn get_book(
    State(repo): State<BookRepository>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Book>, AppError> {
    let Path(id) = id?;
    repo.get(id)
        .await?
        .map(Json)
        .ok_or_else(|| BookError::NotFound(id).into())
}

async fn create_book(
    State(repo): State<BookRepository>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(input) = payload?;
    let book = repo.create(&input).await?;

    tracing::info!(
        book_id = book.id,
        user_id = ?user.user_id(),
        user = %user.name,
        "book created"
    );

    let location = format!("/books/{}", book.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(book)))
}

async fn update_book(
    State(repo): State<BookRepository>,
    CurrentUser(user): CurrentUser,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<BookInput>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    repo.update(id, &input).await?;

    tracing::info!(
        book_id = id,
        user_id = ?user.user_id(),
        user = %user.name,
        "book updated"
    );
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_book(
    State(repo): State<BookRepository>,
    CurrentUser(user): CurrentUser,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let Path(id) = id?;
    repo.delete(id).await?;

    tracing::info!(
        book_id = id,
        user_id = ?user.user_id(),
        user = %user.name,
        "book deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
