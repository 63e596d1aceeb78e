//! HTTP handlers for `/books`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookstore_http::error::AppError;
use serde_json::Value;

use super::models::{BookEnvelope, BookList, Message};
use super::repo::{BookError, BookRepository};
use super::schema::{self, FieldError, ValidationMode};

/// Build the books router; every path is absolute
pub fn router(repo: BookRepository) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route("/books/", get(list_books).post(create_book))
        .route(
            "/books/{isbn}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(repo)
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        let message = err.to_string();
        match err {
            BookError::NotFound(_) => AppError::not_found(message),
            // Duplicate keys surface as a server error, same as any other failed insert
            BookError::Conflict(_) => AppError::Internal(anyhow::anyhow!(message)),
            BookError::Database(db_err) => {
                AppError::Internal(anyhow::Error::new(db_err).context("books query failed"))
            }
        }
    }
}

fn invalid(errors: Vec<FieldError>) -> AppError {
    let details = errors
        .iter()
        .map(|e| serde_json::to_value(e).unwrap_or(Value::Null))
        .collect();
    let summary = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    AppError::validation(details, summary)
}

/// GET /books
async fn list_books(State(repo): State<BookRepository>) -> Result<Json<BookList>, AppError> {
    let books = repo.find_all().await?;
    Ok(Json(BookList { books }))
}

/// GET /books/{isbn}
async fn get_book(
    State(repo): State<BookRepository>,
    Path(isbn): Path<String>,
) -> Result<Json<BookEnvelope>, AppError> {
    let book = repo.find_one(&isbn).await?;
    Ok(Json(BookEnvelope { book }))
}

/// POST /books
async fn create_book(
    State(repo): State<BookRepository>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BookEnvelope>), AppError> {
    let Json(payload) = payload?;
    let book = schema::validate(&payload, ValidationMode::Create).map_err(invalid)?;

    let book = repo.create(&book).await?;
    tracing::info!(isbn = %book.isbn, "book created");
    Ok((StatusCode::CREATED, Json(BookEnvelope { book })))
}

/// PUT /books/{isbn}
async fn update_book(
    State(repo): State<BookRepository>,
    Path(isbn): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookEnvelope>, AppError> {
    let Json(payload) = payload?;
    let book = schema::validate(&payload, ValidationMode::Update { isbn: &isbn }).map_err(invalid)?;

    let book = repo.update(&isbn, &book).await?;
    tracing::info!(isbn = %book.isbn, "book updated");
    Ok(Json(BookEnvelope { book }))
}

/// DELETE /books/{isbn}
async fn delete_book(
    State(repo): State<BookRepository>,
    Path(isbn): Path<String>,
) -> Result<Json<Message>, AppError> {
    repo.remove(&isbn).await?;
    tracing::info!(%isbn, "book deleted");
    Ok(Json(Message {
        message: "Book deleted".to_string(),
    }))
}
