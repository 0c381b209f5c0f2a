//! Route handlers for the books API.
//!
//! Outcome is signaled by the response body, never the status code: every
//! response is 200 with either a JSON document or one of the fixed plain-text
//! messages. Callers distinguish outcomes by parsing the body, not the
//! status code.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};

use shelf_http::extract::FormOrJson;
use shelf_store::{BookStore, StoreError};

use super::models::{
    AddCommentRequest, BookResponse, BookSummaryResponse, CreateBookRequest, CreatedBookResponse,
};
use crate::utils::strip_markup;

/// GET /api/books
pub async fn list_books(State(store): State<BookStore>) -> Response {
    match store.list_all().await {
        Ok(summaries) => {
            let body: Vec<BookSummaryResponse> = summaries
                .into_iter()
                .map(BookSummaryResponse::from)
                .collect();
            Json(body).into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to list books");
            "cannot get books".into_response()
        }
    }
}

/// POST /api/books
pub async fn create_book(
    State(store): State<BookStore>,
    FormOrJson(body): FormOrJson<CreateBookRequest>,
) -> Response {
    let raw_title = match body.title {
        Some(title) if !title.is_empty() => title,
        _ => return "missing required field title".into_response(),
    };

    let title = strip_markup(&raw_title);
    if title.is_empty() {
        return "sanitized title is empty".into_response();
    }

    match store.create(&title).await {
        Ok(book) => Json(CreatedBookResponse::from(book)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to create book");
            "cannot post book".into_response()
        }
    }
}

/// DELETE /api/books
pub async fn clear_books(State(store): State<BookStore>) -> Response {
    match store.delete_all().await {
        Ok(()) => "complete delete successful".into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to clear books");
            "cannot delete books".into_response()
        }
    }
}

/// GET /api/books/{id}
pub async fn get_book(State(store): State<BookStore>, Path(id): Path<String>) -> Response {
    match store.get(&id).await {
        Ok(book) => Json(BookResponse::from(book)).into_response(),
        Err(StoreError::NotFound(_)) => "no book exists".into_response(),
        Err(err) => {
            tracing::error!(error = %err, book_id = %id, "failed to fetch book");
            "cannot get book".into_response()
        }
    }
}

/// POST /api/books/{id}
///
/// Malformed ids fold into the generic failure text here, unlike GET/DELETE,
/// which report them separately from missing books.
pub async fn add_comment(
    State(store): State<BookStore>,
    Path(id): Path<String>,
    FormOrJson(body): FormOrJson<AddCommentRequest>,
) -> Response {
    let raw_comment = match body.comment {
        Some(comment) if !comment.is_empty() => comment,
        _ => return "missing required field comment".into_response(),
    };

    let comment = strip_markup(&raw_comment);
    if comment.is_empty() {
        return "sanitized comment is empty".into_response();
    }

    match store.append_comment(&id, &comment).await {
        Ok(book) => Json(BookResponse::from(book)).into_response(),
        Err(StoreError::NotFound(_)) => "no book exists".into_response(),
        Err(err) => {
            tracing::error!(error = %err, book_id = %id, "failed to append comment");
            "cannot post comment".into_response()
        }
    }
}

/// DELETE /api/books/{id}
pub async fn delete_book(State(store): State<BookStore>, Path(id): Path<String>) -> Response {
    match store.delete(&id).await {
        Ok(()) => "delete successful".into_response(),
        Err(StoreError::NotFound(_)) => "no book exists".into_response(),
        Err(err) => {
            tracing::error!(error = %err, book_id = %id, "failed to delete book");
            "cannot delete book".into_response()
        }
    }
}
