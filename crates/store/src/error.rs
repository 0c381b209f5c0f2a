use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced by [`crate::BookStore`] operations.
///
/// Callers are expected to match on `NotFound` and `InvalidId`; everything else
/// is an opaque store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no book with id {0}")]
    NotFound(Uuid),

    #[error("malformed book id '{0}'")]
    InvalidId(String),

    #[error("book title must not be empty")]
    EmptyTitle,

    #[error(transparent)]
    Backend(#[from] sqlx::Error),

    #[error("corrupt comments column: {0}")]
    Encoding(#[from] serde_json::Error),
}
