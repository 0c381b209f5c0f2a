use serde::{Deserialize, Serialize};

use shelf_store::{Book, BookSummary};

/// Request body for creating a book. Absent and empty titles are equivalent.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBookRequest {
    pub title: Option<String>,
}

/// Request body for appending a comment to a book.
#[derive(Debug, Default, Deserialize)]
pub struct AddCommentRequest {
    pub comment: Option<String>,
}

/// Listing entry: `{title, _id, commentcount}` on the wire.
#[derive(Debug, Serialize)]
pub struct BookSummaryResponse {
    pub title: String,
    #[serde(rename = "_id")]
    pub id: String,
    pub commentcount: usize,
}

impl From<BookSummary> for BookSummaryResponse {
    fn from(summary: BookSummary) -> Self {
        Self {
            title: summary.title,
            id: summary.id.to_string(),
            commentcount: summary.comment_count,
        }
    }
}

/// Creation response: `{title, _id}` on the wire.
#[derive(Debug, Serialize)]
pub struct CreatedBookResponse {
    pub title: String,
    #[serde(rename = "_id")]
    pub id: String,
}

impl From<Book> for CreatedBookResponse {
    fn from(book: Book) -> Self {
        Self {
            title: book.title,
            id: book.id.to_string(),
        }
    }
}

/// Full book response: `{_id, title, comments}` on the wire.
#[derive(Debug, Serialize)]
pub struct BookResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub comments: Vec<String>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id.to_string(),
            title: book.title,
            comments: book.comments,
        }
    }
}
