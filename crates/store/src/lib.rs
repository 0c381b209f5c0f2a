//! Persistence layer for the shelf service.
//!
//! Book records live in a single SQLite table; the ordered comment list is kept
//! as a JSON array column so every mutation is a single-row (atomic) update.

pub mod book;
pub mod error;

pub use book::{migrations, Book, BookStore, BookSummary};
pub use error::StoreError;
