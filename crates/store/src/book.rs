use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use uuid::Uuid;

use shelf_kernel::settings::DatabaseSettings;
use shelf_kernel::Migration;

use crate::error::StoreError;

/// A fully loaded book record.
#[derive(Debug, Clone)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub comments: Vec<String>,
}

/// Listing projection: everything but the comment bodies.
#[derive(Debug, Clone)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub comment_count: usize,
}

/// Migrations owned by the book store, surfaced through the module channel.
pub fn migrations() -> Vec<Migration> {
    vec![Migration {
        id: "001_create_books",
        up: r#"
            CREATE TABLE IF NOT EXISTS books (
                id       TEXT PRIMARY KEY,
                title    TEXT NOT NULL CHECK (title <> ''),
                comments TEXT NOT NULL DEFAULT '[]'
            );
            "#,
    }]
}

/// Handle to the book collection. Cheap to clone; all clones share one pool.
#[derive(Clone)]
pub struct BookStore {
    pool: SqlitePool,
}

impl BookStore {
    /// Open (creating if necessary) the database described by `settings`.
    pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        // File-backed databases need their parent directory to exist.
        if let Some(path) = settings.url.strip_prefix("sqlite://") {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await.with_context(|| {
                        format!("failed to create database directory {}", parent.display())
                    })?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(&settings.url)
            .with_context(|| format!("invalid database url '{}'", settings.url))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("failed to open database at '{}'", settings.url))?;

        tracing::info!(url = %settings.url, "book store connected");

        Ok(Self { pool })
    }

    /// Apply collected module migrations in order.
    pub async fn apply_migrations(
        &self,
        migrations: &[(String, Migration)],
    ) -> anyhow::Result<()> {
        for (module, migration) in migrations {
            tracing::info!(module = %module, migration = migration.id, "applying migration");

            sqlx::raw_sql(migration.up)
                .execute(&self.pool)
                .await
                .with_context(|| {
                    format!("migration '{}' of module '{}' failed", migration.id, module)
                })?;
        }

        Ok(())
    }

    /// List every book as a summary, in insertion order.
    pub async fn list_all(&self) -> Result<Vec<BookSummary>, StoreError> {
        let rows: Vec<(String, String, String)> =
            sqlx::query_as("SELECT id, title, comments FROM books ORDER BY rowid")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|(id, title, comments)| {
                Ok(BookSummary {
                    id: parse_stored_id(&id)?,
                    title,
                    comment_count: decode_comments(&comments)?.len(),
                })
            })
            .collect()
    }

    /// Store a new book with no comments. The title must already be sanitized
    /// and non-empty; an empty title violates the collection invariant.
    pub async fn create(&self, title: &str) -> Result<Book, StoreError> {
        if title.is_empty() {
            return Err(StoreError::EmptyTitle);
        }

        let book = Book {
            id: Uuid::now_v7(),
            title: title.to_string(),
            comments: Vec::new(),
        };

        sqlx::query("INSERT INTO books (id, title, comments) VALUES (?1, ?2, ?3)")
            .bind(book.id.to_string())
            .bind(&book.title)
            .bind(serde_json::to_string(&book.comments)?)
            .execute(&self.pool)
            .await?;

        tracing::debug!(book_id = %book.id, "book created");

        Ok(book)
    }

    /// Fetch a single book by its string-rendered id.
    pub async fn get(&self, raw_id: &str) -> Result<Book, StoreError> {
        let id = parse_id(raw_id)?;

        let row: Option<(String, String)> =
            sqlx::query_as("SELECT title, comments FROM books WHERE id = ?1")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        let (title, comments) = row.ok_or(StoreError::NotFound(id))?;

        Ok(Book {
            id,
            title,
            comments: decode_comments(&comments)?,
        })
    }

    /// Append a comment to a book and return the updated record.
    pub async fn append_comment(&self, raw_id: &str, comment: &str) -> Result<Book, StoreError> {
        let mut book = self.get(raw_id).await?;
        book.comments.push(comment.to_string());

        sqlx::query("UPDATE books SET comments = ?1 WHERE id = ?2")
            .bind(serde_json::to_string(&book.comments)?)
            .bind(book.id.to_string())
            .execute(&self.pool)
            .await?;

        tracing::debug!(book_id = %book.id, comments = book.comments.len(), "comment appended");

        Ok(book)
    }

    /// Remove one book permanently.
    pub async fn delete(&self, raw_id: &str) -> Result<(), StoreError> {
        let id = parse_id(raw_id)?;

        let result = sqlx::query("DELETE FROM books WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        tracing::debug!(book_id = %id, "book deleted");

        Ok(())
    }

    /// Remove every book unconditionally.
    pub async fn delete_all(&self) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM books").execute(&self.pool).await?;

        tracing::debug!(deleted = result.rows_affected(), "book collection cleared");

        Ok(())
    }
}

/// The store's id-format predicate: anything that is not a UUID is malformed.
fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::InvalidId(raw.to_string()))
}

/// Ids in the table are always written by us, so a parse failure here is a
/// storage-level fault, not caller input.
fn parse_stored_id(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|err| StoreError::Backend(sqlx::Error::Decode(Box::new(err))))
}

fn decode_comments(raw: &str) -> Result<Vec<String>, StoreError> {
    Ok(serde_json::from_str(raw)?)
}
