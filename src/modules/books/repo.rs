//! Persistence for book records.
//!
//! Each operation is a single statement; uniqueness of `isbn` is enforced by
//! the primary key, and concurrent updates are last-writer-wins.

use sqlx::SqlitePool;
use thiserror::Error;

use super::models::Book;

const COLUMNS: &str = "isbn, amazon_url, author, language, pages, publisher, title, year";

#[derive(Debug, Error)]
pub enum BookError {
    #[error("no book with isbn '{0}'")]
    NotFound(String),

    #[error("a book with isbn '{0}' already exists")]
    Conflict(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, BookError>;

/// Repository for the `books` table.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new book and return the stored row.
    ///
    /// Returns [`BookError::Conflict`] if the isbn is already taken.
    pub async fn create(&self, book: &Book) -> Result<Book> {
        let sql = format!(
            "INSERT INTO books ({COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&sql)
            .bind(&book.isbn)
            .bind(&book.amazon_url)
            .bind(&book.author)
            .bind(&book.language)
            .bind(book.pages)
            .bind(&book.publisher)
            .bind(&book.title)
            .bind(book.year)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    BookError::Conflict(book.isbn.clone())
                }
                other => BookError::Database(other),
            })
    }

    /// All books in insertion order.
    pub async fn find_all(&self) -> Result<Vec<Book>> {
        let sql = format!("SELECT {COLUMNS} FROM books ORDER BY rowid");
        Ok(sqlx::query_as::<_, Book>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn find_one(&self, isbn: &str) -> Result<Book> {
        let sql = format!("SELECT {COLUMNS} FROM books WHERE isbn = ?");
        sqlx::query_as::<_, Book>(&sql)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| BookError::NotFound(isbn.to_string()))
    }

    /// Replace every column except `isbn` of the book identified by `isbn`.
    ///
    /// `book.isbn` is ignored; the stored identity never changes here.
    pub async fn update(&self, isbn: &str, book: &Book) -> Result<Book> {
        let sql = format!(
            "UPDATE books SET amazon_url = ?, author = ?, language = ?, pages = ?, \
             publisher = ?, title = ?, year = ? WHERE isbn = ? RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&sql)
            .bind(&book.amazon_url)
            .bind(&book.author)
            .bind(&book.language)
            .bind(book.pages)
            .bind(&book.publisher)
            .bind(&book.title)
            .bind(book.year)
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| BookError::NotFound(isbn.to_string()))
    }

    pub async fn remove(&self, isbn: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM books WHERE isbn = ?")
            .bind(isbn)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(BookError::NotFound(isbn.to_string()));
        }
        Ok(())
    }
}
