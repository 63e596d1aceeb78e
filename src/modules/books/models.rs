use serde::{Deserialize, Serialize};

/// A book record, one row of the `books` table.
///
/// `isbn` is the identity and never changes once the record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i64,
    pub publisher: String,
    pub title: String,
    pub year: i64,
}

/// `{"book": ...}` envelope returned by single-record endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookEnvelope {
    pub book: Book,
}

/// `{"books": [...]}` envelope returned by the listing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookList {
    pub books: Vec<Book>,
}

/// `{"message": ...}` confirmation returned after a delete.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}
