use sqlx::SqlitePool;
use thiserror::Error;

use super::models::{Book, BookInput};

#[derive(Debug, Error)]
pub enum BookError {
    #[error("required fields are blank: {}", .0.join(", "))]
    Validation(Vec<&'static str>),

    #[error("book {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

/// CRUD access to the shared `books` table.
#[derive(Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every book, in insertion order.
    pub async fn list(&self) -> Result<Vec<Book>, BookError> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, description FROM books ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Book>, BookError> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, description FROM books WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    pub async fn create(&self, input: &BookInput) -> Result<Book, BookError> {
        check(input)?;

        let book = sqlx::query_as::<_, Book>(
            "INSERT INTO books (title, author, description) VALUES (?, ?, ?)
             RETURNING id, title, author, description",
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.description())
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(book_id = book.id, "book created");
        Ok(book)
    }

    /// Replaces title, author and description. A missing id wins over
    /// invalid input.
    pub async fn update(&self, id: i64, input: &BookInput) -> Result<Book, BookError> {
        if let Err(invalid) = check(input) {
            return match self.get(id).await? {
                Some(_) => Err(invalid),
                None => Err(BookError::NotFound(id)),
            };
        }

        sqlx::query_as::<_, Book>(
            "UPDATE books SET title = ?, author = ?, description = ? WHERE id = ?
             RETURNING id, title, author, description",
        )
        .bind(&input.title)
        .bind(&input.author)
        .bind(input.description())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(BookError::NotFound(id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), BookError> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BookError::NotFound(id));
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, BookError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn check(input: &BookInput) -> Result<(), BookError> {
    let blank = input.blank_fields();
    if blank.is_empty() {
        Ok(())
    } else {
        Err(BookError::Validation(blank))
    }
}
