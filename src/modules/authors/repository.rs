use bookapi_db::{DbError, Repository, Result, SqlitePool};
use tracing::instrument;

use super::models::{Author, NewAuthor};
use crate::modules::books::models::Book;

const AUTHOR_COLUMNS: &str = "id, first_name, last_name, country_id";

#[derive(Clone)]
pub struct AuthorRepository {
    pool: SqlitePool,
}

impl AuthorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), err)]
    pub async fn books_by_author(&self, author_id: i64) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.isbn, b.title, b.date_published
            FROM books b
            JOIN book_authors ba ON ba.book_id = b.id
            WHERE ba.author_id = ?
            ORDER BY b.title
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    #[instrument(skip(self), err)]
    pub async fn authors_of_book(&self, book_id: i64) -> Result<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            r#"
            SELECT a.id, a.first_name, a.last_name, a.country_id
            FROM authors a
            JOIN book_authors ba ON ba.author_id = a.id
            WHERE ba.book_id = ?
            ORDER BY a.first_name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    #[instrument(skip(self), err)]
    pub async fn has_books(&self, author_id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_authors WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }
}

#[async_trait::async_trait]
impl Repository for AuthorRepository {
    type Entity = Author;
    type Input = NewAuthor;

    #[instrument(skip(self), err)]
    async fn exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: i64) -> Result<Author> {
        sqlx::query_as::<_, Author>(&format!("SELECT {AUTHOR_COLUMNS} FROM authors WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(&format!(
            "SELECT {AUTHOR_COLUMNS} FROM authors ORDER BY first_name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    #[instrument(skip(self, input), fields(country_id = input.country_id), err)]
    async fn create(&self, input: &NewAuthor) -> Result<Author> {
        let author = sqlx::query_as::<_, Author>(&format!(
            "INSERT INTO authors (first_name, last_name, country_id) VALUES (?, ?, ?) RETURNING {AUTHOR_COLUMNS}"
        ))
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.country_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(author)
    }

    #[instrument(skip(self, input), fields(country_id = input.country_id), err)]
    async fn update(&self, id: i64, input: &NewAuthor) -> Result<Author> {
        sqlx::query_as::<_, Author>(&format!(
            "UPDATE authors SET first_name = ?, last_name = ?, country_id = ? WHERE id = ? RETURNING {AUTHOR_COLUMNS}"
        ))
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.country_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM authors WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
