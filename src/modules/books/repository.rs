//! Books and their author/category link rows.
//!
//! The scalar row and both link sets are always written together in one
//! transaction; an update deletes every existing link row of the book and
//! inserts the supplied set.

use bookapi_db::{DbError, Repository, Result, SqlitePool};
use sqlx::SqliteConnection;
use tracing::instrument;

use super::models::{Book, NewBook};
use crate::modules::reviews::repository as reviews_repository;
use crate::utils::distinct_ids;

const BOOK_COLUMNS: &str = "id, isbn, title, date_published";

#[derive(Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), err)]
    pub async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE UPPER(isbn) = UPPER(?)"
        ))
        .bind(isbn.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Whether a book other than `book_id` already has `isbn`.
    ///
    /// Stored ISBNs are trimmed, so only the candidate needs trimming.
    #[instrument(skip(self), err)]
    pub async fn is_duplicate_isbn(&self, book_id: i64, isbn: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE UPPER(isbn) = UPPER(?) AND id <> ?",
        )
        .bind(isbn.trim())
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Average review rating, `0.0` for a book without reviews
    #[instrument(skip(self), err)]
    pub async fn rating(&self, book_id: i64) -> Result<f64> {
        let average: Option<f64> =
            sqlx::query_scalar("SELECT AVG(rating) FROM reviews WHERE book_id = ?")
                .bind(book_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(average.unwrap_or(0.0))
    }

    /// Delete the book together with its reviews in one transaction,
    /// returning how many reviews went. Link rows follow through the cascade.
    #[instrument(skip(self), err)]
    pub async fn delete_with_reviews(&self, id: i64) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let removed = reviews_repository::delete_for_book(&mut *tx, id).await?;
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        tx.commit().await?;
        Ok(removed)
    }

    #[instrument(skip(self), err)]
    pub async fn author_ids(&self, book_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar(
            "SELECT author_id FROM book_authors WHERE book_id = ? ORDER BY author_id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    #[instrument(skip(self), err)]
    pub async fn category_ids(&self, book_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar(
            "SELECT category_id FROM book_categories WHERE book_id = ? ORDER BY category_id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

async fn insert_links(conn: &mut SqliteConnection, book_id: i64, input: &NewBook) -> Result<()> {
    for author_id in distinct_ids(&input.author_ids) {
        sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES (?, ?)")
            .bind(book_id)
            .bind(author_id)
            .execute(&mut *conn)
            .await?;
    }

    for category_id in distinct_ids(&input.category_ids) {
        sqlx::query("INSERT INTO book_categories (book_id, category_id) VALUES (?, ?)")
            .bind(book_id)
            .bind(category_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

async fn clear_links(conn: &mut SqliteConnection, book_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM book_authors WHERE book_id = ?")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query("DELETE FROM book_categories WHERE book_id = ?")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[async_trait::async_trait]
impl Repository for BookRepository {
    type Entity = Book;
    type Input = NewBook;

    #[instrument(skip(self), err)]
    async fn exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: i64) -> Result<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Book>> {
        let books =
            sqlx::query_as::<_, Book>(&format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY title"))
                .fetch_all(&self.pool)
                .await?;

        Ok(books)
    }

    #[instrument(
        skip(self, input),
        fields(isbn = %input.isbn, authors = input.author_ids.len(), categories = input.category_ids.len()),
        err
    )]
    async fn create(&self, input: &NewBook) -> Result<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (isbn, title, date_published) VALUES (?, ?, ?) RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&input.isbn)
        .bind(&input.title)
        .bind(input.date_published)
        .fetch_one(&mut *tx)
        .await?;

        insert_links(&mut *tx, book.id, input).await?;
        tx.commit().await?;

        Ok(book)
    }

    #[instrument(
        skip(self, input),
        fields(isbn = %input.isbn, authors = input.author_ids.len(), categories = input.category_ids.len()),
        err
    )]
    async fn update(&self, id: i64, input: &NewBook) -> Result<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(&format!(
            "UPDATE books SET isbn = ?, title = ?, date_published = ? WHERE id = ? RETURNING {BOOK_COLUMNS}"
        ))
        .bind(&input.isbn)
        .bind(&input.title)
        .bind(input.date_published)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;

        clear_links(&mut *tx, id).await?;
        insert_links(&mut *tx, id, input).await?;
        tx.commit().await?;

        Ok(book)
    }

    /// Link rows go with the book; reviews must already be gone
    #[instrument(skip(self), err)]
    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
