use bookapi_db::{DbError, Repository, Result, SqlitePool};
use sqlx::SqliteConnection;
use tracing::instrument;

use super::models::{NewReview, Review};
use crate::modules::books::models::Book;

const REVIEW_COLUMNS: &str = "id, headline, review_text, rating, book_id, reviewer_id";

#[derive(Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), err)]
    pub async fn reviews_of_book(&self, book_id: i64) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE book_id = ? ORDER BY rating DESC, id"
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    #[instrument(skip(self), err)]
    pub async fn book_of_review(&self, review_id: i64) -> Result<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.isbn, b.title, b.date_published
            FROM books b
            JOIN reviews r ON r.book_id = b.id
            WHERE r.id = ?
            "#,
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }
}

/// Delete every review of `book_id` on `conn`, returning how many went.
///
/// Runs on the caller's connection so the removal commits or rolls back with
/// the book delete it precedes.
#[instrument(skip(conn), err)]
pub async fn delete_for_book(conn: &mut SqliteConnection, book_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM reviews WHERE book_id = ?")
        .bind(book_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

/// Delete every review written by `reviewer_id` on `conn`, returning how many went
#[instrument(skip(conn), err)]
pub async fn delete_for_reviewer(conn: &mut SqliteConnection, reviewer_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM reviews WHERE reviewer_id = ?")
        .bind(reviewer_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}

#[async_trait::async_trait]
impl Repository for ReviewRepository {
    type Entity = Review;
    type Input = NewReview;

    #[instrument(skip(self), err)]
    async fn exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: i64) -> Result<Review> {
        sqlx::query_as::<_, Review>(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY rating DESC, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    #[instrument(
        skip(self, input),
        fields(book_id = input.book_id, reviewer_id = input.reviewer_id),
        err
    )]
    async fn create(&self, input: &NewReview) -> Result<Review> {
        let review = sqlx::query_as::<_, Review>(&format!(
            r#"
            INSERT INTO reviews (headline, review_text, rating, book_id, reviewer_id)
            VALUES (?, ?, ?, ?, ?)
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(&input.headline)
        .bind(&input.review_text)
        .bind(input.rating)
        .bind(input.book_id)
        .bind(input.reviewer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    #[instrument(
        skip(self, input),
        fields(book_id = input.book_id, reviewer_id = input.reviewer_id),
        err
    )]
    async fn update(&self, id: i64, input: &NewReview) -> Result<Review> {
        sqlx::query_as::<_, Review>(&format!(
            r#"
            UPDATE reviews
            SET headline = ?, review_text = ?, rating = ?, book_id = ?, reviewer_id = ?
            WHERE id = ?
            RETURNING {REVIEW_COLUMNS}
            "#
        ))
        .bind(&input.headline)
        .bind(&input.review_text)
        .bind(input.rating)
        .bind(input.book_id)
        .bind(input.reviewer_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
