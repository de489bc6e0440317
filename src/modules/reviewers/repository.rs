use bookapi_db::{DbError, Repository, Result, SqlitePool};
use tracing::instrument;

use super::models::{NewReviewer, Reviewer};
use crate::modules::reviews::models::Review;
use crate::modules::reviews::repository as reviews_repository;

#[derive(Clone)]
pub struct ReviewerRepository {
    pool: SqlitePool,
}

impl ReviewerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Delete the reviewer and every review they wrote in one transaction,
    /// returning how many reviews went
    #[instrument(skip(self), err)]
    pub async fn delete_with_reviews(&self, id: i64) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let removed = reviews_repository::delete_for_reviewer(&mut *tx, id).await?;
        let result = sqlx::query("DELETE FROM reviewers WHERE id = ?")
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
    pub async fn reviews_by_reviewer(&self, reviewer_id: i64) -> Result<Vec<Review>> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, headline, review_text, rating, book_id, reviewer_id
            FROM reviews
            WHERE reviewer_id = ?
            ORDER BY rating DESC, id
            "#,
        )
        .bind(reviewer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    #[instrument(skip(self), err)]
    pub async fn reviewer_of_review(&self, review_id: i64) -> Result<Reviewer> {
        sqlx::query_as::<_, Reviewer>(
            r#"
            SELECT rv.id, rv.first_name, rv.last_name
            FROM reviewers rv
            JOIN reviews r ON r.reviewer_id = rv.id
            WHERE r.id = ?
            "#,
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }
}

#[async_trait::async_trait]
impl Repository for ReviewerRepository {
    type Entity = Reviewer;
    type Input = NewReviewer;

    #[instrument(skip(self), err)]
    async fn exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviewers WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: i64) -> Result<Reviewer> {
        sqlx::query_as::<_, Reviewer>("SELECT id, first_name, last_name FROM reviewers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Reviewer>> {
        let reviewers = sqlx::query_as::<_, Reviewer>(
            "SELECT id, first_name, last_name FROM reviewers ORDER BY first_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(reviewers)
    }

    #[instrument(skip(self, input), err)]
    async fn create(&self, input: &NewReviewer) -> Result<Reviewer> {
        let reviewer = sqlx::query_as::<_, Reviewer>(
            "INSERT INTO reviewers (first_name, last_name) VALUES (?, ?) RETURNING id, first_name, last_name",
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(reviewer)
    }

    #[instrument(skip(self, input), err)]
    async fn update(&self, id: i64, input: &NewReviewer) -> Result<Reviewer> {
        sqlx::query_as::<_, Reviewer>(
            "UPDATE reviewers SET first_name = ?, last_name = ? WHERE id = ? RETURNING id, first_name, last_name",
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    /// Reviews by this reviewer must already be gone
    #[instrument(skip(self), err)]
    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reviewers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
