//! Database repository for countries.

use bookapi_db::{DbError, Repository, Result, SqlitePool};
use tracing::instrument;

use super::models::{Country, NewCountry};
use crate::modules::authors::models::Author;
use crate::utils::name_key;

#[derive(Clone)]
pub struct CountryRepository {
    pool: SqlitePool,
}

impl CountryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Authors whose country is `country_id`
    #[instrument(skip(self), err)]
    pub async fn authors_of_country(&self, country_id: i64) -> Result<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>(
            "SELECT id, first_name, last_name, country_id FROM authors WHERE country_id = ? ORDER BY first_name",
        )
        .bind(country_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(authors)
    }

    /// Country of an existing author
    #[instrument(skip(self), err)]
    pub async fn country_of_author(&self, author_id: i64) -> Result<Country> {
        let country = sqlx::query_as::<_, Country>(
            r#"
            SELECT c.id, c.name
            FROM countries c
            JOIN authors a ON a.country_id = c.id
            WHERE a.id = ?
            "#,
        )
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(country)
    }

    /// Whether another country already uses `name`, ignoring case and surrounding whitespace
    #[instrument(skip(self), err)]
    pub async fn is_duplicate_name(&self, country_id: i64, name: &str) -> Result<bool> {
        let others: Vec<String> = sqlx::query_scalar("SELECT name FROM countries WHERE id <> ?")
            .bind(country_id)
            .fetch_all(&self.pool)
            .await?;

        let key = name_key(name);
        Ok(others.iter().any(|other| name_key(other) == key))
    }

    #[instrument(skip(self), err)]
    pub async fn has_authors(&self, country_id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors WHERE country_id = ?")
            .bind(country_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }
}

#[async_trait::async_trait]
impl Repository for CountryRepository {
    type Entity = Country;
    type Input = NewCountry;

    #[instrument(skip(self), err)]
    async fn exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM countries WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: i64) -> Result<Country> {
        let country = sqlx::query_as::<_, Country>("SELECT id, name FROM countries WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)?;

        Ok(country)
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Country>> {
        let countries = sqlx::query_as::<_, Country>("SELECT id, name FROM countries ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = countries.len(), "listed countries");
        Ok(countries)
    }

    #[instrument(skip(self, input), fields(name = %input.name), err)]
    async fn create(&self, input: &NewCountry) -> Result<Country> {
        let country = sqlx::query_as::<_, Country>(
            "INSERT INTO countries (name) VALUES (?) RETURNING id, name",
        )
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(country)
    }

    #[instrument(skip(self, input), fields(name = %input.name), err)]
    async fn update(&self, id: i64, input: &NewCountry) -> Result<Country> {
        let country = sqlx::query_as::<_, Country>(
            "UPDATE countries SET name = ? WHERE id = ? RETURNING id, name",
        )
        .bind(&input.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(country)
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM countries WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing;

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let catalog = testing::catalog().await;
        for name in ["Peru", "Chile", "Norway"] {
            catalog
                .countries
                .create(&NewCountry {
                    name: name.to_string(),
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = catalog
            .countries
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Chile", "Norway", "Peru"]);
    }

    #[tokio::test]
    async fn duplicate_name_ignores_case_whitespace_and_self() {
        let catalog = testing::catalog().await;
        let kenya = catalog
            .countries
            .create(&NewCountry {
                name: "Kenya".to_string(),
            })
            .await
            .unwrap();

        assert!(catalog.countries.is_duplicate_name(0, "  kENYA ").await.unwrap());
        assert!(catalog.countries.is_duplicate_name(0, "\tKenya\r\n").await.unwrap());
        assert!(!catalog.countries.is_duplicate_name(kenya.id, "kenya").await.unwrap());
        assert!(!catalog.countries.is_duplicate_name(0, "Ghana").await.unwrap());
    }

    #[tokio::test]
    async fn missing_country_is_not_found() {
        let catalog = testing::catalog().await;

        assert!(!catalog.countries.exists(99).await.unwrap());
        assert!(matches!(catalog.countries.get(99).await, Err(DbError::NotFound)));
        assert!(matches!(
            catalog
                .countries
                .update(
                    99,
                    &NewCountry {
                        name: "Atlantis".to_string()
                    }
                )
                .await,
            Err(DbError::NotFound)
        ));
        assert!(!catalog.countries.delete(99).await.unwrap());
    }

    #[tokio::test]
    async fn country_of_author_follows_foreign_key() {
        let catalog = testing::catalog().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        let country = catalog
            .countries
            .country_of_author(fixtures.author_id)
            .await
            .unwrap();
        assert_eq!(country.id, fixtures.country_id);
        assert!(catalog.countries.has_authors(fixtures.country_id).await.unwrap());
        assert_eq!(
            catalog
                .countries
                .authors_of_country(fixtures.country_id)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
