use bookapi_db::{DbError, Repository, Result, SqlitePool};
use tracing::instrument;

use super::models::{Category, NewCategory};
use crate::modules::books::models::Book;
use crate::utils::name_key;

#[derive(Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self), err)]
    pub async fn books_of_category(&self, category_id: i64) -> Result<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT b.id, b.isbn, b.title, b.date_published
            FROM books b
            JOIN book_categories bc ON bc.book_id = b.id
            WHERE bc.category_id = ?
            ORDER BY b.title
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    #[instrument(skip(self), err)]
    pub async fn categories_of_book(&self, book_id: i64) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT c.id, c.name
            FROM categories c
            JOIN book_categories bc ON bc.category_id = c.id
            WHERE bc.book_id = ?
            ORDER BY c.name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Case- and whitespace-insensitive name clash with any category other than `category_id`
    #[instrument(skip(self), err)]
    pub async fn is_duplicate_name(&self, category_id: i64, name: &str) -> Result<bool> {
        let others: Vec<String> = sqlx::query_scalar("SELECT name FROM categories WHERE id <> ?")
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;

        let key = name_key(name);
        Ok(others.iter().any(|other| name_key(other) == key))
    }

    #[instrument(skip(self), err)]
    pub async fn has_books(&self, category_id: i64) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM book_categories WHERE category_id = ?")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }
}

#[async_trait::async_trait]
impl Repository for CategoryRepository {
    type Entity = Category;
    type Input = NewCategory;

    #[instrument(skip(self), err)]
    async fn exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: i64) -> Result<Category> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), err)]
    async fn list(&self) -> Result<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    #[instrument(skip(self, input), fields(name = %input.name), err)]
    async fn create(&self, input: &NewCategory) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES (?) RETURNING id, name",
        )
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    #[instrument(skip(self, input), fields(name = %input.name), err)]
    async fn update(&self, id: i64, input: &NewCategory) -> Result<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = ? WHERE id = ? RETURNING id, name",
        )
        .bind(&input.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
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
    async fn linked_category_cannot_be_removed_by_the_store() {
        let catalog = testing::catalog().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        assert!(catalog.categories.has_books(fixtures.category_id).await.unwrap());
        assert!(matches!(
            catalog.categories.delete(fixtures.category_id).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
    }

    #[tokio::test]
    async fn join_accessors_follow_link_rows() {
        let catalog = testing::catalog().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        let books = catalog
            .categories
            .books_of_category(fixtures.category_id)
            .await
            .unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, fixtures.book_id);

        let categories = catalog
            .categories
            .categories_of_book(fixtures.book_id)
            .await
            .unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, fixtures.category_id);
    }

    #[tokio::test]
    async fn rename_keeps_id() {
        let catalog = testing::catalog().await;
        let horror = catalog
            .categories
            .create(&NewCategory {
                name: "Horror".to_string(),
            })
            .await
            .unwrap();

        let renamed = catalog
            .categories
            .update(
                horror.id,
                &NewCategory {
                    name: "Gothic Horror".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(renamed.id, horror.id);
        assert_eq!(catalog.categories.get(horror.id).await.unwrap().name, "Gothic Horror");
    }
}
