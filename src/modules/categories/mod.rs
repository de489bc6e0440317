pub mod models;
pub mod repository;
mod routes;

use async_trait::async_trait;
use axum::Router;
use bookapi_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use super::catalog::Catalog;
use super::openapi::{
    array_of, empty_response, error_response, health_operation, id_param, json_body,
    json_response, schema_ref,
};

pub struct CategoriesModule {
    catalog: Catalog,
}

impl CategoriesModule {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for CategoriesModule {
    fn name(&self) -> &'static str {
        "categories"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "categories module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router().with_state(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let tag = "Categories";
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List categories ordered by name",
                        "tags": [tag],
                        "responses": {
                            "200": json_response("Categories", array_of("Category")),
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a category",
                        "tags": [tag],
                        "requestBody": json_body(schema_ref("CategoryInput")),
                        "responses": {
                            "201": json_response("Created category", schema_ref("Category")),
                            "400": error_response("Malformed payload"),
                            "422": error_response("Category name already exists"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/health": health_operation(tag),
                "/{id}": {
                    "parameters": [id_param("id")],
                    "get": {
                        "summary": "Get a category",
                        "tags": [tag],
                        "responses": {
                            "200": json_response("Category", schema_ref("Category")),
                            "404": error_response("Category not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a category",
                        "tags": [tag],
                        "requestBody": json_body(schema_ref("CategoryInput")),
                        "responses": {
                            "204": empty_response("Updated"),
                            "400": error_response("Malformed payload or id mismatch"),
                            "404": error_response("Category not found"),
                            "422": error_response("Category name already exists")
                        }
                    },
                    "delete": {
                        "summary": "Delete a category no book uses",
                        "tags": [tag],
                        "responses": {
                            "204": empty_response("Deleted"),
                            "404": error_response("Category not found"),
                            "409": error_response("Category is used by books")
                        }
                    }
                },
                "/{id}/books": {
                    "get": {
                        "summary": "Books in a category",
                        "tags": [tag],
                        "parameters": [id_param("id")],
                        "responses": {
                            "200": json_response("Books", array_of("Book")),
                            "404": error_response("Category not found")
                        }
                    }
                },
                "/books/{book_id}": {
                    "get": {
                        "summary": "Categories of a book",
                        "tags": [tag],
                        "parameters": [id_param("book_id")],
                        "responses": {
                            "200": json_response("Categories", array_of("Category")),
                            "404": error_response("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Category": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string", "maxLength": models::NAME_MAX }
                        },
                        "required": ["id", "name"]
                    },
                    "CategoryInput": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string", "maxLength": models::NAME_MAX }
                        },
                        "required": ["name"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE categories (
                    id   INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "categories module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "categories module stopped");
        Ok(())
    }
}

pub fn create_module(catalog: Catalog) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(CategoriesModule::new(catalog))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::modules::testing;

    #[tokio::test]
    async fn delete_conflicts_while_books_use_category() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        let response = server
            .delete(&format!("/api/categories/{}", fixtures.category_id))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["error"]["code"], "conflict");

        server
            .get(&format!("/api/categories/{}", fixtures.category_id))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn unused_category_is_deleted() {
        let (server, _catalog) = testing::server().await;
        let created: Value = server
            .post("/api/categories")
            .json(&json!({ "name": "Poetry" }))
            .await
            .json();
        let id = created["id"].as_i64().unwrap();

        server
            .delete(&format!("/api/categories/{id}"))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/categories/{id}"))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_without_insert() {
        let (server, _catalog) = testing::server().await;
        server
            .post("/api/categories")
            .json(&json!({ "name": "Fantasy" }))
            .await
            .assert_status(StatusCode::CREATED);

        for name in ["  fANTASY ", "\tFantasy\n"] {
            let response = server
                .post("/api/categories")
                .json(&json!({ "name": name }))
                .await;
            response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
            assert_eq!(response.json::<Value>()["error"]["details"][0]["field"], "name");
        }

        let categories: Vec<Value> = server.get("/api/categories").await.json();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0]["name"], "Fantasy");
    }

    #[tokio::test]
    async fn rename_to_another_category_name_is_rejected() {
        let (server, _catalog) = testing::server().await;
        for name in ["Drama", "Comedy"] {
            server
                .post("/api/categories")
                .json(&json!({ "name": name }))
                .await
                .assert_status(StatusCode::CREATED);
        }
        let categories: Vec<Value> = server.get("/api/categories").await.json();
        // ordered by name: Comedy, Drama
        let comedy = categories[0]["id"].as_i64().unwrap();

        server
            .put(&format!("/api/categories/{comedy}"))
            .json(&json!({ "id": comedy, "name": "DRAMA" }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        server
            .put(&format!("/api/categories/{comedy}"))
            .json(&json!({ "id": comedy, "name": "comedy" }))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn books_of_category_and_categories_of_book() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        let books: Vec<Value> = server
            .get(&format!("/api/categories/{}/books", fixtures.category_id))
            .await
            .json();
        assert_eq!(books[0]["id"], fixtures.book_id);

        let categories: Vec<Value> = server
            .get(&format!("/api/categories/books/{}", fixtures.book_id))
            .await
            .json();
        assert_eq!(categories[0]["id"], fixtures.category_id);

        server.get("/api/categories/books/999").await.assert_status_not_found();
        server.get("/api/categories/999/books").await.assert_status_not_found();
    }
}
