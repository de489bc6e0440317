pub mod models;
pub mod repository;
mod routes;

use async_trait::async_trait;
use axum::Router;
use bookapi_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use super::catalog::Catalog;
use super::openapi::{
    array_of, empty_response, entity_ref_schema, error_response, health_operation, id_param,
    json_body, json_response, schema_ref,
};

/// Authors, each from one country and linked to many books
pub struct AuthorsModule {
    catalog: Catalog,
}

impl AuthorsModule {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for AuthorsModule {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "authors module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router().with_state(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let tag = "Authors";
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List authors ordered by first name",
                        "tags": [tag],
                        "responses": {
                            "200": json_response("Authors", array_of("Author")),
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create an author",
                        "tags": [tag],
                        "requestBody": json_body(schema_ref("AuthorInput")),
                        "responses": {
                            "201": json_response("Created author", schema_ref("Author")),
                            "400": error_response("Malformed payload"),
                            "404": error_response("Country not found"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/health": health_operation(tag),
                "/{id}": {
                    "parameters": [id_param("id")],
                    "get": {
                        "summary": "Get an author",
                        "tags": [tag],
                        "responses": {
                            "200": json_response("Author", schema_ref("Author")),
                            "404": error_response("Author not found")
                        }
                    },
                    "put": {
                        "summary": "Replace an author",
                        "tags": [tag],
                        "requestBody": json_body(schema_ref("AuthorInput")),
                        "responses": {
                            "204": empty_response("Updated"),
                            "400": error_response("Malformed payload or id mismatch"),
                            "404": error_response("Author or country not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete an author without books",
                        "tags": [tag],
                        "responses": {
                            "204": empty_response("Deleted"),
                            "404": error_response("Author not found"),
                            "409": error_response("Author still has books")
                        }
                    }
                },
                "/{id}/books": {
                    "get": {
                        "summary": "Books by an author",
                        "tags": [tag],
                        "parameters": [id_param("id")],
                        "responses": {
                            "200": json_response("Books", array_of("Book")),
                            "404": error_response("Author not found")
                        }
                    }
                },
                "/books/{book_id}": {
                    "get": {
                        "summary": "Authors of a book",
                        "tags": [tag],
                        "parameters": [id_param("book_id")],
                        "responses": {
                            "200": json_response("Authors", array_of("Author")),
                            "404": error_response("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Author": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "firstName": { "type": "string", "maxLength": models::FIRST_NAME_MAX },
                            "lastName": { "type": "string", "maxLength": models::LAST_NAME_MAX }
                        },
                        "required": ["id", "firstName", "lastName"]
                    },
                    "AuthorInput": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "firstName": { "type": "string", "maxLength": models::FIRST_NAME_MAX },
                            "lastName": { "type": "string", "maxLength": models::LAST_NAME_MAX },
                            "country": entity_ref_schema()
                        },
                        "required": ["firstName", "lastName", "country"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE authors (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    first_name TEXT NOT NULL,
                    last_name  TEXT NOT NULL,
                    country_id INTEGER NOT NULL REFERENCES countries (id)
                );
                CREATE INDEX authors_country_id ON authors (country_id);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "authors module stopped");
        Ok(())
    }
}

pub fn create_module(catalog: Catalog) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AuthorsModule::new(catalog))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::modules::testing;

    #[tokio::test]
    async fn create_with_missing_country_is_not_found() {
        let (server, _catalog) = testing::server().await;

        let response = server
            .post("/api/authors")
            .json(&json!({ "firstName": "Jorge", "lastName": "Borges", "country": { "id": 77 } }))
            .await;

        response.assert_status_not_found();
        assert_eq!(response.json::<Value>()["error"]["details"][0]["field"], "country");
    }

    #[tokio::test]
    async fn create_then_fetch_round_trips() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        let created: Value = server
            .post("/api/authors")
            .json(&json!({
                "firstName": "Jorge",
                "lastName": "Borges",
                "country": { "id": fixtures.country_id }
            }))
            .await
            .json();
        let id = created["id"].as_i64().unwrap();

        server
            .get(&format!("/api/authors/{id}"))
            .await
            .assert_json(&json!({ "id": id, "firstName": "Jorge", "lastName": "Borges" }));
    }

    #[tokio::test]
    async fn update_reports_every_missing_reference() {
        let (server, _catalog) = testing::server().await;

        let response = server
            .put("/api/authors/5")
            .json(&json!({ "id": 5, "firstName": "A", "lastName": "B", "country": { "id": 6 } }))
            .await;

        response.assert_status_not_found();
        let details = response.json::<Value>()["error"]["details"].clone();
        assert_eq!(details.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn author_with_books_cannot_be_deleted() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        server
            .delete(&format!("/api/authors/{}", fixtures.author_id))
            .await
            .assert_status(StatusCode::CONFLICT);
        server.delete("/api/authors/999").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn books_by_author_lists_linked_books() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        let books: Vec<Value> = server
            .get(&format!("/api/authors/{}/books", fixtures.author_id))
            .await
            .json();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0]["isbn"], testing::FIXTURE_ISBN);

        let authors: Vec<Value> = server
            .get(&format!("/api/authors/books/{}", fixtures.book_id))
            .await
            .json();
        assert_eq!(authors[0]["id"], fixtures.author_id);
    }
}
