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

/// Countries authors belong to
pub struct CountriesModule {
    catalog: Catalog,
}

impl CountriesModule {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for CountriesModule {
    fn name(&self) -> &'static str {
        "countries"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "countries module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router().with_state(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let tag = "Countries";
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List countries ordered by name",
                        "tags": [tag],
                        "responses": {
                            "200": json_response("Countries", array_of("Country")),
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a country",
                        "tags": [tag],
                        "requestBody": json_body(schema_ref("CountryInput")),
                        "responses": {
                            "201": json_response("Created country", schema_ref("Country")),
                            "400": error_response("Malformed payload"),
                            "422": error_response("Country name already exists"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/health": health_operation(tag),
                "/{id}": {
                    "parameters": [id_param("id")],
                    "get": {
                        "summary": "Get a country",
                        "tags": [tag],
                        "responses": {
                            "200": json_response("Country", schema_ref("Country")),
                            "404": error_response("Country not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a country",
                        "tags": [tag],
                        "requestBody": json_body(schema_ref("CountryInput")),
                        "responses": {
                            "204": empty_response("Updated"),
                            "400": error_response("Malformed payload or id mismatch"),
                            "404": error_response("Country not found"),
                            "422": error_response("Country name already exists")
                        }
                    },
                    "delete": {
                        "summary": "Delete a country without authors",
                        "tags": [tag],
                        "responses": {
                            "204": empty_response("Deleted"),
                            "404": error_response("Country not found"),
                            "409": error_response("Country still has authors")
                        }
                    }
                },
                "/{id}/authors": {
                    "get": {
                        "summary": "Authors from a country",
                        "tags": [tag],
                        "parameters": [id_param("id")],
                        "responses": {
                            "200": json_response("Authors", array_of("Author")),
                            "404": error_response("Country not found")
                        }
                    }
                },
                "/authors/{author_id}": {
                    "get": {
                        "summary": "Country of an author",
                        "tags": [tag],
                        "parameters": [id_param("author_id")],
                        "responses": {
                            "200": json_response("Country", schema_ref("Country")),
                            "404": error_response("Author not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Country": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "integer", "format": "int64" },
                            "name": { "type": "string", "maxLength": models::NAME_MAX }
                        },
                        "required": ["id", "name"]
                    },
                    "CountryInput": {
                        "type": "object",
                        "properties": {
                            "id": {
                                "type": "integer",
                                "format": "int64",
                                "description": "Must match the path id on update"
                            },
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
                CREATE TABLE countries (
                    id   INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "countries module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "countries module stopped");
        Ok(())
    }
}

pub fn create_module(catalog: Catalog) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(CountriesModule::new(catalog))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use serde_json::{json, Value};

    use crate::modules::testing;

    #[tokio::test]
    async fn create_then_fetch_round_trips() {
        let (server, _catalog) = testing::server().await;

        let response = server
            .post("/api/countries")
            .json(&json!({ "name": "Portugal" }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let created: Value = response.json();
        let id = created["id"].as_i64().unwrap();
        assert_eq!(
            response.header(header::LOCATION).to_str().unwrap(),
            format!("/api/countries/{id}")
        );

        server
            .get(&format!("/api/countries/{id}"))
            .await
            .assert_json(&json!({ "id": id, "name": "Portugal" }));
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected_without_insert() {
        let (server, _catalog) = testing::server().await;
        server
            .post("/api/countries")
            .json(&json!({ "name": "Japan" }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/api/countries")
            .json(&json!({ "name": "  jApAn " }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"]["details"][0]["field"], "name");

        let countries: Vec<Value> = server.get("/api/countries").await.json();
        assert_eq!(countries.len(), 1);
    }

    #[tokio::test]
    async fn name_padded_with_tabs_and_newlines_is_a_duplicate() {
        let (server, _catalog) = testing::server().await;
        server
            .post("/api/countries")
            .json(&json!({ "name": "Kenya" }))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/api/countries")
            .json(&json!({ "name": "\tKenya\n" }))
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let countries: Vec<Value> = server.get("/api/countries").await.json();
        assert_eq!(countries.len(), 1);
    }

    #[tokio::test]
    async fn stored_name_is_trimmed() {
        let (server, _catalog) = testing::server().await;

        let created: Value = server
            .post("/api/countries")
            .json(&json!({ "name": "\t Chile \r\n" }))
            .await
            .json();
        assert_eq!(created["name"], "Chile");
    }

    #[tokio::test]
    async fn blank_or_long_name_is_bad_request() {
        let (server, _catalog) = testing::server().await;

        server
            .post("/api/countries")
            .json(&json!({ "name": "   " }))
            .await
            .assert_status_bad_request();
        server
            .post("/api/countries")
            .json(&json!({ "name": "x".repeat(51) }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn update_checks_id_then_existence() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;
        let id = fixtures.country_id;

        server
            .put(&format!("/api/countries/{id}"))
            .json(&json!({ "id": id + 1, "name": "Renamed" }))
            .await
            .assert_status_bad_request();
        server
            .put("/api/countries/999")
            .json(&json!({ "id": 999, "name": "Renamed" }))
            .await
            .assert_status_not_found();

        server
            .put(&format!("/api/countries/{id}"))
            .json(&json!({ "id": id, "name": "Renamed" }))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/countries/{id}"))
            .await
            .assert_json(&json!({ "id": id, "name": "Renamed" }));
    }

    #[tokio::test]
    async fn delete_is_blocked_while_authors_reference_country() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        server
            .delete(&format!("/api/countries/{}", fixtures.country_id))
            .await
            .assert_status(StatusCode::CONFLICT);
        server
            .get(&format!("/api/countries/{}", fixtures.country_id))
            .await
            .assert_status_ok();

        let empty: Value = server
            .post("/api/countries")
            .json(&json!({ "name": "Iceland" }))
            .await
            .json();
        server
            .delete(&format!("/api/countries/{}", empty["id"]))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn relationship_routes() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        let authors: Vec<Value> = server
            .get(&format!("/api/countries/{}/authors", fixtures.country_id))
            .await
            .json();
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0]["id"], fixtures.author_id);
        assert!(authors[0].get("countryId").is_none());

        let country: Value = server
            .get(&format!("/api/countries/authors/{}", fixtures.author_id))
            .await
            .json();
        assert_eq!(country["id"], fixtures.country_id);

        server.get("/api/countries/999/authors").await.assert_status_not_found();
        server.get("/api/countries/authors/999").await.assert_status_not_found();
    }
}
