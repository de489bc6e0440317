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

/// People who write reviews
pub struct ReviewersModule {
    catalog: Catalog,
}

impl ReviewersModule {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for ReviewersModule {
    fn name(&self) -> &'static str {
        "reviewers"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "reviewers module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router().with_state(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let tag = "Reviewers";
        let reviewer_input = json!({
            "type": "object",
            "properties": {
                "id": { "type": "integer", "format": "int64" },
                "firstName": { "type": "string", "maxLength": models::FIRST_NAME_MAX },
                "lastName": { "type": "string", "maxLength": models::LAST_NAME_MAX }
            },
            "required": ["firstName", "lastName"]
        });
        let mut reviewer = reviewer_input.clone();
        reviewer["required"] = json!(["id", "firstName", "lastName"]);

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List reviewers ordered by first name",
                        "tags": [tag],
                        "responses": {
                            "200": json_response("Reviewers", array_of("Reviewer")),
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a reviewer",
                        "tags": [tag],
                        "requestBody": json_body(schema_ref("ReviewerInput")),
                        "responses": {
                            "201": json_response("Created reviewer", schema_ref("Reviewer")),
                            "400": error_response("Malformed payload"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/health": health_operation(tag),
                "/{id}": {
                    "parameters": [id_param("id")],
                    "get": {
                        "summary": "Get a reviewer",
                        "tags": [tag],
                        "responses": {
                            "200": json_response("Reviewer", schema_ref("Reviewer")),
                            "404": error_response("Reviewer not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a reviewer",
                        "tags": [tag],
                        "requestBody": json_body(schema_ref("ReviewerInput")),
                        "responses": {
                            "204": empty_response("Updated"),
                            "400": error_response("Malformed payload or id mismatch"),
                            "404": error_response("Reviewer not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a reviewer and their reviews",
                        "tags": [tag],
                        "responses": {
                            "204": empty_response("Deleted"),
                            "404": error_response("Reviewer not found")
                        }
                    }
                },
                "/{id}/reviews": {
                    "get": {
                        "summary": "Reviews written by a reviewer",
                        "tags": [tag],
                        "parameters": [id_param("id")],
                        "responses": {
                            "200": json_response("Reviews", array_of("Review")),
                            "404": error_response("Reviewer not found")
                        }
                    }
                },
                "/{id}/reviewer": {
                    "get": {
                        "summary": "Reviewer of a review (id is the review id)",
                        "tags": [tag],
                        "parameters": [id_param("id")],
                        "responses": {
                            "200": json_response("Reviewer", schema_ref("Reviewer")),
                            "404": error_response("Review not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Reviewer": reviewer,
                    "ReviewerInput": reviewer_input
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE reviewers (
                    id         INTEGER PRIMARY KEY AUTOINCREMENT,
                    first_name TEXT NOT NULL,
                    last_name  TEXT NOT NULL
                );
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviewers module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviewers module stopped");
        Ok(())
    }
}

pub fn create_module(catalog: Catalog) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(ReviewersModule::new(catalog))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::modules::testing;

    #[tokio::test]
    async fn deleting_reviewer_removes_their_reviews() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        server
            .delete(&format!("/api/reviewers/{}", fixtures.reviewer_id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format!("/api/reviewers/{}", fixtures.reviewer_id))
            .await
            .assert_status_not_found();
        server
            .get(&format!("/api/reviews/{}", fixtures.review_id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn reviewer_of_missing_review_is_not_found() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        server.get("/api/reviewers/999/reviewer").await.assert_status_not_found();

        let reviewer: Value = server
            .get(&format!("/api/reviewers/{}/reviewer", fixtures.review_id))
            .await
            .json();
        assert_eq!(reviewer["id"], fixtures.reviewer_id);
    }

    #[tokio::test]
    async fn reviews_by_reviewer_are_transfer_objects() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        let reviews: Vec<Value> = server
            .get(&format!("/api/reviewers/{}/reviews", fixtures.reviewer_id))
            .await
            .json();
        assert_eq!(reviews.len(), 1);
        assert!(reviews[0].get("reviewText").is_some());
        assert!(reviews[0].get("bookId").is_none());
    }

    #[tokio::test]
    async fn create_and_update_round_trip() {
        let (server, _catalog) = testing::server().await;

        let created: Value = server
            .post("/api/reviewers")
            .json(&json!({ "firstName": "Maya", "lastName": "Angelou" }))
            .await
            .json();
        let id = created["id"].as_i64().unwrap();

        server
            .put(&format!("/api/reviewers/{id}"))
            .json(&json!({ "id": id, "firstName": "Maya", "lastName": "A." }))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/reviewers/{id}"))
            .await
            .assert_json(&json!({ "id": id, "firstName": "Maya", "lastName": "A." }));
    }

    #[tokio::test]
    async fn unparseable_body_is_bad_request() {
        let (server, _catalog) = testing::server().await;

        server
            .post("/api/reviewers")
            .text("not json")
            .content_type("application/json")
            .await
            .assert_status_bad_request();
    }
}
