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

/// Reviews of books, one reviewer each
pub struct ReviewsModule {
    catalog: Catalog,
}

impl ReviewsModule {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "reviews module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router().with_state(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let tag = "Reviews";
        let text_fields = json!({
            "headline": {
                "type": "string",
                "minLength": models::HEADLINE_MIN,
                "maxLength": models::HEADLINE_MAX
            },
            "reviewText": {
                "type": "string",
                "minLength": models::TEXT_MIN,
                "maxLength": models::TEXT_MAX
            },
            "rating": {
                "type": "integer",
                "minimum": models::RATING_MIN,
                "maximum": models::RATING_MAX
            }
        });

        let mut review_props = text_fields.clone();
        review_props["id"] = json!({ "type": "integer", "format": "int64" });
        let mut input_props = review_props.clone();
        input_props["book"] = entity_ref_schema();
        input_props["reviewer"] = entity_ref_schema();

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List reviews, highest rating first",
                        "tags": [tag],
                        "responses": {
                            "200": json_response("Reviews", array_of("Review")),
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a review",
                        "tags": [tag],
                        "requestBody": json_body(schema_ref("ReviewInput")),
                        "responses": {
                            "201": json_response("Created review", schema_ref("Review")),
                            "400": error_response("Malformed payload"),
                            "404": error_response("Book or reviewer not found"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/health": health_operation(tag),
                "/{id}": {
                    "parameters": [id_param("id")],
                    "get": {
                        "summary": "Get a review",
                        "tags": [tag],
                        "responses": {
                            "200": json_response("Review", schema_ref("Review")),
                            "404": error_response("Review not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a review",
                        "tags": [tag],
                        "requestBody": json_body(schema_ref("ReviewInput")),
                        "responses": {
                            "204": empty_response("Updated"),
                            "400": error_response("Malformed payload or id mismatch"),
                            "404": error_response("Review, book or reviewer not found")
                        }
                    },
                    "delete": {
                        "summary": "Delete a review",
                        "tags": [tag],
                        "responses": {
                            "204": empty_response("Deleted"),
                            "404": error_response("Review not found")
                        }
                    }
                },
                "/{id}/book": {
                    "get": {
                        "summary": "Book a review is about",
                        "tags": [tag],
                        "parameters": [id_param("id")],
                        "responses": {
                            "200": json_response("Book", schema_ref("Book")),
                            "404": error_response("Review not found")
                        }
                    }
                },
                "/books/{book_id}": {
                    "get": {
                        "summary": "Reviews of a book",
                        "tags": [tag],
                        "parameters": [id_param("book_id")],
                        "responses": {
                            "200": json_response("Reviews", array_of("Review")),
                            "404": error_response("Book not found")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Review": {
                        "type": "object",
                        "properties": review_props,
                        "required": ["id", "headline", "reviewText", "rating"]
                    },
                    "ReviewInput": {
                        "type": "object",
                        "properties": input_props,
                        "required": ["headline", "reviewText", "rating", "book", "reviewer"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE reviews (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    headline    TEXT NOT NULL,
                    review_text TEXT NOT NULL,
                    rating      INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                    book_id     INTEGER NOT NULL REFERENCES books (id),
                    reviewer_id INTEGER NOT NULL REFERENCES reviewers (id)
                );
                CREATE INDEX reviews_book_id ON reviews (book_id);
                CREATE INDEX reviews_reviewer_id ON reviews (reviewer_id);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "reviews module stopped");
        Ok(())
    }
}

pub fn create_module(catalog: Catalog) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(ReviewsModule::new(catalog))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::modules::testing;

    fn body(book_id: i64, reviewer_id: i64) -> Value {
        json!({
            "headline": "A slow but rewarding read",
            "reviewText": "The first half drags, but the ending more than makes up for it.",
            "rating": 4,
            "book": { "id": book_id },
            "reviewer": { "id": reviewer_id }
        })
    }

    #[tokio::test]
    async fn create_then_fetch_round_trips() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        let response = server
            .post("/api/reviews")
            .json(&body(fixtures.book_id, fixtures.reviewer_id))
            .await;
        response.assert_status(StatusCode::CREATED);
        let id = response.json::<Value>()["id"].as_i64().unwrap();

        server.get(&format!("/api/reviews/{id}")).await.assert_json(&json!({
            "id": id,
            "headline": "A slow but rewarding read",
            "reviewText": "The first half drags, but the ending more than makes up for it.",
            "rating": 4
        }));

        let book: Value = server.get(&format!("/api/reviews/{id}/book")).await.json();
        assert_eq!(book["id"], fixtures.book_id);
    }

    #[tokio::test]
    async fn missing_book_and_reviewer_are_both_reported() {
        let (server, _catalog) = testing::server().await;

        let response = server.post("/api/reviews").json(&body(41, 42)).await;

        response.assert_status_not_found();
        let details = response.json::<Value>()["error"]["details"].clone();
        assert_eq!(details[0]["field"], "book");
        assert_eq!(details[1]["field"], "reviewer");
    }

    #[tokio::test]
    async fn rating_out_of_range_is_bad_request() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;
        let mut review = body(fixtures.book_id, fixtures.reviewer_id);
        review["rating"] = json!(6);

        server
            .post("/api/reviews")
            .json(&review)
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn update_and_delete() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;
        let id = fixtures.review_id;

        let mut review = body(fixtures.book_id, fixtures.reviewer_id);
        review["id"] = json!(id);
        review["rating"] = json!(1);
        server
            .put(&format!("/api/reviews/{id}"))
            .json(&review)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let stored: Value = server.get(&format!("/api/reviews/{id}")).await.json();
        assert_eq!(stored["rating"], 1);

        server
            .delete(&format!("/api/reviews/{id}"))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete(&format!("/api/reviews/{id}"))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn reviews_of_book() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        let reviews: Vec<Value> = server
            .get(&format!("/api/reviews/books/{}", fixtures.book_id))
            .await
            .json();
        assert_eq!(reviews[0]["id"], fixtures.review_id);

        server.get("/api/reviews/books/999").await.assert_status_not_found();
        server.get("/api/reviews/999/book").await.assert_status_not_found();
    }
}
