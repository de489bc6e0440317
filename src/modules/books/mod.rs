pub mod models;
pub mod repository;
mod routes;

use async_trait::async_trait;
use axum::Router;
use bookapi_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use super::catalog::Catalog;
use super::openapi::{
    array_of, empty_response, error_response, health_operation, id_list_param, id_param,
    json_body, json_response, schema_ref,
};

/// Books module: the catalog's central resource, linked to authors and
/// categories through link tables and reviewed by reviewers
pub struct BooksModule {
    catalog: Catalog,
}

impl BooksModule {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router().with_state(self.catalog.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        let tag = "Books";
        let link_params = json!([
            id_list_param(models::AUTHOR_PARAM, "Author ids, repeated once per author"),
            id_list_param(models::CATEGORY_PARAM, "Category ids, repeated once per category")
        ]);
        let scalar_props = json!({
            "isbn": {
                "type": "string",
                "minLength": models::ISBN_MIN,
                "maxLength": models::ISBN_MAX
            },
            "title": { "type": "string", "maxLength": models::TITLE_MAX },
            "datePublished": {
                "type": "string",
                "description": "Timestamp without offset, e.g. 1965-08-01T00:00:00"
            }
        });
        let mut book_props = scalar_props.clone();
        book_props["id"] = json!({ "type": "integer", "format": "int64" });

        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List books ordered by title",
                        "tags": [tag],
                        "responses": {
                            "200": json_response("Books", array_of("Book")),
                            "500": error_response("Internal server error")
                        }
                    },
                    "post": {
                        "summary": "Create a book with its authors and categories",
                        "tags": [tag],
                        "parameters": link_params,
                        "requestBody": json_body(schema_ref("BookInput")),
                        "responses": {
                            "201": json_response("Created book", schema_ref("Book")),
                            "400": error_response("Malformed payload or ids"),
                            "404": error_response("Author or category not found"),
                            "422": error_response("ISBN already exists"),
                            "500": error_response("Internal server error")
                        }
                    }
                },
                "/health": health_operation(tag),
                "/{id}": {
                    "parameters": [id_param("id")],
                    "get": {
                        "summary": "Get a book",
                        "tags": [tag],
                        "responses": {
                            "200": json_response("Book", schema_ref("Book")),
                            "404": error_response("Book not found")
                        }
                    },
                    "put": {
                        "summary": "Replace a book and its author and category links",
                        "tags": [tag],
                        "parameters": link_params,
                        "requestBody": json_body(schema_ref("BookInput")),
                        "responses": {
                            "204": empty_response("Updated"),
                            "400": error_response("Malformed payload, ids or id mismatch"),
                            "404": error_response("Book, author or category not found"),
                            "422": error_response("ISBN already exists")
                        }
                    },
                    "delete": {
                        "summary": "Delete a book and its reviews",
                        "tags": [tag],
                        "responses": {
                            "204": empty_response("Deleted"),
                            "404": error_response("Book not found")
                        }
                    }
                },
                "/{id}/rating": {
                    "get": {
                        "summary": "Average review rating, 0 without reviews",
                        "tags": [tag],
                        "parameters": [id_param("id")],
                        "responses": {
                            "200": json_response("Rating", json!({ "type": "number" })),
                            "404": error_response("Book not found")
                        }
                    }
                },
                "/isbn/{isbn}": {
                    "get": {
                        "summary": "Find a book by ISBN",
                        "tags": [tag],
                        "parameters": [{
                            "name": "isbn",
                            "in": "path",
                            "required": true,
                            "schema": { "type": "string" }
                        }],
                        "responses": {
                            "200": json_response("Book", schema_ref("Book")),
                            "404": error_response("No book with this ISBN")
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Book": {
                        "type": "object",
                        "properties": book_props.clone(),
                        "required": ["id", "isbn", "title"]
                    },
                    "BookInput": {
                        "type": "object",
                        "properties": book_props,
                        "required": ["isbn", "title"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_init",
            up: r#"
                CREATE TABLE books (
                    id             INTEGER PRIMARY KEY AUTOINCREMENT,
                    isbn           TEXT NOT NULL UNIQUE,
                    title          TEXT NOT NULL,
                    date_published TEXT
                );

                CREATE TABLE book_authors (
                    book_id   INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
                    author_id INTEGER NOT NULL REFERENCES authors (id),
                    PRIMARY KEY (book_id, author_id)
                );
                CREATE INDEX book_authors_author_id ON book_authors (author_id);

                CREATE TABLE book_categories (
                    book_id     INTEGER NOT NULL REFERENCES books (id) ON DELETE CASCADE,
                    category_id INTEGER NOT NULL REFERENCES categories (id),
                    PRIMARY KEY (book_id, category_id)
                );
                CREATE INDEX book_categories_category_id ON book_categories (category_id);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(catalog: Catalog) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(catalog))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use bookapi_db::Repository;
    use serde_json::{json, Value};

    use crate::modules::testing;

    fn book(isbn: &str) -> Value {
        json!({
            "isbn": isbn,
            "title": "The Left Hand of Darkness",
            "datePublished": "1969-03-01T00:00:00Z"
        })
    }

    #[tokio::test]
    async fn create_writes_one_link_per_distinct_id() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;
        let (a, c) = (fixtures.author_id, fixtures.category_id);

        let response = server
            .post(&format!("/api/books?authId={a}&authId={a}&catId={c}"))
            .json(&book("0441478123"))
            .await;
        response.assert_status(StatusCode::CREATED);

        let created: Value = response.json();
        let id = created["id"].as_i64().unwrap();
        assert_eq!(
            response.header(header::LOCATION).to_str().unwrap(),
            format!("/api/books/{id}")
        );
        assert_eq!(catalog.books.author_ids(id).await.unwrap(), vec![a]);
        assert_eq!(catalog.books.category_ids(id).await.unwrap(), vec![c]);

        let fetched: Value = server.get(&format!("/api/books/{id}")).await.json();
        assert_eq!(fetched, created);
        assert_eq!(fetched["title"], "The Left Hand of Darkness");
    }

    #[tokio::test]
    async fn naive_publication_date_round_trips() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        let created: Value = server
            .post(&format!(
                "/api/books?authId={}&catId={}",
                fixtures.author_id, fixtures.category_id
            ))
            .json(&json!({
                "isbn": "0441013597",
                "title": "Dune",
                "datePublished": "1965-08-01T00:00:00"
            }))
            .await
            .json();
        assert_eq!(created["datePublished"], "1965-08-01T00:00:00");

        let fetched: Value = server.get("/api/books/isbn/0441013597").await.json();
        assert_eq!(fetched["datePublished"], "1965-08-01T00:00:00");
    }

    #[tokio::test]
    async fn padded_isbn_is_bad_request_and_short_padding_is_trimmed() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;
        let url = format!(
            "/api/books?authId={}&catId={}",
            fixtures.author_id, fixtures.category_id
        );

        server
            .post(&url)
            .json(&book("   1234567890   "))
            .await
            .assert_status_bad_request();

        let created: Value = server.post(&url).json(&book(" 12345 ")).await.json();
        assert_eq!(created["isbn"], "12345");
        assert_eq!(catalog.books.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_isbn_is_unprocessable() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        let response = server
            .post(&format!(
                "/api/books?authId={}&catId={}",
                fixtures.author_id, fixtures.category_id
            ))
            .json(&book(testing::FIXTURE_ISBN))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"]["details"][0]["field"], "isbn");
        assert_eq!(catalog.books.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_or_malformed_ids_are_bad_request() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        server
            .post("/api/books")
            .json(&book("1234567"))
            .await
            .assert_status_bad_request();
        server
            .post(&format!("/api/books?authId=x&catId={}", fixtures.category_id))
            .json(&book("1234567"))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn unknown_author_and_category_are_not_found() {
        let (server, _catalog) = testing::server().await;

        let response = server
            .post("/api/books?authId=50&catId=60&catId=61")
            .json(&book("1234567"))
            .await;

        response.assert_status_not_found();
        let details = response.json::<Value>()["error"]["details"].clone();
        assert_eq!(details.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_replaces_associations() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;
        let author = testing::author(&catalog, fixtures.country_id, "Other").await;
        let category = testing::category(&catalog, "Other").await;
        let id = fixtures.book_id;

        let mut body = book(testing::FIXTURE_ISBN);
        body["id"] = json!(id);
        server
            .put(&format!("/api/books/{id}?authId={author}&catId={category}"))
            .json(&body)
            .await
            .assert_status(StatusCode::NO_CONTENT);

        assert_eq!(catalog.books.author_ids(id).await.unwrap(), vec![author]);
        assert_eq!(catalog.books.category_ids(id).await.unwrap(), vec![category]);
    }

    #[tokio::test]
    async fn update_to_another_books_isbn_is_unprocessable() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;
        let links = format!("authId={}&catId={}", fixtures.author_id, fixtures.category_id);

        let other: Value = server
            .post(&format!("/api/books?{links}"))
            .json(&book("55555"))
            .await
            .json();
        let other_id = other["id"].as_i64().unwrap();

        let mut body = book(testing::FIXTURE_ISBN);
        body["id"] = json!(other_id);
        server
            .put(&format!("/api/books/{other_id}?{links}"))
            .json(&body)
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn delete_removes_reviews_and_links() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        server
            .delete(&format!("/api/books/{}", fixtures.book_id))
            .await
            .assert_status(StatusCode::NO_CONTENT);

        server
            .get(&format!("/api/reviews/{}", fixtures.review_id))
            .await
            .assert_status_not_found();
        server
            .delete(&format!("/api/categories/{}", fixtures.category_id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn isbn_lookup_and_rating() {
        let (server, catalog) = testing::server().await;
        let fixtures = testing::Fixtures::seed(&catalog).await;

        let found: Value = server
            .get(&format!("/api/books/isbn/{}", testing::FIXTURE_ISBN))
            .await
            .json();
        assert_eq!(found["id"], fixtures.book_id);
        server.get("/api/books/isbn/nope").await.assert_status_not_found();

        let upper_route: Value = server
            .get(&format!("/api/books/ISBN/{}", testing::FIXTURE_ISBN))
            .await
            .json();
        assert_eq!(upper_route, found);
        server.get("/api/books/ISBN/nope").await.assert_status_not_found();

        let rating: f64 = server
            .get(&format!("/api/books/{}/rating", fixtures.book_id))
            .await
            .json();
        assert_eq!(rating, 4.0);
        server.get("/api/books/999/rating").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn every_id_route_is_not_found_for_missing_book() {
        let (server, _catalog) = testing::server().await;

        server.get("/api/books/404").await.assert_status_not_found();
        server.delete("/api/books/404").await.assert_status_not_found();
        server
            .put("/api/books/404?authId=1&catId=1")
            .json(&json!({ "id": 404, "isbn": "12345", "title": "Gone" }))
            .await
            .assert_status_not_found();
        server.get("/api/authors/books/404").await.assert_status_not_found();
        server.get("/api/categories/books/404").await.assert_status_not_found();
        server.get("/api/reviews/books/404").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn non_numeric_id_is_bad_request() {
        let (server, _catalog) = testing::server().await;

        server.get("/api/books/abc").await.assert_status_bad_request();
    }
}
