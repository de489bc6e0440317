//! Shared fixtures for repository and HTTP tests.

use axum_test::TestServer;
use bookapi_db::Repository;
use bookapi_kernel::settings::Settings;

use super::{
    authors::models::NewAuthor, books::models::NewBook, categories::models::NewCategory,
    countries::models::NewCountry, reviewers::models::NewReviewer, reviews::models::NewReview,
    Catalog,
};
use crate::app::Application;

pub const FIXTURE_ISBN: &str = "080442957X";

/// Migrated in-memory catalog without an HTTP layer
pub async fn catalog() -> Catalog {
    let app = Application::in_memory(Settings::default()).await.unwrap();
    Catalog::new(app.pool().clone())
}

/// Test server over the full router, plus direct repository access to the same database
pub async fn server() -> (TestServer, Catalog) {
    let app = Application::in_memory(Settings::default()).await.unwrap();
    let catalog = Catalog::new(app.pool().clone());
    let server = TestServer::new(app.router()).unwrap();
    (server, catalog)
}

pub async fn author(catalog: &Catalog, country_id: i64, first_name: &str) -> i64 {
    catalog
        .authors
        .create(&NewAuthor {
            first_name: first_name.to_string(),
            last_name: "Fixture".to_string(),
            country_id,
        })
        .await
        .unwrap()
        .id
}

pub async fn category(catalog: &Catalog, name: &str) -> i64 {
    catalog
        .categories
        .create(&NewCategory {
            name: name.to_string(),
        })
        .await
        .unwrap()
        .id
}

/// One row of every table, linked together
pub struct Fixtures {
    pub country_id: i64,
    pub category_id: i64,
    pub author_id: i64,
    pub reviewer_id: i64,
    pub book_id: i64,
    pub review_id: i64,
}

impl Fixtures {
    /// The review is rated 4
    pub async fn seed(catalog: &Catalog) -> Self {
        let country_id = catalog
            .countries
            .create(&NewCountry {
                name: "Nigeria".to_string(),
            })
            .await
            .unwrap()
            .id;
        let category_id = category(catalog, "Fiction").await;
        let author_id = author(catalog, country_id, "Chinua").await;
        let reviewer_id = catalog
            .reviewers
            .create(&NewReviewer {
                first_name: "Ada".to_string(),
                last_name: "Reader".to_string(),
            })
            .await
            .unwrap()
            .id;
        let book_id = catalog
            .books
            .create(&NewBook {
                isbn: FIXTURE_ISBN.to_string(),
                title: "Things Fall Apart".to_string(),
                date_published: None,
                author_ids: vec![author_id],
                category_ids: vec![category_id],
            })
            .await
            .unwrap()
            .id;
        let review_id = catalog
            .reviews
            .create(&NewReview {
                headline: "A classic that holds up".to_string(),
                review_text: "Okonkwo's story is as sharp and unsettling today as it was on first reading."
                    .to_string(),
                rating: 4,
                book_id,
                reviewer_id,
            })
            .await
            .unwrap()
            .id;

        Self {
            country_id,
            category_id,
            author_id,
            reviewer_id,
            book_id,
            review_id,
        }
    }
}
