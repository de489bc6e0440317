use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use bookapi_db::Repository;
use bookapi_http::AppError;

use super::models::{Category, CategoryPayload};
use crate::modules::{
    books::models::Book,
    catalog::Catalog,
    common::{created, Payload, ResourceId},
    validation::{ensure_exists, ensure_same_id, Checks, Rejection},
};

pub fn router() -> Router<Catalog> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/{id}/books", get(books_of_category))
        .route("/books/{book_id}", get(categories_of_book))
}

async fn health_check() -> &'static str {
    "categories module is healthy"
}

async fn list_categories(
    State(catalog): State<Catalog>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(catalog.categories.list().await?))
}

async fn get_category(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<Json<Category>, AppError> {
    ensure_exists(&catalog.categories, id, "Category").await?;
    Ok(Json(catalog.categories.get(id).await?))
}

async fn books_of_category(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<Json<Vec<Book>>, AppError> {
    ensure_exists(&catalog.categories, id, "Category").await?;
    Ok(Json(catalog.categories.books_of_category(id).await?))
}

async fn categories_of_book(
    State(catalog): State<Catalog>,
    ResourceId(book_id): ResourceId,
) -> Result<Json<Vec<Category>>, AppError> {
    ensure_exists(&catalog.books, book_id, "Book").await?;
    Ok(Json(catalog.categories.categories_of_book(book_id).await?))
}

async fn create_category(
    State(catalog): State<Catalog>,
    Payload(payload): Payload<CategoryPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;
    reject_duplicate_name(&catalog, 0, &payload.name).await?;

    let category = catalog.categories.create(&payload.to_input()).await?;
    tracing::info!(category_id = category.id, "category created");

    Ok(created("categories", category.id, category))
}

async fn update_category(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
    Payload(payload): Payload<CategoryPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    ensure_same_id(id, payload.id)?;

    let mut missing = Checks::new();
    missing.require(
        catalog.categories.exists(id).await?,
        "id",
        format!("Category {id} not found"),
    );
    missing.finish(Rejection::Missing)?;

    reject_duplicate_name(&catalog, id, &payload.name).await?;

    catalog.categories.update(id, &payload.to_input()).await?;
    tracing::info!(category_id = id, "category updated");

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_category(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, AppError> {
    ensure_exists(&catalog.categories, id, "Category").await?;

    let mut blockers = Checks::new();
    blockers.require(
        !catalog.categories.has_books(id).await?,
        "books",
        format!("Category {id} cannot be deleted because it is used by at least one book"),
    );
    blockers.finish(Rejection::InUse)?;

    catalog.categories.delete(id).await?;
    tracing::info!(category_id = id, "category deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn reject_duplicate_name(catalog: &Catalog, id: i64, name: &str) -> Result<(), AppError> {
    let mut duplicates = Checks::new();
    duplicates.require(
        !catalog.categories.is_duplicate_name(id, name).await?,
        "name",
        "Category already exists",
    );
    duplicates.finish(Rejection::Duplicate)?;
    Ok(())
}
