use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use bookapi_db::Repository;
use bookapi_http::AppError;

use super::models::{AuthorDto, AuthorPayload};
use crate::modules::{
    books::models::Book,
    catalog::Catalog,
    common::{created, Payload, ResourceId},
    validation::{ensure_exists, ensure_same_id, Checks, Rejection},
};

pub fn router() -> Router<Catalog> {
    Router::new()
        .route("/", get(list_authors).post(create_author))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_author).put(update_author).delete(delete_author),
        )
        .route("/{id}/books", get(books_by_author))
        .route("/books/{book_id}", get(authors_of_book))
}

async fn health_check() -> &'static str {
    "authors module is healthy"
}

async fn list_authors(State(catalog): State<Catalog>) -> Result<Json<Vec<AuthorDto>>, AppError> {
    let authors = catalog.authors.list().await?;
    Ok(Json(authors.into_iter().map(AuthorDto::from).collect()))
}

async fn get_author(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<Json<AuthorDto>, AppError> {
    ensure_exists(&catalog.authors, id, "Author").await?;
    Ok(Json(catalog.authors.get(id).await?.into()))
}

async fn books_by_author(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<Json<Vec<Book>>, AppError> {
    ensure_exists(&catalog.authors, id, "Author").await?;
    Ok(Json(catalog.authors.books_by_author(id).await?))
}

async fn authors_of_book(
    State(catalog): State<Catalog>,
    ResourceId(book_id): ResourceId,
) -> Result<Json<Vec<AuthorDto>>, AppError> {
    ensure_exists(&catalog.books, book_id, "Book").await?;
    let authors = catalog.authors.authors_of_book(book_id).await?;
    Ok(Json(authors.into_iter().map(AuthorDto::from).collect()))
}

async fn create_author(
    State(catalog): State<Catalog>,
    Payload(payload): Payload<AuthorPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let country_id = payload.country_id();
    let mut missing = Checks::new();
    missing.require(
        catalog.countries.exists(country_id).await?,
        "country",
        format!("Country {country_id} not found"),
    );
    missing.finish(Rejection::Missing)?;

    let author = catalog.authors.create(&payload.to_input()).await?;
    tracing::info!(author_id = author.id, country_id, "author created");

    Ok(created("authors", author.id, AuthorDto::from(author)))
}

async fn update_author(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
    Payload(payload): Payload<AuthorPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    ensure_same_id(id, payload.id)?;

    let country_id = payload.country_id();
    let mut missing = Checks::new();
    missing
        .require(
            catalog.authors.exists(id).await?,
            "id",
            format!("Author {id} not found"),
        )
        .require(
            catalog.countries.exists(country_id).await?,
            "country",
            format!("Country {country_id} not found"),
        );
    missing.finish(Rejection::Missing)?;

    catalog.authors.update(id, &payload.to_input()).await?;
    tracing::info!(author_id = id, country_id, "author updated");

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_author(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, AppError> {
    ensure_exists(&catalog.authors, id, "Author").await?;

    let mut blockers = Checks::new();
    blockers.require(
        !catalog.authors.has_books(id).await?,
        "books",
        format!("Author {id} cannot be deleted because they have at least one book"),
    );
    blockers.finish(Rejection::InUse)?;

    catalog.authors.delete(id).await?;
    tracing::info!(author_id = id, "author deleted");

    Ok(StatusCode::NO_CONTENT)
}
