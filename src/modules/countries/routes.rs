use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use bookapi_db::Repository;
use bookapi_http::AppError;

use super::models::{Country, CountryPayload};
use crate::modules::{
    authors::models::AuthorDto,
    catalog::Catalog,
    common::{created, Payload, ResourceId},
    validation::{ensure_exists, ensure_same_id, Checks, Rejection},
};

pub fn router() -> Router<Catalog> {
    Router::new()
        .route("/", get(list_countries).post(create_country))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_country).put(update_country).delete(delete_country),
        )
        .route("/{id}/authors", get(authors_of_country))
        .route("/authors/{author_id}", get(country_of_author))
}

async fn health_check() -> &'static str {
    "countries module is healthy"
}

async fn list_countries(State(catalog): State<Catalog>) -> Result<Json<Vec<Country>>, AppError> {
    Ok(Json(catalog.countries.list().await?))
}

async fn get_country(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<Json<Country>, AppError> {
    ensure_exists(&catalog.countries, id, "Country").await?;
    Ok(Json(catalog.countries.get(id).await?))
}

async fn authors_of_country(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<Json<Vec<AuthorDto>>, AppError> {
    ensure_exists(&catalog.countries, id, "Country").await?;
    let authors = catalog.countries.authors_of_country(id).await?;
    Ok(Json(authors.into_iter().map(AuthorDto::from).collect()))
}

async fn country_of_author(
    State(catalog): State<Catalog>,
    ResourceId(author_id): ResourceId,
) -> Result<Json<Country>, AppError> {
    ensure_exists(&catalog.authors, author_id, "Author").await?;
    Ok(Json(catalog.countries.country_of_author(author_id).await?))
}

async fn create_country(
    State(catalog): State<Catalog>,
    Payload(payload): Payload<CountryPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;
    reject_duplicate_name(&catalog, 0, &payload.name).await?;

    let country = catalog.countries.create(&payload.to_input()).await?;
    tracing::info!(country_id = country.id, "country created");

    Ok(created("countries", country.id, country))
}

async fn update_country(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
    Payload(payload): Payload<CountryPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    ensure_same_id(id, payload.id)?;

    let mut missing = Checks::new();
    missing.require(
        catalog.countries.exists(id).await?,
        "id",
        format!("Country {id} not found"),
    );
    missing.finish(Rejection::Missing)?;

    reject_duplicate_name(&catalog, id, &payload.name).await?;

    catalog.countries.update(id, &payload.to_input()).await?;
    tracing::info!(country_id = id, "country updated");

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_country(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, AppError> {
    ensure_exists(&catalog.countries, id, "Country").await?;

    let mut blockers = Checks::new();
    blockers.require(
        !catalog.countries.has_authors(id).await?,
        "authors",
        format!("Country {id} cannot be deleted because it has authors"),
    );
    blockers.finish(Rejection::InUse)?;

    catalog.countries.delete(id).await?;
    tracing::info!(country_id = id, "country deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn reject_duplicate_name(catalog: &Catalog, id: i64, name: &str) -> Result<(), AppError> {
    let mut duplicates = Checks::new();
    duplicates.require(
        !catalog.countries.is_duplicate_name(id, name).await?,
        "name",
        "Country already exists",
    );
    duplicates.finish(Rejection::Duplicate)?;
    Ok(())
}
