use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::Response,
    routing::get,
    Json, Router,
};
use bookapi_db::Repository;
use bookapi_http::AppError;

use super::models::{AssociationIds, Book, BookPayload};
use crate::modules::{
    catalog::Catalog,
    common::{created, Payload, ResourceId},
    validation::{ensure_exists, ensure_same_id, Checks, Rejection},
};

pub fn router() -> Router<Catalog> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/{id}/rating", get(book_rating))
        .route("/isbn/{isbn}", get(book_by_isbn))
        .route("/ISBN/{isbn}", get(book_by_isbn))
}

/// Query string as ordered key/value pairs, keeping repeated keys
struct QueryPairs(Vec<(String, String)>);

impl<S> FromRequestParts<S> for QueryPairs
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        Ok(QueryPairs(pairs))
    }
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(State(catalog): State<Catalog>) -> Result<Json<Vec<Book>>, AppError> {
    Ok(Json(catalog.books.list().await?))
}

async fn get_book(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<Json<Book>, AppError> {
    ensure_exists(&catalog.books, id, "Book").await?;
    Ok(Json(catalog.books.get(id).await?))
}

async fn book_by_isbn(
    State(catalog): State<Catalog>,
    Path(isbn): Path<String>,
) -> Result<Json<Book>, AppError> {
    catalog
        .books
        .find_by_isbn(&isbn)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Book with ISBN {isbn} not found")))
}

async fn book_rating(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<Json<f64>, AppError> {
    ensure_exists(&catalog.books, id, "Book").await?;
    Ok(Json(catalog.books.rating(id).await?))
}

/// Payload shape and association ids, reported together
fn check_shape(payload: &BookPayload, query: &[(String, String)]) -> Result<AssociationIds, Rejection> {
    let mut shape = Checks::new();
    payload.check(&mut shape);
    let links = AssociationIds::collect(query, &mut shape);
    shape.finish(Rejection::Malformed)?;
    Ok(links)
}

/// Every linked author and category must exist
async fn check_links(
    catalog: &Catalog,
    checks: &mut Checks,
    links: &AssociationIds,
) -> Result<(), AppError> {
    for &author_id in &links.author_ids {
        checks.require(
            catalog.authors.exists(author_id).await?,
            "authId",
            format!("Author {author_id} not found"),
        );
    }
    for &category_id in &links.category_ids {
        checks.require(
            catalog.categories.exists(category_id).await?,
            "catId",
            format!("Category {category_id} not found"),
        );
    }
    Ok(())
}

async fn reject_duplicate_isbn(catalog: &Catalog, id: i64, isbn: &str) -> Result<(), AppError> {
    let mut duplicates = Checks::new();
    duplicates.require(
        !catalog.books.is_duplicate_isbn(id, isbn).await?,
        "isbn",
        format!("ISBN {} already exists", isbn.trim()),
    );
    duplicates.finish(Rejection::Duplicate)?;
    Ok(())
}

async fn create_book(
    State(catalog): State<Catalog>,
    QueryPairs(query): QueryPairs,
    Payload(payload): Payload<BookPayload>,
) -> Result<Response, AppError> {
    let links = check_shape(&payload, &query)?;

    let mut missing = Checks::new();
    check_links(&catalog, &mut missing, &links).await?;
    missing.finish(Rejection::Missing)?;

    reject_duplicate_isbn(&catalog, 0, &payload.isbn).await?;

    let book = catalog.books.create(&payload.to_input(&links)).await?;
    tracing::info!(
        book_id = book.id,
        authors = links.author_ids.len(),
        categories = links.category_ids.len(),
        "book created"
    );

    Ok(created("books", book.id, book))
}

async fn update_book(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
    QueryPairs(query): QueryPairs,
    Payload(payload): Payload<BookPayload>,
) -> Result<StatusCode, AppError> {
    let links = check_shape(&payload, &query)?;
    ensure_same_id(id, payload.id)?;

    let mut missing = Checks::new();
    missing.require(
        catalog.books.exists(id).await?,
        "id",
        format!("Book {id} not found"),
    );
    check_links(&catalog, &mut missing, &links).await?;
    missing.finish(Rejection::Missing)?;

    reject_duplicate_isbn(&catalog, id, &payload.isbn).await?;

    catalog.books.update(id, &payload.to_input(&links)).await?;
    tracing::info!(book_id = id, "book updated");

    Ok(StatusCode::NO_CONTENT)
}

/// Removes the book's reviews, the book and its link rows in one commit
async fn delete_book(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, AppError> {
    ensure_exists(&catalog.books, id, "Book").await?;

    let removed = catalog.books.delete_with_reviews(id).await?;
    tracing::info!(book_id = id, reviews_removed = removed, "book deleted");

    Ok(StatusCode::NO_CONTENT)
}
