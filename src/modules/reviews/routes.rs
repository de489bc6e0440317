use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use bookapi_db::Repository;
use bookapi_http::AppError;

use super::models::{ReviewDto, ReviewPayload};
use crate::modules::{
    books::models::Book,
    catalog::Catalog,
    common::{created, Payload, ResourceId},
    validation::{ensure_exists, ensure_same_id, Checks, Rejection},
};

pub fn router() -> Router<Catalog> {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_review).put(update_review).delete(delete_review),
        )
        .route("/{id}/book", get(book_of_review))
        .route("/books/{book_id}", get(reviews_of_book))
}

async fn health_check() -> &'static str {
    "reviews module is healthy"
}

async fn list_reviews(State(catalog): State<Catalog>) -> Result<Json<Vec<ReviewDto>>, AppError> {
    let reviews = catalog.reviews.list().await?;
    Ok(Json(reviews.into_iter().map(ReviewDto::from).collect()))
}

async fn get_review(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<Json<ReviewDto>, AppError> {
    ensure_exists(&catalog.reviews, id, "Review").await?;
    Ok(Json(catalog.reviews.get(id).await?.into()))
}

async fn book_of_review(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<Json<Book>, AppError> {
    ensure_exists(&catalog.reviews, id, "Review").await?;
    Ok(Json(catalog.reviews.book_of_review(id).await?))
}

async fn reviews_of_book(
    State(catalog): State<Catalog>,
    ResourceId(book_id): ResourceId,
) -> Result<Json<Vec<ReviewDto>>, AppError> {
    ensure_exists(&catalog.books, book_id, "Book").await?;
    let reviews = catalog.reviews.reviews_of_book(book_id).await?;
    Ok(Json(reviews.into_iter().map(ReviewDto::from).collect()))
}

/// Book and reviewer referenced by the payload must both exist
async fn check_references(
    catalog: &Catalog,
    checks: &mut Checks,
    payload: &ReviewPayload,
) -> Result<(), AppError> {
    let book_id = payload.book_id();
    let reviewer_id = payload.reviewer_id();
    checks
        .require(
            catalog.books.exists(book_id).await?,
            "book",
            format!("Book {book_id} not found"),
        )
        .require(
            catalog.reviewers.exists(reviewer_id).await?,
            "reviewer",
            format!("Reviewer {reviewer_id} not found"),
        );
    Ok(())
}

async fn create_review(
    State(catalog): State<Catalog>,
    Payload(payload): Payload<ReviewPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let mut missing = Checks::new();
    check_references(&catalog, &mut missing, &payload).await?;
    missing.finish(Rejection::Missing)?;

    let review = catalog.reviews.create(&payload.to_input()).await?;
    tracing::info!(
        review_id = review.id,
        book_id = review.book_id,
        reviewer_id = review.reviewer_id,
        "review created"
    );

    Ok(created("reviews", review.id, ReviewDto::from(review)))
}

async fn update_review(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
    Payload(payload): Payload<ReviewPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    ensure_same_id(id, payload.id)?;

    let mut missing = Checks::new();
    missing.require(
        catalog.reviews.exists(id).await?,
        "id",
        format!("Review {id} not found"),
    );
    check_references(&catalog, &mut missing, &payload).await?;
    missing.finish(Rejection::Missing)?;

    catalog.reviews.update(id, &payload.to_input()).await?;
    tracing::info!(review_id = id, "review updated");

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_review(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, AppError> {
    ensure_exists(&catalog.reviews, id, "Review").await?;

    catalog.reviews.delete(id).await?;
    tracing::info!(review_id = id, "review deleted");

    Ok(StatusCode::NO_CONTENT)
}
