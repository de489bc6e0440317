use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::get,
    Json, Router,
};
use bookapi_db::Repository;
use bookapi_http::AppError;

use super::models::{Reviewer, ReviewerPayload};
use crate::modules::{
    catalog::Catalog,
    common::{created, Payload, ResourceId},
    reviews::models::ReviewDto,
    validation::{ensure_exists, ensure_same_id, Checks, Rejection},
};

pub fn router() -> Router<Catalog> {
    Router::new()
        .route("/", get(list_reviewers).post(create_reviewer))
        .route("/health", get(health_check))
        .route(
            "/{id}",
            get(get_reviewer)
                .put(update_reviewer)
                .delete(delete_reviewer),
        )
        .route("/{id}/reviews", get(reviews_by_reviewer))
        // `id` here is a review id
        .route("/{id}/reviewer", get(reviewer_of_review))
}

async fn health_check() -> &'static str {
    "reviewers module is healthy"
}

async fn list_reviewers(State(catalog): State<Catalog>) -> Result<Json<Vec<Reviewer>>, AppError> {
    Ok(Json(catalog.reviewers.list().await?))
}

async fn get_reviewer(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<Json<Reviewer>, AppError> {
    ensure_exists(&catalog.reviewers, id, "Reviewer").await?;
    Ok(Json(catalog.reviewers.get(id).await?))
}

async fn reviews_by_reviewer(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<Json<Vec<ReviewDto>>, AppError> {
    ensure_exists(&catalog.reviewers, id, "Reviewer").await?;
    let reviews = catalog.reviewers.reviews_by_reviewer(id).await?;
    Ok(Json(reviews.into_iter().map(ReviewDto::from).collect()))
}

async fn reviewer_of_review(
    State(catalog): State<Catalog>,
    ResourceId(review_id): ResourceId,
) -> Result<Json<Reviewer>, AppError> {
    ensure_exists(&catalog.reviews, review_id, "Review").await?;
    Ok(Json(catalog.reviewers.reviewer_of_review(review_id).await?))
}

async fn create_reviewer(
    State(catalog): State<Catalog>,
    Payload(payload): Payload<ReviewerPayload>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let reviewer = catalog.reviewers.create(&payload.to_input()).await?;
    tracing::info!(reviewer_id = reviewer.id, "reviewer created");

    Ok(created("reviewers", reviewer.id, reviewer))
}

async fn update_reviewer(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
    Payload(payload): Payload<ReviewerPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    ensure_same_id(id, payload.id)?;

    let mut missing = Checks::new();
    missing.require(
        catalog.reviewers.exists(id).await?,
        "id",
        format!("Reviewer {id} not found"),
    );
    missing.finish(Rejection::Missing)?;

    catalog.reviewers.update(id, &payload.to_input()).await?;
    tracing::info!(reviewer_id = id, "reviewer updated");

    Ok(StatusCode::NO_CONTENT)
}

/// Removes the reviewer and their reviews in one commit
async fn delete_reviewer(
    State(catalog): State<Catalog>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, AppError> {
    ensure_exists(&catalog.reviewers, id, "Reviewer").await?;

    let removed = catalog.reviewers.delete_with_reviews(id).await?;
    tracing::info!(reviewer_id = id, reviews_removed = removed, "reviewer deleted");

    Ok(StatusCode::NO_CONTENT)
}
