use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::modules::common::EntityRef;
use crate::modules::validation::{Checks, Rejection};

pub const HEADLINE_MIN: usize = 10;
pub const HEADLINE_MAX: usize = 200;
pub const TEXT_MIN: usize = 50;
pub const TEXT_MAX: usize = 2000;
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

/// Stored review row with both foreign keys.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Review {
    pub id: i64,
    pub headline: String,
    pub review_text: String,
    pub rating: i64,
    pub book_id: i64,
    pub reviewer_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub id: i64,
    pub headline: String,
    pub review_text: String,
    pub rating: i64,
}

impl From<Review> for ReviewDto {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            headline: review.headline,
            review_text: review.review_text,
            rating: review.rating,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub headline: String,
    pub review_text: String,
    pub rating: i64,
    pub book_id: i64,
    pub reviewer_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub review_text: String,
    #[serde(default)]
    pub rating: i64,
    pub book: Option<EntityRef>,
    pub reviewer: Option<EntityRef>,
}

impl ReviewPayload {
    pub fn validate(&self) -> Result<(), Rejection> {
        let mut checks = Checks::new();
        checks
            .length("headline", "Headline", &self.headline, HEADLINE_MIN, HEADLINE_MAX)
            .length("reviewText", "Review text", &self.review_text, TEXT_MIN, TEXT_MAX)
            .range("rating", "Rating", self.rating, RATING_MIN, RATING_MAX)
            .require(self.book.is_some(), "book", "Book is required")
            .require(self.reviewer.is_some(), "reviewer", "Reviewer is required");
        checks.finish(Rejection::Malformed)
    }

    pub fn book_id(&self) -> i64 {
        self.book.map(|book| book.id).unwrap_or_default()
    }

    pub fn reviewer_id(&self) -> i64 {
        self.reviewer.map(|reviewer| reviewer.id).unwrap_or_default()
    }

    pub fn to_input(&self) -> NewReview {
        NewReview {
            headline: self.headline.clone(),
            review_text: self.review_text.clone(),
            rating: self.rating,
            book_id: self.book_id(),
            reviewer_id: self.reviewer_id(),
        }
    }
}
