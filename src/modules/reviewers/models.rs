use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::modules::validation::{Checks, Rejection};

pub const FIRST_NAME_MAX: usize = 100;
pub const LAST_NAME_MAX: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Reviewer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone)]
pub struct NewReviewer {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewerPayload {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl ReviewerPayload {
    pub fn validate(&self) -> Result<(), Rejection> {
        let mut checks = Checks::new();
        checks
            .text("firstName", "First name", &self.first_name, FIRST_NAME_MAX)
            .text("lastName", "Last name", &self.last_name, LAST_NAME_MAX);
        checks.finish(Rejection::Malformed)
    }

    pub fn to_input(&self) -> NewReviewer {
        NewReviewer {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}
