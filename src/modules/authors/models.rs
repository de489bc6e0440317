use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::modules::common::EntityRef;
use crate::modules::validation::{Checks, Rejection};

pub const FIRST_NAME_MAX: usize = 100;
pub const LAST_NAME_MAX: usize = 200;

/// Stored author row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub country_id: i64,
}

/// Author as returned by the API, without the country reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl From<Author> for AuthorDto {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            first_name: author.first_name,
            last_name: author.last_name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAuthor {
    pub first_name: String,
    pub last_name: String,
    pub country_id: i64,
}

/// Request body: `{"id": 0, "firstName": "..", "lastName": "..", "country": {"id": 3}}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorPayload {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub country: Option<EntityRef>,
}

impl AuthorPayload {
    pub fn validate(&self) -> Result<(), Rejection> {
        let mut checks = Checks::new();
        checks
            .text("firstName", "First name", &self.first_name, FIRST_NAME_MAX)
            .text("lastName", "Last name", &self.last_name, LAST_NAME_MAX)
            .require(self.country.is_some(), "country", "Country is required");
        checks.finish(Rejection::Malformed)
    }

    /// Country id of a validated payload
    pub fn country_id(&self) -> i64 {
        self.country.map(|country| country.id).unwrap_or_default()
    }

    pub fn to_input(&self) -> NewAuthor {
        NewAuthor {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            country_id: self.country_id(),
        }
    }
}
