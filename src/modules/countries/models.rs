use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::modules::validation::{Checks, Rejection};

pub const NAME_MAX: usize = 50;

/// A country authors belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub id: i64,
    pub name: String,
}

/// Fields written on create and update.
#[derive(Debug, Clone)]
pub struct NewCountry {
    pub name: String,
}

/// Request body for `POST` and `PUT`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryPayload {
    /// Ignored on create; must match the path on update
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

impl CountryPayload {
    pub fn validate(&self) -> Result<(), Rejection> {
        let mut checks = Checks::new();
        checks.text("name", "Country name", &self.name, NAME_MAX);
        checks.finish(Rejection::Malformed)
    }

    /// Stored name is trimmed
    pub fn to_input(&self) -> NewCountry {
        NewCountry {
            name: self.name.trim().to_string(),
        }
    }
}
