use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::modules::validation::{Checks, Rejection};

pub const NAME_MAX: usize = 50;

/// A book category, e.g. "Science Fiction".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

impl CategoryPayload {
    pub fn validate(&self) -> Result<(), Rejection> {
        let mut checks = Checks::new();
        checks.text("name", "Category name", &self.name, NAME_MAX);
        checks.finish(Rejection::Malformed)
    }

    /// Stored name is trimmed
    pub fn to_input(&self) -> NewCategory {
        NewCategory {
            name: self.name.trim().to_string(),
        }
    }
}
