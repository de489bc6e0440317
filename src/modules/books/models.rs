use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use crate::modules::validation::Checks;
use crate::utils::distinct_ids;

pub const ISBN_MIN: usize = 3;
pub const ISBN_MAX: usize = 10;
pub const TITLE_MAX: usize = 200;

/// Query parameter carrying author ids, repeated once per id
pub const AUTHOR_PARAM: &str = "authId";
/// Query parameter carrying category ids, repeated once per id
pub const CATEGORY_PARAM: &str = "catId";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub date_published: Option<NaiveDateTime>,
}

/// Scalar fields plus the full author and category sets of a book.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub date_published: Option<NaiveDateTime>,
    pub author_ids: Vec<i64>,
    pub category_ids: Vec<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "parse_published")]
    pub date_published: Option<NaiveDateTime>,
}

/// Publication date as a naive timestamp (`1965-08-01T00:00:00`), a bare date,
/// or an RFC 3339 timestamp, which is converted to UTC.
fn parse_published<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();

    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(stamp.naive_utc()));
    }
    if let Ok(stamp) = raw.parse::<NaiveDateTime>() {
        return Ok(Some(stamp));
    }
    raw.parse::<NaiveDate>()
        .map(|date| Some(date.and_time(NaiveTime::MIN)))
        .map_err(|_| serde::de::Error::custom(format!("invalid publication date '{raw}'")))
}

impl BookPayload {
    /// ISBN length is checked on the value as sent, padding included
    pub fn check(&self, checks: &mut Checks) {
        checks
            .require(!self.isbn.trim().is_empty(), "isbn", "ISBN is required")
            .length("isbn", "ISBN", &self.isbn, ISBN_MIN, ISBN_MAX)
            .text("title", "Title", &self.title, TITLE_MAX);
    }

    pub fn to_input(&self, links: &AssociationIds) -> NewBook {
        NewBook {
            isbn: self.isbn.trim().to_string(),
            title: self.title.clone(),
            date_published: self.date_published,
            author_ids: links.author_ids.clone(),
            category_ids: links.category_ids.clone(),
        }
    }
}

/// Author and category ids taken from `?authId=1&authId=2&catId=3`.
///
/// Ids are de-duplicated keeping first occurrences; both lists must be
/// non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationIds {
    pub author_ids: Vec<i64>,
    pub category_ids: Vec<i64>,
}

impl AssociationIds {
    /// Parse raw query pairs, recording malformed or missing ids in `checks`
    pub fn collect(pairs: &[(String, String)], checks: &mut Checks) -> Self {
        let mut author_ids = Vec::new();
        let mut category_ids = Vec::new();

        for (key, value) in pairs {
            let (target, field) = match key.as_str() {
                AUTHOR_PARAM => (&mut author_ids, AUTHOR_PARAM),
                CATEGORY_PARAM => (&mut category_ids, CATEGORY_PARAM),
                _ => continue,
            };
            match value.trim().parse::<i64>() {
                Ok(id) => target.push(id),
                Err(_) => {
                    checks.require(false, field, format!("'{value}' is not a valid id"));
                }
            }
        }

        checks
            .require(!author_ids.is_empty(), AUTHOR_PARAM, "At least one author is required")
            .require(
                !category_ids.is_empty(),
                CATEGORY_PARAM,
                "At least one category is required",
            );

        Self {
            author_ids: distinct_ids(&author_ids),
            category_ids: distinct_ids(&category_ids),
        }
    }
}
