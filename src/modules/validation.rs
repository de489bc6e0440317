//! Request validation shared by every resource.
//!
//! Checks run in stages. Each stage collects [`Reason`]s into [`Checks`] and
//! ends with [`Checks::finish`], which short-circuits with a [`Rejection`] of
//! the stage's kind when anything was collected:
//!
//! | Stage | Rejection | Status |
//! |-------|-----------|--------|
//! | payload shape, path/body id match | `Malformed` | 400 |
//! | update target and referenced rows exist | `Missing` | 404 |
//! | name / ISBN uniqueness | `Duplicate` | 422 |
//! | dependent rows block a delete | `InUse` | 409 |

use bookapi_db::Repository;
use bookapi_http::AppError;
use serde::Serialize;

/// One structured validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reason {
    pub field: &'static str,
    pub message: String,
}

impl Reason {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Why a request was refused, with every reason collected by the failing stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Malformed(Vec<Reason>),
    Missing(Vec<Reason>),
    Duplicate(Vec<Reason>),
    InUse(Vec<Reason>),
}

impl Rejection {
    pub fn reasons(&self) -> &[Reason] {
        match self {
            Rejection::Malformed(reasons)
            | Rejection::Missing(reasons)
            | Rejection::Duplicate(reasons)
            | Rejection::InUse(reasons) => reasons,
        }
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        let details = rejection
            .reasons()
            .iter()
            .map(|reason| serde_json::json!(reason))
            .collect::<Vec<_>>();
        let summary = rejection
            .reasons()
            .iter()
            .map(|reason| reason.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        match rejection {
            Rejection::Malformed(_) => AppError::bad_request(summary).with_details(details),
            Rejection::Missing(_) => AppError::not_found(summary).with_details(details),
            Rejection::Duplicate(_) => AppError::validation(details, summary),
            Rejection::InUse(_) => AppError::conflict(details, summary),
        }
    }
}

/// Accumulator for one validation stage
#[derive(Debug, Default)]
pub struct Checks {
    reasons: Vec<Reason>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` unless `ok` holds
    pub fn require(&mut self, ok: bool, field: &'static str, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.reasons.push(Reason::new(field, message));
        }
        self
    }

    /// Non-empty after trimming, at most `max` characters
    pub fn text(&mut self, field: &'static str, label: &str, value: &str, max: usize) -> &mut Self {
        if value.trim().is_empty() {
            self.reasons.push(Reason::new(field, format!("{label} is required")));
        } else if value.chars().count() > max {
            self.reasons.push(Reason::new(
                field,
                format!("{label} cannot be more than {max} characters"),
            ));
        }
        self
    }

    /// Between `min` and `max` characters inclusive
    pub fn length(
        &mut self,
        field: &'static str,
        label: &str,
        value: &str,
        min: usize,
        max: usize,
    ) -> &mut Self {
        let len = value.chars().count();
        if !(min..=max).contains(&len) {
            self.reasons.push(Reason::new(
                field,
                format!("{label} must be between {min} and {max} characters"),
            ));
        }
        self
    }

    /// Integer within `min..=max`
    pub fn range(&mut self, field: &'static str, label: &str, value: i64, min: i64, max: i64) -> &mut Self {
        if !(min..=max).contains(&value) {
            self.reasons.push(Reason::new(
                field,
                format!("{label} must be between {min} and {max}"),
            ));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    /// End the stage: `Ok` when nothing was collected, otherwise `kind(reasons)`
    pub fn finish(self, kind: fn(Vec<Reason>) -> Rejection) -> Result<(), Rejection> {
        if self.reasons.is_empty() {
            Ok(())
        } else {
            Err(kind(self.reasons))
        }
    }
}

/// Update bodies must carry the id of the resource they replace
pub fn ensure_same_id(path_id: i64, body_id: i64) -> Result<(), Rejection> {
    let mut checks = Checks::new();
    checks.require(
        path_id == body_id,
        "id",
        format!("Path id {path_id} does not match body id {body_id}"),
    );
    checks.finish(Rejection::Malformed)
}

/// Existence guard in front of id-keyed reads and deletes
pub async fn ensure_exists<R>(repo: &R, id: i64, label: &str) -> Result<(), AppError>
where
    R: Repository + Sync,
{
    if repo.exists(id).await? {
        Ok(())
    } else {
        Err(AppError::not_found(format!("{label} {id} not found")))
    }
}
