//! Base repository trait for catalog tables.

use crate::error::Result;

/// Common contract of every catalog repository.
///
/// A repository is the data access layer for one table. Each resource adds its
/// own relationship accessors (joins through link tables or foreign keys) as
/// inherent methods next to its implementation of this trait.
#[async_trait::async_trait]
pub trait Repository {
    /// The stored row, including its surrogate id
    type Entity: Send;

    /// The fields written on create and update
    type Input: Send + Sync;

    /// Existence probe, used as a guard before every id-keyed operation
    async fn exists(&self, id: i64) -> Result<bool>;

    /// Point lookup; a missing row is [`crate::DbError::NotFound`]
    async fn get(&self, id: i64) -> Result<Self::Entity>;

    /// Full scan ordered by the entity's display key
    async fn list(&self) -> Result<Vec<Self::Entity>>;

    /// Insert and return the stored row with its assigned id
    async fn create(&self, input: &Self::Input) -> Result<Self::Entity>;

    /// Replace every scalar field of an existing row
    async fn update(&self, id: i64, input: &Self::Input) -> Result<Self::Entity>;

    /// Delete by id, returning whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;
}
