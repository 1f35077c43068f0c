//! Storage context abstraction.

use async_trait::async_trait;

use crate::entity::{Entity, Include, Predicate};
use crate::error::DomainError;

/// Per-entity collection of a storage context.
///
/// Every write is a single atomic unit: it either persists completely or
/// leaves the store unchanged. Each logical request is expected to go
/// through its own handle; isolation is the engine's concern.
#[async_trait]
pub trait Store<T: Entity>: Send + Sync {
    /// Persists `entity` together with any attached graph.
    ///
    /// Returns `DomainError::Conflict` on a duplicate identity.
    async fn insert(&self, entity: &T) -> Result<(), DomainError>;

    /// Loads every row, shaped by `include`.
    async fn fetch_all(&self, include: Include) -> Result<Vec<T>, DomainError>;

    /// Loads the first row matching `predicate`, shaped by `include`.
    async fn fetch_first(
        &self,
        predicate: &Predicate,
        include: Include,
    ) -> Result<Option<T>, DomainError>;

    /// Loads the row with identity `id`, scalar fields only.
    async fn find(&self, id: &str) -> Result<Option<T>, DomainError>;

    /// Overwrites the stored row sharing `entity`'s identity. Returns the
    /// number of rows affected.
    async fn replace(&self, entity: &T) -> Result<u64, DomainError>;

    /// Removes the row with identity `id`. Returns the number of rows
    /// affected.
    async fn remove(&self, id: &str) -> Result<u64, DomainError>;

    /// Whether any row matches `predicate`.
    async fn any(&self, predicate: &Predicate) -> Result<bool, DomainError>;
}
