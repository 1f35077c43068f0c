//! Test repositories — mock `Repository` implementations for tests.

use async_trait::async_trait;
use eventhub_core::entity::{Entity, Include, Predicate};
use eventhub_core::error::DomainError;
use eventhub_core::repository::{Repository, RepositoryResult};

/// A repository that returns a failed result from every operation, carrying
/// the configured error.
#[derive(Debug, Clone)]
pub struct FailingRepository {
    error: DomainError,
}

impl FailingRepository {
    /// Fails every call with `error`.
    #[must_use]
    pub fn new(error: DomainError) -> Self {
        Self { error }
    }

    /// Fails every call with a persistence error.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(DomainError::Persistence("connection refused".into()))
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for FailingRepository {
    async fn add(&self, _entity: T) -> RepositoryResult {
        RepositoryResult::failure(self.error.clone())
    }

    async fn get_all(&self) -> RepositoryResult<Vec<T>> {
        RepositoryResult::failure(self.error.clone())
    }

    async fn get(&self, _predicate: &Predicate, _include: Include) -> RepositoryResult<T> {
        RepositoryResult::failure(self.error.clone())
    }

    async fn update(&self, _entity: &T) -> RepositoryResult {
        RepositoryResult::failure(self.error.clone())
    }

    async fn delete(&self, _entity: &T) -> RepositoryResult {
        RepositoryResult::failure(self.error.clone())
    }

    async fn already_exists(&self, _predicate: &Predicate) -> RepositoryResult {
        RepositoryResult::failure(self.error.clone())
    }
}
