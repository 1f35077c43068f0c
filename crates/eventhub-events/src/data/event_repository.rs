//! Event-specific repository.
//!
//! Delegates to `BaseRepository` except for reads, which always eager-load
//! package relations, and delete, which reads the row before removing it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use eventhub_core::entity::{Include, Predicate};
use eventhub_core::error::DomainError;
use eventhub_core::repository::{BaseRepository, Repository, RepositoryResult, settle};
use eventhub_core::store::Store;

use super::entities::EventEntity;

/// Error reported when deleting an event that does not exist.
pub const EVENT_NOT_FOUND: &str = "Event not found";

/// Repository over `EventEntity` with fixed relation loading.
#[derive(Clone)]
pub struct EventRepository {
    base: BaseRepository<EventEntity>,
}

impl EventRepository {
    /// Creates a repository over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store<EventEntity>>) -> Self {
        Self {
            base: BaseRepository::new(store),
        }
    }

    fn store(&self) -> &Arc<dyn Store<EventEntity>> {
        self.base.store()
    }

    async fn fetch_then_remove(&self, id: &str) -> Result<(), DomainError> {
        let Some(existing) = self.store().find(id).await? else {
            return Err(DomainError::NotFound(EVENT_NOT_FOUND.to_owned()));
        };
        match self.store().remove(&existing.id).await? {
            0 => Err(DomainError::NotFound(EVENT_NOT_FOUND.to_owned())),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Repository<EventEntity> for EventRepository {
    async fn add(&self, entity: EventEntity) -> RepositoryResult {
        self.base.add(entity).await
    }

    /// Loads every event with its join rows, without package details.
    async fn get_all(&self) -> RepositoryResult<Vec<EventEntity>> {
        debug!("loading all events with package links");
        settle(
            "get_all",
            "event",
            self.store().fetch_all(Include::Joins).await,
        )
    }

    /// Loads the first matching event with join rows and packages. The
    /// `include` argument is ignored.
    async fn get(&self, predicate: &Predicate, _include: Include) -> RepositoryResult<EventEntity> {
        self.base.get(predicate, Include::JoinsAndTargets).await
    }

    async fn update(&self, entity: &EventEntity) -> RepositoryResult {
        self.base.update(entity).await
    }

    /// Re-reads the event by identity and removes the fresh row; the
    /// caller's instance is only used for its id.
    async fn delete(&self, entity: &EventEntity) -> RepositoryResult {
        debug!(id = %entity.id, "deleting event");
        let outcome = self.fetch_then_remove(&entity.id).await;
        if outcome.is_ok() {
            info!(id = %entity.id, "event deleted");
        }
        settle("delete", "event", outcome)
    }

    async fn already_exists(&self, predicate: &Predicate) -> RepositoryResult {
        self.base.already_exists(predicate).await
    }
}
