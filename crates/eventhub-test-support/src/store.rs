//! Test stores — mock `Store` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use eventhub_core::entity::{Entity, Include, Predicate};
use eventhub_core::error::DomainError;
use eventhub_core::store::Store;

/// A store that records every inserted entity and serves reads from the
/// recorded rows. Relation loading is not modelled: rows come back exactly
/// as they were inserted.
#[derive(Debug)]
pub struct RecordingStore<T> {
    inserted: Mutex<Vec<T>>,
}

impl<T> Default for RecordingStore<T> {
    fn default() -> Self {
        Self {
            inserted: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone> RecordingStore<T> {
    /// Creates an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every entity passed to `insert`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn inserted(&self) -> Vec<T> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl<T: Entity> Store<T> for RecordingStore<T> {
    async fn insert(&self, entity: &T) -> Result<(), DomainError> {
        self.inserted.lock().unwrap().push(entity.clone());
        Ok(())
    }

    async fn fetch_all(&self, _include: Include) -> Result<Vec<T>, DomainError> {
        Ok(self.inserted())
    }

    async fn fetch_first(
        &self,
        predicate: &Predicate,
        _include: Include,
    ) -> Result<Option<T>, DomainError> {
        Ok(self.inserted().into_iter().find(|e| predicate.matches(e)))
    }

    async fn find(&self, id: &str) -> Result<Option<T>, DomainError> {
        Ok(self.inserted().into_iter().find(|e| e.id() == id))
    }

    async fn replace(&self, entity: &T) -> Result<u64, DomainError> {
        let mut rows = self.inserted.lock().unwrap();
        match rows.iter_mut().find(|e| e.id() == entity.id()) {
            Some(row) => {
                *row = entity.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn remove(&self, id: &str) -> Result<u64, DomainError> {
        let mut rows = self.inserted.lock().unwrap();
        let before = rows.len();
        rows.retain(|e| e.id() != id);
        Ok(u64::from(before != rows.len()))
    }

    async fn any(&self, predicate: &Predicate) -> Result<bool, DomainError> {
        Ok(self.inserted().iter().any(|e| predicate.matches(e)))
    }
}

/// A store that fails every call with a persistence error. Useful for
/// testing fault-conversion paths.
#[derive(Debug)]
pub struct FailingStore;

fn refused() -> DomainError {
    DomainError::Persistence("connection refused".into())
}

#[async_trait]
impl<T: Entity> Store<T> for FailingStore {
    async fn insert(&self, _entity: &T) -> Result<(), DomainError> {
        Err(refused())
    }

    async fn fetch_all(&self, _include: Include) -> Result<Vec<T>, DomainError> {
        Err(refused())
    }

    async fn fetch_first(
        &self,
        _predicate: &Predicate,
        _include: Include,
    ) -> Result<Option<T>, DomainError> {
        Err(refused())
    }

    async fn find(&self, _id: &str) -> Result<Option<T>, DomainError> {
        Err(refused())
    }

    async fn replace(&self, _entity: &T) -> Result<u64, DomainError> {
        Err(refused())
    }

    async fn remove(&self, _id: &str) -> Result<u64, DomainError> {
        Err(refused())
    }

    async fn any(&self, _predicate: &Predicate) -> Result<bool, DomainError> {
        Err(refused())
    }
}
