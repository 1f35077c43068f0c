//! Generic repository abstraction.
//!
//! `Repository<T>` is the CRUD contract every entity kind is persisted
//! through. Each operation converts storage faults into a failed
//! `RepositoryResult` instead of returning them as errors, so callers branch
//! on `is_success()` and never on `?`.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::entity::{Entity, Include, Predicate};
use crate::error::{DomainError, EXISTS};
use crate::result::OperationResult;
use crate::store::Store;

/// Result returned by repository operations.
pub type RepositoryResult<T = ()> = OperationResult<T>;

/// CRUD contract over a single entity kind.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Inserts `entity` and its attached graph in one commit. Empty
    /// identities are assigned first.
    async fn add(&self, entity: T) -> RepositoryResult;

    /// Returns every row; an empty store is a success.
    async fn get_all(&self) -> RepositoryResult<Vec<T>>;

    /// Returns the first row matching `predicate`, loaded per `include`.
    /// No match is a `NotFound` failure, never a success without payload.
    async fn get(&self, predicate: &Predicate, include: Include) -> RepositoryResult<T>;

    /// Replaces the stored row sharing `entity`'s identity.
    async fn update(&self, entity: &T) -> RepositoryResult;

    /// Removes the row sharing `entity`'s identity without reading it first.
    async fn delete(&self, entity: &T) -> RepositoryResult;

    /// Existence check with inverted polarity: succeeds when **no** row
    /// matches, fails with `"Exists"` when one does. Read it as "no conflict",
    /// not "already exists".
    async fn already_exists(&self, predicate: &Predicate) -> RepositoryResult;
}

/// Store-backed implementation of `Repository<T>`.
pub struct BaseRepository<T: Entity> {
    store: Arc<dyn Store<T>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> BaseRepository<T> {
    /// Creates a repository over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store<T>>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// The underlying storage context.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store<T>> {
        &self.store
    }
}

impl<T: Entity> Clone for BaseRepository<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.store))
    }
}

/// Converts a store outcome into a repository result, logging the failure.
pub fn settle<V>(
    operation: &'static str,
    entity: &'static str,
    outcome: Result<V, DomainError>,
) -> RepositoryResult<V> {
    if let Err(err) = &outcome {
        warn!(operation, entity, error = %err, "repository operation failed");
    }
    outcome.into()
}

fn expect_one_row(affected: u64) -> Result<(), DomainError> {
    if affected == 0 {
        Err(DomainError::not_found())
    } else {
        Ok(())
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for BaseRepository<T> {
    async fn add(&self, mut entity: T) -> RepositoryResult {
        entity.assign_identity();
        debug!(entity = T::NAME, id = entity.id(), "adding");
        let outcome = self.store.insert(&entity).await;
        if outcome.is_ok() {
            info!(entity = T::NAME, id = entity.id(), "added");
        }
        settle("add", T::NAME, outcome)
    }

    async fn get_all(&self) -> RepositoryResult<Vec<T>> {
        debug!(entity = T::NAME, "loading all");
        settle("get_all", T::NAME, self.store.fetch_all(Include::Nothing).await)
    }

    async fn get(&self, predicate: &Predicate, include: Include) -> RepositoryResult<T> {
        debug!(entity = T::NAME, ?predicate, ?include, "loading first match");
        let outcome = match predicate.validate::<T>() {
            Ok(()) => self
                .store
                .fetch_first(predicate, include)
                .await
                .and_then(|found| found.ok_or_else(DomainError::not_found)),
            Err(err) => Err(err),
        };
        settle("get", T::NAME, outcome)
    }

    async fn update(&self, entity: &T) -> RepositoryResult {
        debug!(entity = T::NAME, id = entity.id(), "updating");
        let outcome = self.store.replace(entity).await.and_then(expect_one_row);
        settle("update", T::NAME, outcome)
    }

    async fn delete(&self, entity: &T) -> RepositoryResult {
        debug!(entity = T::NAME, id = entity.id(), "deleting");
        let outcome = self.store.remove(entity.id()).await.and_then(expect_one_row);
        settle("delete", T::NAME, outcome)
    }

    async fn already_exists(&self, predicate: &Predicate) -> RepositoryResult {
        let outcome = match predicate.validate::<T>() {
            Ok(()) => self.store.any(predicate).await,
            Err(err) => Err(err),
        }
        .and_then(|found| {
            if found {
                Err(DomainError::Conflict(EXISTS.to_owned()))
            } else {
                Ok(())
            }
        });
        settle("already_exists", T::NAME, outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::entity::{Value, new_identity};

    #[derive(Debug, Clone, PartialEq)]
    struct Venue {
        id: String,
        name: String,
    }

    impl Entity for Venue {
        const NAME: &'static str = "venue";
        const FIELDS: &'static [&'static str] = &["id", "name"];

        fn id(&self) -> &str {
            &self.id
        }

        fn assign_identity(&mut self) {
            if self.id.is_empty() {
                self.id = new_identity();
            }
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(Value::from(self.id.as_str())),
                "name" => Some(Value::from(self.name.as_str())),
                _ => None,
            }
        }
    }

    /// Vec-backed store; `broken` makes every call fail.
    #[derive(Default)]
    struct VecStore {
        rows: Mutex<Vec<Venue>>,
        broken: bool,
    }

    impl VecStore {
        fn check(&self) -> Result<(), DomainError> {
            if self.broken {
                Err(DomainError::Persistence("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl Store<Venue> for VecStore {
        async fn insert(&self, entity: &Venue) -> Result<(), DomainError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|r| r.id == entity.id) {
                return Err(DomainError::Conflict("duplicate key".into()));
            }
            rows.push(entity.clone());
            Ok(())
        }

        async fn fetch_all(&self, _include: Include) -> Result<Vec<Venue>, DomainError> {
            self.check()?;
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn fetch_first(
            &self,
            predicate: &Predicate,
            _include: Include,
        ) -> Result<Option<Venue>, DomainError> {
            self.check()?;
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .find(|r| predicate.matches(*r))
                .cloned())
        }

        async fn find(&self, id: &str) -> Result<Option<Venue>, DomainError> {
            self.fetch_first(&Predicate::id(id), Include::Nothing).await
        }

        async fn replace(&self, entity: &Venue) -> Result<u64, DomainError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            match rows.iter_mut().find(|r| r.id == entity.id) {
                Some(row) => {
                    *row = entity.clone();
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        async fn remove(&self, id: &str) -> Result<u64, DomainError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != id);
            Ok((before - rows.len()) as u64)
        }

        async fn any(&self, predicate: &Predicate) -> Result<bool, DomainError> {
            self.check()?;
            Ok(self.rows.lock().unwrap().iter().any(|r| predicate.matches(r)))
        }
    }

    fn repository() -> BaseRepository<Venue> {
        BaseRepository::new(Arc::new(VecStore::default()))
    }

    fn broken_repository() -> BaseRepository<Venue> {
        BaseRepository::new(Arc::new(VecStore {
            rows: Mutex::default(),
            broken: true,
        }))
    }

    fn venue(name: &str) -> Venue {
        Venue {
            id: String::new(),
            name: name.to_owned(),
        }
    }

    #[tokio::test]
    async fn test_add_assigns_identity_and_persists() {
        // Arrange
        let repo = repository();

        // Act
        let result = repo.add(venue("Hall A")).await;

        // Assert
        assert!(result.is_success());
        let all = repo.get_all().await.into_inner().unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].id.is_empty());
    }

    #[tokio::test]
    async fn test_add_duplicate_identity_is_failure() {
        let repo = repository();
        let mut first = venue("Hall A");
        first.id = "v-1".into();
        assert!(repo.add(first.clone()).await.is_success());

        let result = repo.add(first).await;

        assert!(!result.is_success());
        assert_eq!(result.error(), Some("duplicate key"));
    }

    #[tokio::test]
    async fn test_get_all_on_empty_store_is_success() {
        let result = repository().get_all().await;

        assert!(result.is_success());
        assert!(result.result().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_without_match_is_not_found_failure() {
        let result = repository().get(&Predicate::id("missing"), Include::Nothing).await;

        assert!(!result.is_success());
        assert!(result.result().is_none());
        assert_eq!(result.error(), Some("Not Found"));
    }

    #[tokio::test]
    async fn test_get_returns_first_match() {
        let repo = repository();
        assert!(repo.add(venue("Hall A")).await.is_success());
        assert!(repo.add(venue("Hall B")).await.is_success());

        let result = repo.get(&Predicate::eq("name", "Hall B"), Include::Nothing).await;

        assert_eq!(result.result().unwrap().name, "Hall B");
    }

    #[tokio::test]
    async fn test_get_with_unknown_field_is_validation_failure() {
        let result = repository().get(&Predicate::eq("capacity", "10"), Include::Nothing).await;

        assert!(matches!(
            result.domain_error(),
            Some(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_stored_row() {
        let repo = repository();
        let mut stored = venue("Hall A");
        stored.id = "v-1".into();
        assert!(repo.add(stored.clone()).await.is_success());

        stored.name = "Hall C".into();
        let result = repo.update(&stored).await;

        assert!(result.is_success());
        let reloaded = repo.get(&Predicate::id("v-1"), Include::Nothing).await;
        assert_eq!(reloaded.result().unwrap().name, "Hall C");
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let mut ghost = venue("Ghost");
        ghost.id = "v-404".into();

        let result = repository().update(&ghost).await;

        assert_eq!(result.error(), Some("Not Found"));
    }

    #[tokio::test]
    async fn test_delete_removes_by_identity_only() {
        let repo = repository();
        let mut stored = venue("Hall A");
        stored.id = "v-1".into();
        assert!(repo.add(stored).await.is_success());

        let detached = Venue {
            id: "v-1".into(),
            name: String::new(),
        };
        let result = repo.delete(&detached).await;

        assert!(result.is_success());
        assert!(repo.get_all().await.result().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_failure() {
        let mut ghost = venue("Ghost");
        ghost.id = "v-404".into();

        let result = repository().delete(&ghost).await;

        assert!(!result.is_success());
        assert!(result.domain_error().unwrap().is_not_found());
    }

    #[tokio::test]
    async fn test_already_exists_succeeds_when_nothing_matches() {
        let result = repository().already_exists(&Predicate::eq("name", "Hall A")).await;

        assert!(result.is_success());
        assert!(result.error().is_none());
    }

    #[tokio::test]
    async fn test_already_exists_fails_with_exists_when_a_row_matches() {
        let repo = repository();
        assert!(repo.add(venue("Hall A")).await.is_success());

        let result = repo.already_exists(&Predicate::eq("name", "Hall A")).await;

        assert!(!result.is_success());
        assert_eq!(result.error(), Some("Exists"));
    }

    #[tokio::test]
    async fn test_store_faults_become_failures() {
        let repo = broken_repository();

        assert_eq!(repo.add(venue("x")).await.error(), Some("connection refused"));
        assert_eq!(repo.get_all().await.error(), Some("connection refused"));
        assert_eq!(
            repo.get(&Predicate::all(), Include::Nothing).await.error(),
            Some("connection refused")
        );
        assert_eq!(
            repo.already_exists(&Predicate::all()).await.error(),
            Some("connection refused")
        );
    }
}
