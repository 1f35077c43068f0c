//! In-process storage context.
//!
//! Holds the three relations in memory with the same key and cascade rules
//! as the PostgreSQL schema: primary keys are unique, join rows must point at
//! an existing event and package, and removing an event or a package removes
//! the join rows that reference it. Every write validates first and mutates
//! second, so a rejected write leaves the tables untouched.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use eventhub_core::entity::{Include, Predicate};
use eventhub_core::error::DomainError;
use eventhub_core::store::Store;

use super::entities::{EventEntity, EventPackageEntity, PackageEntity};

#[derive(Debug, Default)]
struct Tables {
    events: Vec<EventEntity>,
    packages: Vec<PackageEntity>,
    event_packages: Vec<EventPackageEntity>,
}

impl Tables {
    fn has_event(&self, id: &str) -> bool {
        self.events.iter().any(|e| e.id == id)
    }

    fn has_package(&self, id: &str) -> bool {
        self.packages.iter().any(|p| p.id == id)
    }

    fn has_join(&self, id: &str) -> bool {
        self.event_packages.iter().any(|j| j.id == id)
    }

    fn package(&self, id: &str) -> Option<&PackageEntity> {
        self.packages.iter().find(|p| p.id == id)
    }

    /// Join rows of `event_id`, with their packages when `include` asks.
    fn joins_of(&self, event_id: &str, include: Include) -> Vec<EventPackageEntity> {
        self.event_packages
            .iter()
            .filter(|j| j.event_id == event_id)
            .map(|j| EventPackageEntity {
                package: if include.targets() {
                    self.package(&j.package_id).cloned()
                } else {
                    None
                },
                ..j.clone()
            })
            .collect()
    }

    fn shape(&self, event: &EventEntity, include: Include) -> EventEntity {
        EventEntity {
            packages: if include.joins() {
                self.joins_of(&event.id, include)
            } else {
                Vec::new()
            },
            ..event.clone()
        }
    }

    fn with_package(&self, join: &EventPackageEntity, include: Include) -> EventPackageEntity {
        EventPackageEntity {
            package: if include.joins() {
                self.package(&join.package_id).cloned()
            } else {
                None
            },
            ..join.clone()
        }
    }

    /// Checks a join row (and the package it carries, if any) can be
    /// inserted. `pending_*` are ids inserted earlier in the same write.
    fn check_join(
        &self,
        join: &EventPackageEntity,
        event_exists: bool,
        pending_joins: &[&str],
        pending_packages: &[&str],
    ) -> Result<(), DomainError> {
        if self.has_join(&join.id) || pending_joins.contains(&join.id.as_str()) {
            return Err(duplicate("event_package", &join.id));
        }
        if !event_exists {
            return Err(dangling("event", &join.event_id));
        }
        match &join.package {
            Some(package) => {
                if self.has_package(&package.id)
                    || pending_packages.contains(&package.id.as_str())
                {
                    return Err(duplicate("package", &package.id));
                }
                if package.id != join.package_id {
                    return Err(dangling("package", &join.package_id));
                }
            }
            None => {
                if !self.has_package(&join.package_id)
                    && !pending_packages.contains(&join.package_id.as_str())
                {
                    return Err(dangling("package", &join.package_id));
                }
            }
        }
        Ok(())
    }

    fn push_join(&mut self, join: &EventPackageEntity) {
        if let Some(package) = &join.package {
            self.packages.push(package.clone());
        }
        self.event_packages.push(EventPackageEntity {
            package: None,
            ..join.clone()
        });
    }
}

fn duplicate(kind: &str, id: &str) -> DomainError {
    DomainError::Conflict(format!("duplicate {kind} id: {id}"))
}

fn dangling(kind: &str, id: &str) -> DomainError {
    DomainError::Persistence(format!("foreign key violation: {kind} {id} does not exist"))
}

fn count(removed: usize) -> u64 {
    u64::try_from(removed).unwrap_or(u64::MAX)
}

/// Mutex-guarded in-memory storage context for all three entity kinds.
#[derive(Debug, Default)]
pub struct MemoryContext {
    tables: Mutex<Tables>,
}

impl MemoryContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, DomainError> {
        self.tables
            .lock()
            .map_err(|e| DomainError::Persistence(format!("storage lock poisoned: {e}")))
    }
}

#[async_trait]
impl Store<EventEntity> for MemoryContext {
    async fn insert(&self, entity: &EventEntity) -> Result<(), DomainError> {
        let mut tables = self.tables()?;
        if tables.has_event(&entity.id) {
            return Err(duplicate("event", &entity.id));
        }
        let mut pending_joins = Vec::new();
        let mut pending_packages = Vec::new();
        for join in &entity.packages {
            if join.event_id != entity.id {
                return Err(dangling("event", &join.event_id));
            }
            tables.check_join(join, true, &pending_joins, &pending_packages)?;
            pending_joins.push(join.id.as_str());
            if let Some(package) = &join.package {
                pending_packages.push(package.id.as_str());
            }
        }

        tables.events.push(entity.scalars());
        for join in &entity.packages {
            tables.push_join(join);
        }
        Ok(())
    }

    async fn fetch_all(&self, include: Include) -> Result<Vec<EventEntity>, DomainError> {
        let tables = self.tables()?;
        Ok(tables
            .events
            .iter()
            .map(|e| tables.shape(e, include))
            .collect())
    }

    async fn fetch_first(
        &self,
        predicate: &Predicate,
        include: Include,
    ) -> Result<Option<EventEntity>, DomainError> {
        let tables = self.tables()?;
        Ok(tables
            .events
            .iter()
            .find(|e| predicate.matches(*e))
            .map(|e| tables.shape(e, include)))
    }

    async fn find(&self, id: &str) -> Result<Option<EventEntity>, DomainError> {
        let tables = self.tables()?;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    async fn replace(&self, entity: &EventEntity) -> Result<u64, DomainError> {
        let mut tables = self.tables()?;
        match tables.events.iter_mut().find(|e| e.id == entity.id) {
            Some(row) => {
                *row = entity.scalars();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn remove(&self, id: &str) -> Result<u64, DomainError> {
        let mut tables = self.tables()?;
        let before = tables.events.len();
        tables.events.retain(|e| e.id != id);
        let removed = before - tables.events.len();
        if removed > 0 {
            tables.event_packages.retain(|j| j.event_id != id);
        }
        Ok(count(removed))
    }

    async fn any(&self, predicate: &Predicate) -> Result<bool, DomainError> {
        let tables = self.tables()?;
        Ok(tables.events.iter().any(|e| predicate.matches(e)))
    }
}

#[async_trait]
impl Store<PackageEntity> for MemoryContext {
    async fn insert(&self, entity: &PackageEntity) -> Result<(), DomainError> {
        let mut tables = self.tables()?;
        if tables.has_package(&entity.id) {
            return Err(duplicate("package", &entity.id));
        }
        tables.packages.push(entity.clone());
        Ok(())
    }

    async fn fetch_all(&self, _include: Include) -> Result<Vec<PackageEntity>, DomainError> {
        Ok(self.tables()?.packages.clone())
    }

    async fn fetch_first(
        &self,
        predicate: &Predicate,
        _include: Include,
    ) -> Result<Option<PackageEntity>, DomainError> {
        let tables = self.tables()?;
        Ok(tables.packages.iter().find(|p| predicate.matches(*p)).cloned())
    }

    async fn find(&self, id: &str) -> Result<Option<PackageEntity>, DomainError> {
        Ok(self.tables()?.package(id).cloned())
    }

    async fn replace(&self, entity: &PackageEntity) -> Result<u64, DomainError> {
        let mut tables = self.tables()?;
        match tables.packages.iter_mut().find(|p| p.id == entity.id) {
            Some(row) => {
                *row = entity.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn remove(&self, id: &str) -> Result<u64, DomainError> {
        let mut tables = self.tables()?;
        let before = tables.packages.len();
        tables.packages.retain(|p| p.id != id);
        let removed = before - tables.packages.len();
        if removed > 0 {
            tables.event_packages.retain(|j| j.package_id != id);
        }
        Ok(count(removed))
    }

    async fn any(&self, predicate: &Predicate) -> Result<bool, DomainError> {
        Ok(self.tables()?.packages.iter().any(|p| predicate.matches(p)))
    }
}

#[async_trait]
impl Store<EventPackageEntity> for MemoryContext {
    async fn insert(&self, entity: &EventPackageEntity) -> Result<(), DomainError> {
        let mut tables = self.tables()?;
        let event_exists = tables.has_event(&entity.event_id);
        tables.check_join(entity, event_exists, &[], &[])?;
        tables.push_join(entity);
        Ok(())
    }

    async fn fetch_all(&self, include: Include) -> Result<Vec<EventPackageEntity>, DomainError> {
        let tables = self.tables()?;
        Ok(tables
            .event_packages
            .iter()
            .map(|j| tables.with_package(j, include))
            .collect())
    }

    async fn fetch_first(
        &self,
        predicate: &Predicate,
        include: Include,
    ) -> Result<Option<EventPackageEntity>, DomainError> {
        let tables = self.tables()?;
        Ok(tables
            .event_packages
            .iter()
            .find(|j| predicate.matches(*j))
            .map(|j| tables.with_package(j, include)))
    }

    async fn find(&self, id: &str) -> Result<Option<EventPackageEntity>, DomainError> {
        let tables = self.tables()?;
        Ok(tables.event_packages.iter().find(|j| j.id == id).cloned())
    }

    async fn replace(&self, entity: &EventPackageEntity) -> Result<u64, DomainError> {
        let mut tables = self.tables()?;
        if !tables.has_join(&entity.id) {
            return Ok(0);
        }
        if !tables.has_event(&entity.event_id) {
            return Err(dangling("event", &entity.event_id));
        }
        if !tables.has_package(&entity.package_id) {
            return Err(dangling("package", &entity.package_id));
        }
        if let Some(row) = tables.event_packages.iter_mut().find(|j| j.id == entity.id) {
            *row = EventPackageEntity {
                package: None,
                ..entity.clone()
            };
        }
        Ok(1)
    }

    async fn remove(&self, id: &str) -> Result<u64, DomainError> {
        let mut tables = self.tables()?;
        let before = tables.event_packages.len();
        tables.event_packages.retain(|j| j.id != id);
        Ok(count(before - tables.event_packages.len()))
    }

    async fn any(&self, predicate: &Predicate) -> Result<bool, DomainError> {
        Ok(self
            .tables()?
            .event_packages
            .iter()
            .any(|j| predicate.matches(j)))
    }
}
