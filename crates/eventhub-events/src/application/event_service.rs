//! Event domain service.
//!
//! Creates events with their default packages, reads them back in the
//! domain shape, and deletes them. Every operation returns an `EventResult`;
//! repository failures are carried through, with not-found reads normalized
//! to `"Event Not found"`.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use eventhub_core::entity::{Include, Predicate};
use eventhub_core::error::DomainError;
use eventhub_core::repository::Repository;
use eventhub_core::result::OperationResult;
use eventhub_core::store::Store;

use crate::data::entities::{EventEntity, EventPackageEntity, PackageEntity};
use crate::data::event_repository::EventRepository;
use crate::domain::models::{CreateEventRequest, Event};

/// Result returned by the event service.
pub type EventResult<T = ()> = OperationResult<T>;

/// Error reported when a requested event cannot be read.
pub const EVENT_LOOKUP_FAILED: &str = "Event Not found";

/// Currency of the default packages.
pub const DEFAULT_CURRENCY: &str = "SEK";

/// Title and whole-unit price of every package attached at creation.
pub const DEFAULT_PACKAGES: [(&str, i64); 2] = [("Standard", 199), ("VIP", 499)];

/// Builds one join row per default package, each carrying a new package.
#[must_use]
pub fn default_packages() -> Vec<EventPackageEntity> {
    DEFAULT_PACKAGES
        .iter()
        .map(|&(title, price)| {
            EventPackageEntity::for_new_package(PackageEntity {
                title: title.to_owned(),
                price: Decimal::new(price, 0),
                currency: DEFAULT_CURRENCY.to_owned(),
                ..PackageEntity::default()
            })
        })
        .collect()
}

/// Orchestrates event creation, retrieval and deletion.
#[derive(Clone)]
pub struct EventService {
    repository: Arc<dyn Repository<EventEntity>>,
}

impl EventService {
    /// Creates a service over `repository`.
    #[must_use]
    pub fn new(repository: Arc<dyn Repository<EventEntity>>) -> Self {
        Self { repository }
    }

    /// Creates a service backed by an `EventRepository` over `store`.
    #[must_use]
    pub fn with_store(store: Arc<dyn Store<EventEntity>>) -> Self {
        Self::new(Arc::new(EventRepository::new(store)))
    }

    /// Creates an event from `request` with the default packages attached,
    /// persisted in a single add.
    pub async fn create_event(&self, request: CreateEventRequest) -> EventResult {
        let entity = EventEntity {
            id: String::new(),
            image: request.image,
            title: request.title,
            description: request.description,
            location: request.location,
            event_date: request.event_date,
            packages: default_packages(),
        };
        debug!(title = ?entity.title, "creating event");

        let result = self.repository.add(entity).await;
        match result.error() {
            None => info!("event created"),
            Some(error) => warn!(error, "event creation failed"),
        }
        result
    }

    /// Returns every event as a summary; packages are left unset.
    pub async fn get_all_events(&self) -> EventResult<Vec<Event>> {
        self.repository
            .get_all()
            .await
            .map(|entities| entities.iter().map(Event::summary).collect())
    }

    /// Returns the event with identity `id` including its packages.
    pub async fn get_event(&self, id: &str) -> EventResult<Event> {
        let result = self
            .repository
            .get(&Predicate::id(id), Include::JoinsAndTargets)
            .await;
        match result.into_inner() {
            Ok(entity) => EventResult::ok(Event::detailed(&entity)),
            Err(err) => {
                debug!(id, error = %err, "event lookup failed");
                EventResult::failure(DomainError::NotFound(EVENT_LOOKUP_FAILED.to_owned()))
            }
        }
    }

    /// Deletes the event with identity `id`, passing the repository outcome
    /// through unchanged.
    pub async fn delete_event(&self, id: &str) -> EventResult {
        let result = self.repository.delete(&EventEntity::with_id(id)).await;
        if result.is_success() {
            info!(id, "event deleted");
        }
        result
    }
}
