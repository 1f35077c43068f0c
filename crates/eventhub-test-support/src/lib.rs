//! Shared test doubles and utilities for the Eventhub service.

mod repository;
mod store;

pub use repository::FailingRepository;
pub use store::{FailingStore, RecordingStore};
