//! Shared application state.

use eventhub_events::application::event_service::EventService;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Event domain service.
    pub events: EventService,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(events: EventService) -> Self {
        Self { events }
    }
}
