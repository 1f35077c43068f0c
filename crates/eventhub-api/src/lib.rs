//! Eventhub API — HTTP layer over the event service.

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Builds the application router without middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .nest("/api/events", routes::events::router())
        .merge(openapi::docs_router())
        .with_state(state)
}
