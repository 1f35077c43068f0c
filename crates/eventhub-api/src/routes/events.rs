//! Routes for the Event bounded context.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use serde::Serialize;
use tracing::{info, instrument};

use eventhub_core::error::DomainError;
use eventhub_core::result::OperationResult;
use eventhub_events::application::event_service::EventResult;
use eventhub_events::domain::models::{CreateEventRequest, Event};

use crate::error::{ApiError, ErrorBody};
use crate::openapi::{AckResult, EventDetailResult, EventListResult};
use crate::state::AppState;

const MAX_TITLE_LEN: usize = 200;
const MAX_REFERENCE_LEN: usize = 500;

/// Turns a failed result into its HTTP error; successful results are
/// returned as the JSON body unchanged.
fn respond<T: Serialize>(result: OperationResult<T>) -> Result<Json<OperationResult<T>>, ApiError> {
    if let Some(err) = result.domain_error().cloned() {
        return Err(ApiError(err));
    }
    Ok(Json(result))
}

fn validate_create(request: &CreateEventRequest) -> Result<(), DomainError> {
    if let Some(title) = &request.title {
        if title.trim().is_empty() {
            return Err(DomainError::Validation("title must not be blank".to_owned()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(DomainError::Validation(format!(
                "title must be at most {MAX_TITLE_LEN} characters"
            )));
        }
    }
    for (field, value) in [("image", &request.image), ("location", &request.location)] {
        if value
            .as_ref()
            .is_some_and(|v| v.chars().count() > MAX_REFERENCE_LEN)
        {
            return Err(DomainError::Validation(format!(
                "{field} must be at most {MAX_REFERENCE_LEN} characters"
            )));
        }
    }
    Ok(())
}

/// GET /
#[utoipa::path(
    get,
    path = "/api/events",
    responses(
        (status = 200, description = "All events without package detail", body = EventListResult),
        (status = 500, description = "Storage failure", body = ErrorBody)
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub(crate) async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<EventResult<Vec<Event>>>, ApiError> {
    respond(state.events.get_all_events().await)
}

/// GET /{id}
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event identity")),
    responses(
        (status = 200, description = "The event with its packages", body = EventDetailResult),
        (status = 404, description = "Event Not found", body = ErrorBody)
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub(crate) async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventResult<Event>>, ApiError> {
    respond(state.events.get_event(&id).await)
}

/// POST /
#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventRequest,
    responses(
        (status = 200, description = "Event created with the default packages", body = AckResult),
        (status = 400, description = "Request failed validation", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    ),
    tag = "events"
)]
#[instrument(skip(state, request), fields(title = ?request.title))]
pub(crate) async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<Json<EventResult>, ApiError> {
    validate_create(&request)?;
    info!("handling create_event");
    respond(state.events.create_event(request).await)
}

/// DELETE /{id}
#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Event identity")),
    responses(
        (status = 200, description = "Event deleted", body = AckResult),
        (status = 404, description = "Event not found", body = ErrorBody)
    ),
    tag = "events"
)]
#[instrument(skip(state))]
pub(crate) async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventResult>, ApiError> {
    respond(state.events.delete_event(&id).await)
}

/// Returns the router for the event context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/{id}", get(get_event).delete(delete_event))
}
