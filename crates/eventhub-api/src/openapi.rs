//! OpenAPI document and Swagger UI for the HTTP API.

use axum::Router;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use eventhub_events::domain::models::{CreateEventRequest, Event, Package};

use crate::error::ErrorBody;
use crate::routes::health::HealthResponse;
use crate::state::AppState;

/// Path of the generated OpenAPI document.
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";

/// Successful `get_all_events` body.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResult {
    pub success: bool,
    pub error: Option<String>,
    /// Event summaries; `packages` is never present.
    pub result: Vec<Event>,
}

/// Successful `get_event` body.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventDetailResult {
    pub success: bool,
    pub error: Option<String>,
    pub result: Event,
}

/// Successful body of operations without a payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct AckResult {
    pub success: bool,
    pub error: Option<String>,
    /// Always `null`.
    #[schema(value_type = Option<Object>)]
    pub result: Option<()>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::events::list_events,
        crate::routes::events::get_event,
        crate::routes::events::create_event,
        crate::routes::events::delete_event,
    ),
    components(schemas(
        Event,
        Package,
        CreateEventRequest,
        ErrorBody,
        HealthResponse,
        EventListResult,
        EventDetailResult,
        AckResult,
    )),
    tags(
        (name = "events", description = "Events and their ticket packages"),
        (name = "health", description = "Liveness"),
    ),
    info(title = "Eventhub API", description = "Create, read and delete events.")
)]
pub struct ApiDoc;

/// Swagger UI at `/docs`, backed by the document at [`OPENAPI_JSON`].
pub fn docs_router() -> Router<AppState> {
    Router::new().merge(SwaggerUi::new("/docs").url(OPENAPI_JSON, ApiDoc::openapi()))
}
