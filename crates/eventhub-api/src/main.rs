//! Eventhub API server entry point.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use eventhub_api::config::{AppConfig, StoreBackend};
use eventhub_api::error::AppError;
use eventhub_api::state::AppState;
use eventhub_core::store::Store;
use eventhub_events::application::event_service::EventService;
use eventhub_events::data::entities::EventEntity;
use eventhub_events::data::memory::MemoryContext;
use eventhub_store::pg_context::PgContext;

async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store<EventEntity>>, AppError> {
    match config.store {
        StoreBackend::Memory => {
            tracing::warn!("using in-process store; data is lost on exit");
            Ok(Arc::new(MemoryContext::new()))
        }
        StoreBackend::Postgres => {
            let database_url = config.database_url.as_deref().ok_or_else(|| {
                AppError::Config("DATABASE_URL environment variable must be set".to_owned())
            })?;
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(database_url)
                .await?;
            sqlx::migrate!("../../migrations").run(&pool).await?;
            tracing::info!("database migrations applied");
            Ok(Arc::new(PgContext::new(pool)))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Eventhub API server");

    let config = AppConfig::from_env()?;
    let store = open_store(&config).await?;
    let app_state = AppState::new(EventService::with_store(store));

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = eventhub_api::build_router(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
