//! HTTP API for the hospital wayfinding backend
//!
//! Each `*_endpoints` module owns one area of the API and contributes a
//! `Router` via `routes(state)`; [`create_router`] merges them and adds the
//! shared layers (error envelope, request tracing, CORS).
//!
//! All errors leave the server as
//! `{"error": {"message", "status", "code", "details"?, "path"?, "method"?}}`.

use axum::{
    http::{header, HeaderValue, Method},
    middleware, Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use wayfinder_core::db::{DatabaseService, LibsqlStore, MapStore, RecordStore};
use wayfinder_core::services::{MapService, RequestService, ScoreService, StaffService};

pub mod config;
mod csv_endpoints;
mod http_error;
mod map_endpoints;
mod path_endpoints;
mod request_endpoints;
mod score_endpoints;

pub use config::{ConfigError, ServerConfig};
pub use http_error::HttpError;

#[derive(Clone)]
pub struct AppState {
    pub map: Arc<MapService>,
    pub staff: Arc<StaffService>,
    pub requests: Arc<RequestService>,
    pub scores: Arc<ScoreService>,
}

impl AppState {
    pub fn new(map_store: Arc<dyn MapStore>, record_store: Arc<dyn RecordStore>) -> Self {
        Self {
            map: Arc::new(MapService::new(map_store.clone())),
            staff: Arc::new(StaffService::new(record_store.clone())),
            requests: Arc::new(RequestService::new(record_store.clone(), map_store)),
            scores: Arc::new(ScoreService::new(record_store)),
        }
    }

    /// Open (or create) the database at `db_path` and wire every service to it
    pub async fn from_database(db_path: PathBuf) -> anyhow::Result<Self> {
        let db = Arc::new(DatabaseService::new(db_path).await?);
        let store = Arc::new(LibsqlStore::new(db));
        Ok(Self::new(store.clone(), store))
    }
}

pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .merge(path_endpoints::routes(state.clone()))
        .merge(map_endpoints::routes(state.clone()))
        .merge(csv_endpoints::routes(state.clone()))
        .merge(request_endpoints::routes(state.clone()))
        .merge(score_endpoints::routes(state))
        .fallback(http_error::not_found)
        .layer(middleware::from_fn(http_error::error_envelope))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers(Any)
        .allow_credentials(false)
}

/// Start the HTTP server and run until Ctrl-C
///
/// # Errors
///
/// Returns error if the database cannot be opened or the address cannot be bound.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::from_database(config.db_path.clone()).await?;
    let app = create_router(state, &config.cors_origins);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Wayfinder API listening on http://{}", addr);
    tracing::info!("Database: {}", config.db_path.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
