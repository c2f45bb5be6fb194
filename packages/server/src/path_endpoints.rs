//! Route finder and liveness endpoints
//!
//! - `GET /healthcheck` - 200 with an empty body
//! - `GET /api/path?start=&end=[&strategy=dijkstra|astar]` - shortest path

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::{AppState, HttpError};
use wayfinder_core::routing::SearchStrategy;
use wayfinder_core::services::PathResult;

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub strategy: SearchStrategy,
}

async fn healthcheck() -> StatusCode {
    StatusCode::OK
}

async fn find_path(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<PathResult>, HttpError> {
    let result = state
        .map
        .find_route(&query.start, &query.end, query.strategy)
        .await?;
    Ok(Json(result))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/api/path", get(find_path))
        .with_state(state)
}
