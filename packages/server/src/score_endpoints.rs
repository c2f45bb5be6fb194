//! Minigame leaderboard
//!
//! - `POST /api/high-scores` - `{"initials": "ABC", "time": 93}`
//! - `GET /api/high-scores/all-time` - all-time top five
//! - `GET /api/high-scores/today` - top five since midnight UTC

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};

use crate::{AppState, HttpError};
use wayfinder_core::models::{HighScore, NewHighScore};

async fn submit_score(
    State(state): State<AppState>,
    Json(score): Json<NewHighScore>,
) -> Result<(StatusCode, Json<HighScore>), HttpError> {
    let stored = state.scores.submit(score).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

async fn all_time(State(state): State<AppState>) -> Result<Json<Vec<HighScore>>, HttpError> {
    Ok(Json(state.scores.all_time().await?))
}

async fn today(State(state): State<AppState>) -> Result<Json<Vec<HighScore>>, HttpError> {
    Ok(Json(state.scores.today().await?))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/high-scores", post(submit_score))
        .route("/api/high-scores/all-time", get(all_time))
        .route("/api/high-scores/today", get(today))
        .with_state(state)
}
