//! CSV Import/Export Endpoints
//!
//! Imports take `{"csvString": "..."}` and bulk replace the table; exports
//! return `text/csv` attachments.
//!
//! - `POST /api/node-populate`, `GET /api/download-node-csv`
//! - `POST /api/edge-populate`, `GET /api/download-edge-csv`
//! - `POST /api/employee-populate`, `GET /api/download-employee-csv`
//! - `GET /api/employee-email-fetch` - employee emails for assignment lists

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::{AppState, HttpError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvUpload {
    pub csv_string: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: u64,
}

fn csv_attachment(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

async fn populate_nodes(
    State(state): State<AppState>,
    Json(upload): Json<CsvUpload>,
) -> Result<Json<ImportSummary>, HttpError> {
    let edit = state.map.import_nodes_csv(&upload.csv_string).await?;
    Ok(Json(ImportSummary {
        imported: edit.nodes,
    }))
}

async fn populate_edges(
    State(state): State<AppState>,
    Json(upload): Json<CsvUpload>,
) -> Result<Json<ImportSummary>, HttpError> {
    let edit = state.map.import_edges_csv(&upload.csv_string).await?;
    Ok(Json(ImportSummary {
        imported: edit.edges,
    }))
}

async fn populate_employees(
    State(state): State<AppState>,
    Json(upload): Json<CsvUpload>,
) -> Result<Json<ImportSummary>, HttpError> {
    let count = state.staff.import_employees_csv(&upload.csv_string).await?;
    Ok(Json(ImportSummary {
        imported: count as u64,
    }))
}

async fn download_nodes(State(state): State<AppState>) -> Result<Response, HttpError> {
    Ok(csv_attachment("nodes.csv", state.map.export_nodes_csv().await?))
}

async fn download_edges(State(state): State<AppState>) -> Result<Response, HttpError> {
    Ok(csv_attachment("edges.csv", state.map.export_edges_csv().await?))
}

async fn download_employees(State(state): State<AppState>) -> Result<Response, HttpError> {
    Ok(csv_attachment(
        "employees.csv",
        state.staff.export_employees_csv().await?,
    ))
}

async fn employee_emails(State(state): State<AppState>) -> Result<Json<Vec<String>>, HttpError> {
    Ok(Json(state.staff.employee_emails().await?))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/node-populate", post(populate_nodes))
        .route("/api/edge-populate", post(populate_edges))
        .route("/api/employee-populate", post(populate_employees))
        .route("/api/download-node-csv", get(download_nodes))
        .route("/api/download-edge-csv", get(download_edges))
        .route("/api/download-employee-csv", get(download_employees))
        .route("/api/employee-email-fetch", get(employee_emails))
        .with_state(state)
}
