//! Service Request Endpoints
//!
//! Each request type gets a `GET`/`POST` pair under its own path; the
//! shared `/api/service-request` routes cover listing across types and
//! staff updates.
//!
//! - `GET|POST /api/flower-service-request`
//! - `GET|POST /api/gift-service-request`
//! - `GET|POST /api/medical-device-service-request`
//! - `GET|POST /api/medicine-delivery-service-request`
//! - `GET|POST /api/religious-service-request`
//! - `GET|POST /api/room-scheduling-request`
//! - `GET /api/service-request?status=&kind=`
//! - `GET /api/service-request/:id`
//! - `PATCH /api/service-request/:id` - `{"status": "...", "assignedTo": "..."}`

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, MethodRouter},
    Router,
};
use serde::de::DeserializeOwned;

use crate::{AppState, HttpError};
use wayfinder_core::models::{
    FlowerDetails, GiftDetails, MedicalDeviceDetails, MedicineDeliveryDetails, ReligiousDetails,
    RequestDetails, RequestFilter, RequestForm, RequestKind, RequestStatus, RequestUpdate,
    RoomSchedulingDetails, ServiceRequest,
};

#[derive(Debug, Default, serde::Deserialize)]
pub struct RequestListQuery {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub kind: Option<RequestKind>,
}

async fn create_request<D>(
    State(state): State<AppState>,
    Json(form): Json<RequestForm<D>>,
) -> Result<(StatusCode, Json<ServiceRequest>), HttpError>
where
    D: DeserializeOwned + Into<RequestDetails> + Send + 'static,
{
    let created = state.requests.create(form.into_new_request()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_by_kind(
    state: AppState,
    kind: RequestKind,
) -> Result<Json<Vec<ServiceRequest>>, HttpError> {
    let filter = RequestFilter {
        kind: Some(kind),
        status: None,
    };
    Ok(Json(state.requests.list(filter).await?))
}

/// `GET` lists requests of `kind`, `POST` creates one from a flat form
fn kind_routes<D>(kind: RequestKind) -> MethodRouter<AppState>
where
    D: DeserializeOwned + Into<RequestDetails> + Send + 'static,
{
    get(move |State(state): State<AppState>| list_by_kind(state, kind))
        .post(create_request::<D>)
}

async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<RequestListQuery>,
) -> Result<Json<Vec<ServiceRequest>>, HttpError> {
    let filter = RequestFilter {
        kind: query.kind,
        status: query.status,
    };
    Ok(Json(state.requests.list(filter).await?))
}

async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ServiceRequest>, HttpError> {
    Ok(Json(state.requests.get(&id).await?))
}

async fn update_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<RequestUpdate>,
) -> Result<Json<ServiceRequest>, HttpError> {
    Ok(Json(state.requests.update(&id, update).await?))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/flower-service-request",
            kind_routes::<FlowerDetails>(RequestKind::Flower),
        )
        .route(
            "/api/gift-service-request",
            kind_routes::<GiftDetails>(RequestKind::Gift),
        )
        .route(
            "/api/medical-device-service-request",
            kind_routes::<MedicalDeviceDetails>(RequestKind::MedicalDevice),
        )
        .route(
            "/api/medicine-delivery-service-request",
            kind_routes::<MedicineDeliveryDetails>(RequestKind::MedicineDelivery),
        )
        .route(
            "/api/religious-service-request",
            kind_routes::<ReligiousDetails>(RequestKind::Religious),
        )
        .route(
            "/api/room-scheduling-request",
            kind_routes::<RoomSchedulingDetails>(RequestKind::RoomScheduling),
        )
        .route("/api/service-request", get(list_requests))
        .route(
            "/api/service-request/:id",
            get(get_request).patch(update_request),
        )
        .with_state(state)
}
