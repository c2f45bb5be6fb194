//! Map Editing Endpoints
//!
//! # Endpoints
//!
//! - `GET /api/nodes` - List nodes
//! - `GET /api/nodes/:id` - Get a node by ID
//! - `GET /api/edges` - List edges
//! - `GET /api/room-name-fetch` - Long names of every non-hallway node
//! - `POST /api/add-nodes-and-associated-edges` - `{"nodes": [...], "edges": [...]}`
//! - `POST /api/refactor-nodes` - `{"nodes": [...]}`
//! - `POST /api/delete-nodes-and-associated-edges` - `{"nodeIDs": [...]}`
//! - `POST /api/add-edges` - `{"edges": [{"startNodeID", "endNodeID"}]}`
//! - `POST /api/refactor-edges` - `{"edges": [{"edgeID", "startNodeID", "endNodeID"}]}`
//! - `POST /api/delete-edges` - `{"edgeIDs": [...]}`

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::{AppState, HttpError};
use wayfinder_core::models::{Edge, EdgeChange, NewEdge, Node};
use wayfinder_core::services::MapEdit;

#[derive(Debug, Deserialize)]
pub struct AddNodesBody {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<NewEdge>,
}

#[derive(Debug, Deserialize)]
pub struct NodesBody {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
pub struct NodeIdsBody {
    #[serde(rename = "nodeIDs")]
    pub node_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewEdgesBody {
    pub edges: Vec<NewEdge>,
}

#[derive(Debug, Deserialize)]
pub struct EdgeChangesBody {
    pub edges: Vec<EdgeChange>,
}

#[derive(Debug, Deserialize)]
pub struct EdgeIdsBody {
    #[serde(rename = "edgeIDs")]
    pub edge_ids: Vec<String>,
}

async fn list_nodes(State(state): State<AppState>) -> Result<Json<Vec<Node>>, HttpError> {
    Ok(Json(state.map.list_nodes().await?))
}

async fn get_node(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Node>, HttpError> {
    Ok(Json(state.map.get_node(&id).await?))
}

async fn list_edges(State(state): State<AppState>) -> Result<Json<Vec<Edge>>, HttpError> {
    Ok(Json(state.map.list_edges().await?))
}

async fn room_names(State(state): State<AppState>) -> Result<Json<Vec<String>>, HttpError> {
    Ok(Json(state.map.room_names().await?))
}

async fn add_nodes_and_edges(
    State(state): State<AppState>,
    Json(body): Json<AddNodesBody>,
) -> Result<Json<MapEdit>, HttpError> {
    Ok(Json(
        state.map.add_nodes_with_edges(body.nodes, body.edges).await?,
    ))
}

async fn refactor_nodes(
    State(state): State<AppState>,
    Json(body): Json<NodesBody>,
) -> Result<Json<MapEdit>, HttpError> {
    Ok(Json(state.map.refactor_nodes(body.nodes).await?))
}

async fn delete_nodes_and_edges(
    State(state): State<AppState>,
    Json(body): Json<NodeIdsBody>,
) -> Result<Json<MapEdit>, HttpError> {
    Ok(Json(state.map.delete_nodes(&body.node_ids).await?))
}

async fn add_edges(
    State(state): State<AppState>,
    Json(body): Json<NewEdgesBody>,
) -> Result<Json<MapEdit>, HttpError> {
    Ok(Json(state.map.add_edges(body.edges).await?))
}

async fn refactor_edges(
    State(state): State<AppState>,
    Json(body): Json<EdgeChangesBody>,
) -> Result<Json<MapEdit>, HttpError> {
    Ok(Json(state.map.refactor_edges(body.edges).await?))
}

async fn delete_edges(
    State(state): State<AppState>,
    Json(body): Json<EdgeIdsBody>,
) -> Result<Json<MapEdit>, HttpError> {
    Ok(Json(state.map.delete_edges(&body.edge_ids).await?))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/nodes", get(list_nodes))
        .route("/api/nodes/:id", get(get_node))
        .route("/api/edges", get(list_edges))
        .route("/api/room-name-fetch", get(room_names))
        .route("/api/add-nodes-and-associated-edges", post(add_nodes_and_edges))
        .route("/api/refactor-nodes", post(refactor_nodes))
        .route(
            "/api/delete-nodes-and-associated-edges",
            post(delete_nodes_and_edges),
        )
        .route("/api/add-edges", post(add_edges))
        .route("/api/refactor-edges", post(refactor_edges))
        .route("/api/delete-edges", post(delete_edges))
        .with_state(state)
}
