//! Map Service - Building Graph Operations
//!
//! Business logic over the node/edge graph:
//!
//! - Map editing (add, refactor and delete nodes and edges)
//! - CSV bulk replace and export
//! - Room name listing for dropdowns
//! - Route finding over a fresh snapshot of the graph
//!
//! Every write is validated against the current graph before it reaches the
//! store, so callers see a `ServiceError` rather than a constraint failure.
//! A write the store still refuses (another edit landed in between) is
//! checked again against the graph as it is now and reported the same way.

use crate::csv_io;
use crate::db::MapStore;
use crate::models::{Edge, EdgeChange, NewEdge, Node, ValidationError};
use crate::routing::{MapGraph, RouteError, SearchStrategy};
use crate::services::ServiceError;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Counts of rows touched by a map edit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapEdit {
    pub nodes: u64,
    pub edges: u64,
}

impl MapEdit {
    fn nodes(count: usize) -> Self {
        Self {
            nodes: count as u64,
            edges: 0,
        }
    }

    fn edges(count: usize) -> Self {
        Self {
            nodes: 0,
            edges: count as u64,
        }
    }
}

/// Route finder answer
///
/// `path` is empty and `distance` is `None` when no route exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    pub start: String,
    pub end: String,
    pub strategy: SearchStrategy,
    pub found: bool,
    pub path: Vec<String>,
    pub distance: Option<f64>,
}

/// Which stored edges survive a write, for re-checking a rejected one
enum SurvivingEdges<'a> {
    All,
    AllExcept(&'a [String]),
    None,
}

pub struct MapService {
    store: Arc<dyn MapStore>,
}

impl MapService {
    pub fn new(store: Arc<dyn MapStore>) -> Self {
        Self { store }
    }

    //
    // NODES
    //

    pub async fn list_nodes(&self) -> Result<Vec<Node>, ServiceError> {
        Ok(self.store.list_nodes().await?)
    }

    pub async fn get_node(&self, node_id: &str) -> Result<Node, ServiceError> {
        self.store
            .get_node(node_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Node", node_id))
    }

    /// Add new nodes together with edges that may reference them
    #[instrument(skip_all, fields(nodes = nodes.len(), edges = edges.len()))]
    pub async fn add_nodes_with_edges(
        &self,
        nodes: Vec<Node>,
        edges: Vec<NewEdge>,
    ) -> Result<MapEdit, ServiceError> {
        let existing_nodes = self.store.list_nodes().await?;
        let mut known: HashSet<String> = existing_nodes.into_iter().map(|n| n.node_id).collect();

        for node in &nodes {
            node.validate()?;
            if !known.insert(node.node_id.clone()) {
                return Err(ServiceError::conflict(format!(
                    "Node '{}' already exists",
                    node.node_id
                )));
            }
        }

        let edges = Self::checked_new_edges(edges, &known, self.edge_ids().await?)?;
        let edit = MapEdit {
            nodes: nodes.len() as u64,
            edges: edges.len() as u64,
        };

        if let Err(e) = self
            .store
            .insert_nodes_with_edges(nodes.clone(), edges.clone())
            .await
        {
            return Err(self
                .explain_rejected_write(e, &nodes, &edges, SurvivingEdges::All)
                .await);
        }
        info!(nodes = edit.nodes, edges = edit.edges, "Added nodes");
        Ok(edit)
    }

    /// Overwrite existing nodes matched by id
    #[instrument(skip_all, fields(nodes = nodes.len()))]
    pub async fn refactor_nodes(&self, nodes: Vec<Node>) -> Result<MapEdit, ServiceError> {
        let known = self.node_ids().await?;
        for node in &nodes {
            node.validate()?;
            if !known.contains(&node.node_id) {
                return Err(ServiceError::not_found("Node", node.node_id.clone()));
            }
        }

        let updated = self.store.update_nodes(nodes).await?;
        info!(updated, "Refactored nodes");
        Ok(MapEdit {
            nodes: updated,
            edges: 0,
        })
    }

    /// Delete nodes along with every edge touching them
    #[instrument(skip(self))]
    pub async fn delete_nodes(&self, node_ids: &[String]) -> Result<MapEdit, ServiceError> {
        let known = self.node_ids().await?;
        if let Some(missing) = node_ids.iter().find(|id| !known.contains(*id)) {
            return Err(ServiceError::not_found("Node", missing.clone()));
        }

        let deletion = self.store.delete_nodes(node_ids).await?;
        info!(
            nodes = deletion.nodes_deleted,
            edges = deletion.edges_deleted,
            "Deleted nodes"
        );
        Ok(MapEdit {
            nodes: deletion.nodes_deleted,
            edges: deletion.edges_deleted,
        })
    }

    /// Long names of every non-hallway node, sorted and deduplicated
    pub async fn room_names(&self) -> Result<Vec<String>, ServiceError> {
        let mut names: Vec<String> = self
            .store
            .list_nodes()
            .await?
            .into_iter()
            .filter(Node::is_room)
            .map(|n| n.long_name)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    //
    // EDGES
    //

    pub async fn list_edges(&self) -> Result<Vec<Edge>, ServiceError> {
        Ok(self.store.list_edges().await?)
    }

    #[instrument(skip_all, fields(edges = edges.len()))]
    pub async fn add_edges(&self, edges: Vec<NewEdge>) -> Result<MapEdit, ServiceError> {
        let known = self.node_ids().await?;
        let existing = self.edge_ids().await?;
        let edges = Self::checked_new_edges(edges, &known, existing)?;

        let edit = MapEdit::edges(edges.len());
        if let Err(e) = self.store.apply_edge_changes(&[], edges.clone()).await {
            return Err(self
                .explain_rejected_write(e, &[], &edges, SurvivingEdges::All)
                .await);
        }
        info!(edges = edit.edges, "Added edges");
        Ok(edit)
    }

    /// Re-route existing edges: each old edge is removed and replaced by one
    /// between the new endpoints
    #[instrument(skip_all, fields(changes = changes.len()))]
    pub async fn refactor_edges(&self, changes: Vec<EdgeChange>) -> Result<MapEdit, ServiceError> {
        let known = self.node_ids().await?;
        let mut remaining = self.edge_ids().await?;

        let mut remove = Vec::with_capacity(changes.len());
        let mut replacements = Vec::with_capacity(changes.len());
        for change in changes {
            if !remaining.remove(&change.edge_id) {
                return Err(ServiceError::not_found("Edge", change.edge_id));
            }
            remove.push(change.edge_id);
            replacements.push(NewEdge::new(change.start_node_id, change.end_node_id));
        }

        let inserts = Self::checked_new_edges(replacements, &known, remaining)?;
        let edit = MapEdit::edges(inserts.len());
        if let Err(e) = self.store.apply_edge_changes(&remove, inserts.clone()).await {
            return Err(self
                .explain_rejected_write(e, &[], &inserts, SurvivingEdges::AllExcept(&remove))
                .await);
        }
        info!(edges = edit.edges, "Refactored edges");
        Ok(edit)
    }

    #[instrument(skip(self))]
    pub async fn delete_edges(&self, edge_ids: &[String]) -> Result<MapEdit, ServiceError> {
        let existing = self.edge_ids().await?;
        if let Some(missing) = edge_ids.iter().find(|id| !existing.contains(*id)) {
            return Err(ServiceError::not_found("Edge", missing.clone()));
        }

        let removed = self.store.apply_edge_changes(edge_ids, Vec::new()).await?;
        info!(removed, "Deleted edges");
        Ok(MapEdit {
            nodes: 0,
            edges: removed,
        })
    }

    //
    // CSV
    //

    /// Replace every node (and therefore every edge) with the CSV contents
    #[instrument(skip_all, fields(bytes = text.len()))]
    pub async fn import_nodes_csv(&self, text: &str) -> Result<MapEdit, ServiceError> {
        let nodes = csv_io::parse_nodes(text)?;
        let edit = MapEdit::nodes(nodes.len());
        self.store.replace_nodes(nodes).await?;
        info!(nodes = edit.nodes, "Imported nodes from CSV");
        Ok(edit)
    }

    /// Replace every edge with the CSV contents; endpoints must exist
    #[instrument(skip_all, fields(bytes = text.len()))]
    pub async fn import_edges_csv(&self, text: &str) -> Result<MapEdit, ServiceError> {
        let edges = csv_io::parse_edges(text)?;
        let known = self.node_ids().await?;
        for edge in &edges {
            Self::check_endpoints(edge, &known)?;
        }

        let edit = MapEdit::edges(edges.len());
        if let Err(e) = self.store.replace_edges(edges.clone()).await {
            return Err(self
                .explain_rejected_write(e, &[], &edges, SurvivingEdges::None)
                .await);
        }
        info!(edges = edit.edges, "Imported edges from CSV");
        Ok(edit)
    }

    pub async fn export_nodes_csv(&self) -> Result<String, ServiceError> {
        let nodes = self.store.list_nodes().await?;
        csv_io::nodes_to_csv(&nodes).map_err(|e| ServiceError::Store(e.into()))
    }

    pub async fn export_edges_csv(&self) -> Result<String, ServiceError> {
        let edges = self.store.list_edges().await?;
        csv_io::edges_to_csv(&edges).map_err(|e| ServiceError::Store(e.into()))
    }

    //
    // ROUTING
    //

    /// Shortest path between two nodes over the current map
    #[instrument(skip(self))]
    pub async fn find_route(
        &self,
        start: &str,
        end: &str,
        strategy: SearchStrategy,
    ) -> Result<PathResult, ServiceError> {
        let nodes = self.store.list_nodes().await?;
        let edges = self.store.list_edges().await?;
        let graph = MapGraph::from_snapshot(&nodes, &edges);

        let route = graph
            .shortest_path(start, end, strategy)
            .map_err(|RouteError::UnknownNode(id)| ServiceError::not_found("Node", id))?;

        let mut result = PathResult {
            start: start.to_string(),
            end: end.to_string(),
            strategy,
            found: false,
            path: Vec::new(),
            distance: None,
        };
        match route {
            Some(route) => {
                result.found = true;
                result.path = route.node_ids;
                result.distance = Some(route.distance);
                tracing::debug!(hops = result.path.len(), "Route found");
            }
            None => info!("No route between nodes"),
        }

        Ok(result)
    }

    //
    // HELPERS
    //

    async fn node_ids(&self) -> Result<HashSet<String>, ServiceError> {
        Ok(self
            .store
            .list_nodes()
            .await?
            .into_iter()
            .map(|n| n.node_id)
            .collect())
    }

    async fn edge_ids(&self) -> Result<HashSet<String>, ServiceError> {
        Ok(self
            .store
            .list_edges()
            .await?
            .into_iter()
            .map(|e| e.edge_id)
            .collect())
    }

    fn check_endpoints(edge: &Edge, known: &HashSet<String>) -> Result<(), ServiceError> {
        for endpoint in [&edge.start_node_id, &edge.end_node_id] {
            if !known.contains(endpoint) {
                return Err(ValidationError::invalid_reference(format!(
                    "Edge '{}' references unknown node '{}'",
                    edge.edge_id, endpoint
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Re-run the add checks for a write the store refused
    ///
    /// Returns the conflict or validation error the graph now produces, or
    /// the store error itself when the checks still pass.
    async fn explain_rejected_write(
        &self,
        error: anyhow::Error,
        nodes: &[Node],
        edges: &[Edge],
        surviving: SurvivingEdges<'_>,
    ) -> ServiceError {
        let (known, mut taken) = match (self.node_ids().await, self.edge_ids().await) {
            (Ok(known), Ok(taken)) => (known, taken),
            _ => return ServiceError::Store(error),
        };
        match surviving {
            SurvivingEdges::All => {}
            SurvivingEdges::AllExcept(removed) => taken.retain(|id| !removed.contains(id)),
            SurvivingEdges::None => taken.clear(),
        }

        match Self::first_clash(nodes, edges, known, taken) {
            Some(err) => {
                warn!("Map changed during write: {}", err);
                err
            }
            None => ServiceError::Store(error),
        }
    }

    fn first_clash(
        nodes: &[Node],
        edges: &[Edge],
        mut known: HashSet<String>,
        mut taken: HashSet<String>,
    ) -> Option<ServiceError> {
        for node in nodes {
            if !known.insert(node.node_id.clone()) {
                return Some(ServiceError::conflict(format!(
                    "Node '{}' already exists",
                    node.node_id
                )));
            }
        }
        for edge in edges {
            if let Err(err) = Self::check_endpoints(edge, &known) {
                return Some(err);
            }
            if !taken.insert(edge.edge_id.clone()) {
                return Some(ServiceError::conflict(format!(
                    "Edge '{}' already exists",
                    edge.edge_id
                )));
            }
        }
        None
    }

    /// Validate new edges against known nodes and ids already taken
    fn checked_new_edges(
        edges: Vec<NewEdge>,
        known: &HashSet<String>,
        mut taken: HashSet<String>,
    ) -> Result<Vec<Edge>, ServiceError> {
        let mut checked = Vec::with_capacity(edges.len());
        for new_edge in edges {
            let edge = new_edge.into_edge()?;
            Self::check_endpoints(&edge, known)?;
            if !taken.insert(edge.edge_id.clone()) {
                return Err(ServiceError::conflict(format!(
                    "Edge '{}' already exists",
                    edge.edge_id
                )));
            }
            checked.push(edge);
        }
        Ok(checked)
    }
}

#[cfg(test)]
#[path = "map_service_test.rs"]
mod map_service_test;
