//! MapStore Trait - Data Access for the Building Graph
//!
//! Services never touch SQL directly; they receive an `Arc<dyn MapStore>`
//! at construction time. The production implementation is
//! [`LibsqlStore`](crate::db::LibsqlStore); tests can substitute an
//! in-memory double.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so embedded and networked
//!    backends share one interface
//! 2. **Ownership Semantics**: Write methods take ownership of values
//! 3. **Error Handling**: `anyhow::Result`; services translate failures
//! 4. **Atomic multi-row writes**: every method that touches more than one
//!    row is all-or-nothing
//! 5. **Stable ordering**: list methods return rows in insertion order so
//!    route ties resolve identically across calls

use crate::models::{Edge, Node};
use anyhow::Result;
use async_trait::async_trait;

/// Outcome of deleting nodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeDeletion {
    pub nodes_deleted: u64,
    pub edges_deleted: u64,
}

/// Abstraction layer for map persistence
///
/// Implementations must be `Send + Sync` so they can be shared across
/// request handlers.
#[async_trait]
pub trait MapStore: Send + Sync {
    //
    // NODES
    //

    /// All nodes, in insertion order
    async fn list_nodes(&self) -> Result<Vec<Node>>;

    /// Node by id (`Ok(None)` if it doesn't exist)
    async fn get_node(&self, node_id: &str) -> Result<Option<Node>>;

    /// Insert nodes and edges in one transaction
    ///
    /// Edges may reference the nodes being inserted. Fails without writing
    /// anything if any id already exists or an edge endpoint is missing.
    async fn insert_nodes_with_edges(&self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<()>;

    /// Overwrite existing nodes (matched by id); returns rows updated
    async fn update_nodes(&self, nodes: Vec<Node>) -> Result<u64>;

    /// Delete nodes and every edge touching them, in one transaction
    async fn delete_nodes(&self, node_ids: &[String]) -> Result<NodeDeletion>;

    /// Bulk replace: delete every node (and therefore every edge), insert `nodes`
    async fn replace_nodes(&self, nodes: Vec<Node>) -> Result<()>;

    //
    // EDGES
    //

    /// All edges, in insertion order
    async fn list_edges(&self) -> Result<Vec<Edge>>;

    /// Delete `remove` (by edge id) then insert `insert`, in one transaction
    ///
    /// Returns the number of edges removed.
    async fn apply_edge_changes(&self, remove: &[String], insert: Vec<Edge>) -> Result<u64>;

    /// Bulk replace: delete every edge, insert `edges`
    async fn replace_edges(&self, edges: Vec<Edge>) -> Result<()>;
}
