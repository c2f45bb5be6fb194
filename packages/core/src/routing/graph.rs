//! In-memory adjacency view of a map snapshot

use crate::models::{Edge, Node};
use std::collections::HashMap;

/// Neighbor entry: target vertex and edge weight
#[derive(Debug, Clone, Copy)]
pub(crate) struct Neighbor {
    pub node: usize,
    pub weight: f64,
}

/// Undirected weighted graph built from one read of nodes and edges
///
/// Vertices are indexed in node order and every adjacency list follows
/// edge order, which makes searches deterministic for a given snapshot.
/// Weights are the Euclidean distance between endpoint coordinates.
#[derive(Debug, Clone, Default)]
pub struct MapGraph {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    coords: Vec<(f64, f64)>,
    adjacency: Vec<Vec<Neighbor>>,
    edge_count: usize,
    skipped_edges: usize,
}

impl MapGraph {
    /// Build the graph, skipping edges whose endpoints are unknown
    pub fn from_snapshot(nodes: &[Node], edges: &[Edge]) -> Self {
        let mut graph = Self::default();

        for node in nodes {
            if graph.index.contains_key(&node.node_id) {
                tracing::warn!(node_id = %node.node_id, "Duplicate node in snapshot, keeping first");
                continue;
            }
            graph.index.insert(node.node_id.clone(), graph.ids.len());
            graph.ids.push(node.node_id.clone());
            graph.coords.push((node.x, node.y));
            graph.adjacency.push(Vec::new());
        }

        for edge in edges {
            let endpoints = (
                graph.index.get(&edge.start_node_id).copied(),
                graph.index.get(&edge.end_node_id).copied(),
            );
            let (start, end) = match endpoints {
                (Some(start), Some(end)) if start != end => (start, end),
                _ => {
                    tracing::warn!(
                        edge_id = %edge.edge_id,
                        start = %edge.start_node_id,
                        end = %edge.end_node_id,
                        "Skipping edge with missing or identical endpoints"
                    );
                    graph.skipped_edges += 1;
                    continue;
                }
            };

            let weight = graph.straight_line(start, end);
            graph.adjacency[start].push(Neighbor { node: end, weight });
            graph.adjacency[end].push(Neighbor { node: start, weight });
            graph.edge_count += 1;
        }

        graph
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    /// Edges that made it into the graph
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Edges dropped because an endpoint was missing (or both were the same)
    pub fn skipped_edges(&self) -> usize {
        self.skipped_edges
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.index.contains_key(node_id)
    }

    pub(crate) fn vertex(&self, node_id: &str) -> Option<usize> {
        self.index.get(node_id).copied()
    }

    pub(crate) fn id(&self, vertex: usize) -> &str {
        &self.ids[vertex]
    }

    pub(crate) fn neighbors(&self, vertex: usize) -> &[Neighbor] {
        &self.adjacency[vertex]
    }

    pub(crate) fn straight_line(&self, a: usize, b: usize) -> f64 {
        let (ax, ay) = self.coords[a];
        let (bx, by) = self.coords[b];
        (bx - ax).hypot(by - ay)
    }
}
