//! Shortest path search (Dijkstra and A*)

use super::graph::MapGraph;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::str::FromStr;
use thiserror::Error;

/// Search algorithm used by [`MapGraph::shortest_path`]
///
/// Deserializes through [`FromStr`], so JSON bodies and query strings accept
/// the same spellings: `dijkstra`, `astar` or `a*` in any case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SearchStrategy {
    #[default]
    Dijkstra,
    /// A* guided by the straight-line distance to the goal
    #[serde(rename = "astar")]
    AStar,
}

impl FromStr for SearchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dijkstra" => Ok(SearchStrategy::Dijkstra),
            "astar" | "a*" => Ok(SearchStrategy::AStar),
            other => Err(format!("Unknown search strategy: {}", other)),
        }
    }
}

impl TryFrom<String> for SearchStrategy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchStrategy::Dijkstra => write!(f, "dijkstra"),
            SearchStrategy::AStar => write!(f, "astar"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("Node not found: {0}")]
    UnknownNode(String),
}

/// A found path: node ids from start to end inclusive, and its total weight
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub node_ids: Vec<String>,
    pub distance: f64,
}

/// Frontier entry; ordered so the heap pops the lowest priority first and,
/// among equal priorities, the entry pushed earliest
#[derive(Debug, Clone, Copy)]
struct Candidate {
    priority: f64,
    seq: u64,
    vertex: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl MapGraph {
    /// Find a minimal-weight path between two node ids
    ///
    /// Returns `Ok(None)` when both nodes exist but are not connected.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfinder_core::models::{Edge, Node};
    /// use wayfinder_core::routing::{MapGraph, SearchStrategy};
    ///
    /// let nodes = vec![Node::new("A", 0.0, 0.0), Node::new("B", 3.0, 4.0)];
    /// let graph = MapGraph::from_snapshot(&nodes, &[Edge::new("A", "B")]);
    /// let route = graph.shortest_path("A", "B", SearchStrategy::Dijkstra).unwrap().unwrap();
    /// assert_eq!(route.node_ids, vec!["A", "B"]);
    /// assert_eq!(route.distance, 5.0);
    /// ```
    pub fn shortest_path(
        &self,
        start: &str,
        end: &str,
        strategy: SearchStrategy,
    ) -> Result<Option<Route>, RouteError> {
        let source = self
            .vertex(start)
            .ok_or_else(|| RouteError::UnknownNode(start.to_string()))?;
        let goal = self
            .vertex(end)
            .ok_or_else(|| RouteError::UnknownNode(end.to_string()))?;

        if source == goal {
            return Ok(Some(Route {
                node_ids: vec![start.to_string()],
                distance: 0.0,
            }));
        }

        let heuristic = |vertex: usize| match strategy {
            SearchStrategy::Dijkstra => 0.0,
            SearchStrategy::AStar => self.straight_line(vertex, goal),
        };

        let n = self.node_count();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        let mut settled = vec![false; n];
        let mut frontier = BinaryHeap::new();
        let mut seq = 0u64;

        dist[source] = 0.0;
        frontier.push(Candidate {
            priority: heuristic(source),
            seq,
            vertex: source,
        });

        while let Some(Candidate { vertex, .. }) = frontier.pop() {
            if settled[vertex] {
                continue;
            }
            settled[vertex] = true;

            if vertex == goal {
                break;
            }

            for neighbor in self.neighbors(vertex) {
                if settled[neighbor.node] {
                    continue;
                }
                let candidate = dist[vertex] + neighbor.weight;
                // Strictly shorter only: the first predecessor found keeps ties
                if candidate < dist[neighbor.node] {
                    dist[neighbor.node] = candidate;
                    prev[neighbor.node] = Some(vertex);
                    seq += 1;
                    frontier.push(Candidate {
                        priority: candidate + heuristic(neighbor.node),
                        seq,
                        vertex: neighbor.node,
                    });
                }
            }
        }

        if !settled[goal] {
            return Ok(None);
        }

        let mut path = vec![goal];
        let mut current = goal;
        while let Some(previous) = prev[current] {
            path.push(previous);
            current = previous;
        }
        path.reverse();

        Ok(Some(Route {
            node_ids: path.into_iter().map(|v| self.id(v).to_string()).collect(),
            distance: dist[goal],
        }))
    }
}
