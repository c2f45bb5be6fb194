//! Route Finder
//!
//! Shortest paths over the building map. A [`MapGraph`] is built from a
//! single snapshot of nodes and edges (one read per query), then searched
//! with Dijkstra or A*:
//!
//! - Edges are traversable in both directions
//! - Edge weight is the Euclidean distance between endpoint coordinates,
//!   computed when the graph is built from the current positions
//! - Equal-cost candidates are expanded in node order, then edge order, so
//!   an unchanged map always yields the same path
//! - Edges referencing unknown nodes are skipped with a warning

mod graph;
mod search;

pub use graph::MapGraph;
pub use search::{Route, RouteError, SearchStrategy};

#[cfg(test)]
mod routing_test;
