//! Map Node Data Structures
//!
//! A `Node` is a point of interest on the hospital map: a room, a hallway
//! junction, an elevator or an entrance. Nodes are the vertices of the
//! building graph; their planar coordinates drive edge weights.
//!
//! Field names on the wire (JSON and CSV) follow the map data files used by
//! the facilities team (`nodeID`, `xcoord`, `ycoord`, ...), so a single
//! schema covers the HTTP API and CSV exchange.
//!
//! # Examples
//!
//! ```rust
//! use wayfinder_core::models::Node;
//!
//! let lobby = Node::new("CLOBB001L1", 1200.0, 900.0).with_names("Main Lobby", "Lobby");
//! let hall = Node::new("CHALL002L1", 1203.0, 904.0);
//! assert_eq!(lobby.distance_to(&hall), 5.0);
//! ```

use serde::{Deserialize, Serialize};

use super::edge::EDGE_ID_SEPARATOR;
use super::validation::{require_text, ValidationError};

/// Node type used for plain hallway junctions
pub const HALLWAY_NODE_TYPE: &str = "HALL";

/// A point of interest in the building graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    #[serde(rename = "nodeID")]
    pub node_id: String,

    /// Horizontal map coordinate
    #[serde(rename = "xcoord")]
    pub x: f64,

    /// Vertical map coordinate
    #[serde(rename = "ycoord")]
    pub y: f64,

    /// Floor label (e.g. "L1", "1", "2")
    pub floor: String,

    /// Building name
    pub building: String,

    /// Node category (e.g. "HALL", "ELEV", "CONF")
    #[serde(rename = "nodeType")]
    pub node_type: String,

    /// Display name
    #[serde(rename = "longName")]
    pub long_name: String,

    /// Abbreviated display name
    #[serde(rename = "shortName")]
    pub short_name: String,
}

impl Node {
    /// Create a hallway node on floor 1 with its id as display name
    pub fn new(node_id: impl Into<String>, x: f64, y: f64) -> Self {
        let node_id = node_id.into();
        Self {
            long_name: node_id.clone(),
            short_name: node_id.clone(),
            node_id,
            x,
            y,
            floor: "1".to_string(),
            building: String::new(),
            node_type: HALLWAY_NODE_TYPE.to_string(),
        }
    }

    pub fn with_location(mut self, floor: impl Into<String>, building: impl Into<String>) -> Self {
        self.floor = floor.into();
        self.building = building.into();
        self
    }

    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = node_type.into();
        self
    }

    pub fn with_names(mut self, long_name: impl Into<String>, short_name: impl Into<String>) -> Self {
        self.long_name = long_name.into();
        self.short_name = short_name.into();
        self
    }

    /// Euclidean distance between two nodes' map coordinates
    pub fn distance_to(&self, other: &Node) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Whether this node is a named destination rather than a hallway junction
    pub fn is_room(&self) -> bool {
        !self.node_type.eq_ignore_ascii_case(HALLWAY_NODE_TYPE)
    }

    /// Validate required fields and coordinates
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("nodeID", &self.node_id)?;
        if self.node_id.contains(EDGE_ID_SEPARATOR) {
            return Err(ValidationError::invalid_value(
                "nodeID",
                format!("'{}' must not contain '{}'", self.node_id, EDGE_ID_SEPARATOR),
            ));
        }
        require_text("floor", &self.floor)?;
        require_text("longName", &self.long_name)?;

        if !self.x.is_finite() {
            return Err(ValidationError::invalid_value("xcoord", "must be a finite number"));
        }
        if !self.y.is_finite() {
            return Err(ValidationError::invalid_value("ycoord", "must be a finite number"));
        }

        Ok(())
    }
}
