//! Map Edge Data Structures
//!
//! An `Edge` is a traversable connection between two nodes. The edge id is
//! always derived from its endpoints, so the same connection cannot be
//! stored twice under different ids.

use serde::{Deserialize, Serialize};

use super::validation::{require_text, ValidationError};

/// Joins start and end node ids in a derived edge id
pub const EDGE_ID_SEPARATOR: char = '_';

/// A connection between two map nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Derived identifier: `"{start_node_id}_{end_node_id}"`
    #[serde(rename = "edgeID")]
    pub edge_id: String,

    #[serde(rename = "startNodeID")]
    pub start_node_id: String,

    #[serde(rename = "endNodeID")]
    pub end_node_id: String,
}

impl Edge {
    /// Create an edge, deriving its id from the endpoints
    pub fn new(start_node_id: impl Into<String>, end_node_id: impl Into<String>) -> Self {
        let start_node_id = start_node_id.into();
        let end_node_id = end_node_id.into();
        Self {
            edge_id: Self::derive_id(&start_node_id, &end_node_id),
            start_node_id,
            end_node_id,
        }
    }

    /// Edge id for a pair of endpoints
    ///
    /// Node ids never contain [`EDGE_ID_SEPARATOR`], so distinct endpoint
    /// pairs always give distinct ids.
    pub fn derive_id(start_node_id: &str, end_node_id: &str) -> String {
        format!("{}{}{}", start_node_id, EDGE_ID_SEPARATOR, end_node_id)
    }

    /// The endpoint opposite `node_id`, if this edge touches it
    pub fn other_end(&self, node_id: &str) -> Option<&str> {
        if self.start_node_id == node_id {
            Some(&self.end_node_id)
        } else if self.end_node_id == node_id {
            Some(&self.start_node_id)
        } else {
            None
        }
    }

    /// Whether this edge touches `node_id`
    pub fn touches(&self, node_id: &str) -> bool {
        self.other_end(node_id).is_some()
    }

    /// Validate endpoints and the derived id
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("startNodeID", &self.start_node_id)?;
        require_text("endNodeID", &self.end_node_id)?;

        if self.start_node_id == self.end_node_id {
            return Err(ValidationError::invalid_value(
                "endNodeID",
                format!("edge cannot connect node '{}' to itself", self.start_node_id),
            ));
        }

        let expected = Self::derive_id(&self.start_node_id, &self.end_node_id);
        if self.edge_id != expected {
            return Err(ValidationError::invalid_value(
                "edgeID",
                format!("expected '{}', got '{}'", expected, self.edge_id),
            ));
        }

        Ok(())
    }
}

/// Endpoints of an edge to be created (the id is derived, never supplied)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEdge {
    #[serde(rename = "startNodeID")]
    pub start_node_id: String,

    #[serde(rename = "endNodeID")]
    pub end_node_id: String,
}

impl NewEdge {
    pub fn new(start_node_id: impl Into<String>, end_node_id: impl Into<String>) -> Self {
        Self {
            start_node_id: start_node_id.into(),
            end_node_id: end_node_id.into(),
        }
    }

    /// Build the stored edge, validating endpoints
    pub fn into_edge(self) -> Result<Edge, ValidationError> {
        let edge = Edge::new(self.start_node_id, self.end_node_id);
        edge.validate()?;
        Ok(edge)
    }
}

/// Re-routing of an existing edge to new endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeChange {
    /// Id of the edge being replaced
    #[serde(rename = "edgeID")]
    pub edge_id: String,

    #[serde(rename = "startNodeID")]
    pub start_node_id: String,

    #[serde(rename = "endNodeID")]
    pub end_node_id: String,
}
