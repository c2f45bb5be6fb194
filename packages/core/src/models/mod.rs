//! Data Models
//!
//! This module contains the data structures used throughout Wayfinder:
//!
//! - `Node` / `Edge` - the building map graph
//! - `Employee` - staff directory records
//! - `ServiceRequest` - staff-submitted tasks with typed details
//! - `HighScore` - minigame leaderboard entries
//!
//! Every input schema validates itself via `validate()` (or a normalizing
//! constructor) and reports a [`ValidationError`].

mod edge;
mod employee;
mod high_score;
mod node;
mod service_request;
mod validation;

pub use edge::{Edge, EdgeChange, NewEdge, EDGE_ID_SEPARATOR};
pub use employee::Employee;
pub use high_score::{HighScore, NewHighScore, MAX_INITIALS};
pub use node::{Node, HALLWAY_NODE_TYPE};
pub use service_request::{
    FlowerDetails, GiftDetails, MedicalDeviceDetails, MedicineDeliveryDetails, NewServiceRequest,
    Priority, ReligiousDetails, RequestDetails, RequestFilter, RequestForm, RequestKind,
    RequestStatus, RequestUpdate, RoomSchedulingDetails, ServiceRequest,
};
pub use validation::ValidationError;
