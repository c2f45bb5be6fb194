//! Business Services
//!
//! This module contains the business logic layer:
//!
//! - `MapService` - map editing, CSV exchange and route finding
//! - `StaffService` - employee directory
//! - `RequestService` - service request lifecycle
//! - `ScoreService` - minigame leaderboard
//!
//! Services own an `Arc` of the store traits they need and never touch SQL
//! directly, so every service can run against an in-memory double.

pub mod error;
pub mod map_service;
pub mod request_service;
pub mod score_service;
pub mod staff_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::ServiceError;
pub use map_service::{MapEdit, MapService, PathResult};
pub use request_service::RequestService;
pub use score_service::{ScoreService, LEADERBOARD_SIZE};
pub use staff_service::StaffService;
