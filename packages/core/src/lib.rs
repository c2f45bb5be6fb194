//! Wayfinder Core Business Logic Layer
//!
//! This crate provides the data model, persistence and business services for
//! the hospital wayfinding backend.
//!
//! # Architecture
//!
//! - **libsql**: Embedded SQLite-compatible database, one file for every table
//! - **Injected stores**: Services depend on the `MapStore`/`RecordStore`
//!   traits, never on a global connection
//! - **Snapshot routing**: Each route query reads the map once and searches
//!   an in-memory graph
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, Edge, ServiceRequest, etc.)
//! - [`db`] - Database layer with libsql integration
//! - [`routing`] - Shortest path search over the building graph
//! - [`csv_io`] - CSV import/export for nodes, edges and employees
//! - [`services`] - Business services (MapService, RequestService, etc.)

pub mod csv_io;
pub mod db;
pub mod models;
pub mod routing;
pub mod services;

// Re-export commonly used types
pub use models::*;
pub use services::*;
