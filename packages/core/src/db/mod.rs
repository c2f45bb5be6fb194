//! Database Layer
//!
//! This module handles all persistence using libsql (embedded, SQLite-compatible):
//!
//! - Connection management and idempotent schema creation
//! - `MapStore` for the building graph (nodes and edges)
//! - `RecordStore` for employees, service requests and high scores
//!
//! # Architecture
//!
//! Services depend on the store traits only. [`LibsqlStore`] implements
//! both over a shared [`DatabaseService`], so a single database file holds
//! every table.

mod database;
mod error;
mod libsql_store;
mod map_store;
mod record_store;

pub use database::DatabaseService;
pub use error::DatabaseError;
pub use libsql_store::LibsqlStore;
pub use map_store::{MapStore, NodeDeletion};
pub use record_store::RecordStore;
