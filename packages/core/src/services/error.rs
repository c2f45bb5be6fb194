//! Service Layer Error Types
//!
//! Every service returns [`ServiceError`]. The variants line up with the
//! failure classes the HTTP layer distinguishes: not found, invalid input,
//! conflict with current state, and storage failure.

use crate::csv_io::CsvImportError;
use crate::models::ValidationError;
use thiserror::Error;

/// Service operation errors
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Entity not found by id
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Input failed validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Operation conflicts with stored state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// CSV payload could not be parsed
    #[error("CSV import failed: {0}")]
    Csv(#[from] CsvImportError),

    /// Data-access failure
    #[error("Storage error: {0}")]
    Store(#[from] anyhow::Error),
}

impl ServiceError {
    /// Create a not found error
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
