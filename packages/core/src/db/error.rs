//! Errors raised while opening the map database or running its statements

use std::path::PathBuf;
use thiserror::Error;

/// Failures owned by [`DatabaseService`](super::DatabaseService)
///
/// Stores convert these into `anyhow::Error` at the trait seam; row-level
/// decoding problems never show up here.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Cannot open map database {path}: {source}")]
    Open {
        path: PathBuf,
        source: libsql::Error,
    },

    #[error("Cannot create database directory: {0}")]
    CreateDirectory(#[from] std::io::Error),

    #[error("No write access to {path}")]
    PermissionDenied { path: PathBuf },

    /// A table or index could not be created at startup
    #[error("Schema setup failed: {0}")]
    Schema(String),

    #[error("{statement} failed: {source}")]
    Statement {
        statement: String,
        source: libsql::Error,
    },

    #[error(transparent)]
    Libsql(#[from] libsql::Error),
}

impl DatabaseError {
    pub fn statement(statement: impl Into<String>, source: libsql::Error) -> Self {
        Self::Statement {
            statement: statement.into(),
            source,
        }
    }
}
