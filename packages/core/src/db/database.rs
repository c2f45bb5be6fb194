//! Embedded libsql database holding the map, staff directory, service
//! requests and leaderboard.
//!
//! The schema is created with `CREATE TABLE IF NOT EXISTS` on every start,
//! the journal runs in WAL mode, and each connection enables foreign keys so
//! deleting a node cascades to its edges.
//!
//! Multi-statement writes go through [`DatabaseService::begin_transaction`]
//! and [`DatabaseService::finish_transaction`]:
//!
//! ```no_run
//! # use wayfinder_core::db::DatabaseService;
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let db = DatabaseService::new(PathBuf::from("./data/wayfinder.db")).await?;
//! let conn = db.begin_transaction().await?;
//! let result = conn
//!     .execute("DELETE FROM edges", ())
//!     .await
//!     .map_err(anyhow::Error::from);
//! db.finish_transaction(&conn, result).await?;
//! # Ok(())
//! # }
//! ```

use crate::db::error::DatabaseError;
use libsql::{Builder, Connection, Database};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Milliseconds a connection waits on a locked database
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Tables, created in order
const SCHEMA: &[(&str, &str)] = &[
    (
        "nodes",
        "CREATE TABLE IF NOT EXISTS nodes (
            node_id TEXT PRIMARY KEY,
            x REAL NOT NULL,
            y REAL NOT NULL,
            floor TEXT NOT NULL,
            building TEXT NOT NULL,
            node_type TEXT NOT NULL,
            long_name TEXT NOT NULL,
            short_name TEXT NOT NULL
        )",
    ),
    (
        "edges",
        "CREATE TABLE IF NOT EXISTS edges (
            edge_id TEXT PRIMARY KEY,
            start_node_id TEXT NOT NULL,
            end_node_id TEXT NOT NULL,
            CHECK (start_node_id <> end_node_id),
            -- Node deletion removes every edge touching it
            FOREIGN KEY (start_node_id) REFERENCES nodes(node_id) ON DELETE CASCADE,
            FOREIGN KEY (end_node_id) REFERENCES nodes(node_id) ON DELETE CASCADE
        )",
    ),
    (
        "employees",
        "CREATE TABLE IF NOT EXISTS employees (
            employee_id TEXT PRIMARY KEY,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            position TEXT NOT NULL
        )",
    ),
    (
        "service_requests",
        // No foreign key on location: requests outlive map re-imports
        "CREATE TABLE IF NOT EXISTS service_requests (
            request_id TEXT PRIMARY KEY,
            kind TEXT NOT NULL,
            requested_by TEXT NOT NULL,
            location TEXT NOT NULL,
            priority TEXT NOT NULL,
            status TEXT NOT NULL,
            assigned_to TEXT,
            notes TEXT,
            details JSON NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    ),
    (
        "high_scores",
        "CREATE TABLE IF NOT EXISTS high_scores (
            score_id TEXT PRIMARY KEY,
            initials TEXT NOT NULL,
            time INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
    ),
];

/// Secondary indexes
const INDEXES: &[(&str, &str)] = &[
    (
        "idx_edges_start",
        "CREATE INDEX IF NOT EXISTS idx_edges_start ON edges(start_node_id)",
    ),
    (
        "idx_edges_end",
        "CREATE INDEX IF NOT EXISTS idx_edges_end ON edges(end_node_id)",
    ),
    (
        "idx_requests_kind",
        "CREATE INDEX IF NOT EXISTS idx_requests_kind ON service_requests(kind, created_at)",
    ),
    (
        "idx_requests_status",
        "CREATE INDEX IF NOT EXISTS idx_requests_status ON service_requests(status)",
    ),
    (
        "idx_high_scores_time",
        "CREATE INDEX IF NOT EXISTS idx_high_scores_time ON high_scores(time DESC, created_at)",
    ),
];

/// Handle to the embedded map database
///
/// Opened once at startup; stores share it through an `Arc` and open a
/// short-lived connection per operation.
///
/// ```no_run
/// use wayfinder_core::db::DatabaseService;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db = DatabaseService::new(PathBuf::from("/var/lib/wayfinder/map.db")).await?;
///     println!("map database at {}", db.path().display());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseService {
    db: Arc<Database>,
    db_path: PathBuf,
}

impl DatabaseService {
    /// Open (or create) the database at `db_path` and make sure every table exists
    ///
    /// Missing parent directories are created.
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        let fresh = !db_path.exists();
        ensure_parent_dir(&db_path)?;

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|source| DatabaseError::Open {
                path: db_path.clone(),
                source,
            })?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };
        service.create_schema(fresh).await?;

        tracing::info!(path = %service.db_path.display(), fresh, "Map database ready");
        Ok(service)
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Pragmas can return rows, so they go through `query` rather than `execute`
    async fn pragma(conn: &Connection, pragma: &str) -> Result<(), DatabaseError> {
        conn.query(pragma, ())
            .await
            .map_err(|e| DatabaseError::statement(pragma, e))?;
        Ok(())
    }

    async fn create_schema(&self, fresh: bool) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        Self::pragma(&conn, "PRAGMA journal_mode = WAL").await?;

        for (name, ddl) in SCHEMA.iter().chain(INDEXES) {
            conn.execute(ddl, ())
                .await
                .map_err(|e| DatabaseError::Schema(format!("{}: {}", name, e)))?;
        }

        if fresh {
            Self::pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)").await?;
        }
        Ok(())
    }

    /// Plain connection without per-connection pragmas
    pub fn connect(&self) -> Result<Connection, DatabaseError> {
        Ok(self.db.connect()?)
    }

    /// Connection with the busy timeout and foreign keys switched on
    ///
    /// Every store operation should use this; both settings are
    /// per-connection in SQLite.
    pub async fn connect_with_timeout(&self) -> Result<Connection, DatabaseError> {
        let conn = self.connect()?;
        Self::pragma(&conn, &format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS)).await?;
        Self::pragma(&conn, "PRAGMA foreign_keys = ON").await?;
        Ok(conn)
    }

    /// Connection with an open `BEGIN IMMEDIATE` transaction
    pub async fn begin_transaction(&self) -> Result<Connection, DatabaseError> {
        let conn = self.connect_with_timeout().await?;
        conn.execute("BEGIN IMMEDIATE", ())
            .await
            .map_err(|e| DatabaseError::statement("BEGIN IMMEDIATE", e))?;
        Ok(conn)
    }

    /// Commit when `result` is `Ok`, roll back otherwise, and hand `result` back
    pub async fn finish_transaction<T, E>(
        &self,
        conn: &Connection,
        result: Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DatabaseError>,
    {
        let value = match result {
            Ok(value) => value,
            Err(err) => {
                if let Err(e) = conn.execute("ROLLBACK", ()).await {
                    tracing::warn!(error = %e, "Rollback failed");
                }
                return Err(err);
            }
        };

        if let Err(e) = conn.execute("COMMIT", ()).await {
            let _ = conn.execute("ROLLBACK", ()).await;
            return Err(DatabaseError::statement("COMMIT", e).into());
        }
        Ok(value)
    }
}

fn ensure_parent_dir(db_path: &Path) -> Result<(), DatabaseError> {
    let Some(parent) = db_path.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => DatabaseError::PermissionDenied {
            path: db_path.to_path_buf(),
        },
        _ => DatabaseError::CreateDirectory(e),
    })
}
