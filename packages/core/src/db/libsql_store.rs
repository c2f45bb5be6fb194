//! LibsqlStore - MapStore and RecordStore over libsql
//!
//! Holds the SQL for every persistence operation and converts libsql rows
//! into models. Multi-row writes run inside a single transaction opened via
//! [`DatabaseService::begin_transaction`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use wayfinder_core::db::{DatabaseService, LibsqlStore, MapStore};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/map.db")).await?);
//!     let store: Arc<dyn MapStore> = Arc::new(LibsqlStore::new(db));
//!     let nodes = store.list_nodes().await?;
//!     println!("{} nodes", nodes.len());
//!     Ok(())
//! }
//! ```

use crate::db::{DatabaseService, MapStore, NodeDeletion, RecordStore};
use crate::models::{Edge, Employee, HighScore, Node, RequestDetails, RequestFilter, ServiceRequest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Row, Value};
use std::sync::Arc;

const NODE_COLUMNS: &str = "node_id, x, y, floor, building, node_type, long_name, short_name";
const EDGE_COLUMNS: &str = "edge_id, start_node_id, end_node_id";
const EMPLOYEE_COLUMNS: &str = "employee_id, first_name, last_name, email, position";
const REQUEST_COLUMNS: &str = "request_id, kind, requested_by, location, priority, status, \
                               assigned_to, notes, details, created_at, updated_at";
const SCORE_COLUMNS: &str = "score_id, initials, time, created_at";

/// libsql-backed implementation of the data-access traits
pub struct LibsqlStore {
    db: Arc<DatabaseService>,
}

impl LibsqlStore {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Timestamps are stored as fixed-width RFC3339 so they sort lexically
    fn format_timestamp(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("Unable to parse timestamp '{}'", s))
    }

    fn row_to_node(row: &Row) -> Result<Node> {
        Ok(Node {
            node_id: row.get(0).context("Failed to get node_id")?,
            x: row.get(1).context("Failed to get x")?,
            y: row.get(2).context("Failed to get y")?,
            floor: row.get(3).context("Failed to get floor")?,
            building: row.get(4).context("Failed to get building")?,
            node_type: row.get(5).context("Failed to get node_type")?,
            long_name: row.get(6).context("Failed to get long_name")?,
            short_name: row.get(7).context("Failed to get short_name")?,
        })
    }

    fn row_to_edge(row: &Row) -> Result<Edge> {
        Ok(Edge {
            edge_id: row.get(0).context("Failed to get edge_id")?,
            start_node_id: row.get(1).context("Failed to get start_node_id")?,
            end_node_id: row.get(2).context("Failed to get end_node_id")?,
        })
    }

    fn row_to_employee(row: &Row) -> Result<Employee> {
        Ok(Employee {
            employee_id: row.get(0).context("Failed to get employee_id")?,
            first_name: row.get(1).context("Failed to get first_name")?,
            last_name: row.get(2).context("Failed to get last_name")?,
            email: row.get(3).context("Failed to get email")?,
            position: row.get(4).context("Failed to get position")?,
        })
    }

    fn row_to_request(row: &Row) -> Result<ServiceRequest> {
        let priority: String = row.get(4).context("Failed to get priority")?;
        let status: String = row.get(5).context("Failed to get status")?;
        let details_json: String = row.get(8).context("Failed to get details")?;
        let created_at: String = row.get(9).context("Failed to get created_at")?;
        let updated_at: String = row.get(10).context("Failed to get updated_at")?;

        let details: RequestDetails =
            serde_json::from_str(&details_json).context("Failed to parse request details")?;

        Ok(ServiceRequest {
            request_id: row.get(0).context("Failed to get request_id")?,
            requested_by: row.get(2).context("Failed to get requested_by")?,
            location: row.get(3).context("Failed to get location")?,
            priority: priority.parse().map_err(anyhow::Error::msg)?,
            status: status.parse().map_err(anyhow::Error::msg)?,
            assigned_to: row.get(6).context("Failed to get assigned_to")?,
            notes: row.get(7).context("Failed to get notes")?,
            created_at: Self::parse_timestamp(&created_at)?,
            updated_at: Self::parse_timestamp(&updated_at)?,
            details,
        })
    }

    fn row_to_score(row: &Row) -> Result<HighScore> {
        let created_at: String = row.get(3).context("Failed to get created_at")?;
        Ok(HighScore {
            score_id: row.get(0).context("Failed to get score_id")?,
            initials: row.get(1).context("Failed to get initials")?,
            time: row.get(2).context("Failed to get time")?,
            created_at: Self::parse_timestamp(&created_at)?,
        })
    }

    /// Run a query and convert every row
    async fn query_all<T>(
        &self,
        sql: &str,
        params: Vec<Value>,
        convert: fn(&Row) -> Result<T>,
    ) -> Result<Vec<T>> {
        let conn = self.db.connect_with_timeout().await?;
        let mut rows = conn
            .query(sql, params)
            .await
            .with_context(|| format!("Failed to execute query: {}", sql))?;

        let mut items = Vec::new();
        while let Some(row) = rows.next().await.context("Failed to read row")? {
            items.push(convert(&row)?);
        }
        Ok(items)
    }

    async fn insert_node(conn: &Connection, node: &Node) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO nodes ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                NODE_COLUMNS
            ),
            (
                node.node_id.as_str(),
                node.x,
                node.y,
                node.floor.as_str(),
                node.building.as_str(),
                node.node_type.as_str(),
                node.long_name.as_str(),
                node.short_name.as_str(),
            ),
        )
        .await
        .with_context(|| format!("Failed to insert node '{}'", node.node_id))?;
        Ok(())
    }

    async fn insert_edge(conn: &Connection, edge: &Edge) -> Result<()> {
        conn.execute(
            &format!("INSERT INTO edges ({}) VALUES (?, ?, ?)", EDGE_COLUMNS),
            (
                edge.edge_id.as_str(),
                edge.start_node_id.as_str(),
                edge.end_node_id.as_str(),
            ),
        )
        .await
        .with_context(|| format!("Failed to insert edge '{}'", edge.edge_id))?;
        Ok(())
    }

    async fn insert_employee(conn: &Connection, employee: &Employee) -> Result<()> {
        conn.execute(
            &format!("INSERT INTO employees ({}) VALUES (?, ?, ?, ?, ?)", EMPLOYEE_COLUMNS),
            (
                employee.employee_id.as_str(),
                employee.first_name.as_str(),
                employee.last_name.as_str(),
                employee.email.as_str(),
                employee.position.as_str(),
            ),
        )
        .await
        .with_context(|| format!("Failed to insert employee '{}'", employee.employee_id))?;
        Ok(())
    }

    async fn write_nodes_with_edges(conn: &Connection, nodes: &[Node], edges: &[Edge]) -> Result<()> {
        for node in nodes {
            Self::insert_node(conn, node).await?;
        }
        for edge in edges {
            Self::insert_edge(conn, edge).await?;
        }
        Ok(())
    }

    async fn write_node_updates(conn: &Connection, nodes: &[Node]) -> Result<u64> {
        let mut updated = 0;
        for node in nodes {
            updated += conn
                .execute(
                    "UPDATE nodes SET x = ?, y = ?, floor = ?, building = ?, node_type = ?,
                            long_name = ?, short_name = ?
                     WHERE node_id = ?",
                    (
                        node.x,
                        node.y,
                        node.floor.as_str(),
                        node.building.as_str(),
                        node.node_type.as_str(),
                        node.long_name.as_str(),
                        node.short_name.as_str(),
                        node.node_id.as_str(),
                    ),
                )
                .await
                .with_context(|| format!("Failed to update node '{}'", node.node_id))?;
        }
        Ok(updated)
    }

    async fn write_node_deletions(conn: &Connection, node_ids: &[String]) -> Result<NodeDeletion> {
        let mut deletion = NodeDeletion::default();
        for node_id in node_ids {
            deletion.edges_deleted += conn
                .execute(
                    "DELETE FROM edges WHERE start_node_id = ? OR end_node_id = ?",
                    (node_id.as_str(), node_id.as_str()),
                )
                .await
                .with_context(|| format!("Failed to delete edges of node '{}'", node_id))?;
            deletion.nodes_deleted += conn
                .execute("DELETE FROM nodes WHERE node_id = ?", [node_id.as_str()])
                .await
                .with_context(|| format!("Failed to delete node '{}'", node_id))?;
        }
        Ok(deletion)
    }

    async fn write_node_replacement(conn: &Connection, nodes: &[Node]) -> Result<()> {
        conn.execute("DELETE FROM edges", ())
            .await
            .context("Failed to clear edges")?;
        conn.execute("DELETE FROM nodes", ())
            .await
            .context("Failed to clear nodes")?;
        for node in nodes {
            Self::insert_node(conn, node).await?;
        }
        Ok(())
    }

    async fn write_edge_changes(conn: &Connection, remove: &[String], insert: &[Edge]) -> Result<u64> {
        let mut removed = 0;
        for edge_id in remove {
            removed += conn
                .execute("DELETE FROM edges WHERE edge_id = ?", [edge_id.as_str()])
                .await
                .with_context(|| format!("Failed to delete edge '{}'", edge_id))?;
        }
        for edge in insert {
            Self::insert_edge(conn, edge).await?;
        }
        Ok(removed)
    }

    async fn write_edge_replacement(conn: &Connection, edges: &[Edge]) -> Result<()> {
        conn.execute("DELETE FROM edges", ())
            .await
            .context("Failed to clear edges")?;
        for edge in edges {
            Self::insert_edge(conn, edge).await?;
        }
        Ok(())
    }

    async fn write_employee_replacement(conn: &Connection, employees: &[Employee]) -> Result<()> {
        conn.execute("DELETE FROM employees", ())
            .await
            .context("Failed to clear employees")?;
        for employee in employees {
            Self::insert_employee(conn, employee).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl MapStore for LibsqlStore {
    async fn list_nodes(&self) -> Result<Vec<Node>> {
        self.query_all(
            &format!("SELECT {} FROM nodes ORDER BY rowid", NODE_COLUMNS),
            Vec::new(),
            Self::row_to_node,
        )
        .await
    }

    async fn get_node(&self, node_id: &str) -> Result<Option<Node>> {
        let mut nodes = self
            .query_all(
                &format!("SELECT {} FROM nodes WHERE node_id = ?", NODE_COLUMNS),
                vec![Value::from(node_id)],
                Self::row_to_node,
            )
            .await?;
        Ok(nodes.pop())
    }

    async fn insert_nodes_with_edges(&self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<()> {
        let conn = self.db.begin_transaction().await?;
        let result = Self::write_nodes_with_edges(&conn, &nodes, &edges).await;
        self.db.finish_transaction(&conn, result).await
    }

    async fn update_nodes(&self, nodes: Vec<Node>) -> Result<u64> {
        let conn = self.db.begin_transaction().await?;
        let result = Self::write_node_updates(&conn, &nodes).await;
        self.db.finish_transaction(&conn, result).await
    }

    async fn delete_nodes(&self, node_ids: &[String]) -> Result<NodeDeletion> {
        let conn = self.db.begin_transaction().await?;
        let result = Self::write_node_deletions(&conn, node_ids).await;
        self.db.finish_transaction(&conn, result).await
    }

    async fn replace_nodes(&self, nodes: Vec<Node>) -> Result<()> {
        let conn = self.db.begin_transaction().await?;
        let result = Self::write_node_replacement(&conn, &nodes).await;
        self.db.finish_transaction(&conn, result).await
    }

    async fn list_edges(&self) -> Result<Vec<Edge>> {
        self.query_all(
            &format!("SELECT {} FROM edges ORDER BY rowid", EDGE_COLUMNS),
            Vec::new(),
            Self::row_to_edge,
        )
        .await
    }

    async fn apply_edge_changes(&self, remove: &[String], insert: Vec<Edge>) -> Result<u64> {
        let conn = self.db.begin_transaction().await?;
        let result = Self::write_edge_changes(&conn, remove, &insert).await;
        self.db.finish_transaction(&conn, result).await
    }

    async fn replace_edges(&self, edges: Vec<Edge>) -> Result<()> {
        let conn = self.db.begin_transaction().await?;
        let result = Self::write_edge_replacement(&conn, &edges).await;
        self.db.finish_transaction(&conn, result).await
    }
}

#[async_trait]
impl RecordStore for LibsqlStore {
    async fn list_employees(&self) -> Result<Vec<Employee>> {
        self.query_all(
            &format!("SELECT {} FROM employees ORDER BY employee_id", EMPLOYEE_COLUMNS),
            Vec::new(),
            Self::row_to_employee,
        )
        .await
    }

    async fn replace_employees(&self, employees: Vec<Employee>) -> Result<()> {
        let conn = self.db.begin_transaction().await?;
        let result = Self::write_employee_replacement(&conn, &employees).await;
        self.db.finish_transaction(&conn, result).await
    }

    async fn insert_request(&self, request: ServiceRequest) -> Result<()> {
        let details =
            serde_json::to_string(&request.details).context("Failed to serialize details")?;
        let conn = self.db.connect_with_timeout().await?;

        conn.execute(
            &format!(
                "INSERT INTO service_requests ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                REQUEST_COLUMNS
            ),
            libsql::params![
                request.request_id.as_str(),
                request.kind().as_str(),
                request.requested_by.as_str(),
                request.location.as_str(),
                request.priority.to_string(),
                request.status.to_string(),
                request.assigned_to.clone(),
                request.notes.clone(),
                details,
                Self::format_timestamp(&request.created_at),
                Self::format_timestamp(&request.updated_at),
            ],
        )
        .await
        .with_context(|| format!("Failed to insert service request '{}'", request.request_id))?;

        Ok(())
    }

    async fn get_request(&self, request_id: &str) -> Result<Option<ServiceRequest>> {
        let mut requests = self
            .query_all(
                &format!(
                    "SELECT {} FROM service_requests WHERE request_id = ?",
                    REQUEST_COLUMNS
                ),
                vec![Value::from(request_id)],
                Self::row_to_request,
            )
            .await?;
        Ok(requests.pop())
    }

    async fn list_requests(&self, filter: RequestFilter) -> Result<Vec<ServiceRequest>> {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(kind) = filter.kind {
            conditions.push("kind = ?");
            params.push(Value::from(kind.as_str()));
        }
        if let Some(status) = filter.status {
            conditions.push("status = ?");
            params.push(Value::from(status.to_string()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        self.query_all(
            &format!(
                "SELECT {} FROM service_requests{} ORDER BY created_at DESC, rowid DESC",
                REQUEST_COLUMNS, where_clause
            ),
            params,
            Self::row_to_request,
        )
        .await
    }

    async fn update_request(&self, request: &ServiceRequest) -> Result<bool> {
        let conn = self.db.connect_with_timeout().await?;
        let changed = conn
            .execute(
                "UPDATE service_requests SET status = ?, assigned_to = ?, updated_at = ?
                 WHERE request_id = ? AND status <> 'Closed'",
                (
                    request.status.to_string(),
                    request.assigned_to.clone(),
                    Self::format_timestamp(&request.updated_at),
                    request.request_id.as_str(),
                ),
            )
            .await
            .with_context(|| {
                format!("Failed to update service request '{}'", request.request_id)
            })?;
        Ok(changed > 0)
    }

    async fn insert_high_score(&self, score: HighScore) -> Result<()> {
        let conn = self.db.connect_with_timeout().await?;
        conn.execute(
            &format!("INSERT INTO high_scores ({}) VALUES (?, ?, ?, ?)", SCORE_COLUMNS),
            (
                score.score_id.as_str(),
                score.initials.as_str(),
                score.time,
                Self::format_timestamp(&score.created_at),
            ),
        )
        .await
        .context("Failed to insert high score")?;
        Ok(())
    }

    async fn top_high_scores(
        &self,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<HighScore>> {
        let since = since
            .map(|ts| Self::format_timestamp(&ts))
            .unwrap_or_default();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.query_all(
            &format!(
                "SELECT {} FROM high_scores WHERE created_at >= ?
                 ORDER BY time DESC, created_at ASC, rowid ASC LIMIT ?",
                SCORE_COLUMNS
            ),
            vec![Value::from(since), Value::from(limit)],
            Self::row_to_score,
        )
        .await
    }
}
