//! In-memory store doubles for service unit tests

use crate::db::{MapStore, NodeDeletion, RecordStore};
use crate::models::{Edge, Employee, HighScore, Node, RequestFilter, ServiceRequest};
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
pub struct InMemoryMapStore {
    nodes: Mutex<Vec<Node>>,
    edges: Mutex<Vec<Edge>>,
}

impl InMemoryMapStore {
    pub fn with_map(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            nodes: Mutex::new(nodes),
            edges: Mutex::new(edges),
        }
    }
}

/// Same key rules as the database: unique edge ids, endpoints must exist
fn check_edges(nodes: &[Node], edges: &[Edge]) -> Result<()> {
    let mut seen = HashSet::new();
    for edge in edges {
        if !seen.insert(edge.edge_id.as_str()) {
            bail!("duplicate edge {}", edge.edge_id);
        }
        for endpoint in [&edge.start_node_id, &edge.end_node_id] {
            if !nodes.iter().any(|n| &n.node_id == endpoint) {
                bail!("edge {} references missing node {}", edge.edge_id, endpoint);
            }
        }
    }
    Ok(())
}

#[async_trait]
impl MapStore for InMemoryMapStore {
    async fn list_nodes(&self) -> Result<Vec<Node>> {
        Ok(self.nodes.lock().unwrap().clone())
    }

    async fn get_node(&self, node_id: &str) -> Result<Option<Node>> {
        Ok(self
            .nodes
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.node_id == node_id)
            .cloned())
    }

    async fn insert_nodes_with_edges(&self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<()> {
        let mut stored_nodes = self.nodes.lock().unwrap();
        let mut stored_edges = self.edges.lock().unwrap();
        for node in &nodes {
            if stored_nodes.iter().any(|n| n.node_id == node.node_id) {
                bail!("duplicate node {}", node.node_id);
            }
        }
        let mut next_nodes = stored_nodes.clone();
        next_nodes.extend(nodes);
        let mut next_edges = stored_edges.clone();
        next_edges.extend(edges);
        check_edges(&next_nodes, &next_edges)?;
        *stored_nodes = next_nodes;
        *stored_edges = next_edges;
        Ok(())
    }

    async fn update_nodes(&self, nodes: Vec<Node>) -> Result<u64> {
        let mut stored = self.nodes.lock().unwrap();
        let mut updated = 0;
        for node in nodes {
            if let Some(slot) = stored.iter_mut().find(|n| n.node_id == node.node_id) {
                *slot = node;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete_nodes(&self, node_ids: &[String]) -> Result<NodeDeletion> {
        let mut nodes = self.nodes.lock().unwrap();
        let mut edges = self.edges.lock().unwrap();
        let (nodes_before, edges_before) = (nodes.len(), edges.len());
        nodes.retain(|n| !node_ids.contains(&n.node_id));
        edges.retain(|e| !node_ids.iter().any(|id| e.touches(id)));
        Ok(NodeDeletion {
            nodes_deleted: (nodes_before - nodes.len()) as u64,
            edges_deleted: (edges_before - edges.len()) as u64,
        })
    }

    async fn replace_nodes(&self, nodes: Vec<Node>) -> Result<()> {
        *self.nodes.lock().unwrap() = nodes;
        self.edges.lock().unwrap().clear();
        Ok(())
    }

    async fn list_edges(&self) -> Result<Vec<Edge>> {
        Ok(self.edges.lock().unwrap().clone())
    }

    async fn apply_edge_changes(&self, remove: &[String], insert: Vec<Edge>) -> Result<u64> {
        let nodes = self.nodes.lock().unwrap();
        let mut edges = self.edges.lock().unwrap();
        let mut next: Vec<Edge> = edges
            .iter()
            .filter(|e| !remove.contains(&e.edge_id))
            .cloned()
            .collect();
        let removed = (edges.len() - next.len()) as u64;
        next.extend(insert);
        check_edges(&nodes, &next)?;
        *edges = next;
        Ok(removed)
    }

    async fn replace_edges(&self, edges: Vec<Edge>) -> Result<()> {
        check_edges(&self.nodes.lock().unwrap(), &edges)?;
        *self.edges.lock().unwrap() = edges;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRecordStore {
    employees: Mutex<Vec<Employee>>,
    requests: Mutex<Vec<ServiceRequest>>,
    scores: Mutex<Vec<HighScore>>,
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list_employees(&self) -> Result<Vec<Employee>> {
        let mut employees = self.employees.lock().unwrap().clone();
        employees.sort_by(|a, b| a.employee_id.cmp(&b.employee_id));
        Ok(employees)
    }

    async fn replace_employees(&self, employees: Vec<Employee>) -> Result<()> {
        *self.employees.lock().unwrap() = employees;
        Ok(())
    }

    async fn insert_request(&self, request: ServiceRequest) -> Result<()> {
        self.requests.lock().unwrap().push(request);
        Ok(())
    }

    async fn get_request(&self, request_id: &str) -> Result<Option<ServiceRequest>> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.request_id == request_id)
            .cloned())
    }

    async fn list_requests(&self, filter: RequestFilter) -> Result<Vec<ServiceRequest>> {
        let mut requests: Vec<ServiceRequest> = self
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| filter.kind.map_or(true, |k| r.kind() == k))
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        requests.reverse();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn update_request(&self, request: &ServiceRequest) -> Result<bool> {
        let mut requests = self.requests.lock().unwrap();
        match requests
            .iter_mut()
            .find(|r| r.request_id == request.request_id && !r.status.is_terminal())
        {
            Some(slot) => {
                *slot = request.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_high_score(&self, score: HighScore) -> Result<()> {
        self.scores.lock().unwrap().push(score);
        Ok(())
    }

    async fn top_high_scores(
        &self,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<HighScore>> {
        let mut scores: Vec<HighScore> = self
            .scores
            .lock()
            .unwrap()
            .iter()
            .filter(|s| since.map_or(true, |ts| s.created_at >= ts))
            .cloned()
            .collect();
        scores.sort_by(|a, b| b.time.cmp(&a.time).then(a.created_at.cmp(&b.created_at)));
        scores.truncate(limit);
        Ok(scores)
    }
}
