//! RecordStore Trait - Data Access for Staff Records
//!
//! Covers the employee directory, service requests and the minigame
//! leaderboard. Like [`MapStore`](crate::db::MapStore) it is injected into
//! the services as `Arc<dyn RecordStore>`.

use crate::models::{Employee, HighScore, RequestFilter, ServiceRequest};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait RecordStore: Send + Sync {
    //
    // EMPLOYEES
    //

    /// All employees, ordered by id
    async fn list_employees(&self) -> Result<Vec<Employee>>;

    /// Bulk replace the employee directory
    async fn replace_employees(&self, employees: Vec<Employee>) -> Result<()>;

    //
    // SERVICE REQUESTS
    //

    async fn insert_request(&self, request: ServiceRequest) -> Result<()>;

    async fn get_request(&self, request_id: &str) -> Result<Option<ServiceRequest>>;

    /// Requests matching `filter`, newest first
    async fn list_requests(&self, filter: RequestFilter) -> Result<Vec<ServiceRequest>>;

    /// Persist status, assignee and `updated_at` of an open request
    ///
    /// Returns `false` when nothing was written because the request is
    /// missing or already `Closed` in storage.
    async fn update_request(&self, request: &ServiceRequest) -> Result<bool>;

    //
    // HIGH SCORES
    //

    async fn insert_high_score(&self, score: HighScore) -> Result<()>;

    /// Longest play times first (ties: earliest submission), optionally
    /// restricted to scores created at or after `since`
    async fn top_high_scores(
        &self,
        since: Option<DateTime<Utc>>,
        limit: usize,
    ) -> Result<Vec<HighScore>>;
}
