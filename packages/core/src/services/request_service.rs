//! Request Service - Service Request Lifecycle
//!
//! Staff create requests against a room on the map; the request then moves
//! through `Unassigned -> Assigned -> InProgress -> Closed`. Transitions
//! between the open states are unrestricted, but `Closed` is terminal.
//!
//! # Examples
//!
//! ```rust,no_run
//! use wayfinder_core::models::{FlowerDetails, NewServiceRequest, Priority};
//! use wayfinder_core::services::RequestService;
//!
//! # async fn example(service: RequestService) -> Result<(), Box<dyn std::error::Error>> {
//! let request = service
//!     .create(NewServiceRequest {
//!         requested_by: "Nurse Joy".to_string(),
//!         location: "CCONF001L1".to_string(),
//!         priority: Priority::High,
//!         notes: None,
//!         details: FlowerDetails {
//!             flower_type: "Tulip".to_string(),
//!             quantity: 12,
//!             recipient: "Room 4".to_string(),
//!             message: Some("Get well soon".to_string()),
//!         }
//!         .into(),
//!     })
//!     .await?;
//! println!("created {}", request.request_id);
//! # Ok(())
//! # }
//! ```

use crate::db::{MapStore, RecordStore};
use crate::models::{
    NewServiceRequest, RequestFilter, RequestStatus, RequestUpdate, ServiceRequest,
    ValidationError,
};
use crate::services::ServiceError;
use chrono::{SubsecRound, Utc};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

pub struct RequestService {
    records: Arc<dyn RecordStore>,
    map: Arc<dyn MapStore>,
}

impl RequestService {
    pub fn new(records: Arc<dyn RecordStore>, map: Arc<dyn MapStore>) -> Self {
        Self { records, map }
    }

    /// Validate and persist a new request with status `Unassigned`
    #[instrument(skip_all, fields(kind = %request.details.kind(), location = %request.location))]
    pub async fn create(&self, request: NewServiceRequest) -> Result<ServiceRequest, ServiceError> {
        request.validate()?;

        if self.map.get_node(&request.location).await?.is_none() {
            return Err(ValidationError::invalid_reference(format!(
                "Location '{}' is not a node on the map",
                request.location
            ))
            .into());
        }

        // Stored timestamps keep microseconds
        let now = Utc::now().trunc_subsecs(6);
        let stored = ServiceRequest {
            request_id: Uuid::new_v4().to_string(),
            requested_by: request.requested_by,
            location: request.location,
            priority: request.priority,
            status: RequestStatus::Unassigned,
            assigned_to: None,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
            created_at: now,
            updated_at: now,
            details: request.details,
        };

        self.records.insert_request(stored.clone()).await?;
        info!(request_id = %stored.request_id, "Service request created");
        Ok(stored)
    }

    pub async fn get(&self, request_id: &str) -> Result<ServiceRequest, ServiceError> {
        self.records
            .get_request(request_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Service request", request_id))
    }

    /// Requests matching `filter`, newest first
    pub async fn list(&self, filter: RequestFilter) -> Result<Vec<ServiceRequest>, ServiceError> {
        Ok(self.records.list_requests(filter).await?)
    }

    /// Change status and/or assignee
    ///
    /// Assigning someone to an `Unassigned` request without naming a status
    /// moves it to `Assigned`. Closed requests cannot change.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        request_id: &str,
        update: RequestUpdate,
    ) -> Result<ServiceRequest, ServiceError> {
        if update.status.is_none() && update.assigned_to.is_none() {
            return Err(ValidationError::MissingField("status".to_string()).into());
        }

        let mut request = self.get(request_id).await?;
        if request.status.is_terminal() {
            return Err(ServiceError::conflict(format!(
                "Service request '{}' is closed",
                request_id
            )));
        }

        if let Some(assignee) = update.assigned_to {
            let assignee = assignee.trim().to_string();
            if assignee.is_empty() {
                return Err(ValidationError::MissingField("assignedTo".to_string()).into());
            }
            let employees = self.records.list_employees().await?;
            if !employees.iter().any(|e| e.email == assignee) {
                return Err(ValidationError::invalid_reference(format!(
                    "No employee with email '{}'",
                    assignee
                ))
                .into());
            }
            request.assigned_to = Some(assignee);
        }

        request.status = match update.status {
            Some(status) => status,
            None if request.status == RequestStatus::Unassigned => RequestStatus::Assigned,
            None => request.status,
        };
        request.updated_at = Utc::now().trunc_subsecs(6);

        if !self.records.update_request(&request).await? {
            // Closed (or gone) between the read above and this write
            return Err(ServiceError::conflict(format!(
                "Service request '{}' is closed",
                request_id
            )));
        }
        info!(status = %request.status, "Service request updated");
        Ok(request)
    }
}
