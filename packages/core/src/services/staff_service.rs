//! Employee directory: CSV exchange and the email list used when assigning
//! service requests.

use crate::csv_io;
use crate::db::RecordStore;
use crate::models::Employee;
use crate::services::ServiceError;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct StaffService {
    records: Arc<dyn RecordStore>,
}

impl StaffService {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    pub async fn list_employees(&self) -> Result<Vec<Employee>, ServiceError> {
        Ok(self.records.list_employees().await?)
    }

    /// Emails of every employee, in employee id order
    pub async fn employee_emails(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self
            .records
            .list_employees()
            .await?
            .into_iter()
            .map(|e| e.email)
            .collect())
    }

    /// Replace the directory with the CSV contents
    #[instrument(skip_all, fields(bytes = text.len()))]
    pub async fn import_employees_csv(&self, text: &str) -> Result<usize, ServiceError> {
        let employees = csv_io::parse_employees(text)?;
        let count = employees.len();
        self.records.replace_employees(employees).await?;
        info!(count, "Imported employees from CSV");
        Ok(count)
    }

    pub async fn export_employees_csv(&self) -> Result<String, ServiceError> {
        let employees = self.records.list_employees().await?;
        csv_io::employees_to_csv(&employees).map_err(|e| ServiceError::Store(e.into()))
    }
}
