//! Employee directory records

use serde::{Deserialize, Serialize};

use super::validation::{require_text, ValidationError};

/// A staff member who can be assigned to service requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "employeeID")]
    pub employee_id: String,

    #[serde(rename = "firstName")]
    pub first_name: String,

    #[serde(rename = "lastName")]
    pub last_name: String,

    pub email: String,

    pub position: String,
}

impl Employee {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("employeeID", &self.employee_id)?;
        require_text("firstName", &self.first_name)?;
        require_text("lastName", &self.last_name)?;
        require_text("email", &self.email)?;

        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(ValidationError::invalid_value(
                "email",
                format!("'{}' is not an email address", self.email),
            )),
        }
    }
}
