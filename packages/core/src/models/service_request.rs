//! Service Request Data Structures
//!
//! Staff submit service requests against a room on the map. All request
//! types share a common envelope (`ServiceRequest`) and carry their
//! type-specific fields in [`RequestDetails`], which is stored as JSON in a
//! single `service_requests` table.
//!
//! # Lifecycle
//!
//! ```text
//! Unassigned -> Assigned -> InProgress -> Closed
//! ```
//!
//! Any non-closed request may move to any status; `Closed` is terminal.
//! Requests are never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::validation::{require_text, ValidationError};

/// Workflow status of a service request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Unassigned,
    Assigned,
    InProgress,
    Closed,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Unassigned" => Ok(Self::Unassigned),
            "Assigned" => Ok(Self::Assigned),
            "InProgress" => Ok(Self::InProgress),
            "Closed" => Ok(Self::Closed),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unassigned => write!(f, "Unassigned"),
            Self::Assigned => write!(f, "Assigned"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Closed => write!(f, "Closed"),
        }
    }
}

/// Urgency of a service request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Emergency,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Self::Low),
            "Medium" => Ok(Self::Medium),
            "High" => Ok(Self::High),
            "Emergency" => Ok(Self::Emergency),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Emergency => write!(f, "Emergency"),
        }
    }
}

/// Request type discriminator, also used in endpoint paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestKind {
    Flower,
    Gift,
    MedicalDevice,
    MedicineDelivery,
    Religious,
    RoomScheduling,
}

impl RequestKind {
    pub const ALL: [RequestKind; 6] = [
        Self::Flower,
        Self::Gift,
        Self::MedicalDevice,
        Self::MedicineDelivery,
        Self::Religious,
        Self::RoomScheduling,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flower => "flower",
            Self::Gift => "gift",
            Self::MedicalDevice => "medical-device",
            Self::MedicineDelivery => "medicine-delivery",
            Self::Religious => "religious",
            Self::RoomScheduling => "room-scheduling",
        }
    }
}

impl FromStr for RequestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Invalid request kind: {}", s))
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowerDetails {
    pub flower_type: String,
    pub quantity: u32,
    pub recipient: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftDetails {
    pub gift_description: String,
    pub recipient: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalDeviceDetails {
    pub device_name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineDeliveryDetails {
    pub medicine_name: String,
    pub dosage: String,
    pub patient_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReligiousDetails {
    pub religion: String,
    pub service_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSchedulingDetails {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Type-specific request fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RequestDetails {
    Flower(FlowerDetails),
    Gift(GiftDetails),
    MedicalDevice(MedicalDeviceDetails),
    MedicineDelivery(MedicineDeliveryDetails),
    Religious(ReligiousDetails),
    RoomScheduling(RoomSchedulingDetails),
}

impl RequestDetails {
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Flower(_) => RequestKind::Flower,
            Self::Gift(_) => RequestKind::Gift,
            Self::MedicalDevice(_) => RequestKind::MedicalDevice,
            Self::MedicineDelivery(_) => RequestKind::MedicineDelivery,
            Self::Religious(_) => RequestKind::Religious,
            Self::RoomScheduling(_) => RequestKind::RoomScheduling,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Flower(d) => {
                require_text("flowerType", &d.flower_type)?;
                require_text("recipient", &d.recipient)?;
                require_positive("quantity", d.quantity)
            }
            Self::Gift(d) => {
                require_text("giftDescription", &d.gift_description)?;
                require_text("recipient", &d.recipient)
            }
            Self::MedicalDevice(d) => {
                require_text("deviceName", &d.device_name)?;
                require_positive("quantity", d.quantity)
            }
            Self::MedicineDelivery(d) => {
                require_text("medicineName", &d.medicine_name)?;
                require_text("dosage", &d.dosage)?;
                require_text("patientName", &d.patient_name)
            }
            Self::Religious(d) => {
                require_text("religion", &d.religion)?;
                require_text("serviceType", &d.service_type)
            }
            Self::RoomScheduling(d) => {
                if d.start_time >= d.end_time {
                    return Err(ValidationError::invalid_value(
                        "endTime",
                        "must be after startTime",
                    ));
                }
                Ok(())
            }
        }
    }
}

fn require_positive(field: &str, value: u32) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::invalid_value(field, "must be at least 1"));
    }
    Ok(())
}

macro_rules! impl_into_details {
    ($($details:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$details> for RequestDetails {
                fn from(details: $details) -> Self {
                    Self::$variant(details)
                }
            }
        )*
    };
}

impl_into_details! {
    FlowerDetails => Flower,
    GiftDetails => Gift,
    MedicalDeviceDetails => MedicalDevice,
    MedicineDeliveryDetails => MedicineDelivery,
    ReligiousDetails => Religious,
    RoomSchedulingDetails => RoomScheduling,
}

/// A stored service request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    pub request_id: String,
    pub requested_by: String,
    /// Target room (node id)
    pub location: String,
    pub priority: Priority,
    pub status: RequestStatus,
    pub assigned_to: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub details: RequestDetails,
}

impl ServiceRequest {
    pub fn kind(&self) -> RequestKind {
        self.details.kind()
    }
}

/// Input for creating a service request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceRequest {
    pub requested_by: String,
    pub location: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: Option<String>,
    pub details: RequestDetails,
}

impl NewServiceRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("requestedBy", &self.requested_by)?;
        require_text("location", &self.location)?;
        self.details.validate()
    }
}

/// Flat form body for the per-type endpoints
///
/// The common fields sit next to the type-specific ones, e.g.
/// `{"requestedBy": "...", "location": "...", "flowerType": "Rose", ...}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestForm<D> {
    pub requested_by: String,
    pub location: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub details: D,
}

impl<D: Into<RequestDetails>> RequestForm<D> {
    pub fn into_new_request(self) -> NewServiceRequest {
        NewServiceRequest {
            requested_by: self.requested_by,
            location: self.location,
            priority: self.priority,
            notes: self.notes,
            details: self.details.into(),
        }
    }
}

/// Staff update to an existing request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestUpdate {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// Filter for listing requests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub kind: Option<RequestKind>,
    pub status: Option<RequestStatus>,
}
