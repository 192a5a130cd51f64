use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Store-assigned lead identifier.
pub type LeadId = Uuid;

// ============ Domain Models ============

/// Sales pipeline status of a lead.
///
/// The usual progression is `new -> contacted -> converted`, but any status
/// can be set directly through an update and `converted` stays editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Converted,
}

impl LeadStatus {
    /// All statuses in pipeline order.
    pub const ALL: [LeadStatus; 3] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Converted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Converted => "converted",
        }
    }

    /// Next status in the usual progression, `None` once converted.
    pub fn next(&self) -> Option<LeadStatus> {
        match self {
            LeadStatus::New => Some(LeadStatus::Contacted),
            LeadStatus::Contacted => Some(LeadStatus::Converted),
            LeadStatus::Converted => None,
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(LeadStatus::New),
            "contacted" => Ok(LeadStatus::Contacted),
            "converted" => Ok(LeadStatus::Converted),
            other => Err(format!("unknown lead status '{}'", other)),
        }
    }
}

/// A sales contact record as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Unique identifier, assigned by the store on creation.
    pub id: LeadId,
    /// Contact name (never empty).
    pub name: String,
    /// Contact email address.
    pub email: String,
    /// Company name; `None` when the lead has no company.
    pub company: Option<String>,
    /// Pipeline status.
    pub status: LeadStatus,
    /// Timestamp of creation (store-assigned).
    pub created_at: DateTime<Utc>,
    /// Timestamp of last update (store-assigned).
    pub updated_at: DateTime<Utc>,
}

/// Raw `leads` row as read by sqlx; status is stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct LeadRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<LeadRecord> for Lead {
    type Error = String;

    fn try_from(record: LeadRecord) -> Result<Self, Self::Error> {
        Ok(Lead {
            id: record.id,
            name: record.name,
            email: record.email,
            company: record.company,
            status: record.status.parse()?,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// Validated payload for inserting a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    /// Serialized as an explicit `null` when absent.
    pub company: Option<String>,
    pub status: LeadStatus,
}

/// Validated full overwrite of a lead's writable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadChanges {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub status: LeadStatus,
}

// ============ API Request/Response Models ============

/// Unvalidated create input, as entered in the create form or posted to the API.
///
/// Every field defaults so that missing fields surface as field-level
/// validation messages rather than deserialization failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateLeadInput {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    /// Optional; `new` when absent or blank.
    pub status: Option<String>,
}

impl Default for CreateLeadInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            company: None,
            status: Some(LeadStatus::New.as_str().to_string()),
        }
    }
}

/// Unvalidated update input. Status is required on every edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateLeadInput {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub status: String,
}

impl From<&Lead> for UpdateLeadInput {
    /// Prefills an edit with the lead's current values.
    fn from(lead: &Lead) -> Self {
        Self {
            name: lead.name.clone(),
            email: lead.email.clone(),
            company: lead.company.clone(),
            status: lead.status.as_str().to_string(),
        }
    }
}

/// Query string accepted by the delete endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    /// Must be `true` for the deletion to proceed.
    #[serde(default)]
    pub confirm: bool,
}

/// Response payload for the scoring endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub lead_id: LeadId,
    pub score: u8,
    pub band: crate::scoring::ScoreBand,
    pub guidance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}
