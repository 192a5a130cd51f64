//! Input validation for lead create/update payloads.
//!
//! Validation runs before anything is sent to the store. Every failing field
//! gets its own message so forms can show them inline.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::models::{CreateLeadInput, LeadChanges, LeadStatus, NewLead, UpdateLeadInput};

pub const NAME_REQUIRED: &str = "Name is required";
pub const INVALID_EMAIL: &str = "Invalid email address";
pub const STATUS_REQUIRED: &str = "Status is required";
pub const INVALID_STATUS: &str = "Invalid status: expected one of new, contacted, converted";

// RFC 5322 simplified; the domain must contain at least one dot.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email regex is valid")
});

/// A validation message attached to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// All field errors found in one input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// First message reported for `field`, if any.
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.push(FieldError::new(field, message));
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Validate email address syntax.
///
/// Rejects leading/trailing dots and consecutive dots in the local part,
/// and domains without a top-level label.
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 || email.len() > 254 {
        return false;
    }

    let Some((local, _domain)) = email.rsplit_once('@') else {
        return false;
    };

    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }

    EMAIL_REGEX.is_match(email)
}

/// Absent and blank company names both mean "no company".
pub fn normalize_company(company: Option<&str>) -> Option<String> {
    company
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

fn check_contact(name: &str, email: &str, errors: &mut ValidationErrors) {
    if name.trim().is_empty() {
        errors.push("name", NAME_REQUIRED);
    }
    if !is_valid_email(email) {
        errors.push("email", INVALID_EMAIL);
    }
}

/// Validate a create input; status defaults to `new` when absent or blank.
pub fn validate_create(input: &CreateLeadInput) -> Result<NewLead, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_contact(&input.name, &input.email, &mut errors);

    let status = match input.status.as_deref().map(str::trim) {
        None | Some("") => Some(LeadStatus::New),
        Some(raw) => match raw.parse::<LeadStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.push("status", INVALID_STATUS);
                None
            }
        },
    };

    match status {
        Some(status) if errors.is_empty() => Ok(NewLead {
            name: input.name.trim().to_string(),
            email: input.email.clone(),
            company: normalize_company(input.company.as_deref()),
            status,
        }),
        _ => Err(errors),
    }
}

/// Validate an update input; status is required.
pub fn validate_update(input: &UpdateLeadInput) -> Result<LeadChanges, ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_contact(&input.name, &input.email, &mut errors);

    let status = match input.status.trim() {
        "" => {
            errors.push("status", STATUS_REQUIRED);
            None
        }
        raw => match raw.parse::<LeadStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                errors.push("status", INVALID_STATUS);
                None
            }
        },
    };

    match status {
        Some(status) if errors.is_empty() => Ok(LeadChanges {
            name: input.name.trim().to_string(),
            email: input.email.clone(),
            company: normalize_company(input.company.as_deref()),
            status,
        }),
        _ => Err(errors),
    }
}
