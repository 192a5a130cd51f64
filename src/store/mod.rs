//! Lead store gateway.
//!
//! The store owns the `leads` table: it assigns ids and timestamps and is
//! the only source of truth. Every call is a single-row (or full-scan)
//! operation that the backend is expected to apply atomically.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{Lead, LeadChanges, LeadId, NewLead};

pub mod memory;
pub mod postgres;
pub mod rest;

pub use memory::InMemoryLeadStore;
pub use postgres::PgLeadStore;
pub use rest::RestLeadStore;

/// Remote table of leads.
///
/// Implementations report a missing row on `update`/`delete` as
/// `AppError::NotFound`, and any backend failure as an error whose
/// `message()` is fit to show to a user.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// All leads, newest `created_at` first.
    async fn list(&self) -> Result<Vec<Lead>, AppError>;

    /// Insert one lead and return it with store-assigned fields populated.
    async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError>;

    /// Overwrite the writable fields of one lead; refreshes `updated_at`.
    async fn update(&self, id: LeadId, changes: &LeadChanges) -> Result<(), AppError>;

    /// Delete one lead permanently.
    async fn delete(&self, id: LeadId) -> Result<(), AppError>;
}

pub(crate) fn lead_not_found(id: LeadId) -> AppError {
    AppError::NotFound(format!("Lead {} not found", id))
}
