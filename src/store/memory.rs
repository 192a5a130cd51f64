use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{lead_not_found, LeadStore};
use crate::errors::AppError;
use crate::models::{Lead, LeadChanges, LeadId, NewLead};

/// Process-local lead table.
///
/// Used for local runs (`STORE_BACKEND=memory`) and tests. Rows are kept in
/// insertion order; listing sorts by `created_at` descending and breaks ties
/// by most recent insertion.
#[derive(Default)]
pub struct InMemoryLeadStore {
    rows: RwLock<Vec<Lead>>,
}

impl InMemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored leads.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl LeadStore for InMemoryLeadStore {
    async fn list(&self) -> Result<Vec<Lead>, AppError> {
        let rows = self.rows.read().await;
        let mut leads: Vec<Lead> = rows.iter().rev().cloned().collect();
        // Stable sort keeps newest insertion first among equal timestamps.
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }

    async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let now = Utc::now();
        let mut rows = self.rows.write().await;

        // UUIDv4 collisions are not a practical concern, but ids must never repeat.
        let mut id = Uuid::new_v4();
        while rows.iter().any(|row| row.id == id) {
            id = Uuid::new_v4();
        }

        let stored = Lead {
            id,
            name: lead.name.clone(),
            email: lead.email.clone(),
            company: lead.company.clone(),
            status: lead.status,
            created_at: now,
            updated_at: now,
        };
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, id: LeadId, changes: &LeadChanges) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| lead_not_found(id))?;

        row.name = changes.name.clone();
        row.email = changes.email.clone();
        row.company = changes.company.clone();
        row.status = changes.status;
        row.updated_at = Utc::now().max(row.updated_at);
        Ok(())
    }

    async fn delete(&self, id: LeadId) -> Result<(), AppError> {
        let mut rows = self.rows.write().await;
        let index = rows
            .iter()
            .position(|row| row.id == id)
            .ok_or_else(|| lead_not_found(id))?;
        rows.remove(index);
        Ok(())
    }
}
