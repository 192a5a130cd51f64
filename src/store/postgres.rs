use async_trait::async_trait;
use sqlx::PgPool;

use super::{lead_not_found, LeadStore};
use crate::errors::{AppError, ResultExt};
use crate::models::{Lead, LeadChanges, LeadId, LeadRecord, NewLead};

const LEAD_COLUMNS: &str = "id, name, email, company, status, created_at, updated_at";

/// Lead store backed directly by a Postgres table.
///
/// The table name is formatted into the statements, so it must already be
/// restricted to `[A-Za-z0-9_]` (see `Config::from_lookup`).
#[derive(Clone)]
pub struct PgLeadStore {
    pool: PgPool,
    table: String,
}

impl PgLeadStore {
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }

    fn select_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY created_at DESC",
            LEAD_COLUMNS, self.table
        )
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (name, email, company, status) VALUES ($1, $2, $3, $4) RETURNING {}",
            self.table, LEAD_COLUMNS
        )
    }

    fn update_sql(&self) -> String {
        format!(
            "UPDATE {} SET name = $2, email = $3, company = $4, status = $5, updated_at = now() WHERE id = $1",
            self.table
        )
    }

    fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE id = $1", self.table)
    }
}

fn into_lead(record: LeadRecord) -> Result<Lead, AppError> {
    let id = record.id;
    Lead::try_from(record)
        .map_err(|e| AppError::InternalError(format!("Invalid lead row {}: {}", id, e)))
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn list(&self) -> Result<Vec<Lead>, AppError> {
        let records = sqlx::query_as::<_, LeadRecord>(&self.select_sql())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list leads")?;

        records.into_iter().map(into_lead).collect()
    }

    async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let record = sqlx::query_as::<_, LeadRecord>(&self.insert_sql())
            .bind(&lead.name)
            .bind(&lead.email)
            .bind(&lead.company)
            .bind(lead.status.as_str())
            .fetch_one(&self.pool)
            .await
            .context("Failed to insert lead")?;

        tracing::debug!("Inserted lead {}", record.id);
        into_lead(record)
    }

    async fn update(&self, id: LeadId, changes: &LeadChanges) -> Result<(), AppError> {
        let result = sqlx::query(&self.update_sql())
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.email)
            .bind(&changes.company)
            .bind(changes.status.as_str())
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to update lead {}", id))?;

        if result.rows_affected() == 0 {
            return Err(lead_not_found(id));
        }
        Ok(())
    }

    async fn delete(&self, id: LeadId) -> Result<(), AppError> {
        let result = sqlx::query(&self.delete_sql())
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to delete lead {}", id))?;

        if result.rows_affected() == 0 {
            return Err(lead_not_found(id));
        }
        Ok(())
    }
}
