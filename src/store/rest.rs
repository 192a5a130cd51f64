use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;

use super::{lead_not_found, LeadStore};
use crate::errors::AppError;
use crate::models::{Lead, LeadChanges, LeadId, NewLead};

/// Client for the hosted backend's REST interface to the leads table.
///
/// Speaks the PostgREST dialect: `select`/`order` query parameters,
/// `id=eq.<id>` row filters and `Prefer: return=representation` so that
/// writes echo the affected rows back.
#[derive(Clone)]
pub struct RestLeadStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
}

/// Error body returned by the backend on failed requests.
#[derive(Debug, Deserialize)]
struct StoreErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl RestLeadStore {
    /// Creates a new `RestLeadStore`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The project URL of the hosted backend.
    /// * `api_key` - The API key sent as `apikey` and bearer token.
    /// * `table` - The name of the leads table.
    pub fn new(base_url: String, api_key: String, table: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::StoreError(format!("Failed to create store client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table,
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Sends a request and maps transport and non-2xx failures to `StoreError`.
    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response, AppError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| AppError::StoreError(format!("Store request failed: {}", e)))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<StoreErrorBody>(&text)
            .ok()
            .and_then(|body| body.message.or(body.error))
            .unwrap_or_else(|| format!("Store returned {}: {}", status, text));

        tracing::warn!("Store {} failed ({}): {}", action, status, message);
        Err(AppError::StoreError(message))
    }

    async fn rows(response: Response) -> Result<Vec<Lead>, AppError> {
        response
            .json()
            .await
            .map_err(|e| AppError::StoreError(format!("Failed to parse store response: {}", e)))
    }
}

#[async_trait]
impl LeadStore for RestLeadStore {
    async fn list(&self) -> Result<Vec<Lead>, AppError> {
        let request = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let response = self.send(request, "select").await?;
        Self::rows(response).await
    }

    async fn insert(&self, lead: &NewLead) -> Result<Lead, AppError> {
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(lead);
        let response = self.send(request, "insert").await?;

        let created = Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::StoreError("Insert returned no rows".to_string()))?;

        tracing::info!("✓ Lead stored: {}", created.id);
        Ok(created)
    }

    async fn update(&self, id: LeadId, changes: &LeadChanges) -> Result<(), AppError> {
        let request = self
            .client
            .patch(self.table_url())
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(changes);
        let response = self.send(request, "update").await?;

        if Self::rows(response).await?.is_empty() {
            return Err(lead_not_found(id));
        }
        Ok(())
    }

    async fn delete(&self, id: LeadId) -> Result<(), AppError> {
        let request = self
            .client
            .delete(self.table_url())
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation");
        let response = self.send(request, "delete").await?;

        if Self::rows(response).await?.is_empty() {
            return Err(lead_not_found(id));
        }
        Ok(())
    }
}
