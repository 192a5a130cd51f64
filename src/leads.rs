//! Lead repository operations.
//!
//! Wraps the store with the side effects every mutation carries:
//! 1. Validate input (failures never reach the store, no notification)
//! 2. Call the store
//! 3. On success, invalidate the cached listing, then notify
//! 4. On failure, notify with the store's message and return the error
//!
//! Invalidation always completes before the operation returns, so a listing
//! read issued after a mutation's notification observes that mutation.

use std::sync::Arc;

use crate::cache::{QueryCache, QueryKey};
use crate::errors::AppError;
use crate::models::{CreateLeadInput, Lead, LeadId, UpdateLeadInput};
use crate::notify::{Notification, Notifier};
use crate::scoring::{ScoreResult, ScoringStrategy};
use crate::store::LeadStore;
use crate::validation::{validate_create, validate_update};

/// Proof that the user explicitly confirmed deleting a lead.
///
/// Deletion is irreversible, so [`LeadOperations::delete`] only accepts this
/// token. Obtain it from [`DeleteConfirmation::confirm`] at the point where
/// the confirmation was actually given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteConfirmation {
    id: LeadId,
}

impl DeleteConfirmation {
    pub fn confirm(id: LeadId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> LeadId {
        self.id
    }
}

/// The create/update/delete/score contracts over leads.
#[derive(Clone)]
pub struct LeadOperations {
    store: Arc<dyn LeadStore>,
    cache: Arc<QueryCache>,
    notifier: Arc<dyn Notifier>,
    scorer: Arc<dyn ScoringStrategy>,
}

impl LeadOperations {
    pub fn new(
        store: Arc<dyn LeadStore>,
        cache: Arc<QueryCache>,
        notifier: Arc<dyn Notifier>,
        scorer: Arc<dyn ScoringStrategy>,
    ) -> Self {
        Self {
            store,
            cache,
            notifier,
            scorer,
        }
    }

    /// All leads, newest first, served through the query cache.
    pub async fn list(&self) -> Result<Arc<Vec<Lead>>, AppError> {
        self.cache
            .get_or_fetch(QueryKey::Leads, self.store.list())
            .await
    }

    /// Current snapshot of one lead from the listing.
    pub async fn find(&self, id: LeadId) -> Result<Lead, AppError> {
        self.list()
            .await?
            .iter()
            .find(|lead| lead.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Lead {} not found", id)))
    }

    /// Validates and inserts a new lead.
    pub async fn create(&self, input: &CreateLeadInput) -> Result<Lead, AppError> {
        let new_lead = validate_create(input)?;

        match self.store.insert(&new_lead).await {
            Ok(lead) => {
                tracing::info!("Lead created: {} ({})", lead.id, lead.status);
                self.cache.invalidate(QueryKey::Leads).await;
                self.notifier.notify(Notification::success(
                    "Lead created",
                    "New lead has been successfully added",
                ));
                Ok(lead)
            }
            Err(e) => Err(self.fail("create lead", e)),
        }
    }

    /// Validates and overwrites the writable fields of lead `id`.
    pub async fn update(&self, id: LeadId, input: &UpdateLeadInput) -> Result<(), AppError> {
        let changes = validate_update(input)?;

        match self.store.update(id, &changes).await {
            Ok(()) => {
                tracing::info!("Lead updated: {} ({})", id, changes.status);
                self.cache.invalidate(QueryKey::Leads).await;
                self.notifier.notify(Notification::success(
                    "Lead updated",
                    "Lead information has been successfully updated",
                ));
                Ok(())
            }
            Err(e) => Err(self.fail("update lead", e)),
        }
    }

    /// Permanently deletes the confirmed lead.
    pub async fn delete(&self, confirmation: DeleteConfirmation) -> Result<(), AppError> {
        let id = confirmation.id();

        match self.store.delete(id).await {
            Ok(()) => {
                tracing::info!("Lead deleted: {}", id);
                self.cache.invalidate(QueryKey::Leads).await;
                self.notifier.notify(Notification::success(
                    "Lead deleted",
                    "The lead has been successfully removed",
                ));
                Ok(())
            }
            Err(e) => Err(self.fail("delete lead", e)),
        }
    }

    /// Scores a lead snapshot. The result is never stored.
    ///
    /// The strategy's output is re-checked and always attributed to `lead`.
    pub async fn score(&self, lead: &Lead) -> Result<ScoreResult, AppError> {
        let result = self.scorer.score(lead).await.and_then(|scored| {
            if scored.lead_id != lead.id {
                tracing::warn!(
                    "Scoring strategy answered for {} instead of {}",
                    scored.lead_id,
                    lead.id
                );
            }
            let checked = ScoreResult::new(lead.id, scored.score)?;
            Ok(match scored.explanation {
                Some(explanation) => checked.with_explanation(explanation),
                None => checked,
            })
        });

        match result {
            Ok(result) => {
                self.notifier.notify(Notification::success(
                    "Lead scored",
                    format!("The lead has been scored: {}/100", result.score),
                ));
                Ok(result)
            }
            Err(e) => Err(self.fail("score lead", e)),
        }
    }

    fn fail(&self, action: &str, error: AppError) -> AppError {
        tracing::error!("Failed to {}: {}", action, error);
        self.notifier.notify(Notification::failure(format!(
            "Failed to {}: {}",
            action,
            error.message()
        )));
        error
    }
}
