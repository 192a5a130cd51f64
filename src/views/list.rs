use std::sync::Arc;

use super::forms::EditLeadDialog;
use super::score::ScoreLeadDialog;
use crate::errors::AppError;
use crate::leads::{DeleteConfirmation, LeadOperations};
use crate::models::{Lead, LeadId, LeadStatus};
use crate::scoring::ScoreResult;

pub const EMPTY_STATE_MESSAGE: &str = "No leads yet. Add your first lead with the form.";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this lead?";

/// Which dialog, if any, is open. Opening one replaces the other.
#[derive(Debug, Clone, Default)]
pub enum Selection {
    #[default]
    None,
    Editing(EditLeadDialog),
    Scoring(ScoreLeadDialog),
}

impl Selection {
    /// Lead the open dialog is bound to.
    pub fn lead_id(&self) -> Option<LeadId> {
        match self {
            Selection::None => None,
            Selection::Editing(dialog) => Some(dialog.lead().id),
            Selection::Scoring(dialog) => Some(dialog.lead().id),
        }
    }
}

#[derive(Debug, Clone)]
enum ListState {
    Loading,
    Loaded(Arc<Vec<Lead>>),
    Failed(String),
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRow {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    /// Company name or `-`.
    pub company: String,
    pub status: LeadStatus,
}

impl From<&Lead> for LeadRow {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id,
            name: lead.name.clone(),
            email: lead.email.clone(),
            company: lead.company.clone().unwrap_or_else(|| "-".to_string()),
            status: lead.status,
        }
    }
}

/// What the list area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListContent {
    Loading,
    Error(String),
    Empty(&'static str),
    Rows(Vec<LeadRow>),
}

/// The leads table with its dialogs and delete confirmation.
#[derive(Debug, Clone)]
pub struct LeadListView {
    state: ListState,
    selection: Selection,
    pending_delete: Option<LeadId>,
}

impl Default for LeadListView {
    fn default() -> Self {
        Self {
            state: ListState::Loading,
            selection: Selection::None,
            pending_delete: None,
        }
    }
}

impl LeadListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reloads the listing; failures are shown inline.
    pub async fn refresh(&mut self, ops: &LeadOperations) {
        self.state = match ops.list().await {
            Ok(leads) => ListState::Loaded(leads),
            Err(e) => {
                tracing::warn!("Error loading leads: {}", e);
                ListState::Failed(e.message())
            }
        };
    }

    pub fn content(&self) -> ListContent {
        match &self.state {
            ListState::Loading => ListContent::Loading,
            ListState::Failed(message) => {
                ListContent::Error(format!("Error loading leads: {}", message))
            }
            ListState::Loaded(leads) if leads.is_empty() => ListContent::Empty(EMPTY_STATE_MESSAGE),
            ListState::Loaded(leads) => ListContent::Rows(leads.iter().map(LeadRow::from).collect()),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    fn snapshot(&self, id: LeadId) -> Result<Lead, AppError> {
        let found = match &self.state {
            ListState::Loaded(leads) => leads.iter().find(|lead| lead.id == id).cloned(),
            _ => None,
        };
        found.ok_or_else(|| AppError::NotFound(format!("Lead {} is not in the listing", id)))
    }

    /// Opens the edit dialog for a listed lead, replacing any open dialog.
    pub fn open_edit(&mut self, id: LeadId) -> Result<(), AppError> {
        self.selection = Selection::Editing(EditLeadDialog::open(self.snapshot(id)?));
        Ok(())
    }

    /// Opens the score dialog for a listed lead, replacing any open dialog.
    pub fn open_score(&mut self, id: LeadId) -> Result<(), AppError> {
        self.selection = Selection::Scoring(ScoreLeadDialog::open(self.snapshot(id)?));
        Ok(())
    }

    pub fn close_dialog(&mut self) {
        self.selection = Selection::None;
    }

    /// Submits the open edit dialog; closes it and reloads on success.
    pub async fn submit_edit(&mut self, ops: &LeadOperations) -> Result<(), AppError> {
        let Selection::Editing(dialog) = &mut self.selection else {
            return Err(AppError::BadRequest("No lead is being edited".to_string()));
        };

        dialog.submit(ops).await?;
        self.selection = Selection::None;
        self.refresh(ops).await;
        Ok(())
    }

    /// Runs scoring in the open score dialog.
    pub async fn calculate_score(&mut self, ops: &LeadOperations) -> Result<ScoreResult, AppError> {
        let Selection::Scoring(dialog) = &mut self.selection else {
            return Err(AppError::BadRequest("No lead is being scored".to_string()));
        };
        dialog.calculate(ops).await
    }

    /// Asks for confirmation before deleting; nothing is deleted yet.
    pub fn request_delete(&mut self, id: LeadId) -> &'static str {
        self.pending_delete = Some(id);
        DELETE_PROMPT
    }

    pub fn pending_delete(&self) -> Option<LeadId> {
        self.pending_delete
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the lead awaiting confirmation, then reloads.
    pub async fn confirm_delete(&mut self, ops: &LeadOperations) -> Result<(), AppError> {
        let id = self
            .pending_delete
            .take()
            .ok_or_else(|| AppError::ConfirmationRequired("No deletion is pending".to_string()))?;

        ops.delete(DeleteConfirmation::confirm(id)).await?;

        if self.selection.lead_id() == Some(id) {
            self.selection = Selection::None;
        }
        self.refresh(ops).await;
        Ok(())
    }
}
