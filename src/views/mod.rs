//! Headless dashboard state.
//!
//! These types hold what the dashboard shows and drive [`LeadOperations`]
//! in response to user actions. Rendering is left to whatever front end
//! sits on top.

use crate::errors::AppError;
use crate::leads::LeadOperations;
use crate::models::Lead;

pub mod forms;
pub mod list;
pub mod score;

pub use forms::{CreateLeadForm, EditLeadDialog};
pub use list::{LeadListView, LeadRow, ListContent, Selection, EMPTY_STATE_MESSAGE};
pub use score::{PrimaryAction, ScoreLeadDialog, ScorePhase};

/// The dashboard page: lead list beside the create form.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub list: LeadListView,
    pub create_form: CreateLeadForm,
}

impl Dashboard {
    /// Builds the page and performs the initial load.
    pub async fn load(ops: &LeadOperations) -> Self {
        let mut dashboard = Self::default();
        dashboard.list.refresh(ops).await;
        dashboard
    }

    /// Submits the create form and reloads the list on success.
    pub async fn submit_create(&mut self, ops: &LeadOperations) -> Result<Lead, AppError> {
        let lead = self.create_form.submit(ops).await?;
        self.list.refresh(ops).await;
        Ok(lead)
    }
}
