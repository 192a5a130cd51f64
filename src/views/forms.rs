use crate::errors::AppError;
use crate::leads::LeadOperations;
use crate::models::{CreateLeadInput, Lead, UpdateLeadInput};
use crate::validation::ValidationErrors;

fn in_flight() -> AppError {
    AppError::BadRequest("A submission is already in progress".to_string())
}

/// Holds a form's submitting flag for the duration of one submission.
///
/// The flag is cleared on drop, so a submission whose future is dropped
/// mid-flight leaves the form usable.
struct Submitting<'a>(&'a mut bool);

impl<'a> Submitting<'a> {
    fn begin(flag: &'a mut bool) -> Result<Self, AppError> {
        if *flag {
            return Err(in_flight());
        }
        *flag = true;
        Ok(Self(flag))
    }
}

impl Drop for Submitting<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// State of the "Add New Lead" form.
#[derive(Debug, Clone, Default)]
pub struct CreateLeadForm {
    input: CreateLeadInput,
    errors: ValidationErrors,
    submitting: bool,
}

impl CreateLeadForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &CreateLeadInput {
        &self.input
    }

    /// Field values for editing; clears nothing.
    pub fn input_mut(&mut self) -> &mut CreateLeadInput {
        &mut self.input
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors.for_field(field)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Label of the submit button.
    pub fn submit_label(&self) -> &'static str {
        if self.submitting {
            "Adding..."
        } else {
            "Add Lead"
        }
    }

    /// Submits the form.
    ///
    /// Validation failures populate field errors and never reach the store.
    /// On success the form resets to its defaults; on store failure the
    /// entered values are kept for a retry.
    pub async fn submit(&mut self, ops: &LeadOperations) -> Result<Lead, AppError> {
        let guard = Submitting::begin(&mut self.submitting)?;
        let result = ops.create(&self.input).await;
        drop(guard);

        match result {
            Ok(lead) => {
                *self = Self::default();
                Ok(lead)
            }
            Err(e) => {
                self.errors = e.validation_errors().cloned().unwrap_or_default();
                Err(e)
            }
        }
    }
}

/// State of the edit dialog, bound to the snapshot it was opened with.
#[derive(Debug, Clone)]
pub struct EditLeadDialog {
    lead: Lead,
    input: UpdateLeadInput,
    errors: ValidationErrors,
    submitting: bool,
}

impl EditLeadDialog {
    /// Opens the dialog prefilled with `lead`'s current values.
    pub fn open(lead: Lead) -> Self {
        let input = UpdateLeadInput::from(&lead);
        Self {
            lead,
            input,
            errors: ValidationErrors::default(),
            submitting: false,
        }
    }

    pub fn lead(&self) -> &Lead {
        &self.lead
    }

    pub fn input(&self) -> &UpdateLeadInput {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut UpdateLeadInput {
        &mut self.input
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.errors.for_field(field)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submit_label(&self) -> &'static str {
        if self.submitting {
            "Saving..."
        } else {
            "Save Changes"
        }
    }

    /// Saves the edit. `Ok` means the dialog should close; on error it stays
    /// open with the user's values.
    pub async fn submit(&mut self, ops: &LeadOperations) -> Result<(), AppError> {
        let guard = Submitting::begin(&mut self.submitting)?;
        let result = ops.update(self.lead.id, &self.input).await;
        drop(guard);

        self.errors = match &result {
            Err(e) => e.validation_errors().cloned().unwrap_or_default(),
            Ok(()) => ValidationErrors::default(),
        };
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submitting_flag_is_cleared_on_drop() {
        let mut flag = false;
        {
            let _guard = Submitting::begin(&mut flag).unwrap();
        }
        assert!(!flag);

        let mut busy = true;
        assert!(Submitting::begin(&mut busy).is_err());
        assert!(busy);
    }
}
