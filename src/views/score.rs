use crate::errors::AppError;
use crate::leads::LeadOperations;
use crate::models::Lead;
use crate::scoring::{ScoreBand, ScoreResult};

/// Progress of the scoring interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScorePhase {
    /// Not yet scored; scoring starts only on demand.
    Idle,
    Scoring,
    Scored(ScoreResult),
}

/// The single button at the bottom of the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Calculate,
    /// Disabled while the score is being computed.
    Calculating,
    Close,
}

impl PrimaryAction {
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryAction::Calculate => "Calculate Lead Score",
            PrimaryAction::Calculating => "Calculating score...",
            PrimaryAction::Close => "Close",
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, PrimaryAction::Calculating)
    }
}

/// Keeps a dialog in [`ScorePhase::Scoring`] until finished.
///
/// Dropping it unfinished, e.g. when the caller times out, puts the dialog
/// back to [`ScorePhase::Idle`].
struct ScoringInFlight<'a> {
    phase: &'a mut ScorePhase,
    scored: Option<ScoreResult>,
}

impl<'a> ScoringInFlight<'a> {
    fn begin(phase: &'a mut ScorePhase) -> Self {
        *phase = ScorePhase::Scoring;
        Self {
            phase,
            scored: None,
        }
    }

    fn finish(mut self, result: ScoreResult) {
        self.scored = Some(result);
    }
}

impl Drop for ScoringInFlight<'_> {
    fn drop(&mut self) {
        *self.phase = match self.scored.take() {
            Some(result) => ScorePhase::Scored(result),
            None => ScorePhase::Idle,
        };
    }
}

/// State of the score dialog for one lead snapshot.
#[derive(Debug, Clone)]
pub struct ScoreLeadDialog {
    lead: Lead,
    phase: ScorePhase,
}

impl ScoreLeadDialog {
    pub fn open(lead: Lead) -> Self {
        Self {
            lead,
            phase: ScorePhase::Idle,
        }
    }

    pub fn lead(&self) -> &Lead {
        &self.lead
    }

    pub fn phase(&self) -> &ScorePhase {
        &self.phase
    }

    pub fn title(&self) -> String {
        format!("Score Lead: {}", self.lead.name)
    }

    /// Context lines shown above the result.
    pub fn context_lines(&self) -> Vec<String> {
        vec![
            format!(
                "Company: {}",
                self.lead.company.as_deref().unwrap_or("N/A")
            ),
            format!("Email: {}", self.lead.email),
            format!("Status: {}", self.lead.status),
        ]
    }

    pub fn primary_action(&self) -> PrimaryAction {
        match self.phase {
            ScorePhase::Idle => PrimaryAction::Calculate,
            ScorePhase::Scoring => PrimaryAction::Calculating,
            ScorePhase::Scored(_) => PrimaryAction::Close,
        }
    }

    /// Score and band once scored.
    pub fn result(&self) -> Option<(&ScoreResult, ScoreBand)> {
        match &self.phase {
            ScorePhase::Scored(result) => Some((result, result.band())),
            _ => None,
        }
    }

    /// Runs scoring once. A scored dialog must be reopened to score again.
    pub async fn calculate(&mut self, ops: &LeadOperations) -> Result<ScoreResult, AppError> {
        match &self.phase {
            ScorePhase::Idle => {}
            ScorePhase::Scoring => {
                return Err(AppError::BadRequest(
                    "Scoring is already in progress".to_string(),
                ))
            }
            ScorePhase::Scored(_) => {
                return Err(AppError::BadRequest(
                    "Lead already scored; reopen the dialog to score again".to_string(),
                ))
            }
        }

        let in_flight = ScoringInFlight::begin(&mut self.phase);
        let result = ops.score(&self.lead).await?;
        in_flight.finish(result.clone());
        Ok(result)
    }
}
