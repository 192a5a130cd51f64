//! Lead scoring.
//!
//! Scoring is behind [`ScoringStrategy`] so the placeholder can be replaced
//! by a real model without touching callers. The contract: a full lead
//! snapshot in, an integer score in `[1, 100]` (plus optional explanation)
//! out, never persisted.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::AppError;
use crate::models::{Lead, LeadId};

pub const SCORE_MIN: u8 = 1;
pub const SCORE_MAX: u8 = 100;

/// Delay of the simulated scoring computation.
pub const DEFAULT_SCORING_DELAY: Duration = Duration::from_secs(1);

/// Outcome of scoring one lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub lead_id: LeadId,
    pub score: u8,
    /// Free-form reasoning from strategies that can explain themselves.
    pub explanation: Option<String>,
}

impl ScoreResult {
    /// Builds a result, rejecting scores outside `[1, 100]`.
    pub fn new(lead_id: LeadId, score: u8) -> Result<Self, AppError> {
        if !(SCORE_MIN..=SCORE_MAX).contains(&score) {
            return Err(AppError::ScoringError(format!(
                "score {} is outside {}..={}",
                score, SCORE_MIN, SCORE_MAX
            )));
        }
        Ok(Self {
            lead_id,
            score,
            explanation: None,
        })
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    pub fn band(&self) -> ScoreBand {
        ScoreBand::from_score(self.score)
    }
}

/// Potential category a score falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    /// `score < 30`
    Low,
    /// `30 <= score < 70`
    Medium,
    /// `score >= 70`
    High,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=29 => ScoreBand::Low,
            30..=69 => ScoreBand::Medium,
            _ => ScoreBand::High,
        }
    }

    /// Follow-up advice shown next to the score.
    pub fn guidance(&self) -> &'static str {
        match self {
            ScoreBand::Low => "Low potential. Consider focusing on higher value leads.",
            ScoreBand::Medium => {
                "Medium potential. Follow up when higher priority leads are addressed."
            }
            ScoreBand::High => "High potential. Prioritize this lead for immediate follow-up!",
        }
    }
}

/// Produces a score for a lead snapshot.
#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    async fn score(&self, lead: &Lead) -> Result<ScoreResult, AppError>;
}

/// Placeholder strategy: waits, then draws a uniform score.
///
/// Ignores lead attributes entirely; two calls on the same lead may differ.
#[derive(Debug, Clone)]
pub struct RandomScoringStrategy {
    delay: Duration,
}

impl RandomScoringStrategy {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for RandomScoringStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_SCORING_DELAY)
    }
}

#[async_trait]
impl ScoringStrategy for RandomScoringStrategy {
    async fn score(&self, lead: &Lead) -> Result<ScoreResult, AppError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let score = rand::thread_rng().gen_range(SCORE_MIN..=SCORE_MAX);
        tracing::debug!("Scored lead {} at {}", lead.id, score);
        ScoreResult::new(lead.id, score)
    }
}
