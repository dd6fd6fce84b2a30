//! Boundary exposed to the UI layer.
//!
//! Neither action can fail: errors are logged here and replaced by a
//! displayable fallback.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{error, warn};

use crate::error::{AssistantError, ScoringError};
use crate::model::Backend;
use crate::orchestrator::Assistant;
use crate::scoring::{LeadScoringInput, LeadScoringOutput, MAX_SCORE, ScoringEngine};
use crate::tools::ToolRegistry;

/// Reply shown whenever the assistant could not produce an answer.
pub const APOLOGY: &str =
    "Sorry, I couldn't answer that right now. Please try again in a moment.";

/// Pause before scoring, for UX pacing only.
pub const DEFAULT_SCORING_DELAY: Duration = Duration::from_secs(1);

/// The assistant and scoring actions behind one handle.
pub struct Actions<B> {
    assistant: Assistant<B>,
    scoring: ScoringEngine<B>,
    scoring_delay: Duration,
}

impl<B: Backend> Actions<B> {
    pub fn new(backend: Arc<B>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            assistant: Assistant::new(backend.clone(), tools),
            scoring: ScoringEngine::new(backend),
            scoring_delay: DEFAULT_SCORING_DELAY,
        }
    }

    pub fn with_scoring_delay(mut self, delay: Duration) -> Self {
        self.scoring_delay = delay;
        self
    }

    /// Answer a message; never fails and never returns blank text.
    pub async fn get_assistant_response(&self, message: &str) -> String {
        match self.assistant.converse(message).await {
            Ok(reply) if !reply.trim().is_empty() => reply,
            Ok(_) => {
                warn!(event_name = "actions.assistant.blank_reply", "model returned blank reply");
                APOLOGY.to_string()
            }
            Err(e) => {
                log_assistant_error(&e);
                APOLOGY.to_string()
            }
        }
    }

    /// Score a lead; never fails.
    pub async fn score_lead(&self, input: &LeadScoringInput) -> LeadScoringOutput {
        if !self.scoring_delay.is_zero() {
            tokio::time::sleep(self.scoring_delay).await;
        }

        match self.scoring.score(input).await {
            Ok(output) => well_formed(output),
            Err(e) => scoring_fallback(e),
        }
    }

    /// Score a lead given as untyped JSON; never fails.
    pub async fn score_lead_json(&self, value: &Value) -> LeadScoringOutput {
        match LeadScoringInput::from_json(value) {
            Ok(input) => self.score_lead(&input).await,
            Err(e) => scoring_fallback(e),
        }
    }
}

fn log_assistant_error(err: &AssistantError) {
    match err {
        AssistantError::EmptyMessage | AssistantError::ToolInputValidation { .. } => {
            warn!(event_name = "actions.assistant.rejected", error = %err, "request rejected");
        }
        _ => {
            error!(event_name = "actions.assistant.failed", error = %err, "assistant request failed");
        }
    }
}

fn scoring_fallback(err: ScoringError) -> LeadScoringOutput {
    warn!(event_name = "actions.scoring.rejected", error = %err, "lead scoring rejected");
    match err {
        ScoringError::InvalidInput { fields } => LeadScoringOutput::invalid_input(&fields),
    }
}

fn well_formed(output: LeadScoringOutput) -> LeadScoringOutput {
    if output.score > MAX_SCORE || output.reasons.is_empty() {
        LeadScoringOutput::normalized(f64::from(output.score), output.reasons)
    } else {
        output
    }
}
