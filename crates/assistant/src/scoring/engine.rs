//! Model-backed lead scoring.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{LeadScoringInput, LeadScoringOutput};
use crate::error::ScoringError;
use crate::model::{Backend, Completion, Message, ModelError, ModelRequest, ToolChoice};

pub const SCORING_INSTRUCTION: &str = "You score sales leads for a CRM. Given one lead as JSON, \
rate from 0 to 100 how likely it is to convert into a won deal. Weigh engagement (email opens, \
site visits, demo requests), firmographics (company size, industry, seniority of the contact's \
title) and the declared budget and buying timeline. Reply with only a JSON object of the form \
{\"score\": <integer 0-100>, \"reasons\": [<short sentence>, ...]}. Every factor that raised or \
lowered the score must appear in reasons.";

/// Scores leads with a single structured model request.
pub struct ScoringEngine<B> {
    backend: Arc<B>,
}

impl<B: Backend> ScoringEngine<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Score one lead.
    ///
    /// Invalid input is returned as an error without calling the model.
    /// Model failures are absorbed into [`LeadScoringOutput::fallback`].
    pub async fn score(&self, input: &LeadScoringInput) -> Result<LeadScoringOutput, ScoringError> {
        input.validate()?;

        match self.request(input).await {
            Ok(output) => {
                debug!(
                    event_name = "scoring.completed",
                    score = output.score,
                    reasons = output.reasons.len(),
                    "lead scored"
                );
                Ok(output)
            }
            Err(e) => {
                warn!(event_name = "scoring.fallback", error = %e, "lead scoring failed");
                Ok(LeadScoringOutput::fallback())
            }
        }
    }

    async fn request(&self, input: &LeadScoringInput) -> Result<LeadScoringOutput, ModelError> {
        let lead = serde_json::to_string_pretty(input)
            .map_err(|e| ModelError::InvalidResponse(format!("unencodable lead: {e}")))?;
        let messages = [Message::user(format!("Score this lead:\n{lead}"))];

        let response = self
            .backend
            .call(ModelRequest {
                system: SCORING_INSTRUCTION,
                messages: &messages,
                tools: &[],
                tool_choice: ToolChoice::None,
            })
            .await?;

        match response.completion {
            Completion::Text(text) => parse_reply(&text),
            Completion::ToolCall(call) => Err(ModelError::InvalidResponse(format!(
                "unexpected tool call: {}",
                call.name
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawScore {
    score: Value,
    #[serde(default)]
    reasons: Option<Value>,
}

/// Extract the first JSON object from a reply that may carry prose or a
/// code fence around it.
fn parse_reply(text: &str) -> Result<LeadScoringOutput, ModelError> {
    let start = text
        .find('{')
        .ok_or_else(|| ModelError::InvalidResponse("no JSON object in reply".into()))?;

    let raw = serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<RawScore>()
        .next()
        .ok_or_else(|| ModelError::InvalidResponse("no JSON object in reply".into()))?
        .map_err(|e| ModelError::InvalidResponse(format!("malformed score: {e}")))?;

    let score = match &raw.score {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| ModelError::InvalidResponse(format!("non-numeric score: {}", raw.score)))?;

    let reasons = match raw.reasons {
        Some(Value::String(reason)) => vec![reason],
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|r| match r {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(LeadScoringOutput::normalized(score, reasons))
}
