//! Lead scoring input and output.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ScoringError;

/// Used when the model gave a score but no usable reasons.
pub const NO_FACTORS_REASON: &str = "no specific factors identified";

/// Used when scoring failed for reasons outside the caller's control.
pub const FALLBACK_REASON: &str =
    "An unexpected error occurred while scoring the lead. Please try again later.";

pub const MAX_SCORE: u8 = 100;

/// When the lead says they intend to buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeline {
    Immediate,
    WithinQuarter,
    WithinYear,
    Undecided,
}

/// Engagement signals collected for the lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub email_opens: u32,
    pub site_visits: u32,
    pub demo_requested: bool,
}

/// Attributes of one lead. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadScoringInput {
    pub name: String,
    pub company: String,
    pub title: String,
    pub industry: String,
    /// Number of employees.
    pub company_size: u32,
    /// Declared budget in cents.
    pub budget_cents: i64,
    pub timeline: Timeline,
    pub engagement: Engagement,
}

impl LeadScoringInput {
    /// Parse untyped input, naming every missing or mistyped field.
    pub fn from_json(value: &Value) -> Result<Self, ScoringError> {
        let Some(object) = value.as_object() else {
            return Err(ScoringError::InvalidInput {
                fields: vec!["<lead>".to_string()],
            });
        };

        let mut fields = Vec::new();
        check::<String>(object, "name", &mut fields);
        check::<String>(object, "company", &mut fields);
        check::<String>(object, "title", &mut fields);
        check::<String>(object, "industry", &mut fields);
        check::<u32>(object, "company_size", &mut fields);
        check::<i64>(object, "budget_cents", &mut fields);
        check::<Timeline>(object, "timeline", &mut fields);
        check::<Engagement>(object, "engagement", &mut fields);
        if !fields.is_empty() {
            return Err(ScoringError::InvalidInput { fields });
        }

        let input: Self =
            serde_json::from_value(value.clone()).map_err(|_| ScoringError::InvalidInput {
                fields: vec!["<lead>".to_string()],
            })?;
        input.validate()?;
        Ok(input)
    }

    /// Check field contents beyond their types.
    pub fn validate(&self) -> Result<(), ScoringError> {
        let mut fields = Vec::new();
        for (name, value) in [
            ("name", &self.name),
            ("company", &self.company),
            ("title", &self.title),
            ("industry", &self.industry),
        ] {
            if value.trim().is_empty() {
                fields.push(name.to_string());
            }
        }
        if self.company_size == 0 {
            fields.push("company_size".to_string());
        }
        if self.budget_cents < 0 {
            fields.push("budget_cents".to_string());
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ScoringError::InvalidInput { fields })
        }
    }
}

fn check<T: DeserializeOwned>(object: &Map<String, Value>, name: &str, fields: &mut Vec<String>) {
    let valid = object
        .get(name)
        .filter(|v| !v.is_null())
        .is_some_and(|v| serde_json::from_value::<T>(v.clone()).is_ok());
    if !valid {
        fields.push(name.to_string());
    }
}

/// A bounded score with the reasons behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadScoringOutput {
    /// Always within `0..=100`.
    pub score: u8,
    /// Never empty.
    pub reasons: Vec<String>,
}

impl LeadScoringOutput {
    /// Clamp and round `score`, drop blank reasons, and substitute a
    /// placeholder reason if none remain.
    pub fn normalized(score: f64, reasons: Vec<String>) -> Self {
        let score = if score.is_nan() {
            0
        } else {
            score.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
        };

        let mut reasons: Vec<String> = reasons
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if reasons.is_empty() {
            reasons.push(NO_FACTORS_REASON.to_string());
        }

        Self { score, reasons }
    }

    /// Zero score explaining that scoring failed.
    pub fn fallback() -> Self {
        Self {
            score: 0,
            reasons: vec![FALLBACK_REASON.to_string()],
        }
    }

    /// Zero score naming the fields that blocked scoring.
    pub fn invalid_input(fields: &[String]) -> Self {
        Self {
            score: 0,
            reasons: vec![format!(
                "Lead is missing or has invalid fields: {}",
                fields.join(", ")
            )],
        }
    }
}
