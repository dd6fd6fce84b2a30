//! Lead scoring.

mod engine;
mod types;

pub use engine::{SCORING_INSTRUCTION, ScoringEngine};
pub use types::{
    Engagement, FALLBACK_REASON, LeadScoringInput, LeadScoringOutput, MAX_SCORE,
    NO_FACTORS_REASON, Timeline,
};

#[cfg(test)]
pub(crate) use types::tests::{sample as sample_lead, sample_json as sample_lead_json};
