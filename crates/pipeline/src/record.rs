//! Record types for the sales pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// A unique identifier for a pipeline record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which part of the lifecycle a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Lead,
    Opportunity,
    Contract,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "lead",
            Self::Opportunity => "opportunity",
            Self::Contract => "contract",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lead" | "leads" => Ok(Self::Lead),
            "opportunity" | "opportunities" | "deal" | "deals" => Ok(Self::Opportunity),
            "contract" | "contracts" => Ok(Self::Contract),
            other => Err(Error::InvalidValue(format!("unknown entity kind: {other}"))),
        }
    }
}

/// Pipeline stage, in lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "New")]
    New,
    #[serde(rename = "Contacted")]
    Contacted,
    #[serde(rename = "Qualified")]
    Qualified,
    #[serde(rename = "Proposal")]
    Proposal,
    #[serde(rename = "Negotiation")]
    Negotiation,
    #[serde(rename = "Closed Won")]
    ClosedWon,
    #[serde(rename = "Closed Lost")]
    ClosedLost,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Self::New,
        Self::Contacted,
        Self::Qualified,
        Self::Proposal,
        Self::Negotiation,
        Self::ClosedWon,
        Self::ClosedLost,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Contacted => "Contacted",
            Self::Qualified => "Qualified",
            Self::Proposal => "Proposal",
            Self::Negotiation => "Negotiation",
            Self::ClosedWon => "Closed Won",
            Self::ClosedLost => "Closed Lost",
        }
    }

    /// Only `Closed Won` counts towards conversion.
    pub fn is_won(&self) -> bool {
        matches!(self, Self::ClosedWon)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = Error;

    /// Accepts the display label in any case, with `_` or `-` in place of spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| Error::InvalidValue(format!("unknown stage: {s}")))
    }
}

/// A lead, opportunity or contract as stored by the data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub id: RecordId,
    pub kind: EntityKind,
    pub name: String,
    pub stage: Stage,
    /// Monetary value in cents. Never negative.
    pub value_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl PipelineRecord {
    pub fn new(kind: EntityKind, name: impl Into<String>, stage: Stage, value_cents: i64) -> Self {
        Self {
            id: RecordId::new(),
            kind,
            name: name.into(),
            stage,
            value_cents,
            created_at: Utc::now(),
        }
    }
}

/// Count and summed value of records sharing a kind and stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTotal {
    pub kind: EntityKind,
    pub stage: Stage,
    pub count: u64,
    pub value_cents: i64,
}
