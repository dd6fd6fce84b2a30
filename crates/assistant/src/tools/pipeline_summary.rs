//! `getPipelineSummary`: aggregate figures over the current pipeline.

use std::sync::Arc;

use async_trait::async_trait;
use pipeline::{EntityKind, PipelineSummaryProvider, Stage, StageTotal};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

use super::{InputSchema, Tool, ToolError};

const NAME: &str = "getPipelineSummary";
const DESCRIPTION: &str = "Summarise the current sales pipeline: record counts and total value \
per stage, lead/opportunity/contract counts, the conversion rate (share of records in the \
Closed Won stage) and the total value won. Monetary values are in cents. Takes no arguments.";

/// Count and value of all records in one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSummary {
    pub stage: Stage,
    pub count: u64,
    pub value_cents: i64,
}

/// Aggregate pipeline figures, computed fresh on each call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Every known stage in lifecycle order, zero-filled.
    pub stages: Vec<StageSummary>,
    pub leads: u64,
    pub opportunities: u64,
    pub contracts: u64,
    pub total_count: u64,
    pub total_value_cents: i64,
    pub won_count: u64,
    pub won_value_cents: i64,
    /// `won_count / total_count`, or 0 for an empty pipeline.
    pub conversion_rate: f64,
}

impl PipelineSummary {
    pub fn from_totals(totals: &[StageTotal]) -> Self {
        let stages: Vec<StageSummary> = Stage::ALL
            .into_iter()
            .map(|stage| {
                let rows = totals.iter().filter(|t| t.stage == stage);
                StageSummary {
                    stage,
                    count: rows.clone().map(|t| t.count).sum(),
                    value_cents: rows.map(|t| t.value_cents).sum(),
                }
            })
            .collect();

        let count_of = |kind: EntityKind| -> u64 {
            totals
                .iter()
                .filter(|t| t.kind == kind)
                .map(|t| t.count)
                .sum()
        };

        let total_count: u64 = stages.iter().map(|s| s.count).sum();
        let total_value_cents: i64 = stages.iter().map(|s| s.value_cents).sum();
        let (won_count, won_value_cents) = stages
            .iter()
            .filter(|s| s.stage.is_won())
            .fold((0, 0), |(count, value), s| (count + s.count, value + s.value_cents));

        let conversion_rate = if total_count == 0 {
            0.0
        } else {
            won_count as f64 / total_count as f64
        };

        Self {
            stages,
            leads: count_of(EntityKind::Lead),
            opportunities: count_of(EntityKind::Opportunity),
            contracts: count_of(EntityKind::Contract),
            total_count,
            total_value_cents,
            won_count,
            won_value_cents,
            conversion_rate,
        }
    }
}

/// Reads live totals from the data layer on every call.
pub struct PipelineSummaryTool {
    provider: Arc<dyn PipelineSummaryProvider>,
    schema: InputSchema,
}

impl PipelineSummaryTool {
    pub const NAME: &'static str = NAME;

    pub fn new(provider: Arc<dyn PipelineSummaryProvider>) -> Self {
        Self {
            provider,
            schema: InputSchema::empty(),
        }
    }

    pub async fn summary(&self) -> Result<PipelineSummary, ToolError> {
        let totals = self.provider.stage_totals().await?;
        let summary = PipelineSummary::from_totals(&totals);
        debug!(
            event_name = "assistant.tool.pipeline_summary",
            total_count = summary.total_count,
            won_count = summary.won_count,
            conversion_rate = summary.conversion_rate,
            "pipeline summary computed"
        );
        Ok(summary)
    }
}

#[async_trait]
impl Tool for PipelineSummaryTool {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn input_schema(&self) -> &InputSchema {
        &self.schema
    }

    fn output_schema(&self) -> Value {
        let stage_names: Vec<&str> = Stage::ALL.iter().map(Stage::as_str).collect();
        json!({
            "type": "object",
            "properties": {
                "stages": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "stage": { "type": "string", "enum": stage_names },
                            "count": { "type": "integer", "minimum": 0 },
                            "value_cents": { "type": "integer", "minimum": 0 }
                        },
                        "required": ["stage", "count", "value_cents"]
                    }
                },
                "leads": { "type": "integer", "minimum": 0 },
                "opportunities": { "type": "integer", "minimum": 0 },
                "contracts": { "type": "integer", "minimum": 0 },
                "total_count": { "type": "integer", "minimum": 0 },
                "total_value_cents": { "type": "integer", "minimum": 0 },
                "won_count": { "type": "integer", "minimum": 0 },
                "won_value_cents": { "type": "integer", "minimum": 0 },
                "conversion_rate": { "type": "number", "minimum": 0, "maximum": 1 }
            },
            "required": [
                "stages", "leads", "opportunities", "contracts", "total_count",
                "total_value_cents", "won_count", "won_value_cents", "conversion_rate"
            ]
        })
    }

    async fn execute(&self, _args: Map<String, Value>) -> Result<Value, ToolError> {
        let summary = self.summary().await?;
        serde_json::to_value(summary).map_err(|e| ToolError::Execution(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticProvider;

    fn opportunities(won: u64, lost: u64) -> Vec<StageTotal> {
        vec![
            StageTotal {
                kind: EntityKind::Opportunity,
                stage: Stage::ClosedWon,
                count: won,
                value_cents: won as i64 * 10_000,
            },
            StageTotal {
                kind: EntityKind::Opportunity,
                stage: Stage::ClosedLost,
                count: lost,
                value_cents: lost as i64 * 5_000,
            },
        ]
    }

    #[tokio::test]
    async fn empty_pipeline_has_zero_rate_and_sums() {
        let tool = PipelineSummaryTool::new(Arc::new(StaticProvider::new(Vec::new())));
        let summary = tool.summary().await.unwrap();

        assert_eq!(summary.conversion_rate, 0.0);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.total_value_cents, 0);
        assert_eq!(summary.won_count, 0);
        assert_eq!(summary.won_value_cents, 0);
        assert_eq!(summary.stages.len(), Stage::ALL.len());
        assert!(summary.stages.iter().all(|s| s.count == 0 && s.value_cents == 0));
    }

    #[tokio::test]
    async fn conversion_rate_is_won_share_of_total() {
        let tool = PipelineSummaryTool::new(Arc::new(StaticProvider::new(opportunities(3, 7))));
        let summary = tool.summary().await.unwrap();

        assert_eq!(summary.total_count, 10);
        assert_eq!(summary.opportunities, 10);
        assert_eq!(summary.won_count, 3);
        assert_eq!(summary.won_value_cents, 30_000);
        assert_eq!(summary.total_value_cents, 65_000);
        assert!((summary.conversion_rate - 0.3).abs() < 1e-9);
    }

    #[test]
    fn stages_merge_across_entity_kinds() {
        let totals = vec![
            StageTotal {
                kind: EntityKind::Opportunity,
                stage: Stage::ClosedWon,
                count: 2,
                value_cents: 200,
            },
            StageTotal {
                kind: EntityKind::Contract,
                stage: Stage::ClosedWon,
                count: 1,
                value_cents: 100,
            },
            StageTotal {
                kind: EntityKind::Lead,
                stage: Stage::New,
                count: 1,
                value_cents: 0,
            },
        ];
        let summary = PipelineSummary::from_totals(&totals);

        let won = summary
            .stages
            .iter()
            .find(|s| s.stage == Stage::ClosedWon)
            .unwrap();
        assert_eq!(won.count, 3);
        assert_eq!(won.value_cents, 300);
        assert_eq!(summary.leads, 1);
        assert_eq!(summary.contracts, 1);
        assert!((summary.conversion_rate - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn invoke_rejects_arguments() {
        let tool = PipelineSummaryTool::new(Arc::new(StaticProvider::new(Vec::new())));
        let err = tool.invoke(json!({"stage": "Proposal"})).await.unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidInput {
                tool: NAME.into(),
                fields: vec!["stage".into()],
            }
        );
    }

    #[tokio::test]
    async fn invoke_returns_summary_json() {
        let tool = PipelineSummaryTool::new(Arc::new(StaticProvider::new(opportunities(1, 1))));
        let output = tool.invoke(Value::Null).await.unwrap();
        assert_eq!(output["won_count"], 1);
        assert_eq!(output["conversion_rate"], 0.5);
        assert_eq!(output["stages"][5]["stage"], "Closed Won");
    }
}
