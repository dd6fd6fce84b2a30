//! Single-turn assistant with at most one tool round trip.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::AssistantError;
use crate::model::{
    Backend, Completion, Message, ModelRequest, ModelResponse, ToolChoice, ToolResult,
};
use crate::tools::ToolRegistry;

/// Persona and scope given to the model on every request.
pub const SYSTEM_INSTRUCTION: &str = "You are the sales assistant built into a CRM. You help \
sales reps understand their pipeline of leads, opportunities and contracts. When a question \
needs current pipeline figures (counts, values, conversion rate, revenue won), call the \
getPipelineSummary tool rather than guessing; monetary values from tools are in cents, so \
present them in currency units. Express rates as percentages. You can only read data: you \
cannot create, update or delete records. Be concise.";

/// Routes one user message to the model and resolves it to a reply.
pub struct Assistant<B> {
    backend: Arc<B>,
    tools: Arc<ToolRegistry>,
}

impl<B: Backend> Assistant<B> {
    pub fn new(backend: Arc<B>, tools: Arc<ToolRegistry>) -> Self {
        Self { backend, tools }
    }

    /// Answer one message.
    ///
    /// If the model requests a tool, it is invoked once and its output is
    /// sent back for a final turn in which tools may not be called.
    pub async fn converse(&self, message: &str) -> Result<String, AssistantError> {
        if message.trim().is_empty() {
            return Err(AssistantError::EmptyMessage);
        }

        let mut messages = vec![Message::user(message)];
        let first = self.call(&messages, ToolChoice::Auto).await?;

        let call = match first.completion {
            Completion::Text(text) => return Ok(text),
            Completion::ToolCall(call) => call,
        };

        info!(
            event_name = "assistant.tool.requested",
            tool = %call.name,
            tool_call_id = %call.id,
            "model requested tool"
        );
        let tool = self
            .tools
            .resolve(&call.name)
            .map_err(|e| AssistantError::from_tool(&call.name, e))?;
        let output = tool
            .invoke(call.input.clone())
            .await
            .map_err(|e| AssistantError::from_tool(&call.name, e))?;

        let result = ToolResult::new(call.id.clone(), output);
        messages.push(Message::tool_call(call));
        messages.push(Message::tool_result(result));

        let last = self.call(&messages, ToolChoice::None).await?;
        match last.completion {
            Completion::Text(text) => Ok(text),
            Completion::ToolCall(extra) => {
                warn!(
                    event_name = "assistant.tool.round_exceeded",
                    tool = %extra.name,
                    "model requested a second tool; refusing"
                );
                Err(AssistantError::ToolRoundExceeded(extra.name))
            }
        }
    }

    async fn call(
        &self,
        messages: &[Message],
        tool_choice: ToolChoice,
    ) -> Result<ModelResponse, AssistantError> {
        let request = ModelRequest {
            system: SYSTEM_INSTRUCTION,
            messages,
            tools: self.tools.specs(),
            tool_choice,
        };

        let response = self.backend.call(request).await.map_err(|e| {
            warn!(event_name = "assistant.model.failed", error = %e, "model call failed");
            AssistantError::ModelUnavailable(e)
        })?;
        debug!(
            event_name = "assistant.model.completed",
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "model call completed"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelError, Part, ToolCall};
    use crate::testing::{FailingProvider, ScriptedBackend, StaticProvider};
    use pipeline::{EntityKind, Stage, StageTotal};
    use serde_json::{Value, json};

    fn summary_call(input: Value) -> ModelResponse {
        ModelResponse::tool_call(ToolCall {
            id: "toolu_1".into(),
            name: "getPipelineSummary".into(),
            input,
        })
    }

    fn ten_opportunities_three_won() -> Vec<StageTotal> {
        vec![
            StageTotal {
                kind: EntityKind::Opportunity,
                stage: Stage::ClosedWon,
                count: 3,
                value_cents: 4_500_000,
            },
            StageTotal {
                kind: EntityKind::Opportunity,
                stage: Stage::Negotiation,
                count: 4,
                value_cents: 2_000_000,
            },
            StageTotal {
                kind: EntityKind::Opportunity,
                stage: Stage::ClosedLost,
                count: 3,
                value_cents: 900_000,
            },
        ]
    }

    fn assistant(
        backend: ScriptedBackend,
        totals: Vec<StageTotal>,
    ) -> (Assistant<ScriptedBackend>, Arc<ScriptedBackend>, Arc<StaticProvider>) {
        let backend = Arc::new(backend);
        let provider = Arc::new(StaticProvider::new(totals));
        let tools = ToolRegistry::crm(provider.clone()).unwrap();
        let assistant = Assistant::new(backend.clone(), Arc::new(tools));
        (assistant, backend, provider)
    }

    fn tool_output(messages: &[Message]) -> Option<Value> {
        messages
            .iter()
            .flat_map(|m| m.tool_results())
            .map(|r| r.output.clone())
            .next()
    }

    #[tokio::test]
    async fn text_completion_is_returned_directly() {
        let (assistant, backend, provider) =
            assistant(ScriptedBackend::new().then_text("Hello!"), Vec::new());

        let reply = assistant.converse("hi").await.unwrap();

        assert_eq!(reply, "Hello!");
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, SYSTEM_INSTRUCTION);
        assert_eq!(calls[0].tool_names, vec!["getPipelineSummary".to_string()]);
        assert_eq!(calls[0].tool_choice, ToolChoice::Auto);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn empty_message_never_reaches_model() {
        let (assistant, backend, _) = assistant(ScriptedBackend::new(), Vec::new());

        let err = assistant.converse("   ").await.unwrap_err();

        assert!(matches!(err, AssistantError::EmptyMessage));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn conversion_rate_question_uses_tool_once() {
        let backend = ScriptedBackend::new()
            .then(|_| Ok(summary_call(Value::Null)))
            .then(|request| {
                let output = tool_output(request.messages)
                    .ok_or_else(|| ModelError::InvalidResponse("no tool result".into()))?;
                let rate = output["conversion_rate"].as_f64().unwrap_or_default();
                Ok(ModelResponse::text(format!(
                    "Your conversion rate is {:.0}%.",
                    rate * 100.0
                )))
            });
        let (assistant, backend, provider) = assistant(backend, ten_opportunities_three_won());

        let reply = assistant.converse("what is my conversion rate?").await.unwrap();

        assert!(reply.contains("30%"), "reply was {reply:?}");
        assert_eq!(provider.calls(), 1);

        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].tool_choice, ToolChoice::None);
        assert_eq!(calls[1].messages.len(), 3);
        assert!(matches!(&calls[1].messages[1].parts[0], Part::ToolCall(c) if c.id == "toolu_1"));

        let output = tool_output(&calls[1].messages).unwrap();
        assert!((output["conversion_rate"].as_f64().unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(output["won_count"], 3);
    }

    #[tokio::test]
    async fn second_tool_request_is_refused() {
        let backend = ScriptedBackend::new()
            .then(|_| Ok(summary_call(json!({}))))
            .then(|_| Ok(summary_call(json!({}))));
        let (assistant, _, provider) = assistant(backend, Vec::new());

        let err = assistant.converse("summarise twice").await.unwrap_err();

        assert!(matches!(err, AssistantError::ToolRoundExceeded(ref name) if name == "getPipelineSummary"));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn unknown_tool_is_fatal() {
        let backend = ScriptedBackend::new().then(|_| {
            Ok(ModelResponse::tool_call(ToolCall {
                id: "toolu_2".into(),
                name: "deleteEverything".into(),
                input: Value::Null,
            }))
        });
        let (assistant, backend, _) = assistant(backend, Vec::new());

        let err = assistant.converse("clean up").await.unwrap_err();

        assert!(matches!(err, AssistantError::UnknownTool(ref name) if name == "deleteEverything"));
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn invalid_tool_arguments_propagate() {
        let backend =
            ScriptedBackend::new().then(|_| Ok(summary_call(json!({"region": "EMEA"}))));
        let (assistant, _, provider) = assistant(backend, Vec::new());

        let err = assistant.converse("EMEA pipeline?").await.unwrap_err();

        match err {
            AssistantError::ToolInputValidation { tool, fields } => {
                assert_eq!(tool, "getPipelineSummary");
                assert_eq!(fields, vec!["region".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn data_layer_failure_is_tool_execution() {
        let backend = Arc::new(ScriptedBackend::new().then(|_| Ok(summary_call(Value::Null))));
        let tools = ToolRegistry::crm(Arc::new(FailingProvider)).unwrap();
        let assistant = Assistant::new(backend.clone(), Arc::new(tools));

        let err = assistant.converse("pipeline?").await.unwrap_err();

        match err {
            AssistantError::ToolExecution { tool, reason } => {
                assert_eq!(tool, "getPipelineSummary");
                assert!(reason.contains("stage column unreadable"), "reason was {reason:?}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn model_failure_is_unavailable() {
        let (assistant, _, _) = assistant(ScriptedBackend::new().then_error(), Vec::new());

        let err = assistant.converse("hello").await.unwrap_err();

        assert!(matches!(err, AssistantError::ModelUnavailable(ModelError::Network(_))));
    }

    #[tokio::test]
    async fn failure_on_final_turn_is_unavailable() {
        let backend = ScriptedBackend::new()
            .then(|_| Ok(summary_call(Value::Null)))
            .then_error();
        let (assistant, _, provider) = assistant(backend, Vec::new());

        let err = assistant.converse("pipeline?").await.unwrap_err();

        assert!(matches!(err, AssistantError::ModelUnavailable(_)));
        assert_eq!(provider.calls(), 1);
    }
}
