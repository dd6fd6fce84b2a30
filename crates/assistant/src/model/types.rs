//! Provider-agnostic model types.
//!
//! A provider adapter translates these into its own wire format. The core
//! only ever sees the two [`Completion`] variants.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

use super::errors::ModelError;

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned identifier, echoed back with the result.
    pub id: String,
    pub name: String,
    /// Arguments as JSON. Usually an object; `null` when the tool takes none.
    pub input: Value,
}

/// The output of a tool call, sent back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// The [`ToolCall::id`] this answers.
    pub tool_call_id: String,
    pub output: Value,
}

impl ToolResult {
    pub fn new(tool_call_id: impl Into<String>, output: Value) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            output,
        }
    }
}

/// A part of a message, which can be text or a tool interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Part {
    Text(String),
    ToolCall(ToolCall),
    ToolResult(ToolResult),
}

/// A message, consisting of a role and one or more parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    /// Create a user message with text.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    /// Create the assistant turn that requested a tool.
    pub fn tool_call(call: ToolCall) -> Self {
        Self {
            role: Role::Assistant,
            parts: vec![Part::ToolCall(call)],
        }
    }

    /// Create the user turn carrying a tool result back to the model.
    pub fn tool_result(result: ToolResult) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::ToolResult(result)],
        }
    }

    /// Get combined text content from all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Extract all tool results from this message.
    pub fn tool_results(&self) -> Vec<&ToolResult> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::ToolResult(result) => Some(result),
                _ => None,
            })
            .collect()
    }
}

/// A tool definition exposed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for input parameters.
    pub input_schema: Value,
    /// JSON Schema describing the tool output.
    pub output_schema: Value,
}

/// How the model may use the tools it is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ToolChoice {
    /// Model decides whether to use tools.
    #[default]
    Auto,
    /// Model must answer in text (tools are still visible as context).
    None,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Everything needed for a model request.
#[derive(Debug, Clone)]
pub struct ModelRequest<'a> {
    pub system: &'a str,
    pub messages: &'a [Message],
    pub tools: &'a [ToolSpec],
    pub tool_choice: ToolChoice,
}

/// What the model produced: final text, or a request to run one tool.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Text(String),
    ToolCall(ToolCall),
}

/// The response from a model.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub completion: Completion,
    pub usage: Usage,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            completion: Completion::Text(text.into()),
            usage: Usage::default(),
        }
    }

    pub fn tool_call(call: ToolCall) -> Self {
        Self {
            completion: Completion::ToolCall(call),
            usage: Usage::default(),
        }
    }
}

/// Trait for model provider backends.
pub trait Backend: Send + Sync {
    fn call(
        &self,
        request: ModelRequest<'_>,
    ) -> impl Future<Output = Result<ModelResponse, ModelError>> + Send;
}
