use thiserror::Error;

use crate::model::ModelError;
use crate::tools::ToolError;

/// Errors from a single `converse` call.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssistantError {
    /// The user message was empty or whitespace.
    #[error("message is empty")]
    EmptyMessage,

    /// The model asked for a tool that is not registered.
    #[error("model requested unknown tool: {0}")]
    UnknownTool(String),

    /// The model's tool arguments did not match the tool's schema.
    #[error("invalid arguments for {tool}: {}", fields.join(", "))]
    ToolInputValidation { tool: String, fields: Vec<String> },

    /// The tool could not read the data it needed.
    #[error("tool {tool} failed: {reason}")]
    ToolExecution { tool: String, reason: String },

    /// The model asked for a second tool after the one allowed round.
    #[error("model requested tool {0} after the tool round was used")]
    ToolRoundExceeded(String),

    /// The model capability failed; not retried here.
    #[error("model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),
}

impl AssistantError {
    pub(crate) fn from_tool(tool: &str, err: ToolError) -> Self {
        match err {
            ToolError::UnknownTool(name) => Self::UnknownTool(name),
            ToolError::InvalidInput { tool, fields } => Self::ToolInputValidation { tool, fields },
            ToolError::Execution(reason) => Self::ToolExecution {
                tool: tool.to_string(),
                reason,
            },
            other => Self::ToolExecution {
                tool: tool.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// Errors from the lead scoring engine.
///
/// Model failures never surface here; the engine turns them into a
/// fallback score.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ScoringError {
    /// Required lead fields were missing or malformed.
    #[error("invalid scoring input: {}", fields.join(", "))]
    InvalidInput { fields: Vec<String> },
}
