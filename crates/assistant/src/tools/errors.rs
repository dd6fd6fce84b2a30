use thiserror::Error;

/// Errors from registering, resolving or running tools.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ToolError {
    /// A tool with this name is already registered.
    #[error("duplicate tool: {0}")]
    DuplicateTool(String),

    /// No tool with this name is registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The arguments did not match the tool's input schema.
    #[error("invalid input for {tool}: {}", fields.join(", "))]
    InvalidInput { tool: String, fields: Vec<String> },

    /// The tool ran but could not produce output.
    #[error("execution failed: {0}")]
    Execution(String),
}

impl From<pipeline::Error> for ToolError {
    fn from(err: pipeline::Error) -> Self {
        Self::Execution(err.to_string())
    }
}
