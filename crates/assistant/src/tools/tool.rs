//! Tool trait.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{InputSchema, ToolError};
use crate::model::ToolSpec;

/// A named, read-only operation the model may request.
///
/// Implementations provide `execute`; callers go through [`Tool::invoke`],
/// which validates arguments against [`Tool::input_schema`] first.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn input_schema(&self) -> &InputSchema;

    /// JSON Schema of the value `execute` returns.
    fn output_schema(&self) -> Value;

    /// Run with arguments that already passed validation.
    async fn execute(&self, args: Map<String, Value>) -> Result<Value, ToolError>;

    /// Validate `input`, then execute.
    async fn invoke(&self, input: Value) -> Result<Value, ToolError> {
        let args = self.input_schema().validate(self.name(), input)?;
        self.execute(args).await
    }

    /// The definition sent to the model.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema().to_json_schema(),
            output_schema: self.output_schema(),
        }
    }
}
