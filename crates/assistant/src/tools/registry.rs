//! Tool registry.

use std::collections::HashMap;
use std::sync::Arc;

use pipeline::PipelineSummaryProvider;
use tracing::debug;

use super::{PipelineSummaryTool, Tool, ToolError};
use crate::model::ToolSpec;

/// Tools available to the model, keyed by name.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    specs: Vec<ToolSpec>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The CRM tool set, backed by `provider`.
    pub fn crm(provider: Arc<dyn PipelineSummaryProvider>) -> Result<Self, ToolError> {
        let mut registry = Self::new();
        registry.register(PipelineSummaryTool::new(provider))?;
        Ok(registry)
    }

    /// Add a tool. Fails if the name is taken.
    pub fn register<T>(&mut self, tool: T) -> Result<(), ToolError>
    where
        T: Tool + 'static,
    {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }

        debug!(event_name = "assistant.tool.registered", tool = %name, "tool registered");
        self.specs.push(tool.spec());
        self.tools.insert(name, Arc::new(tool));
        Ok(())
    }

    /// Get a tool by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Definitions for the model, in registration order.
    pub fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::InputSchema;
    use async_trait::async_trait;
    use serde_json::{Map, Value, json};

    struct Echo {
        name: &'static str,
        schema: InputSchema,
    }

    impl Echo {
        fn named(name: &'static str) -> Self {
            Self {
                name,
                schema: InputSchema::empty(),
            }
        }
    }

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Returns its own name."
        }

        fn input_schema(&self) -> &InputSchema {
            &self.schema
        }

        fn output_schema(&self) -> Value {
            json!({ "type": "string" })
        }

        async fn execute(&self, _args: Map<String, Value>) -> Result<Value, ToolError> {
            Ok(json!(self.name))
        }
    }

    #[test]
    fn empty_registry_has_no_tools() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.specs().is_empty());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo::named("lookup")).unwrap();

        let err = registry.register(Echo::named("lookup")).unwrap_err();
        assert_eq!(err, ToolError::DuplicateTool("lookup".into()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.specs().len(), 1);
    }

    #[tokio::test]
    async fn distinct_names_resolve_independently() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo::named("first")).unwrap();
        registry.register(Echo::named("second")).unwrap();

        let first = registry.resolve("first").unwrap();
        let second = registry.resolve("second").unwrap();
        assert_eq!(first.invoke(Value::Null).await.unwrap(), json!("first"));
        assert_eq!(second.invoke(json!({})).await.unwrap(), json!("second"));

        let names: Vec<_> = registry.specs().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["first", "second"]);
    }

    #[test]
    fn unknown_name_fails() {
        let registry = ToolRegistry::new();
        let err = registry.resolve("missing").err().unwrap();
        assert_eq!(err, ToolError::UnknownTool("missing".into()));
    }

    #[tokio::test]
    async fn invoke_validates_before_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(Echo::named("strict")).unwrap();

        let err = registry
            .resolve("strict")
            .unwrap()
            .invoke(json!({"unexpected": 1}))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidInput {
                tool: "strict".into(),
                fields: vec!["unexpected".into()],
            }
        );
    }
}
