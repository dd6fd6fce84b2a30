//! Declared tool inputs and their validation.

use serde_json::{Map, Value, json};

use super::ToolError;

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamType {
    fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
        }
    }
}

/// One named tool parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: ParamType,
    pub description: String,
    pub required: bool,
}

impl Param {
    pub fn required(name: impl Into<String>, kind: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParamType, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }
}

/// The parameters a tool accepts. Undeclared parameters are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSchema {
    params: Vec<Param>,
}

impl InputSchema {
    /// A schema for tools that take no arguments.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Check `input` against the declared parameters.
    ///
    /// `null` is accepted as an empty argument object. On failure the error
    /// names every offending field, in declaration order followed by any
    /// undeclared fields in input order.
    pub fn validate(&self, tool: &str, input: Value) -> Result<Map<String, Value>, ToolError> {
        let args = match input {
            Value::Null => Map::new(),
            Value::Object(args) => args,
            _ => {
                return Err(ToolError::InvalidInput {
                    tool: tool.to_string(),
                    fields: vec!["<arguments>".to_string()],
                });
            }
        };

        let mut fields = Vec::new();
        for param in &self.params {
            match args.get(&param.name) {
                None | Some(Value::Null) if param.required => fields.push(param.name.clone()),
                None | Some(Value::Null) => {}
                Some(value) if !param.kind.matches(value) => fields.push(param.name.clone()),
                Some(_) => {}
            }
        }
        fields.extend(
            args.keys()
                .filter(|key| !self.params.iter().any(|p| &p.name == *key))
                .cloned(),
        );

        if fields.is_empty() {
            Ok(args)
        } else {
            Err(ToolError::InvalidInput {
                tool: tool.to_string(),
                fields,
            })
        }
    }

    /// Render as a JSON Schema object for the model.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    json!({ "type": p.kind.as_str(), "description": p.description }),
                )
            })
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_schema() -> InputSchema {
        InputSchema::empty()
            .param(Param::required("stage", ParamType::String, "Pipeline stage"))
            .param(Param::optional("limit", ParamType::Integer, "Max rows"))
    }

    #[test]
    fn empty_schema_accepts_null_and_empty_object() {
        let schema = InputSchema::empty();
        assert!(schema.validate("t", Value::Null).unwrap().is_empty());
        assert!(schema.validate("t", json!({})).unwrap().is_empty());
    }

    #[test]
    fn undeclared_fields_are_named() {
        let err = InputSchema::empty()
            .validate("t", json!({"region": "EMEA"}))
            .unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidInput {
                tool: "t".into(),
                fields: vec!["region".into()],
            }
        );
    }

    #[test]
    fn missing_and_mistyped_fields_are_named() {
        let err = stage_schema()
            .validate("t", json!({"limit": "ten"}))
            .unwrap_err();
        let ToolError::InvalidInput { fields, .. } = &err else {
            panic!("expected InvalidInput, got {err:?}");
        };
        assert_eq!(fields, &["stage".to_string(), "limit".to_string()]);
    }

    #[test]
    fn valid_arguments_pass_through() {
        let args = stage_schema()
            .validate("t", json!({"stage": "Proposal", "limit": 5}))
            .unwrap();
        assert_eq!(args["stage"], "Proposal");
        assert_eq!(args["limit"], 5);
    }

    #[test]
    fn non_object_arguments_are_rejected() {
        let err = stage_schema().validate("t", json!(["Proposal"])).unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput { .. }));
    }

    #[test]
    fn json_schema_lists_required_params() {
        let schema = stage_schema().to_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
        assert_eq!(schema["required"], json!(["stage"]));
        assert_eq!(schema["additionalProperties"], false);
    }
}
