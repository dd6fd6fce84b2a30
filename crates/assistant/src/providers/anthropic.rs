//! Anthropic Messages API backend.

use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{
    Backend, Completion, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall,
    ToolChoice, ToolSpec, Usage,
};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ApiToolChoice>,
}

#[derive(Debug, Serialize)]
struct ApiToolChoice {
    #[serde(rename = "type")]
    choice_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: ApiContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ApiContent {
    Text(String),
    Blocks(Vec<ApiContentBlock>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

#[derive(Debug, Serialize)]
struct ApiTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ApiResponseBlock>,
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating an Anthropic backend.
#[derive(Debug, Clone)]
pub struct AnthropicBackendBuilder {
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl AnthropicBackendBuilder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Send requests to a different endpoint, such as a proxy.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn build(self) -> AnthropicBackend {
        AnthropicBackend {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            model: self.model,
            max_tokens: self.max_tokens,
            base_url: self.base_url,
        }
    }
}

/// Anthropic API backend.
pub struct AnthropicBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl AnthropicBackend {
    pub fn builder(api_key: impl Into<String>, model: impl Into<String>) -> AnthropicBackendBuilder {
        AnthropicBackendBuilder::new(api_key, model)
    }

    fn apply_headers(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .header("accept", "application/json")
    }

    fn role_to_api(role: Role) -> &'static str {
        match role {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn message_to_api(msg: &Message) -> ApiMessage {
        let role = Self::role_to_api(msg.role);

        // Simple case: single text part
        if let [Part::Text(text)] = msg.parts.as_slice() {
            return ApiMessage {
                role,
                content: ApiContent::Text(text.clone()),
            };
        }

        let blocks = msg
            .parts
            .iter()
            .map(|part| match part {
                Part::Text(text) => ApiContentBlock::Text { text: text.clone() },
                Part::ToolCall(call) => ApiContentBlock::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: match &call.input {
                        Value::Null => Value::Object(Default::default()),
                        input => input.clone(),
                    },
                },
                Part::ToolResult(result) => ApiContentBlock::ToolResult {
                    tool_use_id: result.tool_call_id.clone(),
                    content: result.output.to_string(),
                },
            })
            .collect();

        ApiMessage {
            role,
            content: ApiContent::Blocks(blocks),
        }
    }

    fn tool_to_api(spec: &ToolSpec) -> ApiTool<'_> {
        ApiTool {
            name: &spec.name,
            description: &spec.description,
            input_schema: &spec.input_schema,
        }
    }

    fn build_request<'a>(&'a self, request: &ModelRequest<'a>) -> ApiRequest<'a> {
        let tools: Vec<ApiTool<'a>> = request.tools.iter().map(Self::tool_to_api).collect();
        let tool_choice = if tools.is_empty() {
            None
        } else {
            Some(ApiToolChoice {
                choice_type: match request.tool_choice {
                    ToolChoice::Auto => "auto",
                    ToolChoice::None => "none",
                },
            })
        };

        ApiRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: request.system,
            messages: request.messages.iter().map(Self::message_to_api).collect(),
            tools,
            tool_choice,
        }
    }

    /// Collapse response blocks into one completion. The first tool use
    /// wins; otherwise text blocks are joined.
    fn response_to_completion(blocks: Vec<ApiResponseBlock>) -> Result<Completion, ModelError> {
        let mut text = String::new();
        let mut calls = Vec::new();
        for block in blocks {
            match block {
                ApiResponseBlock::Text { text: t } => text.push_str(&t),
                ApiResponseBlock::ToolUse { id, name, input } => {
                    calls.push(ToolCall { id, name, input })
                }
                ApiResponseBlock::Unknown => {}
            }
        }

        if calls.len() > 1 {
            warn!(
                event_name = "anthropic.response.extra_tool_calls",
                requested = calls.len(),
                "model requested several tools; only the first is used"
            );
        }
        match calls.into_iter().next() {
            Some(call) => Ok(Completion::ToolCall(call)),
            None if text.is_empty() => Err(ModelError::InvalidResponse(
                "response had no text or tool use".into(),
            )),
            None => Ok(Completion::Text(text)),
        }
    }
}

impl std::fmt::Display for AnthropicBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "anthropic({})", self.model)
    }
}

impl Backend for AnthropicBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let api_request = self.build_request(&request);

        let response = self
            .apply_headers(self.client.post(&self.base_url))
            .json(&api_request)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let usage = Usage {
            input_tokens: api_response.usage.input_tokens,
            output_tokens: api_response.usage.output_tokens,
        };
        debug!(
            event_name = "anthropic.response",
            model = %self.model,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "anthropic call completed"
        );

        Ok(ModelResponse {
            completion: Self::response_to_completion(api_response.content)?,
            usage,
        })
    }
}
