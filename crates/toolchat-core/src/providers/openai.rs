//! OpenAI-compatible chat completions provider
//!
//! Talks to any endpoint implementing `POST /chat/completions` (OpenAI,
//! Ollama, vLLM, LocalAI...). Requests are non-streaming: the loop needs the
//! complete message before it can decide between text and tool calls.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::logging::Logger;
use crate::types::{Message, ToolCallRequest, ToolChoice, ToolDescriptor};

use super::error::{ProviderError, ProviderResult};
use super::traits::{AssistantReply, CompletionOptions, Provider, ProviderModelConfig};

/// Default endpoint: a local Ollama server
pub const DEFAULT_API_BASE: &str = "http://localhost:11434/v1/";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDescriptor]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// A JSON string per the API; some servers send an object instead
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

fn to_wire_message(message: &Message) -> WireMessage {
    let bare = |role: &str, content: Option<String>| WireMessage {
        role: role.to_string(),
        content,
        tool_calls: None,
        tool_call_id: None,
        name: None,
    };

    match message {
        Message::System { content } => bare("system", Some(content.clone())),
        Message::User { content } => bare("user", Some(content.clone())),
        Message::Assistant {
            content,
            tool_calls,
        } => {
            let mut wire = bare("assistant", content.clone());
            if !tool_calls.is_empty() {
                wire.tool_calls = Some(
                    tool_calls
                        .iter()
                        .map(|tc| WireToolCall {
                            id: tc.id.clone(),
                            kind: function_kind(),
                            function: WireFunctionCall {
                                name: tc.name.clone(),
                                arguments: Value::String(tc.arguments.clone()),
                            },
                        })
                        .collect(),
                );
            }
            wire
        }
        Message::Tool {
            tool_call_id,
            name,
            content,
        } => WireMessage {
            role: "tool".to_string(),
            content: Some(content.clone()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.clone()),
            name: Some(name.clone()),
        },
    }
}

/// Convert the response message, keeping arguments as the raw string
fn from_wire_message(message: WireMessage) -> AssistantReply {
    let tool_calls = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, tc)| {
            let id = if tc.id.is_empty() {
                format!("call_{}", index)
            } else {
                tc.id
            };
            let arguments = match tc.function.arguments {
                Value::String(raw) => raw,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            ToolCallRequest::new(id, tc.function.name, arguments)
        })
        .collect();

    AssistantReply {
        content: message.content,
        tool_calls,
    }
}

/// Join the base URL and the completions path
fn completions_url(api_base: &str) -> String {
    format!("{}/chat/completions", api_base.trim_end_matches('/'))
}

/// Provider for OpenAI-compatible endpoints
pub struct OpenAiProvider {
    provider_id: String,
    client: Client,
    logger: Arc<dyn Logger>,
}

impl OpenAiProvider {
    /// Create a new provider
    pub fn new(provider_id: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self {
            provider_id: provider_id.into(),
            client: Client::new(),
            logger,
        }
    }

    /// Use a preconfigured HTTP client
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    async fn error_from_response(&self, status: StatusCode, response: reqwest::Response) -> ProviderError {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| if body.is_empty() { status.to_string() } else { body });

        if status == StatusCode::TOO_MANY_REQUESTS {
            ProviderError::rate_limited(&self.provider_id, message)
        } else {
            ProviderError::api_error(&self.provider_id, status.as_u16(), message)
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.provider_id
    }

    fn default_api_base(&self) -> &str {
        match self.provider_id.as_str() {
            "openai" => "https://api.openai.com/v1/",
            "groq" => "https://api.groq.com/openai/v1/",
            "openrouter" => "https://openrouter.ai/api/v1/",
            "mistral" => "https://api.mistral.ai/v1/",
            _ => DEFAULT_API_BASE,
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        model: &ProviderModelConfig,
        options: &CompletionOptions,
    ) -> ProviderResult<AssistantReply> {
        let url = completions_url(&self.get_api_base(model));
        let tools = options.tools.as_deref().filter(|t| !t.is_empty());

        self.logger.debug(&format!(
            "[OpenAiProvider] POST {} model={} messages={} tools={}",
            url,
            model.model,
            messages.len(),
            tools.map_or(0, |t| t.len())
        ));

        let body = ChatCompletionRequest {
            model: &model.model,
            messages: messages.iter().map(to_wire_message).collect(),
            tools,
            tool_choice: tools.and(options.tool_choice),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            stream: false,
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = model.api_key.as_deref().filter(|k| !k.is_empty()) {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let err = self.error_from_response(status, response).await;
            self.logger.debug(&format!("[OpenAiProvider] {}", err));
            return Err(err);
        }

        let text = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&text)?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::invalid_response(&self.provider_id, "response has no choices"))?;

        let reply = from_wire_message(choice.message);
        self.logger.debug(&format!(
            "[OpenAiProvider] reply: {} chars, {} tool calls",
            reply.content_or_empty().len(),
            reply.tool_calls.len()
        ));
        Ok(reply)
    }
}
