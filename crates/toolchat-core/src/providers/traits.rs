//! Provider trait definition

use async_trait::async_trait;

use crate::types::{Message, ToolCallRequest, ToolChoice, ToolDescriptor};
use super::error::ProviderResult;

/// Model configuration for provider requests
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderModelConfig {
    /// Model identifier as used by the provider's API
    pub model: String,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

impl ProviderModelConfig {
    /// Create a new model config
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            api_base: None,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }
}

/// Options for a chat completion request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Tools available for the model to use
    pub tools: Option<Vec<ToolDescriptor>>,
    /// Tool choice behavior
    pub tool_choice: Option<ToolChoice>,
}

impl CompletionOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set temperature
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Offer tools with `tool_choice = auto`
    ///
    /// An empty list leaves both fields unset, so the request carries no tool
    /// capability at all.
    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        if tools.is_empty() {
            self.tools = None;
            self.tool_choice = None;
        } else {
            self.tools = Some(tools);
            self.tool_choice = Some(ToolChoice::Auto);
        }
        self
    }

    /// Drop any tool capability
    pub fn without_tools(mut self) -> Self {
        self.tools = None;
        self.tool_choice = None;
        self
    }

    /// Whether tools are offered
    pub fn has_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// The single message a completion returns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantReply {
    /// Free text, if any
    pub content: Option<String>,
    /// Structured tool invocations, in the order the model emitted them
    pub tool_calls: Vec<ToolCallRequest>,
}

impl AssistantReply {
    /// A plain-text reply
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    /// A reply requesting tool calls
    pub fn tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            content: None,
            tool_calls,
        }
    }

    /// Whether the model asked for tools
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Text content, empty when the model produced none
    pub fn content_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// Convert into the assistant history entry
    pub fn into_message(self) -> Message {
        Message::assistant_tool_calls(self.content, self.tool_calls)
    }
}

/// Provider trait for model endpoints
///
/// Each provider is a stateless request/response wrapper: everything the
/// model needs travels in `messages`.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name (e.g., "openai", "mock")
    fn name(&self) -> &str;

    /// Get the default API base URL
    fn default_api_base(&self) -> &str;

    /// Run one chat completion
    async fn complete(
        &self,
        messages: &[Message],
        model: &ProviderModelConfig,
        options: &CompletionOptions,
    ) -> ProviderResult<AssistantReply>;

    /// Get the API base URL, using custom if provided
    fn get_api_base(&self, model: &ProviderModelConfig) -> String {
        model.api_base.clone().unwrap_or_else(|| self.default_api_base().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_tools_sets_auto_choice() {
        let options = CompletionOptions::new().with_tools(vec![ToolDescriptor::function(
            "multiply",
            "Multiply",
            serde_json::json!({"type": "object"}),
        )]);
        assert!(options.has_tools());
        assert_eq!(options.tool_choice, Some(ToolChoice::Auto));
    }

    #[test]
    fn test_empty_tools_means_no_capability() {
        let options = CompletionOptions::new().with_tools(vec![]);
        assert!(!options.has_tools());
        assert_eq!(options.tools, None);
        assert_eq!(options.tool_choice, None);
    }

    #[test]
    fn test_reply_into_message() {
        let call = ToolCallRequest::new("c1", "multiply", "{}");
        let message = AssistantReply::tool_calls(vec![call.clone()]).into_message();
        assert_eq!(message.tool_calls(), &[call]);
        assert_eq!(message.text(), None);

        let reply = AssistantReply::text("hello");
        assert!(!reply.has_tool_calls());
        assert_eq!(reply.content_or_empty(), "hello");
    }

    #[test]
    fn test_model_config_builder() {
        let config = ProviderModelConfig::new("qwen3:4b")
            .with_api_key("ollama")
            .with_api_base("http://localhost:11434/v1/");
        assert_eq!(config.model, "qwen3:4b");
        assert_eq!(config.api_key.as_deref(), Some("ollama"));
    }
}
