//! Mock provider for testing
//!
//! Provides deterministic, configurable replies without network
//! dependencies, and records every request so tests can assert on what the
//! conversation loop actually sent.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{ProviderError, ProviderResult};
use super::traits::{AssistantReply, CompletionOptions, Provider, ProviderModelConfig};
use crate::logging::Logger;
use crate::types::{Message, MessageRole, ToolCallRequest};

/// One scripted step
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Return this reply
    Reply(AssistantReply),
    /// Fail as if the endpoint were unreachable
    Fail(String),
}

impl MockStep {
    /// Plain-text reply step
    pub fn text(content: impl Into<String>) -> Self {
        MockStep::Reply(AssistantReply::text(content))
    }

    /// Single tool call step
    pub fn tool_call(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        MockStep::Reply(AssistantReply::tool_calls(vec![ToolCallRequest::new(id, name, arguments)]))
    }

    /// Failure step
    pub fn fail(message: impl Into<String>) -> Self {
        MockStep::Fail(message.into())
    }
}

/// Mock response mode
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Echo back the last user message
    Echo,
    /// Return a fixed response
    Fixed(String),
    /// Play back steps in order; running out is an error
    Script(Vec<MockStep>),
}

impl Default for MockMode {
    fn default() -> Self {
        MockMode::Echo
    }
}

/// A request the mock received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub model: String,
    pub options: CompletionOptions,
}

/// Mock model provider for testing
pub struct MockProvider {
    mode: MockMode,
    script: Mutex<VecDeque<MockStep>>,
    requests: Mutex<Vec<RecordedRequest>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    /// Create a mock provider in the given mode
    pub fn with_mode(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        let script = match &mode {
            MockMode::Script(steps) => steps.iter().cloned().collect(),
            _ => VecDeque::new(),
        };
        Self {
            mode,
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Create an echo provider (echoes back user message)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Echo, logger)
    }

    /// Create a fixed response provider
    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Fixed(response.into()), logger)
    }

    /// Create a scripted provider
    pub fn scripted(steps: Vec<MockStep>, logger: Arc<dyn Logger>) -> Self {
        Self::with_mode(MockMode::Script(steps), logger)
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Steps not yet played back
    pub fn remaining_steps(&self) -> usize {
        self.script.lock().len()
    }

    fn last_user_message(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role() == MessageRole::User)
            .and_then(|m| m.text())
            .filter(|t| !t.is_empty())
            .unwrap_or("Hello from MockProvider!")
            .to_string()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_api_base(&self) -> &str {
        "http://localhost:0/mock"
    }

    async fn complete(
        &self,
        messages: &[Message],
        model: &ProviderModelConfig,
        options: &CompletionOptions,
    ) -> ProviderResult<AssistantReply> {
        self.requests.lock().push(RecordedRequest {
            messages: messages.to_vec(),
            model: model.model.clone(),
            options: options.clone(),
        });

        match &self.mode {
            MockMode::Echo => {
                let user_msg = Self::last_user_message(messages);
                self.logger.debug(&format!("MockProvider: echoing {}", user_msg));
                Ok(AssistantReply::text(format!("Echo: {}", user_msg)))
            }
            MockMode::Fixed(response) => Ok(AssistantReply::text(response.clone())),
            MockMode::Script(_) => {
                let step = self.script.lock().pop_front();
                match step {
                    Some(MockStep::Reply(reply)) => Ok(reply),
                    Some(MockStep::Fail(message)) => {
                        self.logger.debug(&format!("MockProvider: failing with {}", message));
                        Err(ProviderError::api_error("mock", 503, message))
                    }
                    None => Err(ProviderError::Other("Mock script exhausted".to_string())),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    fn test_logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    fn test_model() -> ProviderModelConfig {
        ProviderModelConfig::new("mock-model")
    }

    #[tokio::test]
    async fn test_echo_mode() {
        let provider = MockProvider::echo(test_logger());
        let reply = provider
            .complete(&[Message::user("Hello, world!")], &test_model(), &CompletionOptions::new())
            .await
            .unwrap();

        assert_eq!(reply.content.as_deref(), Some("Echo: Hello, world!"));
    }

    #[tokio::test]
    async fn test_fixed_mode() {
        let provider = MockProvider::fixed("This is a test response.", test_logger());
        let reply = provider
            .complete(&[Message::user("Anything")], &test_model(), &CompletionOptions::new())
            .await
            .unwrap();

        assert_eq!(reply.content.as_deref(), Some("This is a test response."));
    }

    #[tokio::test]
    async fn test_script_plays_in_order_then_runs_out() {
        let provider = MockProvider::scripted(
            vec![
                MockStep::tool_call("c1", "multiply", r#"{"a":2,"b":3}"#),
                MockStep::fail("connection refused"),
                MockStep::text("done"),
            ],
            test_logger(),
        );
        let messages = [Message::user("go")];
        let options = CompletionOptions::new();

        let first = provider.complete(&messages, &test_model(), &options).await.unwrap();
        assert_eq!(first.tool_calls[0].name, "multiply");

        let second = provider.complete(&messages, &test_model(), &options).await;
        assert!(matches!(second, Err(ProviderError::ApiError { status: 503, .. })));

        let third = provider.complete(&messages, &test_model(), &options).await.unwrap();
        assert_eq!(third.content.as_deref(), Some("done"));
        assert_eq!(provider.remaining_steps(), 0);

        let fourth = provider.complete(&messages, &test_model(), &options).await;
        assert!(matches!(fourth, Err(ProviderError::Other(_))));
    }

    #[tokio::test]
    async fn test_requests_are_recorded() {
        let provider = MockProvider::fixed("ok", test_logger());
        let options = CompletionOptions::new().with_max_tokens(16);
        provider
            .complete(&[Message::user("first")], &test_model(), &options)
            .await
            .unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "mock-model");
        assert_eq!(requests[0].messages, vec![Message::user("first")]);
        assert_eq!(requests[0].options.max_tokens, Some(16));
    }

    #[test]
    fn test_provider_metadata() {
        let provider = MockProvider::echo(test_logger());
        assert_eq!(provider.name(), "mock");
        assert_eq!(provider.request_count(), 0);
    }
}
