//! Model provider implementations
//!
//! ## Architecture
//!
//! Every provider implements the `Provider` trait: one non-streaming chat
//! completion per call, with the whole history passed in.
//!
//! - `OpenAiProvider` speaks the OpenAI chat-completions wire format, which
//!   covers OpenAI itself and compatible servers such as Ollama and vLLM.
//! - `MockProvider` is kept for testing purposes.

mod traits;
mod error;
mod openai;
mod mock;

// Core traits and types
pub use traits::{AssistantReply, CompletionOptions, Provider, ProviderModelConfig};
pub use error::{ProviderError, ProviderResult};

pub use openai::{OpenAiProvider, DEFAULT_API_BASE};

// Mock provider for testing
pub use mock::{MockMode, MockProvider, MockStep, RecordedRequest};

use crate::logging::Logger;
use std::sync::Arc;

/// Create a provider for the given provider ID
///
/// `mock` yields an echoing `MockProvider`; every other ID is treated as an
/// OpenAI-compatible endpoint.
pub fn create_provider(provider_id: &str, logger: Arc<dyn Logger>) -> Arc<dyn Provider> {
    match provider_id.to_lowercase().as_str() {
        "mock" => Arc::new(MockProvider::echo(logger)),
        _ => Arc::new(OpenAiProvider::new(provider_id, logger)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    #[test]
    fn test_create_provider() {
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger::new());
        assert_eq!(create_provider("mock", Arc::clone(&logger)).name(), "mock");
        assert_eq!(create_provider("MOCK", Arc::clone(&logger)).name(), "mock");
        assert_eq!(create_provider("ollama", Arc::clone(&logger)).name(), "ollama");
        assert_eq!(
            create_provider("ollama", logger).default_api_base(),
            DEFAULT_API_BASE
        );
    }
}
