//! toolchat core
//!
//! A chat-completion client that lets a language model call tools served
//! over MCP. This crate holds everything except terminal wiring, so the
//! conversation loop can be driven by tests or embedded elsewhere.
//!
//! ## Tool calling
//!
//! The `tools` module discovers tools from an MCP server and hands them to
//! the model; the `chat` module runs the conversation loop:
//!
//! ```rust,ignore
//! use toolchat_core::{ChatSession, McpClient, ToolRegistry};
//!
//! let client = Arc::new(McpClient::connect_child_process("toolchat", &["serve".into()], logger.clone()).await?);
//! let registry = ToolRegistry::new(client.clone(), logger.clone());
//!
//! let mut session = ChatSession::new(provider, model, registry, logger);
//! session.start().await?;
//! let outcome = session.handle_input("what is 6 times 7?").await;
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod providers;
pub mod tools;
pub mod mcp;
pub mod chat;

// Re-export commonly used types
pub use types::{
    Message, MessageRole,
    ToolSpec, ToolCallRequest, ToolDescriptor, ToolOutput, ToolChoice,
};

pub use logging::{Logger, NoOpLogger, ConsoleLogger, MemoryLogger};

pub use config::{ChatConfig, ConfigError, ConfigLevel, ConfigOverrides};

pub use providers::{
    Provider, ProviderError, ProviderModelConfig, CompletionOptions, AssistantReply,
    OpenAiProvider, MockProvider, create_provider,
};

pub use tools::{ToolBackend, ToolError, ToolRegistry, LocalToolBackend};

// MCP client and tool server using official rmcp SDK
pub use mcp::{McpClient, McpError, McpResult, Calculator, serve_stdio};

pub use chat::{ChatSession, ConversationHistory, SessionError, TurnError, TurnOutcome};
