//! Tool backend abstraction
//!
//! The conversation loop never talks to MCP directly; it goes through this
//! trait so it can be driven by an in-memory backend in tests.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::types::{ToolOutput, ToolSpec};

/// Errors from listing or calling tools
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool server could not be reached or rejected the request
    #[error("{0}")]
    Transport(String),

    /// The tool ran and reported a failure
    #[error("{0}")]
    Execution(String),

    /// No tool with this name exists
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Source of tools: discovery and invocation
#[async_trait]
pub trait ToolBackend: Send + Sync {
    /// List every tool the backend offers
    async fn list_tools(&self) -> ToolResult<Vec<ToolSpec>>;

    /// Invoke a tool with already-parsed arguments
    async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult<ToolOutput>;
}
