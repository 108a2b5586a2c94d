//! MCP (Model Context Protocol) module
//!
//! Uses the official rmcp SDK for both sides of the tool connection.
//!
//! # Example
//!
//! ```rust,ignore
//! use toolchat_core::mcp::McpClient;
//! use std::sync::Arc;
//!
//! let logger: Arc<dyn Logger> = Arc::new(NoOpLogger::new());
//!
//! // Spawn the tool server as a child process
//! let client = McpClient::connect_child_process("toolchat", &["serve".into()], logger).await?;
//!
//! // List available tools
//! let tools = client.list_tools().await?;
//!
//! // Call a tool
//! let result = client.call_tool("multiply", json!({ "a": 6, "b": 7 })).await?;
//!
//! client.close().await?;
//! ```

mod client;
mod server;

pub use client::{McpClient, McpError, McpResult};
pub use server::{checked_multiply, serve_stdio, Calculator, MultiplyRequest};

// Re-export rmcp types that consumers might need
pub use rmcp::model::{Tool as McpTool, CallToolResult as McpToolResult};
