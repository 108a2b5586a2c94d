//! MCP Client using the official rmcp SDK
//!
//! Connects to a tool server over a child process's stdio, any async byte
//! stream, or Streamable HTTP.

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    ServiceExt,
    model::{
        CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation, RawContent,
        Tool,
    },
    service::RunningService,
    transport::IntoTransport,
    RoleClient,
};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::logging::Logger;
use crate::tools::{ToolBackend, ToolError, ToolResult};
use crate::types::{ToolOutput, ToolSpec};

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type McpResult<T> = Result<T, McpError>;

/// MCP client for a single tool server connection
pub struct McpClient {
    /// The underlying rmcp running service
    client: RunningService<RoleClient, ClientInfo>,
    /// Logger
    logger: Arc<dyn Logger>,
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "toolchat".to_string(),
            title: Some("toolchat".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

impl McpClient {
    /// Spawn a tool server and talk to it over its stdin/stdout
    pub async fn connect_child_process(
        program: &str,
        args: &[String],
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        use rmcp::transport::TokioChildProcess;

        logger.info(&format!("[McpClient] Spawning tool server: {} {}", program, args.join(" ")));

        let mut command = tokio::process::Command::new(program);
        command.args(args);
        let transport = TokioChildProcess::new(command)
            .map_err(|e| McpError::ConnectionFailed(format!("{}: {}", program, e)))?;

        Self::handshake(transport, logger).await
    }

    /// Connect over an already-open byte stream (socket, pipe, duplex)
    pub async fn connect_stream<S>(stream: S, logger: Arc<dyn Logger>) -> McpResult<Self>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        logger.debug("[McpClient] Connecting over byte stream");
        Self::handshake(stream, logger).await
    }

    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    pub async fn connect_http(url: &str, logger: Arc<dyn Logger>) -> McpResult<Self> {
        use rmcp::transport::StreamableHttpClientTransport;

        logger.info(&format!("[McpClient] Connecting to HTTP: {}", url));

        let transport = StreamableHttpClientTransport::from_uri(url);
        Self::handshake(transport, logger).await
    }

    async fn handshake<T, E, A>(transport: T, logger: Arc<dyn Logger>) -> McpResult<Self>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        let client = Self { client, logger };
        match client.server_info() {
            Some(info) => client.logger.info(&format!(
                "[McpClient] Connected to {} {}",
                info.name, info.version
            )),
            None => client.logger.info("[McpClient] Connected and initialized successfully"),
        }
        Ok(client)
    }

    /// List all available tools
    pub async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        let result = self
            .client
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        self.logger.debug(&format!("[McpClient] Listed {} tools", result.tools.len()));

        Ok(result.tools)
    }

    /// Call a tool by name
    ///
    /// Non-object arguments are sent as no arguments at all; the server
    /// decides whether that is acceptable.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<CallToolResult> {
        self.logger.debug(&format!("[McpClient] Calling tool: {}", name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        self.client
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))
    }

    /// Get server info
    pub fn server_info(&self) -> Option<&Implementation> {
        self.client.peer_info().map(|info| &info.server_info)
    }

    /// Close the connection
    pub async fn close(self) -> McpResult<()> {
        self.logger.info("[McpClient] Closing connection");
        self.client
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

impl From<Tool> for ToolSpec {
    fn from(tool: Tool) -> Self {
        ToolSpec {
            name: tool.name.to_string(),
            description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
            parameters: Value::Object((*tool.input_schema).clone()),
        }
    }
}

/// Text of a tool result; text parts joined with newlines
fn result_text(result: &CallToolResult) -> String {
    let parts: Vec<&str> = result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        if let Some(structured) = &result.structured_content {
            return structured.to_string();
        }
    }
    parts.join("\n")
}

/// Convert a call result, surfacing `is_error` results as execution failures
fn into_tool_output(result: CallToolResult) -> ToolResult<ToolOutput> {
    let text = result_text(&result);
    if result.is_error.unwrap_or(false) {
        Err(ToolError::Execution(text))
    } else {
        Ok(ToolOutput::new(text))
    }
}

#[async_trait]
impl ToolBackend for McpClient {
    async fn list_tools(&self) -> ToolResult<Vec<ToolSpec>> {
        let tools = McpClient::list_tools(self)
            .await
            .map_err(|e| ToolError::Transport(e.to_string()))?;
        Ok(tools.into_iter().map(ToolSpec::from).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult<ToolOutput> {
        let result = McpClient::call_tool(self, name, arguments)
            .await
            .map_err(|e| ToolError::Transport(e.to_string()))?;
        into_tool_output(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::Content;
    use serde_json::json;

    #[test]
    fn test_tool_spec_from_mcp_tool() {
        let schema = json!({
            "type": "object",
            "properties": { "a": { "type": "integer" } },
            "required": ["a"]
        });
        let object = schema.as_object().cloned().unwrap();
        let tool = Tool::new("square", "Square a number", Arc::new(object));

        let spec = ToolSpec::from(tool);
        assert_eq!(spec.name, "square");
        assert_eq!(spec.description, "Square a number");
        assert_eq!(spec.parameters, schema);
    }

    #[test]
    fn test_text_contents_are_joined() {
        let result = CallToolResult::success(vec![Content::text("first"), Content::text("second")]);
        let output = into_tool_output(result).unwrap();
        assert_eq!(output.content, "first\nsecond");
    }

    #[test]
    fn test_error_result_becomes_execution_error() {
        let result = CallToolResult::error(vec![Content::text("division by zero")]);
        match into_tool_output(result) {
            Err(ToolError::Execution(message)) => assert_eq!(message, "division by zero"),
            other => panic!("expected execution error, got {:?}", other),
        }
    }
}
