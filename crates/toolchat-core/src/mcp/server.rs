//! Tool registry server
//!
//! A fixed, compile-time set of typed tools served over MCP. The reference
//! tool is `multiply`.

use std::sync::Arc;

use rmcp::{
    ErrorData, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::Deserialize;

use crate::logging::Logger;
use crate::types::ToolSpec;

use super::client::{McpError, McpResult};

/// Arguments of `multiply`
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MultiplyRequest {
    /// Left operand
    pub a: i64,
    /// Right operand
    pub b: i64,
}

/// Multiply without wrapping
pub fn checked_multiply(a: i64, b: i64) -> Result<i64, String> {
    a.checked_mul(b)
        .ok_or_else(|| format!("{} * {} overflows a 64-bit integer", a, b))
}

/// The calculator tool server
#[derive(Clone)]
pub struct Calculator {
    tool_router: ToolRouter<Self>,
    logger: Arc<dyn Logger>,
}

#[tool_router]
impl Calculator {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            logger,
        }
    }

    #[tool(description = "Multiply two integers and return their product")]
    async fn multiply(
        &self,
        Parameters(MultiplyRequest { a, b }): Parameters<MultiplyRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        self.logger.debug(&format!("[ToolServer] multiply({}, {})", a, b));

        match checked_multiply(a, b) {
            Ok(product) => Ok(CallToolResult::success(vec![Content::text(product.to_string())])),
            Err(message) => {
                self.logger.warn(&format!("[ToolServer] {}", message));
                Ok(CallToolResult::error(vec![Content::text(message)]))
            }
        }
    }
}

impl Calculator {
    /// Specs of every tool the server offers, as a client would list them
    pub fn tool_specs() -> Vec<ToolSpec> {
        Self::tool_router()
            .list_all()
            .into_iter()
            .map(ToolSpec::from)
            .collect()
    }
}

#[tool_handler]
impl ServerHandler for Calculator {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some("Arithmetic tools. Call `multiply` with integer arguments `a` and `b`.".to_string()),
            ..Default::default()
        }
    }
}

/// Serve the calculator on stdin/stdout until the client disconnects
///
/// Nothing but protocol frames may be written to stdout while this runs, so
/// the logger must not print there.
pub async fn serve_stdio(logger: Arc<dyn Logger>) -> McpResult<()> {
    logger.info("[ToolServer] Serving tools on stdio");

    let service = Calculator::new(logger.clone())
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

    let reason = service
        .waiting()
        .await
        .map_err(|e| McpError::Protocol(e.to_string()))?;

    logger.info(&format!("[ToolServer] Stopped: {:?}", reason));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::mcp::McpClient;
    use crate::tools::{LocalToolBackend, ToolBackend, ToolError};
    use serde_json::json;

    async fn connected() -> McpClient {
        let (client_io, server_io) = tokio::io::duplex(4096);
        let server = Calculator::new(Arc::new(NoOpLogger::new()));
        tokio::spawn(async move {
            if let Ok(service) = server.serve(server_io).await {
                let _ = service.waiting().await;
            }
        });
        McpClient::connect_stream(client_io, Arc::new(NoOpLogger::new()))
            .await
            .unwrap()
    }

    #[test]
    fn test_checked_multiply() {
        assert_eq!(checked_multiply(6, 7), Ok(42));
        assert_eq!(checked_multiply(-4, 5), Ok(-20));
        assert!(checked_multiply(i64::MAX, 2).is_err());
    }

    #[tokio::test]
    async fn test_lists_multiply_with_schema() {
        let client = connected().await;

        let tools = ToolBackend::list_tools(&client).await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "multiply");
        assert!(!tools[0].description.is_empty());
        assert!(tools[0].parameters["properties"]["a"].is_object());
        assert!(tools[0].parameters["properties"]["b"].is_object());

        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_multiply_round_trip() {
        let client = connected().await;

        let output = ToolBackend::call_tool(&client, "multiply", json!({"a": 6, "b": 7}))
            .await
            .unwrap();
        assert_eq!(output.content, "42");

        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_overflow_is_a_tool_error() {
        let client = connected().await;

        let err = ToolBackend::call_tool(&client, "multiply", json!({"a": i64::MAX, "b": 2}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Execution(_)));

        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_bad_arguments_and_unknown_tool_fail() {
        let client = connected().await;

        assert!(ToolBackend::call_tool(&client, "multiply", json!({"a": "six"})).await.is_err());
        assert!(ToolBackend::call_tool(&client, "divide", json!({"a": 1, "b": 2})).await.is_err());

        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_in_process_calculator_matches_served_tools() {
        let client = connected().await;

        let served = ToolBackend::list_tools(&client).await.unwrap();
        let local = LocalToolBackend::calculator().list_tools().await.unwrap();
        assert_eq!(served, local);
        assert_eq!(local, Calculator::tool_specs());

        client.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_discovery_is_idempotent() {
        let client = connected().await;

        let first = ToolBackend::list_tools(&client).await.unwrap();
        let second = ToolBackend::list_tools(&client).await.unwrap();
        assert_eq!(first, second);

        client.close().await.unwrap();
    }
}
