//! Tool registry for the session's tools
//!
//! The ToolRegistry is the central component for:
//! - Discovering the tools a backend offers (once per session)
//! - Handing them to the model through the tool bridge
//! - Forwarding tool calls to the backend

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::logging::Logger;
use crate::types::{ToolDescriptor, ToolOutput, ToolSpec};

use super::backend::{ToolBackend, ToolResult};
use super::bridge::to_descriptors;

/// Tool registry backed by a single tool source
pub struct ToolRegistry {
    /// Where tools are discovered and executed
    backend: Arc<dyn ToolBackend>,
    /// Tools from the last refresh
    tools: RwLock<Vec<ToolSpec>>,
    /// Logger
    logger: Arc<dyn Logger>,
}

impl ToolRegistry {
    /// Create a registry; nothing is fetched until `refresh`
    pub fn new(backend: Arc<dyn ToolBackend>, logger: Arc<dyn Logger>) -> Self {
        Self {
            backend,
            tools: RwLock::new(Vec::new()),
            logger,
        }
    }

    /// Fetch the tool list from the backend and replace the cache
    ///
    /// Returns the number of tools discovered. On error the previous cache
    /// is kept.
    pub async fn refresh(&self) -> ToolResult<usize> {
        self.logger.info("Fetching tools from the tool server...");

        let specs = match self.backend.list_tools().await {
            Ok(specs) => specs,
            Err(e) => {
                crate::log_error!(self.logger, "[ToolRegistry] Failed to fetch tools: {}", e);
                return Err(e);
            }
        };

        let count = specs.len();
        for spec in &specs {
            crate::log_debug!(self.logger, "[ToolRegistry] {}: {}", spec.name, spec.description);
        }
        *self.tools.write() = specs;

        crate::log_info!(self.logger, "Discovered {} tools from the tool server.", count);
        Ok(count)
    }

    /// Discovered tool specs
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.read().clone()
    }

    /// Tools in the model's calling convention
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        to_descriptors(&self.tools.read())
    }

    /// Whether a tool with this name was discovered
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.read().iter().any(|t| t.name == name)
    }

    /// Get count of discovered tools
    pub fn tool_count(&self) -> usize {
        self.tools.read().len()
    }

    /// Call a tool by name
    ///
    /// The name is not checked against the cache; the backend is the
    /// authority on what exists.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult<ToolOutput> {
        crate::log_debug!(self.logger, "[ToolRegistry] Calling tool: {}", name);
        self.backend.call_tool(name, arguments).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::tools::{LocalToolBackend, ToolError};
    use serde_json::json;

    fn registry(backend: LocalToolBackend) -> (Arc<LocalToolBackend>, ToolRegistry) {
        let backend = Arc::new(backend);
        let registry = ToolRegistry::new(backend.clone(), Arc::new(NoOpLogger::new()));
        (backend, registry)
    }

    #[tokio::test]
    async fn test_refresh_populates_cache() {
        let (_, registry) = registry(LocalToolBackend::calculator());
        assert_eq!(registry.tool_count(), 0);

        assert_eq!(registry.refresh().await.unwrap(), 1);
        assert!(registry.has_tool("multiply"));
        assert_eq!(registry.descriptors()[0].name(), "multiply");
    }

    #[tokio::test]
    async fn test_discovery_is_idempotent() {
        let (_, registry) = registry(LocalToolBackend::calculator());

        registry.refresh().await.unwrap();
        let first = registry.specs();
        registry.refresh().await.unwrap();
        let second = registry.specs();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_tools() {
        let (backend, registry) = registry(LocalToolBackend::calculator());
        registry.refresh().await.unwrap();

        backend.fail_listing("server went away");
        let err = registry.refresh().await.unwrap_err();
        assert!(matches!(err, ToolError::Transport(_)));
        assert_eq!(registry.tool_count(), 1);
    }

    #[tokio::test]
    async fn test_call_tool_forwards_to_backend() {
        let (backend, registry) = registry(LocalToolBackend::calculator());

        let output = registry.call_tool("multiply", json!({"a": 6, "b": 7})).await.unwrap();
        assert_eq!(output.content, "42");
        assert_eq!(backend.calls().len(), 1);

        let missing = registry.call_tool("divide", json!({})).await.unwrap_err();
        assert!(matches!(missing, ToolError::UnknownTool(_)));
    }
}
