//! In-process tool backend
//!
//! Runs tool handlers in the same process. Used by tests and anywhere a
//! conversation should run without spawning a tool server.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::mcp::{checked_multiply, Calculator};
use crate::types::{ToolOutput, ToolSpec};

use super::backend::{ToolBackend, ToolError, ToolResult};

type Handler = Arc<dyn Fn(&Value) -> Result<String, String> + Send + Sync>;

/// A call the backend received
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub name: String,
    pub arguments: Value,
}

/// Tool backend with handlers registered in code
#[derive(Default)]
pub struct LocalToolBackend {
    tools: Vec<(ToolSpec, Handler)>,
    calls: Mutex<Vec<RecordedCall>>,
    listing_error: Mutex<Option<String>>,
}

impl LocalToolBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    pub fn with_tool<F>(mut self, spec: ToolSpec, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<String, String> + Send + Sync + 'static,
    {
        self.tools.push((spec, Arc::new(handler)));
        self
    }

    /// The calculator server's tools, run in process
    ///
    /// Specs come from the server's own router, so both list the same
    /// names, descriptions and schemas.
    pub fn calculator() -> Self {
        Calculator::tool_specs()
            .into_iter()
            .fold(Self::new(), |backend, spec| match spec.name.as_str() {
                "multiply" => backend.with_tool(spec, |args| {
                    let a = integer_arg(args, "a")?;
                    let b = integer_arg(args, "b")?;
                    checked_multiply(a, b).map(|product| product.to_string())
                }),
                _ => backend,
            })
    }

    /// Make every following `list_tools` fail
    pub fn fail_listing(&self, message: impl Into<String>) {
        *self.listing_error.lock() = Some(message.into());
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

fn integer_arg(args: &Value, key: &str) -> Result<i64, String> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| format!("missing integer argument '{}'", key))
}

#[async_trait]
impl ToolBackend for LocalToolBackend {
    async fn list_tools(&self) -> ToolResult<Vec<ToolSpec>> {
        if let Some(message) = self.listing_error.lock().clone() {
            return Err(ToolError::Transport(message));
        }
        Ok(self.tools.iter().map(|(spec, _)| spec.clone()).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult<ToolOutput> {
        self.calls.lock().push(RecordedCall {
            name: name.to_string(),
            arguments: arguments.clone(),
        });

        let handler = self
            .tools
            .iter()
            .find(|(spec, _)| spec.name == name)
            .map(|(_, handler)| Arc::clone(handler))
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        handler(&arguments).map(ToolOutput::new).map_err(ToolError::Execution)
    }
}
