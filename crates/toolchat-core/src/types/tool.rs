//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool's calling contract, as discovered from the tool server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Tool name, unique within a session
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub parameters: Value,
}

impl ToolSpec {
    /// Create a new tool spec with an empty object schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    /// Set the parameter schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.parameters = schema;
        self
    }
}

/// Tool call requested by the model
///
/// `arguments` is kept exactly as the model produced it; it is only parsed
/// right before dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Opaque identifier used to correlate the result
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Serialized JSON arguments
    pub arguments: String,
}

impl ToolCallRequest {
    /// Create a new tool call request
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the argument payload
    pub fn parse_arguments(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.arguments)
    }
}

/// Model-facing tool descriptor (`{"type": "function", "function": {...}}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDescriptor,
}

/// The function part of a [`ToolDescriptor`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl ToolDescriptor {
    /// Create a function descriptor
    pub fn function(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionDescriptor {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    /// The function name
    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Text form of a tool's return value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: String,
}

impl ToolOutput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl std::fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content)
    }
}

/// Tool choice option for requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide whether to use tools
    Auto,
    /// Don't use tools
    None,
    /// Force tool use
    Required,
}

impl Default for ToolChoice {
    fn default() -> Self {
        ToolChoice::Auto
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_spec_creation() {
        let spec = ToolSpec::new("multiply", "Multiply two integers").with_schema(json!({
            "type": "object",
            "properties": {
                "a": { "type": "integer" },
                "b": { "type": "integer" }
            },
            "required": ["a", "b"]
        }));

        assert_eq!(spec.name, "multiply");
        assert_eq!(spec.parameters["required"], json!(["a", "b"]));
    }

    #[test]
    fn test_parse_arguments() {
        let call = ToolCallRequest::new("call_1", "multiply", r#"{"a": 6, "b": 7}"#);
        let args = call.parse_arguments().unwrap();
        assert_eq!(args["a"], json!(6));
        assert_eq!(args["b"], json!(7));

        let broken = ToolCallRequest::new("call_2", "multiply", r#"{"a": 6,"#);
        assert!(broken.parse_arguments().is_err());
    }

    #[test]
    fn test_descriptor_serialization() {
        let descriptor = ToolDescriptor::function("multiply", "Multiply", json!({"type": "object"}));
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["type"], "function");
        assert_eq!(value["function"]["name"], "multiply");
        assert_eq!(value["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn test_tool_choice_serialization() {
        assert_eq!(serde_json::to_string(&ToolChoice::Auto).unwrap(), "\"auto\"");
        assert_eq!(ToolChoice::default(), ToolChoice::Auto);
    }
}
