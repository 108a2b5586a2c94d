//! Tool bridge: tool server specs -> model tool descriptors

use crate::types::{ToolDescriptor, ToolSpec};

impl From<&ToolSpec> for ToolDescriptor {
    fn from(spec: &ToolSpec) -> Self {
        // The server's input schema already is a JSON Schema object
        ToolDescriptor::function(spec.name.clone(), spec.description.clone(), spec.parameters.clone())
    }
}

/// Convert every spec, in order, without filtering or renaming
pub fn to_descriptors(specs: &[ToolSpec]) -> Vec<ToolDescriptor> {
    specs.iter().map(ToolDescriptor::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_passes_schema_through() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": { "type": "integer", "format": "int64" },
                "b": { "type": "integer", "format": "int64" }
            },
            "required": ["a", "b"]
        });
        let specs = vec![ToolSpec::new("multiply", "Multiply two integers").with_schema(schema.clone())];

        let descriptors = to_descriptors(&specs);
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].kind, "function");
        assert_eq!(descriptors[0].function.name, "multiply");
        assert_eq!(descriptors[0].function.description, "Multiply two integers");
        assert_eq!(descriptors[0].function.parameters, schema);
    }

    #[test]
    fn test_order_preserved_and_empty_stays_empty() {
        let specs = vec![ToolSpec::new("b", "second"), ToolSpec::new("a", "first")];
        let names: Vec<_> = to_descriptors(&specs).iter().map(|d| d.name().to_string()).collect();
        assert_eq!(names, vec!["b", "a"]);

        assert!(to_descriptors(&[]).is_empty());
    }
}
