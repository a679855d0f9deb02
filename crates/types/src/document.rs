//! Tool and discovery document types.

use crate::schema::{SchemaNode, SchemaRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Static header of a discovery document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Version of the document schema
    pub schema_version: String,
    /// Optional human-readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Optional human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for DocumentInfo {
    fn default() -> Self {
        Self {
            schema_version: "1.0".to_string(),
            title: None,
            description: None,
        }
    }
}

/// One discoverable, invocable unit corresponding to a single API endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Unique tool name
    pub name: String,
    /// Summary shown to the calling agent
    pub description: String,
    /// Object schema whose properties are the endpoint parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: SchemaNode,
    /// Schema of the unwrapped return type
    #[serde(rename = "outputSchema")]
    pub output_schema: SchemaRef,
    /// Handler identity metadata for execution layers
    #[serde(default)]
    pub annotations: Map<String, Value>,
}

impl Tool {
    /// Returns a single annotation value as a string, when present.
    pub fn annotation_str(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).and_then(Value::as_str)
    }
}

/// Root discovery document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    /// Static information block
    pub info: DocumentInfo,
    /// Tools in discovery order
    pub tools: Vec<Tool>,
    /// Open metadata map from configuration
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    /// Finds a tool by name.
    pub fn tool(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    /// Borrows the reduced `{"tools": [...]}` view of this document.
    pub fn listing(&self) -> ToolListing<'_> {
        ToolListing { tools: &self.tools }
    }
}

/// Tools-only view serialized as `{"tools": [...]}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToolListing<'a> {
    /// Borrowed tool list
    pub tools: &'a [Tool],
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaKind;
    use serde_json::json;
    use std::sync::Arc;

    fn sample_tool() -> Tool {
        Tool {
            name: "Orders_Get".to_string(),
            description: "GET api/orders/{id}".to_string(),
            input_schema: SchemaNode::empty_object(),
            output_schema: Arc::new(SchemaNode::of_kind(SchemaKind::Null)),
            annotations: Map::new(),
        }
    }

    #[test]
    fn tool_serializes_schema_keys_in_camel_case() {
        let value = serde_json::to_value(sample_tool()).expect("serialize tool");

        assert!(value.get("inputSchema").is_some());
        assert_eq!(value["outputSchema"], json!({ "type": "null" }));
    }

    #[test]
    fn listing_wraps_tools_only() {
        let document = Document {
            info: DocumentInfo {
                title: Some("Shop".to_string()),
                ..Default::default()
            },
            tools: vec![sample_tool()],
            metadata: Map::new(),
        };

        let listing = serde_json::to_value(document.listing()).expect("serialize listing");

        assert_eq!(listing.as_object().map(|object| object.len()), Some(1));
        assert_eq!(listing["tools"][0]["name"], "Orders_Get");
    }

    #[test]
    fn info_omits_missing_title_and_description() {
        let value = serde_json::to_value(DocumentInfo::default()).expect("serialize info");
        assert_eq!(value, json!({ "schema_version": "1.0" }));
    }
}
