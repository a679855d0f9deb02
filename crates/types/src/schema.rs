//! JSON-Schema-like nodes emitted for tool input and output schemas.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Shared handle to a schema node.
///
/// Nodes produced by the schema engine are memoized and handed out as shared
/// references, so two lookups of the same type yield the same allocation.
pub type SchemaRef = Arc<SchemaNode>;

/// The JSON `type` keyword of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    #[default]
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

impl SchemaKind {
    /// Returns the wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaKind::String => "string",
            SchemaKind::Integer => "integer",
            SchemaKind::Number => "number",
            SchemaKind::Boolean => "boolean",
            SchemaKind::Object => "object",
            SchemaKind::Array => "array",
            SchemaKind::Null => "null",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One JSON-Schema-like unit.
///
/// `properties` and `required` are only meaningful for object nodes and
/// `items` only for array nodes. `annotations` carries advisory metadata (for
/// example where a parameter is bound from) and is flattened into the node on
/// serialization; it never participates in the structural shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    /// Schema type keyword
    #[serde(rename = "type")]
    pub kind: SchemaKind,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Format hint (e.g. `date-time`, `uuid`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Element schema for array nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<SchemaRef>,
    /// Property schemas for object nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaRef>>,
    /// Names of required properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<IndexSet<String>>,
    /// Literal values for enumeration types, in declaration order
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Open-ended map marker for dictionary-shaped types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
    /// Minimum string length from validation attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum string length from validation attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Inclusive numeric lower bound from validation attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive numeric upper bound from validation attributes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Advisory metadata merged into the node as top-level keys
    #[serde(flatten, default)]
    pub annotations: Map<String, Value>,
}

impl SchemaNode {
    /// Creates a bare node of the given kind.
    pub fn of_kind(kind: SchemaKind) -> Self {
        Self { kind, ..Default::default() }
    }

    /// Creates a bare scalar node with an optional format hint.
    pub fn scalar(kind: SchemaKind, format: Option<&str>) -> Self {
        Self {
            kind,
            format: format.map(str::to_string),
            ..Default::default()
        }
    }

    /// Creates an object node with empty `properties` and `required`.
    pub fn empty_object() -> Self {
        Self {
            kind: SchemaKind::Object,
            properties: Some(IndexMap::new()),
            required: Some(IndexSet::new()),
            ..Default::default()
        }
    }

    /// Creates an object node from collected properties and required names.
    ///
    /// Required names that do not correspond to a property are dropped so the
    /// node always satisfies `required ⊆ properties`.
    pub fn object(properties: IndexMap<String, SchemaRef>, required: IndexSet<String>) -> Self {
        let required = required.into_iter().filter(|name| properties.contains_key(name)).collect();
        Self {
            kind: SchemaKind::Object,
            properties: Some(properties),
            required: Some(required),
            ..Default::default()
        }
    }

    /// Creates an array node with the given element schema.
    pub fn array(items: SchemaRef) -> Self {
        Self {
            kind: SchemaKind::Array,
            items: Some(items),
            ..Default::default()
        }
    }

    /// Creates an open-ended object for dictionary-shaped types.
    pub fn open_object() -> Self {
        Self {
            kind: SchemaKind::Object,
            additional_properties: Some(true),
            ..Default::default()
        }
    }

    /// Creates the placeholder used to break a reference cycle on `type_name`.
    pub fn circular_reference(type_name: &str) -> Self {
        Self {
            description: Some(format!("Circular reference to {type_name}")),
            ..Self::empty_object()
        }
    }

    /// Returns a property schema by name.
    pub fn property(&self, name: &str) -> Option<&SchemaRef> {
        self.properties.as_ref().and_then(|properties| properties.get(name))
    }

    /// Returns whether the named property is required.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.as_ref().is_some_and(|required| required.contains(name))
    }

    /// Returns a single annotation value.
    pub fn annotation(&self, key: &str) -> Option<&Value> {
        self.annotations.get(key)
    }

    /// Compares two nodes ignoring annotations at every level.
    pub fn structurally_eq(&self, other: &SchemaNode) -> bool {
        let items_match = match (&self.items, &other.items) {
            (Some(left), Some(right)) => left.structurally_eq(right),
            (None, None) => true,
            _ => false,
        };
        let properties_match = match (&self.properties, &other.properties) {
            (Some(left), Some(right)) => {
                left.len() == right.len()
                    && left
                        .iter()
                        .all(|(name, node)| right.get(name).is_some_and(|other_node| node.structurally_eq(other_node)))
            }
            (None, None) => true,
            _ => false,
        };

        self.kind == other.kind
            && items_match
            && properties_match
            && self.required == other.required
            && self.enum_values == other.enum_values
            && self.additional_properties == other.additional_properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_kind_as_type_and_merges_annotations() {
        let mut node = SchemaNode::scalar(SchemaKind::Integer, Some("int32"));
        node.annotations.insert("x-source".to_string(), json!("route"));

        let value = serde_json::to_value(&node).expect("serialize node");

        assert_eq!(value, json!({ "type": "integer", "format": "int32", "x-source": "route" }));
    }

    #[test]
    fn circular_placeholder_has_empty_properties_and_required() {
        let node = SchemaNode::circular_reference("Category");
        let value = serde_json::to_value(&node).expect("serialize node");

        assert_eq!(
            value,
            json!({
                "type": "object",
                "description": "Circular reference to Category",
                "properties": {},
                "required": []
            })
        );
    }

    #[test]
    fn object_drops_required_names_without_properties() {
        let mut properties = IndexMap::new();
        properties.insert("id".to_string(), Arc::new(SchemaNode::of_kind(SchemaKind::Integer)));
        let required: IndexSet<String> = ["id".to_string(), "ghost".to_string()].into_iter().collect();

        let node = SchemaNode::object(properties, required);

        assert!(node.is_required("id"));
        assert!(!node.is_required("ghost"));
    }

    #[test]
    fn structural_equality_ignores_annotations() {
        let plain = SchemaNode::of_kind(SchemaKind::String);
        let mut annotated = plain.clone();
        annotated.annotations.insert("x-source".to_string(), json!("query"));

        assert!(plain.structurally_eq(&annotated));
        assert_ne!(plain, annotated);
    }

    #[test]
    fn dictionary_marker_serializes_as_additional_properties() {
        let value = serde_json::to_value(SchemaNode::open_object()).expect("serialize node");
        assert_eq!(value, json!({ "type": "object", "additionalProperties": true }));
    }
}
