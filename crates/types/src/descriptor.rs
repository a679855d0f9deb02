//! Descriptors for host types and endpoints.
//!
//! These are the data the host application exports about itself: one
//! [`TypeDef`] per user-defined type and one [`EndpointDescriptor`] per
//! controller action. They are plain serde types so that a host can ship them
//! as a JSON or YAML snapshot.

use crate::attribute::{Attribute, AttributeSet, HttpVerb};
use crate::schema::SchemaKind;
use crate::type_expr::simple_name;
use serde::{Deserialize, Serialize};

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    String,
    Char,
    Guid,
    Uri,
    Boolean,
    SByte,
    Byte,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Int128,
    UInt128,
    Single,
    Double,
    Decimal,
    DateTime,
    DateTimeOffset,
    DateOnly,
    TimeOnly,
    TimeSpan,
}

impl PrimitiveKind {
    /// Maps the primitive onto its schema kind.
    pub fn schema_kind(&self) -> SchemaKind {
        match self {
            PrimitiveKind::String
            | PrimitiveKind::Char
            | PrimitiveKind::Guid
            | PrimitiveKind::Uri
            | PrimitiveKind::DateTime
            | PrimitiveKind::DateTimeOffset
            | PrimitiveKind::DateOnly
            | PrimitiveKind::TimeOnly
            | PrimitiveKind::TimeSpan => SchemaKind::String,
            PrimitiveKind::Boolean => SchemaKind::Boolean,
            PrimitiveKind::SByte
            | PrimitiveKind::Byte
            | PrimitiveKind::Int16
            | PrimitiveKind::UInt16
            | PrimitiveKind::Int32
            | PrimitiveKind::UInt32
            | PrimitiveKind::Int64
            | PrimitiveKind::UInt64
            | PrimitiveKind::Int128
            | PrimitiveKind::UInt128 => SchemaKind::Integer,
            PrimitiveKind::Single | PrimitiveKind::Double | PrimitiveKind::Decimal => SchemaKind::Number,
        }
    }

    /// Returns the format hint emitted alongside the schema kind.
    pub fn format(&self) -> Option<&'static str> {
        match self {
            PrimitiveKind::Guid => Some("uuid"),
            PrimitiveKind::Uri => Some("uri"),
            PrimitiveKind::DateTime | PrimitiveKind::DateTimeOffset => Some("date-time"),
            PrimitiveKind::DateOnly => Some("date"),
            PrimitiveKind::TimeOnly => Some("time"),
            PrimitiveKind::TimeSpan => Some("duration"),
            PrimitiveKind::Int32 => Some("int32"),
            PrimitiveKind::Int64 => Some("int64"),
            PrimitiveKind::Single => Some("float"),
            PrimitiveKind::Double => Some("double"),
            _ => None,
        }
    }

    /// Whether instances are value types (non-nullable unless wrapped).
    pub fn is_value_type(&self) -> bool {
        !matches!(self, PrimitiveKind::String | PrimitiveKind::Uri)
    }

    /// Recognizes a primitive by keyword alias or unqualified framework name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        let primitive = match name {
            "string" => PrimitiveKind::String,
            "char" => PrimitiveKind::Char,
            "bool" => PrimitiveKind::Boolean,
            "sbyte" => PrimitiveKind::SByte,
            "byte" => PrimitiveKind::Byte,
            "short" => PrimitiveKind::Int16,
            "ushort" => PrimitiveKind::UInt16,
            "int" => PrimitiveKind::Int32,
            "uint" => PrimitiveKind::UInt32,
            "long" => PrimitiveKind::Int64,
            "ulong" => PrimitiveKind::UInt64,
            "float" => PrimitiveKind::Single,
            "double" => PrimitiveKind::Double,
            "decimal" => PrimitiveKind::Decimal,
            _ => match simple_name(name) {
                "String" => PrimitiveKind::String,
                "Char" => PrimitiveKind::Char,
                "Guid" => PrimitiveKind::Guid,
                "Uri" => PrimitiveKind::Uri,
                "Boolean" => PrimitiveKind::Boolean,
                "SByte" => PrimitiveKind::SByte,
                "Byte" => PrimitiveKind::Byte,
                "Int16" => PrimitiveKind::Int16,
                "UInt16" => PrimitiveKind::UInt16,
                "Int32" => PrimitiveKind::Int32,
                "UInt32" => PrimitiveKind::UInt32,
                "Int64" => PrimitiveKind::Int64,
                "UInt64" => PrimitiveKind::UInt64,
                "Int128" => PrimitiveKind::Int128,
                "UInt128" => PrimitiveKind::UInt128,
                "Single" => PrimitiveKind::Single,
                "Double" => PrimitiveKind::Double,
                "Decimal" => PrimitiveKind::Decimal,
                "DateTime" => PrimitiveKind::DateTime,
                "DateTimeOffset" => PrimitiveKind::DateTimeOffset,
                "DateOnly" => PrimitiveKind::DateOnly,
                "TimeOnly" => PrimitiveKind::TimeOnly,
                "TimeSpan" => PrimitiveKind::TimeSpan,
                _ => return None,
            },
        };
        Some(primitive)
    }
}

/// One member of an enumeration type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Member name
    pub name: String,
    /// Underlying numeric value
    pub value: i64,
}

/// One property declared on an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    /// Property name as serialized
    pub name: String,
    /// Type expression of the property
    #[serde(rename = "type")]
    pub type_name: String,
    /// Markers attached to the property
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Static properties never appear in instance schemas
    #[serde(default)]
    pub is_static: bool,
    /// Write-only properties never appear in schemas
    #[serde(default = "default_true")]
    pub readable: bool,
}

fn default_true() -> bool {
    true
}

impl PropertyDef {
    /// Creates a readable instance property.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            attributes: Vec::new(),
            is_static: false,
            readable: true,
        }
    }

    /// Adds a marker to the property.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Whether the property contributes to an instance schema.
    pub fn is_instance_readable(&self) -> bool {
        self.readable && !self.is_static
    }
}

/// Structural shape of a type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeShape {
    /// Built-in scalar
    Primitive { primitive: PrimitiveKind },
    /// Nullable wrapper around a value type
    Nullable { underlying: String },
    /// Enumeration with members in declaration order
    Enum { members: Vec<EnumMember> },
    /// Array with an element type
    Array { element: String },
    /// Generic enumerable; the element type may be unknown
    Sequence {
        #[serde(default)]
        element: Option<String>,
    },
    /// Dictionary-shaped generic
    Dictionary { key: String, value: String },
    /// Class or struct with declared properties and an optional base type
    Object {
        #[serde(default)]
        base: Option<String>,
        #[serde(default)]
        properties: Vec<PropertyDef>,
        #[serde(default)]
        value_type: bool,
    },
    /// Untyped value (`object`, `dynamic`, raw JSON)
    Any,
    /// No value (`void`)
    Void,
    /// Asynchronous wrapper with an optional result type
    Task {
        #[serde(default)]
        result: Option<String>,
    },
    /// Framework action-result wrapper with an optional value type
    ActionResult {
        #[serde(default)]
        value: Option<String>,
    },
    /// Request plumbing (contexts, cancellation tokens) never exposed to callers
    Infrastructure,
}

/// Description of one host type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    /// Type identity (fully-qualified name or closed generic expression)
    pub name: String,
    /// Structural shape
    pub shape: TypeShape,
    /// Markers attached to the type
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl TypeDef {
    /// Creates a type definition without attributes.
    pub fn new(name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            shape,
            attributes: Vec::new(),
        }
    }

    /// Creates a reference-type object definition.
    pub fn object(name: impl Into<String>, base: Option<&str>, properties: Vec<PropertyDef>) -> Self {
        Self::new(
            name,
            TypeShape::Object {
                base: base.map(str::to_string),
                properties,
                value_type: false,
            },
        )
    }

    /// Creates an enumeration definition from `(name, value)` pairs.
    pub fn enumeration(name: impl Into<String>, members: &[(&str, i64)]) -> Self {
        let members = members
            .iter()
            .map(|(name, value)| EnumMember {
                name: (*name).to_string(),
                value: *value,
            })
            .collect();
        Self::new(name, TypeShape::Enum { members })
    }

    /// Adds a marker to the type.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Returns the unqualified type name.
    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Whether instances are non-nullable value types.
    pub fn is_value_type(&self) -> bool {
        match &self.shape {
            TypeShape::Primitive { primitive } => primitive.is_value_type(),
            TypeShape::Enum { .. } => true,
            TypeShape::Object { value_type, .. } => *value_type,
            _ => false,
        }
    }

    /// Whether the type is expanded property-by-property.
    ///
    /// Complex types are non-primitive, non-string, non-enumeration and
    /// non-collection types. Untyped values (`object`, `JsonElement`, ...)
    /// count as complex.
    pub fn is_complex(&self) -> bool {
        matches!(self.shape, TypeShape::Object { .. } | TypeShape::Any)
    }
}

/// One parameter of an endpoint method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    /// Parameter name
    pub name: String,
    /// Type expression of the parameter
    #[serde(rename = "type")]
    pub type_name: String,
    /// Framework binding-source identifier populated by the host, if any
    #[serde(default)]
    pub binding_source: Option<String>,
    /// Markers attached to the parameter
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Whether the method declares a default value for the parameter
    #[serde(default)]
    pub has_default_value: bool,
}

impl ParameterDescriptor {
    /// Creates a parameter without binding metadata.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            binding_source: None,
            attributes: Vec::new(),
            has_default_value: false,
        }
    }

    /// Adds a marker to the parameter.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Sets the framework binding-source identifier.
    pub fn with_binding_source(mut self, identifier: impl Into<String>) -> Self {
        self.binding_source = Some(identifier.into());
        self
    }
}

/// One controller action discovered on the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDescriptor {
    /// Controller name without the `Controller` suffix
    pub controller: String,
    /// Method name of the action
    pub action: String,
    /// Fully-qualified name of the declaring controller type
    pub declaring_type: String,
    /// Markers on the declaring controller type
    #[serde(default)]
    pub controller_attributes: Vec<Attribute>,
    /// Markers on the action method
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Method parameters in declaration order
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Type expression of the declared return type
    #[serde(default = "default_return_type")]
    pub return_type: String,
}

fn default_return_type() -> String {
    "void".to_string()
}

impl EndpointDescriptor {
    /// Creates an endpoint with no markers, parameters or return value.
    pub fn new(controller: impl Into<String>, action: impl Into<String>, declaring_type: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            action: action.into(),
            declaring_type: declaring_type.into(),
            controller_attributes: Vec::new(),
            attributes: Vec::new(),
            parameters: Vec::new(),
            return_type: default_return_type(),
        }
    }

    /// Returns the first HTTP verb marker on the action.
    pub fn http_verb(&self) -> Option<HttpVerb> {
        self.attributes.http_method().map(|(verb, _)| verb)
    }

    /// Returns the controller-level route template.
    pub fn controller_template(&self) -> Option<&str> {
        self.controller_attributes.route_template()
    }

    /// Returns the method-level route template.
    ///
    /// The verb marker's template wins over a separate `Route` marker.
    pub fn method_template(&self) -> Option<&str> {
        self.attributes
            .http_method()
            .and_then(|(_, template)| template)
            .or_else(|| self.attributes.route_template())
    }

    /// Returns the action name, honoring an `ActionName` override.
    pub fn action_name(&self) -> &str {
        self.attributes.action_name().unwrap_or(&self.action)
    }

    /// Returns the unqualified name of the declaring type.
    pub fn declaring_type_name(&self) -> &str {
        simple_name(&self.declaring_type)
    }
}
