//! Shared type definitions for Apiscribe.
//!
//! The discovery document model ([`Document`], [`Tool`], [`SchemaNode`]) and
//! the descriptors a host exports about its endpoints and types.

pub mod attribute;
pub mod descriptor;
pub mod document;
pub mod schema;
pub mod type_expr;

pub use attribute::{Attribute, AttributeSet, BindingSource, DetectionMethod, HttpVerb, ParseHttpVerbError};
pub use descriptor::{EndpointDescriptor, EnumMember, ParameterDescriptor, PrimitiveKind, PropertyDef, TypeDef, TypeShape};
pub use document::{Document, DocumentInfo, Tool, ToolListing};
pub use schema::{SchemaKind, SchemaNode, SchemaRef};
pub use type_expr::{TypeExpr, TypeExprError, simple_name};
