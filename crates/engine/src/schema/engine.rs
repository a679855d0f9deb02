//! Type-to-schema expansion.
//!
//! [`TypeSchemaEngine::expand`] turns a type expression into a shared
//! [`SchemaRef`]. Results are memoized in the [`SchemaCache`] so repeated
//! expansions of one type hand out the same allocation. Self-referential
//! types terminate: a type encountered again while its own expansion is in
//! progress yields a circular-reference placeholder, which is cached until the
//! outer expansion overwrites it with the resolved node.

use crate::documentation::DocumentationSource;
use crate::introspection::TypeIntrospector;
use crate::schema::cache::SchemaCache;
use crate::schema::rules::{self, serializes_as_string};
use apiscribe_types::{
    Attribute, AttributeSet, EnumMember, PropertyDef, SchemaKind, SchemaNode, SchemaRef, TypeDef, TypeExpr, TypeShape,
    simple_name,
};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

const MAX_EXPANSION_DEPTH: usize = 128;

const CIRCULAR_REFERENCE_PREFIX: &str = "Circular reference to ";

#[derive(Debug, Default)]
struct ResolutionContext {
    depth: usize,
    in_progress: HashSet<String>,
}

/// Expands host types into schema nodes.
pub struct TypeSchemaEngine<'a> {
    introspector: &'a dyn TypeIntrospector,
    documentation: &'a dyn DocumentationSource,
    cache: &'a SchemaCache,
    include_descriptions: bool,
    context: ResolutionContext,
}

impl<'a> TypeSchemaEngine<'a> {
    pub fn new(
        introspector: &'a dyn TypeIntrospector,
        documentation: &'a dyn DocumentationSource,
        cache: &'a SchemaCache,
        include_descriptions: bool,
    ) -> Self {
        Self {
            introspector,
            documentation,
            cache,
            include_descriptions,
            context: ResolutionContext::default(),
        }
    }

    /// Returns the canonical schema for `type_name`.
    ///
    /// Never fails: types the introspector cannot describe degrade to an
    /// untyped object with a warning.
    pub fn expand(&mut self, type_name: &str) -> SchemaRef {
        let key = cache_key(type_name);
        if let Some(node) = self.cache.resolved(&key) {
            debug!(type_name = %key, "schema cache hit");
            return node;
        }
        if self.context.in_progress.contains(&key) {
            return self.circular_placeholder(&key);
        }
        if self.context.depth >= MAX_EXPANSION_DEPTH {
            warn!(type_name = %key, "schema expansion too deep; emitting untyped object");
            return Arc::new(SchemaNode::of_kind(SchemaKind::Object));
        }

        let type_def = match self.introspector.describe(&key) {
            Ok(type_def) => type_def,
            Err(error) => {
                warn!(type_name = %key, %error, "type cannot be described; emitting untyped object");
                let node = Arc::new(SchemaNode::of_kind(SchemaKind::Object));
                self.cache.insert_resolved(&key, Arc::clone(&node));
                return node;
            }
        };

        let identity = type_def.name.clone();
        if identity != key {
            if let Some(node) = self.cache.resolved(&identity) {
                self.cache.insert_resolved(&key, Arc::clone(&node));
                return node;
            }
            if self.context.in_progress.contains(&identity) {
                return self.circular_placeholder(&identity);
            }
        }

        self.context.in_progress.insert(identity.clone());
        self.context.depth += 1;
        let node = self.build(&type_def);
        self.context.depth -= 1;
        self.context.in_progress.remove(&identity);

        self.cache.insert_resolved(&identity, Arc::clone(&node));
        if identity != key {
            self.cache.insert_resolved(&key, Arc::clone(&node));
        }
        node
    }

    /// Returns `base` with a description and validation keywords applied.
    ///
    /// `base` is returned unchanged when there is nothing to add, preserving
    /// reference identity. A circular placeholder keeps its description.
    pub fn enrich(&self, base: SchemaRef, description: Option<&str>, attributes: &[Attribute]) -> SchemaRef {
        let description = description.filter(|_| self.include_descriptions && !self.is_circular_placeholder(&base));
        if description.is_none() && !rules::has_validation(attributes) {
            return base;
        }

        let mut node = (*base).clone();
        if let Some(description) = description {
            node.description = Some(description.to_string());
        }
        rules::apply_validation(&mut node, attributes);
        Arc::new(node)
    }

    /// Whether `type_name` denotes a value type that cannot hold null.
    pub fn is_non_nullable_value_type(&self, type_name: &str) -> bool {
        self.introspector
            .describe(type_name)
            .is_ok_and(|type_def| type_def.is_value_type())
    }

    /// Whether `type_name` is expanded property-by-property.
    ///
    /// Nullable wrappers are looked through. Types the introspector cannot
    /// describe count as complex.
    pub fn is_complex(&self, type_name: &str) -> bool {
        match self.introspector.describe(type_name) {
            Ok(TypeDef {
                shape: TypeShape::Nullable { underlying },
                ..
            }) => self.is_complex(&underlying),
            Ok(type_def) => type_def.is_complex(),
            Err(_) => true,
        }
    }

    pub fn introspector(&self) -> &'a dyn TypeIntrospector {
        self.introspector
    }

    pub fn documentation(&self) -> &'a dyn DocumentationSource {
        self.documentation
    }

    pub fn include_descriptions(&self) -> bool {
        self.include_descriptions
    }

    fn circular_placeholder(&self, key: &str) -> SchemaRef {
        debug!(type_name = %key, "circular reference detected");
        let placeholder = Arc::new(SchemaNode::circular_reference(simple_name(key)));
        self.cache.insert_placeholder(key, placeholder)
    }

    fn is_circular_placeholder(&self, node: &SchemaRef) -> bool {
        self.cache.is_placeholder(node)
            || (node.properties.as_ref().is_some_and(IndexMap::is_empty)
                && node
                    .description
                    .as_deref()
                    .is_some_and(|description| description.starts_with(CIRCULAR_REFERENCE_PREFIX)))
    }

    fn build(&mut self, type_def: &TypeDef) -> SchemaRef {
        match &type_def.shape {
            TypeShape::Primitive { primitive } => Arc::new(SchemaNode::scalar(primitive.schema_kind(), primitive.format())),
            TypeShape::Nullable { underlying } => self.expand(underlying),
            TypeShape::Enum { members } => Arc::new(enum_schema(type_def, members)),
            TypeShape::Dictionary { .. } => Arc::new(SchemaNode::open_object()),
            TypeShape::Array { element }
            | TypeShape::Sequence {
                element: Some(element),
            } => {
                let items = self.expand(element);
                Arc::new(SchemaNode::array(items))
            }
            TypeShape::Sequence { element: None } => {
                Arc::new(SchemaNode::array(Arc::new(SchemaNode::of_kind(SchemaKind::Object))))
            }
            TypeShape::Object { .. } => Arc::new(self.object_schema(type_def)),
            TypeShape::Any | TypeShape::Infrastructure => Arc::new(SchemaNode::of_kind(SchemaKind::Object)),
            TypeShape::Void | TypeShape::Task { result: None } => Arc::new(SchemaNode::of_kind(SchemaKind::Null)),
            TypeShape::Task { result: Some(result) } => self.expand(result),
            TypeShape::ActionResult { value: Some(value) } => self.expand(value),
            TypeShape::ActionResult { value: None } => Arc::new(SchemaNode::of_kind(SchemaKind::Object)),
        }
    }

    /// Collects instance properties across the base chain, most-derived first.
    fn object_schema(&mut self, type_def: &TypeDef) -> SchemaNode {
        let mut properties = IndexMap::new();
        let mut required = IndexSet::new();
        let mut visited_levels = HashSet::new();
        let mut level = Some(type_def.clone());

        while let Some(current) = level.take() {
            if !visited_levels.insert(current.name.clone()) {
                warn!(type_name = %type_def.name, base = %current.name, "inheritance cycle detected");
                break;
            }
            let TypeShape::Object { base, properties: declared, .. } = &current.shape else {
                break;
            };

            for property in declared.iter().filter(|property| property.is_instance_readable()) {
                if properties.contains_key(&property.name) {
                    continue;
                }
                let node = self.property_schema(&current, property);
                if rules::is_required(&property.attributes, self.is_non_nullable_value_type(&property.type_name), false) {
                    required.insert(property.name.clone());
                }
                properties.insert(property.name.clone(), node);
            }

            level = base.as_deref().and_then(|base| match self.introspector.describe(base) {
                Ok(base_def) => Some(base_def),
                Err(error) => {
                    warn!(type_name = %current.name, base = %base, %error, "base type cannot be described; stopping inheritance walk");
                    None
                }
            });
        }

        SchemaNode::object(properties, required)
    }

    fn property_schema(&mut self, owner: &TypeDef, property: &PropertyDef) -> SchemaRef {
        let base = self.expand(&property.type_name);
        let documentation = self.documentation;
        let description = documentation
            .property_summary(&owner.name, &property.name)
            .or_else(|| property.attributes.description());
        self.enrich(base, description, &property.attributes)
    }
}

fn enum_schema(type_def: &TypeDef, members: &[EnumMember]) -> SchemaNode {
    let (kind, values) = if serializes_as_string(type_def) {
        let names = members.iter().map(|member| Value::from(member.name.clone())).collect();
        (SchemaKind::String, names)
    } else {
        let numbers = members.iter().map(|member| Value::from(member.value)).collect();
        (SchemaKind::Integer, numbers)
    };
    SchemaNode {
        enum_values: Some(values),
        ..SchemaNode::of_kind(kind)
    }
}

/// Canonical cache key of a type expression.
fn cache_key(type_name: &str) -> String {
    TypeExpr::parse(type_name).map_or_else(|_| type_name.trim().to_string(), |expr| expr.to_string())
}
