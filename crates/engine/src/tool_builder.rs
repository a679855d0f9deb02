//! Per-endpoint tool construction.
//!
//! A [`ToolBuilder`] turns one [`EndpointDescriptor`] into one [`Tool`], or
//! skips it. It owns the per-pass name registry so names stay unique across
//! the whole document.

use crate::error::ToolBuildError;
use crate::options::DiscoveryOptions;
use crate::parameter_source::{SourceResolution, resolve_source};
use crate::schema::{TypeSchemaEngine, rules};
use apiscribe_types::{
    AttributeSet, BindingSource, DetectionMethod, EndpointDescriptor, HttpVerb, ParameterDescriptor, SchemaKind, SchemaNode,
    SchemaRef, Tool, TypeDef, TypeShape,
};
use apiscribe_util::{UniqueNames, analyze_route, combine_templates, controller_action_name, replace_tokens};
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

pub const HANDLER_TYPE_ANNOTATION: &str = "handler_type";
pub const HANDLER_METHOD_ANNOTATION: &str = "handler_method";
pub const HTTP_METHOD_ANNOTATION: &str = "http_method";
pub const ROUTE_TEMPLATE_ANNOTATION: &str = "route_template";

/// Why an endpoint produced no tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The controller or the action carries an exclusion marker
    Excluded(String),
    /// The controller is on the exclusion list
    DenyListed,
    /// The inclusion list is non-empty and does not name the controller
    NotAllowListed,
    /// The action has no HTTP verb marker
    MissingHttpVerb,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Excluded(reason) => write!(f, "excluded: {reason}"),
            SkipReason::DenyListed => f.write_str("controller is in the exclusion list"),
            SkipReason::NotAllowListed => f.write_str("controller is not in the inclusion list"),
            SkipReason::MissingHttpVerb => f.write_str("no HTTP method marker"),
        }
    }
}

/// Decides whether an endpoint is skipped.
///
/// Inclusion and exclusion lists match either the declaring type's simple
/// name (`OrdersController`) or the controller name (`Orders`).
pub fn skip_reason(endpoint: &EndpointDescriptor, options: &DiscoveryOptions) -> Option<SkipReason> {
    if let Some(reason) = endpoint
        .controller_attributes
        .exclusion_reason()
        .or_else(|| endpoint.attributes.exclusion_reason())
    {
        return Some(SkipReason::Excluded(reason.to_string()));
    }

    let names_controller =
        |name: &String| name == endpoint.declaring_type_name() || name.eq_ignore_ascii_case(&endpoint.controller);
    if options.exclude_controllers.iter().any(names_controller) {
        return Some(SkipReason::DenyListed);
    }
    if !options.include_controllers.is_empty() && !options.include_controllers.iter().any(names_controller) {
        return Some(SkipReason::NotAllowListed);
    }

    if endpoint.http_verb().is_none() {
        return Some(SkipReason::MissingHttpVerb);
    }
    None
}

/// Builds tools for the endpoints of one discovery pass.
pub struct ToolBuilder<'a> {
    engine: TypeSchemaEngine<'a>,
    options: &'a DiscoveryOptions,
    names: UniqueNames,
}

impl<'a> ToolBuilder<'a> {
    pub fn new(engine: TypeSchemaEngine<'a>, options: &'a DiscoveryOptions) -> Self {
        Self {
            engine,
            options,
            names: UniqueNames::new(),
        }
    }

    /// Builds the tool for `endpoint`, or returns `None` when it is skipped.
    pub fn build(&mut self, endpoint: &EndpointDescriptor) -> Option<Tool> {
        if let Some(reason) = skip_reason(endpoint, self.options) {
            debug!(
                controller = %endpoint.controller,
                action = %endpoint.action,
                %reason,
                "skipping endpoint"
            );
            return None;
        }
        let verb = endpoint.http_verb()?;

        let (route_template, input_schema) = match self.input_schema(endpoint, verb) {
            Ok(built) => built,
            Err(error) => {
                warn!(
                    controller = %endpoint.controller,
                    action = %endpoint.action,
                    %error,
                    "input schema generation failed; using fallback schema"
                );
                (raw_route_template(endpoint), self.fallback_input_schema(endpoint))
            }
        };

        let name = self.tool_name(endpoint);
        let description = self.tool_description(endpoint, verb, &route_template);
        let output_schema = self.output_schema(&endpoint.return_type);

        let mut annotations = Map::new();
        annotations.insert(HANDLER_TYPE_ANNOTATION.to_string(), Value::from(endpoint.declaring_type.as_str()));
        annotations.insert(HANDLER_METHOD_ANNOTATION.to_string(), Value::from(endpoint.action.as_str()));
        annotations.insert(HTTP_METHOD_ANNOTATION.to_string(), Value::from(verb.as_str()));
        annotations.insert(ROUTE_TEMPLATE_ANNOTATION.to_string(), Value::from(route_template));

        Some(Tool {
            name,
            description,
            input_schema,
            output_schema,
            annotations,
        })
    }

    fn tool_name(&mut self, endpoint: &EndpointDescriptor) -> String {
        let derived = match &self.options.tool_namer {
            Some(namer) => namer(endpoint),
            None => {
                let base = if self.options.include_controller_name_in_tool_name {
                    controller_action_name(&endpoint.controller, endpoint.action_name())
                } else {
                    endpoint.action_name().to_string()
                };
                self.options.tool_name_casing.apply(&base)
            }
        };
        let name = self.names.claim(&derived);
        if name != derived {
            debug!(derived = %derived, assigned = %name, "tool name collision");
        }
        name
    }

    fn tool_description(&self, endpoint: &EndpointDescriptor, verb: HttpVerb, route_template: &str) -> String {
        self.options
            .include_descriptions
            .then(|| {
                self.engine
                    .documentation()
                    .method_summary(&endpoint.declaring_type, &endpoint.action)
            })
            .flatten()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{verb} {route_template}"))
    }

    /// Builds the input schema from the route and the method parameters.
    ///
    /// Returns the combined route template alongside the schema.
    fn input_schema(
        &mut self,
        endpoint: &EndpointDescriptor,
        verb: HttpVerb,
    ) -> Result<(String, SchemaNode), ToolBuildError> {
        let mut route = analyze_route(
            endpoint.controller_template(),
            endpoint.method_template(),
            &endpoint.controller,
            endpoint.action_name(),
        )?;
        route.infer_types(&endpoint.parameters);

        let mut properties: IndexMap<String, SchemaRef> = IndexMap::new();
        let mut owners: HashMap<String, String> = HashMap::new();
        let mut required = IndexSet::new();
        let route_resolution = SourceResolution {
            source: BindingSource::Route,
            detection: DetectionMethod::RouteTemplateAnalysis,
            wire_name: None,
        };

        for route_parameter in &route.parameters {
            let method_parameter = endpoint
                .parameters
                .iter()
                .find(|parameter| parameter.name.eq_ignore_ascii_case(&route_parameter.name));
            let description = method_parameter.and_then(|parameter| self.parameter_description(endpoint, parameter));
            let attributes = method_parameter.map(|parameter| parameter.attributes.as_slice()).unwrap_or_default();

            let base = self.engine.expand(&route_parameter.inferred_type);
            let mut node = (*self.engine.enrich(base, description.as_deref(), attributes)).clone();
            route_resolution.annotate(&mut node, verb, &route.template);

            owners.insert(route_parameter.name.clone(), route_parameter.name.clone());
            required.insert(route_parameter.name.clone());
            properties.insert(route_parameter.name.clone(), Arc::new(node));
        }

        for parameter in &endpoint.parameters {
            if route.contains(&parameter.name) || self.is_infrastructure(parameter) {
                continue;
            }

            let resolution = resolve_source(parameter, &route, verb, self.engine.is_complex(&parameter.type_name));
            let key = resolution.wire_name.clone().unwrap_or_else(|| parameter.name.clone());
            if resolution.source == BindingSource::Route && route.contains(&key) {
                continue;
            }
            if let Some(first) = owners.get(&key) {
                return Err(ToolBuildError::DuplicateInputKey {
                    key,
                    first: first.clone(),
                    second: parameter.name.clone(),
                });
            }

            let description = self.parameter_description(endpoint, parameter);
            let base = self.engine.expand(&parameter.type_name);
            let mut node = (*self.engine.enrich(base, description.as_deref(), &parameter.attributes)).clone();
            resolution.annotate(&mut node, verb, &route.template);

            let is_required = resolution.source == BindingSource::Route
                || rules::is_required(
                    &parameter.attributes,
                    self.engine.is_non_nullable_value_type(&parameter.type_name),
                    parameter.has_default_value,
                );
            if is_required {
                required.insert(key.clone());
            }
            owners.insert(key.clone(), parameter.name.clone());
            properties.insert(key, Arc::new(node));
        }

        Ok((route.template, SchemaNode::object(properties, required)))
    }

    /// Minimal schema mapping each raw parameter type directly.
    fn fallback_input_schema(&self, endpoint: &EndpointDescriptor) -> SchemaNode {
        let properties = endpoint
            .parameters
            .iter()
            .filter(|parameter| !self.is_infrastructure(parameter))
            .map(|parameter| (parameter.name.clone(), Arc::new(self.raw_schema(&parameter.type_name))))
            .collect();
        SchemaNode::object(properties, IndexSet::new())
    }

    fn raw_schema(&self, type_name: &str) -> SchemaNode {
        let Ok(type_def) = self.engine.introspector().describe(type_name) else {
            return SchemaNode::of_kind(SchemaKind::Object);
        };
        match &type_def.shape {
            TypeShape::Primitive { primitive } => SchemaNode::scalar(primitive.schema_kind(), primitive.format()),
            TypeShape::Nullable { underlying } => self.raw_schema(underlying),
            TypeShape::Enum { .. } if rules::serializes_as_string(&type_def) => SchemaNode::of_kind(SchemaKind::String),
            TypeShape::Enum { .. } => SchemaNode::of_kind(SchemaKind::Integer),
            TypeShape::Array { .. } | TypeShape::Sequence { .. } => SchemaNode::of_kind(SchemaKind::Array),
            _ => SchemaNode::of_kind(SchemaKind::Object),
        }
    }

    /// Output schema of a return type, with async and action-result wrappers removed.
    fn output_schema(&mut self, return_type: &str) -> SchemaRef {
        let shape = self
            .engine
            .introspector()
            .describe(return_type)
            .ok()
            .map(|TypeDef { shape, .. }| shape);
        match shape {
            Some(TypeShape::Task { result: Some(result) }) => self.output_schema(&result),
            Some(TypeShape::ActionResult { value: Some(value) }) => self.output_schema(&value),
            Some(TypeShape::Void | TypeShape::Task { result: None }) => Arc::new(SchemaNode::of_kind(SchemaKind::Null)),
            Some(TypeShape::ActionResult { value: None }) => Arc::new(SchemaNode::of_kind(SchemaKind::Object)),
            _ => self.engine.expand(return_type),
        }
    }

    fn parameter_description(&self, endpoint: &EndpointDescriptor, parameter: &ParameterDescriptor) -> Option<String> {
        self.engine
            .documentation()
            .parameter_summary(&endpoint.declaring_type, &endpoint.action, &parameter.name)
            .or_else(|| parameter.attributes.description())
            .map(str::to_string)
    }

    /// Request plumbing and service-container parameters never reach the caller.
    fn is_infrastructure(&self, parameter: &ParameterDescriptor) -> bool {
        parameter.attributes.is_service_bound()
            || parameter
                .binding_source
                .as_deref()
                .is_some_and(|identifier| identifier.eq_ignore_ascii_case("services") || identifier.eq_ignore_ascii_case("special"))
            || self
                .engine
                .introspector()
                .describe(&parameter.type_name)
                .is_ok_and(|type_def| type_def.shape == TypeShape::Infrastructure)
    }
}

/// Combined template without parameter analysis, for endpoints whose route
/// could not be analyzed.
fn raw_route_template(endpoint: &EndpointDescriptor) -> String {
    let controller = endpoint
        .controller_template()
        .map(|template| replace_tokens(template, &endpoint.controller, endpoint.action_name()));
    let method = endpoint
        .method_template()
        .map(|template| replace_tokens(template, &endpoint.controller, endpoint.action_name()));
    combine_templates(controller.as_deref(), method.as_deref())
}
