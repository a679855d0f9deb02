//! Parameter binding-source inference.
//!
//! Reproduces the host framework's model-binding defaults to decide where each
//! endpoint parameter is read from at invocation time. The cascade stops at
//! the first step that yields an answer:
//!
//! 1. binding metadata populated by the host
//! 2. an explicit `From*` marker on the parameter
//! 3. membership in the route template (case-insensitive)
//! 4. the HTTP verb: `GET`, `DELETE`, `HEAD`, `OPTIONS` read everything from the
//!    query string; `POST`, `PUT`, `PATCH` read complex types from the body and
//!    everything else from the query string

use apiscribe_types::{AttributeSet, BindingSource, DetectionMethod, HttpVerb, ParameterDescriptor, SchemaNode};
use apiscribe_util::RouteAnalysis;
use serde_json::Value;

pub const SOURCE_ANNOTATION: &str = "x-source";
pub const DETECTION_METHOD_ANNOTATION: &str = "x-detection-method";
pub const HTTP_METHOD_ANNOTATION: &str = "x-http-method";
pub const ROUTE_TEMPLATE_ANNOTATION: &str = "x-route-template";

/// Where a parameter binds from and how that was decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResolution {
    pub source: BindingSource,
    pub detection: DetectionMethod,
    /// Input key override from an explicit marker (`[FromQuery(Name = "q")]`)
    pub wire_name: Option<String>,
}

impl SourceResolution {
    fn new(source: BindingSource, detection: DetectionMethod) -> Self {
        Self {
            source,
            detection,
            wire_name: None,
        }
    }

    /// Attaches the binding annotations to a parameter schema node.
    pub fn annotate(&self, node: &mut SchemaNode, verb: HttpVerb, route_template: &str) {
        node.annotations
            .insert(SOURCE_ANNOTATION.to_string(), Value::from(self.source.as_str()));
        node.annotations
            .insert(DETECTION_METHOD_ANNOTATION.to_string(), Value::from(self.detection.as_str()));
        node.annotations
            .insert(HTTP_METHOD_ANNOTATION.to_string(), Value::from(verb.as_str()));
        node.annotations
            .insert(ROUTE_TEMPLATE_ANNOTATION.to_string(), Value::from(route_template));
    }
}

/// Resolves the binding source of a parameter.
///
/// `is_complex` reports whether the parameter type is expanded
/// property-by-property; it only matters for payload-carrying verbs.
pub fn resolve_source(
    parameter: &ParameterDescriptor,
    route: &RouteAnalysis,
    verb: HttpVerb,
    is_complex: bool,
) -> SourceResolution {
    if let Some(source) = parameter.binding_source.as_deref().and_then(BindingSource::from_identifier) {
        return SourceResolution::new(source, DetectionMethod::Explicit);
    }

    if let Some((source, wire_name)) = parameter.attributes.explicit_source() {
        return SourceResolution {
            wire_name: wire_name.map(str::to_string),
            ..SourceResolution::new(source, DetectionMethod::Explicit)
        };
    }

    if route.contains(&parameter.name) {
        return SourceResolution::new(BindingSource::Route, DetectionMethod::RouteTemplateAnalysis);
    }

    let source = if verb.carries_payload() && is_complex {
        BindingSource::Body
    } else {
        BindingSource::Query
    };
    SourceResolution::new(source, DetectionMethod::HttpMethodInference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiscribe_types::Attribute;
    use apiscribe_util::analyze_route;

    fn route(template: &str) -> RouteAnalysis {
        analyze_route(Some(template), None, "Orders", "Get").expect("valid template")
    }

    #[test]
    fn route_members_bind_from_route_and_others_from_query_on_get() {
        let route = route("api/orders/{id}");

        let id = resolve_source(&ParameterDescriptor::new("Id", "int"), &route, HttpVerb::Get, false);
        let expand = resolve_source(&ParameterDescriptor::new("expand", "string"), &route, HttpVerb::Get, false);
        let filter = resolve_source(&ParameterDescriptor::new("filter", "OrderFilter"), &route, HttpVerb::Get, true);

        assert_eq!(id, SourceResolution::new(BindingSource::Route, DetectionMethod::RouteTemplateAnalysis));
        assert_eq!(expand, SourceResolution::new(BindingSource::Query, DetectionMethod::HttpMethodInference));
        assert_eq!(filter.source, BindingSource::Query);
    }

    #[test]
    fn payload_verbs_send_complex_types_to_the_body() {
        let route = route("api/orders");

        let order = resolve_source(&ParameterDescriptor::new("order", "Order"), &route, HttpVerb::Post, true);
        let dry_run = resolve_source(&ParameterDescriptor::new("dryRun", "bool"), &route, HttpVerb::Put, false);

        assert_eq!(order.source, BindingSource::Body);
        assert_eq!(order.detection, DetectionMethod::HttpMethodInference);
        assert_eq!(dry_run.source, BindingSource::Query);
    }

    #[test]
    fn explicit_markers_override_inference() {
        let route = route("api/orders/{id}");
        let parameter = ParameterDescriptor::new("order", "Order").with_attribute(Attribute::FromQuery {
            name: Some("o".to_string()),
        });

        let resolution = resolve_source(&parameter, &route, HttpVerb::Post, true);

        assert_eq!(resolution.source, BindingSource::Query);
        assert_eq!(resolution.detection, DetectionMethod::Explicit);
        assert_eq!(resolution.wire_name.as_deref(), Some("o"));
    }

    #[test]
    fn host_binding_metadata_wins_and_path_means_route() {
        let route = route("api/orders");
        let parameter = ParameterDescriptor::new("tenant", "string")
            .with_binding_source("Path")
            .with_attribute(Attribute::FromHeader { name: None });

        let resolution = resolve_source(&parameter, &route, HttpVerb::Get, false);

        assert_eq!(resolution, SourceResolution::new(BindingSource::Route, DetectionMethod::Explicit));
    }

    #[test]
    fn annotations_record_source_and_context() {
        let mut node = SchemaNode::default();
        SourceResolution::new(BindingSource::Header, DetectionMethod::Explicit).annotate(
            &mut node,
            HttpVerb::Delete,
            "api/orders/{id}",
        );

        assert_eq!(node.annotation(SOURCE_ANNOTATION), Some(&Value::from("header")));
        assert_eq!(node.annotation(DETECTION_METHOD_ANNOTATION), Some(&Value::from("explicit")));
        assert_eq!(node.annotation(HTTP_METHOD_ANNOTATION), Some(&Value::from("DELETE")));
        assert_eq!(node.annotation(ROUTE_TEMPLATE_ANNOTATION), Some(&Value::from("api/orders/{id}")));
    }
}
