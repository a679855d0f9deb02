//! Route template analysis.
//!
//! Templates use the placeholder syntax of the host framework:
//! `{name}`, `{name?}`, `{name:int}`, `{name:range(1,10)?}`, `{name=default}`
//! and catch-alls `{*path}` / `{**path}`. Literal braces are escaped by
//! doubling them (`{{`, `}}`).

use apiscribe_types::{ParameterDescriptor, TypeExpr};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashSet;
use thiserror::Error;

static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]*)\}").expect("placeholder regex should compile"));

static PLACEHOLDER_BODY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<catch_all>\*{1,2})?(?P<name>[A-Za-z_][A-Za-z0-9_.\-]*)(?P<rest>.*)$").expect("placeholder body regex should compile")
});

static TOKEN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[(controller|action)\]").expect("token regex should compile"));

const ESCAPED_OPEN: &str = "\u{1}";
const ESCAPED_CLOSE: &str = "\u{2}";

/// Which template a route parameter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateFragment {
    /// Controller-level template
    Controller,
    /// Method-level template
    Method,
    /// A template analyzed after combination
    Combined,
}

/// A named path parameter extracted from a route template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteParameter {
    /// Bare identifier, without optional marker, constraints or catch-all prefix
    pub name: String,
    /// Type expression used for schema mapping
    pub inferred_type: String,
    /// Template that produced the parameter
    pub source_fragment: TemplateFragment,
    /// Whether the placeholder carried an optional marker
    pub optional: bool,
    /// Whether the placeholder is a catch-all
    pub catch_all: bool,
    /// Constraint clauses as written (`int`, `range(1,10)`)
    pub constraints: Vec<String>,
    /// Inline default value, if any
    pub default_value: Option<String>,
}

/// Errors raised for templates the host framework would reject.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTemplateError {
    #[error("unbalanced '{brace}' in route template '{template}'")]
    UnbalancedBrace { template: String, brace: char },
    #[error("invalid route parameter '{{{body}}}' in template '{template}'")]
    InvalidParameter { template: String, body: String },
    #[error("route parameter '{name}' appears more than once in template '{template}'")]
    DuplicateParameter { template: String, name: String },
}

/// Result of analyzing an endpoint's controller and method templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteAnalysis {
    /// Combined template after token replacement
    pub template: String,
    /// Parameters in template order
    pub parameters: Vec<RouteParameter>,
}

impl RouteAnalysis {
    /// Returns whether a parameter name (case-insensitive) is a route parameter.
    pub fn contains(&self, name: &str) -> bool {
        self.parameter(name).is_some()
    }

    /// Finds a route parameter by name, ignoring case.
    pub fn parameter(&self, name: &str) -> Option<&RouteParameter> {
        self.parameters.iter().find(|parameter| parameter.name.eq_ignore_ascii_case(name))
    }

    /// Returns the parameter names in template order.
    pub fn names(&self) -> Vec<&str> {
        self.parameters.iter().map(|parameter| parameter.name.as_str()).collect()
    }

    /// Fills `inferred_type` from same-named method parameters.
    ///
    /// `Nullable<T>` and `T?` are unwrapped to `T`; unmatched parameters keep
    /// the `string` default.
    pub fn infer_types(&mut self, method_parameters: &[ParameterDescriptor]) {
        for parameter in &mut self.parameters {
            parameter.inferred_type = method_parameters
                .iter()
                .find(|candidate| candidate.name.eq_ignore_ascii_case(&parameter.name))
                .map(|candidate| unwrap_nullable(&candidate.type_name))
                .unwrap_or_else(|| "string".to_string());
        }
    }
}

/// Combines a controller-level and a method-level template.
///
/// An absolute method template (`/…` or `~/…`) replaces the controller
/// template. Otherwise the two are joined with exactly one `/`. When either
/// side is empty the other is returned unmodified.
pub fn combine_templates(controller: Option<&str>, method: Option<&str>) -> String {
    let controller = controller.unwrap_or_default();
    let method = method.unwrap_or_default();

    if is_absolute(method) {
        return method.strip_prefix('~').unwrap_or(method).to_string();
    }
    if method.is_empty() {
        return controller.to_string();
    }
    if controller.is_empty() {
        return method.to_string();
    }
    format!("{}/{}", controller.trim_end_matches('/'), method.trim_start_matches('/'))
}

fn is_absolute(template: &str) -> bool {
    template.starts_with('/') || template.starts_with("~/")
}

/// Replaces `[controller]` and `[action]` tokens, ignoring case.
pub fn replace_tokens(template: &str, controller: &str, action: &str) -> String {
    TOKEN_REGEX
        .replace_all(template, |captures: &Captures| {
            let token = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            if token.eq_ignore_ascii_case("controller") {
                controller.to_string()
            } else {
                action.to_string()
            }
        })
        .into_owned()
}

/// Extracts the path parameters of a single template.
///
/// Every parameter is reported with fragment [`TemplateFragment::Combined`]
/// and inferred type `string`; see [`analyze_route`] for per-fragment
/// attribution and [`RouteAnalysis::infer_types`] for type inference.
pub fn extract_parameters(template: &str) -> Result<Vec<RouteParameter>, RouteTemplateError> {
    let parameters = extract_fragment(template, TemplateFragment::Combined)?;
    ensure_unique(template, &parameters)?;
    Ok(parameters)
}

/// Analyzes an endpoint's templates.
///
/// Tokens are replaced in both fragments, the fragments are combined, and the
/// parameters are attributed to the fragment that declared them. A controller
/// template discarded by an absolute method template contributes nothing.
pub fn analyze_route(
    controller_template: Option<&str>,
    method_template: Option<&str>,
    controller: &str,
    action: &str,
) -> Result<RouteAnalysis, RouteTemplateError> {
    let controller_template = controller_template.map(|template| replace_tokens(template, controller, action));
    let method_template = method_template.map(|template| replace_tokens(template, controller, action));
    let template = combine_templates(controller_template.as_deref(), method_template.as_deref());

    let mut parameters = Vec::new();
    let method_is_absolute = method_template.as_deref().is_some_and(is_absolute);
    if let Some(fragment) = controller_template.as_deref()
        && !method_is_absolute
    {
        parameters.extend(extract_fragment(fragment, TemplateFragment::Controller)?);
    }
    if let Some(fragment) = method_template.as_deref() {
        parameters.extend(extract_fragment(fragment, TemplateFragment::Method)?);
    }
    ensure_unique(&template, &parameters)?;

    Ok(RouteAnalysis { template, parameters })
}

fn extract_fragment(template: &str, fragment: TemplateFragment) -> Result<Vec<RouteParameter>, RouteTemplateError> {
    let unescaped = template.replace("{{", ESCAPED_OPEN).replace("}}", ESCAPED_CLOSE);
    ensure_balanced(template, &unescaped)?;

    PLACEHOLDER_REGEX
        .captures_iter(&unescaped)
        .map(|captures| {
            let body = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            parse_placeholder(template, body, fragment)
        })
        .collect()
}

fn ensure_balanced(template: &str, unescaped: &str) -> Result<(), RouteTemplateError> {
    let mut open = false;
    for c in unescaped.chars() {
        match c {
            '{' if open => return Err(unbalanced(template, '{')),
            '{' => open = true,
            '}' if !open => return Err(unbalanced(template, '}')),
            '}' => open = false,
            _ => {}
        }
    }
    if open {
        return Err(unbalanced(template, '{'));
    }
    Ok(())
}

fn unbalanced(template: &str, brace: char) -> RouteTemplateError {
    RouteTemplateError::UnbalancedBrace {
        template: template.to_string(),
        brace,
    }
}

fn parse_placeholder(template: &str, body: &str, fragment: TemplateFragment) -> Result<RouteParameter, RouteTemplateError> {
    let invalid = || RouteTemplateError::InvalidParameter {
        template: template.to_string(),
        body: body.replace(ESCAPED_OPEN, "{{").replace(ESCAPED_CLOSE, "}}"),
    };

    let captures = PLACEHOLDER_BODY_REGEX.captures(body.trim()).ok_or_else(invalid)?;
    let name = captures.name("name").map(|m| m.as_str()).ok_or_else(invalid)?;
    let catch_all = captures.name("catch_all").is_some();
    let rest = captures.name("rest").map(|m| m.as_str()).unwrap_or_default();
    let modifiers = parse_modifiers(rest).ok_or_else(invalid)?;

    Ok(RouteParameter {
        name: name.to_string(),
        inferred_type: "string".to_string(),
        source_fragment: fragment,
        optional: modifiers.optional,
        catch_all,
        constraints: modifiers.constraints,
        default_value: modifiers.default_value,
    })
}

#[derive(Default)]
struct Modifiers {
    optional: bool,
    constraints: Vec<String>,
    default_value: Option<String>,
}

/// Splits the text following a parameter name into its optional marker,
/// constraint clauses and default value.
///
/// Returns `None` for text that is not a valid modifier sequence.
fn parse_modifiers(rest: &str) -> Option<Modifiers> {
    let mut modifiers = Modifiers::default();
    let mut remaining = rest.trim();

    if let Some(stripped) = remaining.strip_prefix('?') {
        modifiers.optional = true;
        remaining = stripped;
    }

    while let Some(stripped) = remaining.strip_prefix(':') {
        let end = clause_end(stripped);
        let clause = stripped[..end].trim();
        if clause.is_empty() {
            return None;
        }
        modifiers.constraints.push(clause.to_string());
        remaining = &stripped[end..];
    }

    if let Some(stripped) = remaining.strip_prefix('=') {
        let (value, optional) = match stripped.strip_suffix('?') {
            Some(value) => (value, true),
            None => (stripped, false),
        };
        modifiers.default_value = Some(value.replace(ESCAPED_OPEN, "{").replace(ESCAPED_CLOSE, "}"));
        modifiers.optional |= optional;
        remaining = "";
    }

    if let Some(stripped) = remaining.strip_prefix('?') {
        modifiers.optional = true;
        remaining = stripped;
    }

    remaining.trim().is_empty().then_some(modifiers)
}

/// Returns the byte offset where a constraint clause ends: the next `:`, `=`
/// or trailing `?` outside parentheses.
fn clause_end(text: &str) -> usize {
    let mut depth = 0usize;
    for (offset, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ':' | '=' if depth == 0 => return offset,
            '?' if depth == 0 && offset + 1 == text.len() => return offset,
            _ => {}
        }
    }
    text.len()
}

fn ensure_unique(template: &str, parameters: &[RouteParameter]) -> Result<(), RouteTemplateError> {
    let mut seen = HashSet::new();
    for parameter in parameters {
        if !seen.insert(parameter.name.to_ascii_lowercase()) {
            return Err(RouteTemplateError::DuplicateParameter {
                template: template.to_string(),
                name: parameter.name.clone(),
            });
        }
    }
    Ok(())
}

/// Unwraps `T?` and `Nullable<T>` to `T`, leaving other expressions as written.
pub fn unwrap_nullable(type_name: &str) -> String {
    match TypeExpr::parse(type_name) {
        Ok(TypeExpr::Nullable(inner)) => inner.to_string(),
        Ok(expr @ TypeExpr::Named { .. }) if expr.simple_name() == Some("Nullable") && expr.args().len() == 1 => {
            expr.args()[0].to_string()
        }
        _ => type_name.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(parameters: &[RouteParameter]) -> Vec<&str> {
        parameters.iter().map(|parameter| parameter.name.as_str()).collect()
    }

    #[test]
    fn strips_optional_marker_from_names() {
        let parameters = extract_parameters("api/customer/{customerId?}").expect("valid template");

        assert_eq!(names(&parameters), vec!["customerId"]);
        assert!(parameters[0].optional);
        assert!(!parameters[0].name.contains('?'));
    }

    #[test]
    fn discards_constraints_and_keeps_bare_identifiers() {
        let parameters = extract_parameters("api/{org:int}/users/{userId:range(1,10)?}/{slug:regex(^[a-z]{{3}}$)}")
            .expect("valid template");

        assert_eq!(names(&parameters), vec!["org", "userId", "slug"]);
        assert_eq!(parameters[0].constraints, vec!["int".to_string()]);
        assert_eq!(parameters[1].constraints, vec!["range(1,10)".to_string()]);
        assert!(parameters[1].optional);
        assert_eq!(parameters[2].constraints.len(), 1);
    }

    #[test]
    fn recognizes_catch_all_and_default_values() {
        let parameters = extract_parameters("files/{*path}/{version=latest}/{**rest}").expect("valid template");

        assert_eq!(names(&parameters), vec!["path", "version", "rest"]);
        assert!(parameters[0].catch_all);
        assert_eq!(parameters[1].default_value.as_deref(), Some("latest"));
        assert!(parameters[2].catch_all);
    }

    #[test]
    fn ignores_escaped_braces() {
        let parameters = extract_parameters("docs/{{literal}}/{id}").expect("valid template");
        assert_eq!(names(&parameters), vec!["id"]);
    }

    #[test]
    fn rejects_malformed_templates() {
        assert!(matches!(
            extract_parameters("api/{id"),
            Err(RouteTemplateError::UnbalancedBrace { brace: '{', .. })
        ));
        assert!(matches!(
            extract_parameters("api/id}"),
            Err(RouteTemplateError::UnbalancedBrace { brace: '}', .. })
        ));
        assert!(matches!(extract_parameters("api/{}"), Err(RouteTemplateError::InvalidParameter { .. })));
        assert!(matches!(
            extract_parameters("api/{id}/{ID}"),
            Err(RouteTemplateError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn combines_relative_and_absolute_templates() {
        assert_eq!(combine_templates(Some("api/orders/"), Some("/{id}")), "/{id}");
        assert_eq!(combine_templates(Some("api/orders/"), Some("{id}")), "api/orders/{id}");
        assert_eq!(combine_templates(Some("api/orders"), Some("~/health")), "/health");
        assert_eq!(combine_templates(Some("api/orders"), None), "api/orders");
        assert_eq!(combine_templates(None, Some("status")), "status");
        assert_eq!(combine_templates(Some(""), Some("")), "");
    }

    #[test]
    fn analysis_attributes_parameters_to_fragments() {
        let analysis = analyze_route(
            Some("api/organizations/{orgId}"),
            Some("users/{userId}"),
            "Organizations",
            "GetUser",
        )
        .expect("valid templates");

        assert_eq!(analysis.template, "api/organizations/{orgId}/users/{userId}");
        assert_eq!(analysis.parameters[0].source_fragment, TemplateFragment::Controller);
        assert_eq!(analysis.parameters[1].source_fragment, TemplateFragment::Method);
    }

    #[test]
    fn absolute_method_template_drops_controller_parameters() {
        let analysis =
            analyze_route(Some("api/tenants/{tenantId}"), Some("/status/{code}"), "Tenants", "Status").expect("valid templates");

        assert_eq!(analysis.template, "/status/{code}");
        assert_eq!(analysis.names(), vec!["code"]);
    }

    #[test]
    fn replaces_controller_and_action_tokens() {
        assert_eq!(replace_tokens("api/[Controller]/[action]", "Orders", "Search"), "api/Orders/Search");
    }

    #[test]
    fn infers_types_from_matching_method_parameters() {
        let mut analysis = analyze_route(Some("api/items/{id}/{version?}/{slug}"), None, "Items", "Get").expect("valid template");
        analysis.infer_types(&[
            ParameterDescriptor::new("ID", "int"),
            ParameterDescriptor::new("version", "Nullable<long>"),
        ]);

        assert_eq!(analysis.parameters[0].inferred_type, "int");
        assert_eq!(analysis.parameters[1].inferred_type, "long");
        assert_eq!(analysis.parameters[2].inferred_type, "string");
        assert!(analysis.contains("Id"));
    }

    #[test]
    fn unwraps_nullable_shorthand() {
        assert_eq!(unwrap_nullable("int?"), "int");
        assert_eq!(unwrap_nullable("System.Nullable<Guid>"), "Guid");
        assert_eq!(unwrap_nullable("List<int?>"), "List<int?>");
    }
}
