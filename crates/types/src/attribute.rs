//! Declarative markers attached to types, members, endpoints and parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// HTTP verbs recognized on endpoint markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpVerb {
    /// Returns the uppercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Head => "HEAD",
            HttpVerb::Options => "OPTIONS",
        }
    }

    /// Whether requests with this verb conventionally carry a body.
    pub fn carries_payload(&self) -> bool {
        matches!(self, HttpVerb::Post | HttpVerb::Put | HttpVerb::Patch)
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a verb name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown HTTP verb '{0}'")]
pub struct ParseHttpVerbError(pub String);

impl FromStr for HttpVerb {
    type Err = ParseHttpVerbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpVerb::Get),
            "POST" => Ok(HttpVerb::Post),
            "PUT" => Ok(HttpVerb::Put),
            "PATCH" => Ok(HttpVerb::Patch),
            "DELETE" => Ok(HttpVerb::Delete),
            "HEAD" => Ok(HttpVerb::Head),
            "OPTIONS" => Ok(HttpVerb::Options),
            _ => Err(ParseHttpVerbError(s.to_string())),
        }
    }
}

/// Logical origin of a parameter value at invocation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingSource {
    Route,
    Query,
    Body,
    Header,
    Form,
}

impl BindingSource {
    /// Returns the lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingSource::Route => "route",
            BindingSource::Query => "query",
            BindingSource::Body => "body",
            BindingSource::Header => "header",
            BindingSource::Form => "form",
        }
    }

    /// Maps a framework binding-source identifier onto a source.
    ///
    /// `path` is the framework's name for route values. Identifiers that do
    /// not denote a request location (`services`, `special`, `custom`, ...)
    /// yield `None`.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier.trim().to_ascii_lowercase().as_str() {
            "path" | "route" => Some(BindingSource::Route),
            "query" => Some(BindingSource::Query),
            "body" => Some(BindingSource::Body),
            "header" => Some(BindingSource::Header),
            "form" | "formfile" => Some(BindingSource::Form),
            _ => None,
        }
    }
}

impl fmt::Display for BindingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a parameter's binding source was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    Explicit,
    RouteTemplateAnalysis,
    HttpMethodInference,
}

impl DetectionMethod {
    /// Returns the snake_case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::Explicit => "explicit",
            DetectionMethod::RouteTemplateAnalysis => "route_template_analysis",
            DetectionMethod::HttpMethodInference => "http_method_inference",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declarative marker on a type, property, endpoint or parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Attribute {
    /// Value must be supplied
    Required,
    /// String length bounds
    StringLength {
        #[serde(default)]
        min: Option<u64>,
        max: u64,
    },
    /// Lower bound on string or collection length
    MinLength { length: u64 },
    /// Upper bound on string or collection length
    MaxLength { length: u64 },
    /// Inclusive numeric range
    Range { minimum: f64, maximum: f64 },
    /// String must be an email address
    EmailAddress,
    /// Human-readable description
    Description { text: String },
    /// Serializer converter applied to the type
    JsonConverter { converter: String },
    /// Excludes the type or endpoint from discovery
    Exclude {
        #[serde(default)]
        reason: Option<String>,
    },
    /// Marks a controller method as not being an endpoint
    NonAction,
    /// Overrides the action name
    ActionName { name: String },
    /// HTTP verb marker with an optional method-level template
    HttpMethod {
        verb: HttpVerb,
        #[serde(default)]
        template: Option<String>,
    },
    /// Route template marker
    Route { template: String },
    /// Binds from the route values
    FromRoute {
        #[serde(default)]
        name: Option<String>,
    },
    /// Binds from the query string
    FromQuery {
        #[serde(default)]
        name: Option<String>,
    },
    /// Binds from the request body
    FromBody,
    /// Binds from a request header
    FromHeader {
        #[serde(default)]
        name: Option<String>,
    },
    /// Binds from form fields
    FromForm {
        #[serde(default)]
        name: Option<String>,
    },
    /// Resolved from the service container, never from the request
    FromServices,
}

/// Default reason reported when an exclusion marker carries none.
pub const DEFAULT_EXCLUSION_REASON: &str = "excluded from tool discovery";

/// Lookup helpers over a set of attributes.
pub trait AttributeSet {
    /// Returns the exclusion reason when the symbol carries an exclusion marker.
    fn exclusion_reason(&self) -> Option<&str>;
    /// Whether a `Required` marker is present.
    fn has_required(&self) -> bool;
    /// Returns the `Description` text, when present.
    fn description(&self) -> Option<&str>;
    /// Returns the explicit binding source and optional wire-name override.
    fn explicit_source(&self) -> Option<(BindingSource, Option<&str>)>;
    /// Whether the value comes from the service container.
    fn is_service_bound(&self) -> bool;
    /// Returns the first HTTP verb marker and its template.
    fn http_method(&self) -> Option<(HttpVerb, Option<&str>)>;
    /// Returns the `Route` template, when present.
    fn route_template(&self) -> Option<&str>;
    /// Returns the `ActionName` override, when present.
    fn action_name(&self) -> Option<&str>;
    /// Returns the converter names applied to the symbol.
    fn json_converters(&self) -> Vec<&str>;
}

impl AttributeSet for [Attribute] {
    fn exclusion_reason(&self) -> Option<&str> {
        self.iter().find_map(|attribute| match attribute {
            Attribute::Exclude { reason } => Some(reason.as_deref().unwrap_or(DEFAULT_EXCLUSION_REASON)),
            Attribute::NonAction => Some("marked as a non-action method"),
            _ => None,
        })
    }

    fn has_required(&self) -> bool {
        self.iter().any(|attribute| matches!(attribute, Attribute::Required))
    }

    fn description(&self) -> Option<&str> {
        self.iter().find_map(|attribute| match attribute {
            Attribute::Description { text } => Some(text.as_str()),
            _ => None,
        })
    }

    fn explicit_source(&self) -> Option<(BindingSource, Option<&str>)> {
        self.iter().find_map(|attribute| match attribute {
            Attribute::FromRoute { name } => Some((BindingSource::Route, name.as_deref())),
            Attribute::FromQuery { name } => Some((BindingSource::Query, name.as_deref())),
            Attribute::FromBody => Some((BindingSource::Body, None)),
            Attribute::FromHeader { name } => Some((BindingSource::Header, name.as_deref())),
            Attribute::FromForm { name } => Some((BindingSource::Form, name.as_deref())),
            _ => None,
        })
    }

    fn is_service_bound(&self) -> bool {
        self.iter().any(|attribute| matches!(attribute, Attribute::FromServices))
    }

    fn http_method(&self) -> Option<(HttpVerb, Option<&str>)> {
        self.iter().find_map(|attribute| match attribute {
            Attribute::HttpMethod { verb, template } => Some((*verb, template.as_deref())),
            _ => None,
        })
    }

    fn route_template(&self) -> Option<&str> {
        self.iter().find_map(|attribute| match attribute {
            Attribute::Route { template } => Some(template.as_str()),
            _ => None,
        })
    }

    fn action_name(&self) -> Option<&str> {
        self.iter().find_map(|attribute| match attribute {
            Attribute::ActionName { name } => Some(name.as_str()),
            _ => None,
        })
    }

    fn json_converters(&self) -> Vec<&str> {
        self.iter()
            .filter_map(|attribute| match attribute {
                Attribute::JsonConverter { converter } => Some(converter.as_str()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_identifier_maps_to_route() {
        assert_eq!(BindingSource::from_identifier("Path"), Some(BindingSource::Route));
        assert_eq!(BindingSource::from_identifier("FormFile"), Some(BindingSource::Form));
        assert_eq!(BindingSource::from_identifier("Services"), None);
    }

    #[test]
    fn exclusion_reason_falls_back_to_default_text() {
        let attributes = vec![Attribute::Exclude { reason: None }];
        assert_eq!(attributes.exclusion_reason(), Some(DEFAULT_EXCLUSION_REASON));

        let attributes = vec![Attribute::Exclude {
            reason: Some("internal".to_string()),
        }];
        assert_eq!(attributes.exclusion_reason(), Some("internal"));
    }

    #[test]
    fn attributes_deserialize_from_tagged_json() {
        let json = r#"[
            { "kind": "httpMethod", "verb": "POST", "template": "{id}" },
            { "kind": "fromQuery", "name": "q" },
            { "kind": "required" }
        ]"#;
        let attributes: Vec<Attribute> = serde_json::from_str(json).expect("deserialize attributes");

        assert_eq!(attributes.http_method(), Some((HttpVerb::Post, Some("{id}"))));
        assert_eq!(attributes.explicit_source(), Some((BindingSource::Query, Some("q"))));
        assert!(attributes.has_required());
    }

    #[test]
    fn verb_parsing_is_case_insensitive() {
        assert_eq!("patch".parse::<HttpVerb>(), Ok(HttpVerb::Patch));
        assert!("TRACE".parse::<HttpVerb>().is_err());
        assert!(HttpVerb::Put.carries_payload());
        assert!(!HttpVerb::Head.carries_payload());
    }
}
