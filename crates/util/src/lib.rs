//! Helpers shared by the Apiscribe engine and its front ends.
//!
//! - [`route_template`]: parameter extraction and combination of route templates
//! - [`naming`]: tool-name casing and collision handling
//! - [`path_processing`]: `~` expansion and config-relative path resolution

pub mod naming;
pub mod path_processing;
pub mod route_template;

pub use naming::{ToolNameCasing, UniqueNames, controller_action_name};
pub use path_processing::{expand_tilde, resolve_relative_to};
pub use route_template::{
    RouteAnalysis, RouteParameter, RouteTemplateError, TemplateFragment, analyze_route, combine_templates, extract_parameters,
    replace_tokens, unwrap_nullable,
};
