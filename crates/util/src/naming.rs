//! Tool-name casing and collision handling.

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Casing applied to derived tool names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolNameCasing {
    /// Leave names exactly as derived (`Orders_GetById`)
    #[default]
    AsIs,
    /// `orders_get_by_id`
    Snake,
    /// `orders-get-by-id`
    Kebab,
    /// `ordersGetById`
    Camel,
    /// `OrdersGetById`
    Pascal,
}

impl ToolNameCasing {
    /// Applies the casing policy to a derived name.
    pub fn apply(&self, name: &str) -> String {
        match self {
            ToolNameCasing::AsIs => name.to_string(),
            ToolNameCasing::Snake => name.to_snake_case(),
            ToolNameCasing::Kebab => name.to_kebab_case(),
            ToolNameCasing::Camel => name.to_lower_camel_case(),
            ToolNameCasing::Pascal => name.to_upper_camel_case(),
        }
    }
}

/// Joins a controller and action name the way default tool names are formed.
pub fn controller_action_name(controller: &str, action: &str) -> String {
    format!("{controller}_{action}")
}

/// Hands out unique names, suffixing repeats with `_2`, `_3`, ...
///
/// The first claimant of a name keeps it unchanged.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
    next_suffix: HashMap<String, usize>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `name`, returning it or the first free suffixed variant.
    pub fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }
        let suffix = self.next_suffix.entry(name.to_string()).or_insert(2);
        loop {
            let candidate = format!("{name}_{suffix}");
            *suffix += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casing_policies_transform_controller_action_names() {
        let name = controller_action_name("Orders", "GetById");

        assert_eq!(ToolNameCasing::AsIs.apply(&name), "Orders_GetById");
        assert_eq!(ToolNameCasing::Snake.apply(&name), "orders_get_by_id");
        assert_eq!(ToolNameCasing::Kebab.apply(&name), "orders-get-by-id");
        assert_eq!(ToolNameCasing::Camel.apply(&name), "ordersGetById");
        assert_eq!(ToolNameCasing::Pascal.apply(&name), "OrdersGetById");
    }

    #[test]
    fn repeated_names_receive_numeric_suffixes() {
        let mut names = UniqueNames::new();

        assert_eq!(names.claim("Get"), "Get");
        assert_eq!(names.claim("Get"), "Get_2");
        assert_eq!(names.claim("Get_3"), "Get_3");
        assert_eq!(names.claim("Get"), "Get_4");
        assert_eq!(names.claim("List"), "List");
    }

    #[test]
    fn casing_deserializes_from_camel_case() {
        let casing: ToolNameCasing = serde_json::from_str("\"asIs\"").expect("deserialize casing");
        assert_eq!(casing, ToolNameCasing::AsIs);
    }
}
