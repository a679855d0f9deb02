//! Rules shared by property and parameter schema enrichment.

use apiscribe_types::{Attribute, AttributeSet, SchemaNode, TypeDef};

/// Whether an enumeration serializes its members by name.
///
/// True when the type carries a string-enum converter marker.
pub fn serializes_as_string(type_def: &TypeDef) -> bool {
    type_def
        .attributes
        .json_converters()
        .iter()
        .any(|converter| converter.contains("StringEnumConverter"))
}

/// Decides whether a property or parameter is required.
///
/// Required iff a `Required` marker is present, or the type is a non-nullable
/// value type that has no declared default value. Properties never declare
/// defaults.
pub fn is_required(attributes: &[Attribute], non_nullable_value_type: bool, has_default_value: bool) -> bool {
    attributes.has_required() || (non_nullable_value_type && !has_default_value)
}

/// Copies validation keywords from markers onto `node`.
pub fn apply_validation(node: &mut SchemaNode, attributes: &[Attribute]) {
    for attribute in attributes {
        match attribute {
            Attribute::StringLength { min, max } => {
                if let Some(min) = min {
                    node.min_length = Some(*min);
                }
                node.max_length = Some(*max);
            }
            Attribute::MinLength { length } => node.min_length = Some(*length),
            Attribute::MaxLength { length } => node.max_length = Some(*length),
            Attribute::Range { minimum, maximum } => {
                node.minimum = Some(*minimum);
                node.maximum = Some(*maximum);
            }
            Attribute::EmailAddress => node.format = Some("email".to_string()),
            _ => {}
        }
    }
}

/// Whether any marker contributes a validation keyword.
pub fn has_validation(attributes: &[Attribute]) -> bool {
    attributes.iter().any(|attribute| {
        matches!(
            attribute,
            Attribute::StringLength { .. }
                | Attribute::MinLength { .. }
                | Attribute::MaxLength { .. }
                | Attribute::Range { .. }
                | Attribute::EmailAddress
        )
    })
}
