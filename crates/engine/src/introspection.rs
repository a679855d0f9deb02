//! Type descriptor lookup.
//!
//! The schema engine never inspects host types directly. It asks a
//! [`TypeIntrospector`] for a [`TypeDef`] by type expression. [`TypeCatalog`]
//! is the data-backed implementation: it recognizes primitives and the
//! framework's well-known generic shapes (`List<T>`, `Dictionary<K, V>`,
//! `Task<T>`, `ActionResult<T>`, `T[]`, `T?`) and looks user types up in a
//! registry of definitions exported by the host.

use crate::error::ReflectionError;
use apiscribe_types::{PrimitiveKind, TypeDef, TypeExpr, TypeShape, simple_name};
use indexmap::IndexMap;

/// Describes host types by name.
pub trait TypeIntrospector: Send + Sync {
    /// Returns the definition of the type named by `type_name`.
    fn describe(&self, type_name: &str) -> Result<TypeDef, ReflectionError>;
}

const SEQUENCE_TYPES: &[&str] = &[
    "List",
    "IList",
    "ICollection",
    "IEnumerable",
    "IReadOnlyList",
    "IReadOnlyCollection",
    "HashSet",
    "ISet",
    "IReadOnlySet",
    "SortedSet",
    "Collection",
    "ReadOnlyCollection",
    "LinkedList",
    "Queue",
    "Stack",
    "ImmutableArray",
    "ImmutableList",
    "IAsyncEnumerable",
];

const UNTYPED_SEQUENCE_TYPES: &[&str] = &["IEnumerable", "ICollection", "IList", "ArrayList"];

const DICTIONARY_TYPES: &[&str] = &[
    "Dictionary",
    "IDictionary",
    "IReadOnlyDictionary",
    "SortedDictionary",
    "ConcurrentDictionary",
    "ImmutableDictionary",
];

const UNTYPED_DICTIONARY_TYPES: &[&str] = &["IDictionary", "Hashtable"];

const ANY_TYPES: &[&str] = &["object", "Object", "dynamic", "JsonElement", "JsonNode", "JsonObject", "ExpandoObject"];

const TASK_TYPES: &[&str] = &["Task", "ValueTask"];

const ACTION_RESULT_TYPES: &[&str] = &["ActionResult", "IActionResult", "IResult"];

const INFRASTRUCTURE_TYPES: &[&str] = &[
    "HttpContext",
    "HttpRequest",
    "HttpResponse",
    "CancellationToken",
    "ClaimsPrincipal",
];

/// Data-backed [`TypeIntrospector`].
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: IndexMap<String, TypeDef>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog from host type definitions.
    pub fn from_types(types: impl IntoIterator<Item = TypeDef>) -> Self {
        let mut catalog = Self::new();
        for type_def in types {
            catalog.register(type_def);
        }
        catalog
    }

    /// Registers or replaces a host type definition.
    pub fn register(&mut self, type_def: TypeDef) {
        self.types.insert(type_def.name.clone(), type_def);
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterates registered definitions in registration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    fn registered(&self, type_name: &str) -> Result<Option<&TypeDef>, ReflectionError> {
        if let Some(type_def) = self.types.get(type_name) {
            return Ok(Some(type_def));
        }
        if type_name.contains('.') {
            return Ok(None);
        }

        let mut candidates = self.types.values().filter(|type_def| type_def.simple_name() == type_name);
        let first = candidates.next();
        let rest: Vec<&TypeDef> = candidates.collect();
        match (first, rest.is_empty()) {
            (Some(type_def), true) => Ok(Some(type_def)),
            (Some(type_def), false) => Err(ReflectionError::Ambiguous {
                name: type_name.to_string(),
                candidates: std::iter::once(type_def)
                    .chain(rest)
                    .map(|candidate| candidate.name.clone())
                    .collect(),
            }),
            (None, _) => Ok(None),
        }
    }
}

impl TypeIntrospector for TypeCatalog {
    fn describe(&self, type_name: &str) -> Result<TypeDef, ReflectionError> {
        let expr = TypeExpr::parse(type_name)?;
        let canonical = expr.to_string();

        if let Some(type_def) = self.registered(&canonical)? {
            return Ok(type_def.clone());
        }
        if let Some(shape) = builtin_shape(&expr) {
            return Ok(TypeDef::new(canonical, shape));
        }
        Err(ReflectionError::UnknownType(canonical))
    }
}

/// Recognizes primitives and well-known framework generics.
///
/// Dictionaries are matched before sequences, since dictionary types are
/// enumerable as well.
pub fn builtin_shape(expr: &TypeExpr) -> Option<TypeShape> {
    let (name, args) = match expr {
        TypeExpr::Nullable(inner) => {
            return Some(TypeShape::Nullable {
                underlying: inner.to_string(),
            });
        }
        TypeExpr::Array(element) => {
            return Some(TypeShape::Array {
                element: element.to_string(),
            });
        }
        TypeExpr::Named { name, args } => (name.as_str(), args.as_slice()),
    };
    let simple = simple_name(name);
    let arg = |index: usize| args.get(index).map(ToString::to_string);

    if args.is_empty()
        && let Some(primitive) = PrimitiveKind::from_type_name(name)
    {
        return Some(TypeShape::Primitive { primitive });
    }

    let shape = match (simple, args.len()) {
        ("void" | "Void", 0) => TypeShape::Void,
        (any, 0) if ANY_TYPES.contains(&any) => TypeShape::Any,
        ("Nullable", 1) => TypeShape::Nullable {
            underlying: arg(0)?,
        },
        (dictionary, 2) if DICTIONARY_TYPES.contains(&dictionary) => TypeShape::Dictionary {
            key: arg(0)?,
            value: arg(1)?,
        },
        (dictionary, 0) if UNTYPED_DICTIONARY_TYPES.contains(&dictionary) => TypeShape::Dictionary {
            key: "string".to_string(),
            value: "object".to_string(),
        },
        (sequence, 1) if SEQUENCE_TYPES.contains(&sequence) => TypeShape::Sequence { element: arg(0) },
        (sequence, 0) if UNTYPED_SEQUENCE_TYPES.contains(&sequence) => TypeShape::Sequence { element: None },
        (task, 0 | 1) if TASK_TYPES.contains(&task) => TypeShape::Task { result: arg(0) },
        (result, 0 | 1) if ACTION_RESULT_TYPES.contains(&result) => TypeShape::ActionResult { value: arg(0) },
        (infrastructure, 0) if INFRASTRUCTURE_TYPES.contains(&infrastructure) => TypeShape::Infrastructure,
        _ => return None,
    };
    Some(shape)
}
