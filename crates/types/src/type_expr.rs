//! Parsing of type expressions such as `List<Order>`, `int?` or `Order[]`.
//!
//! Endpoint and property descriptors reference types by expression. Closed
//! generic instantiations are written in source syntax; the parser turns them
//! into a small tree the type catalog can dispatch on.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Parsed form of a type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// A named type with optional generic arguments
    Named { name: String, args: Vec<TypeExpr> },
    /// Single-dimension array `T[]`
    Array(Box<TypeExpr>),
    /// Nullable shorthand `T?`
    Nullable(Box<TypeExpr>),
}

/// Errors raised while parsing a type expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeExprError {
    #[error("type expression is empty")]
    Empty,
    #[error("unexpected character '{found}' at offset {offset} in '{input}'")]
    Unexpected { input: String, found: char, offset: usize },
    #[error("unexpected end of type expression '{input}'")]
    UnexpectedEnd { input: String },
}

impl TypeExpr {
    /// Parses a type expression.
    pub fn parse(input: &str) -> Result<TypeExpr, TypeExprError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TypeExprError::Empty);
        }
        let mut cursor = Cursor::new(trimmed);
        let expr = cursor.parse_type()?;
        cursor.skip_whitespace();
        match cursor.peek() {
            None => Ok(expr),
            Some(found) => Err(cursor.unexpected(found)),
        }
    }

    /// Returns the unqualified name of a named type (`System.Int32` → `Int32`).
    ///
    /// Arrays and nullable shorthands return `None`.
    pub fn simple_name(&self) -> Option<&str> {
        match self {
            TypeExpr::Named { name, .. } => Some(simple_name(name)),
            _ => None,
        }
    }

    /// Returns the generic arguments of a named type.
    pub fn args(&self) -> &[TypeExpr] {
        match self {
            TypeExpr::Named { args, .. } => args,
            _ => &[],
        }
    }
}

/// Returns the segment after the last `.` of a possibly qualified name.
///
/// Generic arity markers (``List`1``) are removed as well.
pub fn simple_name(name: &str) -> &str {
    let without_args = name.split('<').next().unwrap_or(name);
    let last = without_args.rsplit('.').next().unwrap_or(without_args);
    last.split('`').next().unwrap_or(last)
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named { name, args } if args.is_empty() => f.write_str(name),
            TypeExpr::Named { name, args } => {
                write!(f, "{name}<")?;
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
            TypeExpr::Array(element) => write!(f, "{element}[]"),
            TypeExpr::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}

impl FromStr for TypeExpr {
    type Err = TypeExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeExpr::parse(s)
    }
}

struct Cursor<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().collect(),
            position: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).map(|(_, c)| *c)
    }

    fn offset(&self) -> usize {
        self.chars.get(self.position).map_or(self.input.len(), |(offset, _)| *offset)
    }

    fn bump(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn unexpected(&self, found: char) -> TypeExprError {
        TypeExprError::Unexpected {
            input: self.input.to_string(),
            found,
            offset: self.offset(),
        }
    }

    fn end(&self) -> TypeExprError {
        TypeExprError::UnexpectedEnd {
            input: self.input.to_string(),
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), TypeExprError> {
        self.skip_whitespace();
        match self.peek() {
            Some(found) if found == expected => {
                self.bump();
                Ok(())
            }
            Some(found) => Err(self.unexpected(found)),
            None => Err(self.end()),
        }
    }

    fn parse_type(&mut self) -> Result<TypeExpr, TypeExprError> {
        self.skip_whitespace();
        let name = self.parse_identifier()?;
        let mut args = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some('<') {
            self.bump();
            loop {
                args.push(self.parse_type()?);
                self.skip_whitespace();
                match self.peek() {
                    Some(',') => self.bump(),
                    Some('>') => {
                        self.bump();
                        break;
                    }
                    Some(found) => return Err(self.unexpected(found)),
                    None => return Err(self.end()),
                }
            }
        }

        let mut expr = TypeExpr::Named { name, args };
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('?') => {
                    self.bump();
                    expr = TypeExpr::Nullable(Box::new(expr));
                }
                Some('[') => {
                    self.bump();
                    self.expect(']')?;
                    expr = TypeExpr::Array(Box::new(expr));
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_identifier(&mut self) -> Result<String, TypeExprError> {
        let start = self.offset();
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => self.bump(),
            Some(found) => return Err(self.unexpected(found)),
            None => return Err(self.end()),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '`' | '+'))
        {
            self.bump();
        }
        Ok(self.input[start..self.offset()].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, args: Vec<TypeExpr>) -> TypeExpr {
        TypeExpr::Named {
            name: name.to_string(),
            args,
        }
    }

    #[test]
    fn parses_nested_generics() {
        let expr = TypeExpr::parse("Task<ActionResult<List<Shop.Order>>>").expect("parse");
        assert_eq!(
            expr,
            named(
                "Task",
                vec![named("ActionResult", vec![named("List", vec![named("Shop.Order", vec![])])])]
            )
        );
    }

    #[test]
    fn parses_nullable_and_array_suffixes() {
        assert_eq!(
            TypeExpr::parse("int?").expect("parse"),
            TypeExpr::Nullable(Box::new(named("int", vec![])))
        );
        assert_eq!(
            TypeExpr::parse("Order[]").expect("parse"),
            TypeExpr::Array(Box::new(named("Order", vec![])))
        );
    }

    #[test]
    fn parses_multiple_arguments_with_whitespace() {
        let expr = TypeExpr::parse(" Dictionary< string , int > ").expect("parse");
        assert_eq!(expr.to_string(), "Dictionary<string, int>");
        assert_eq!(expr.args().len(), 2);
    }

    #[test]
    fn rejects_unbalanced_brackets() {
        assert!(matches!(TypeExpr::parse("List<int"), Err(TypeExprError::UnexpectedEnd { .. })));
        assert!(matches!(TypeExpr::parse("List<int>>"), Err(TypeExprError::Unexpected { found: '>', .. })));
        assert_eq!(TypeExpr::parse("  "), Err(TypeExprError::Empty));
    }

    #[test]
    fn simple_name_strips_namespace_and_arity() {
        assert_eq!(simple_name("System.Collections.Generic.List`1"), "List");
        assert_eq!(simple_name("Shop.Models.Order"), "Order");
        assert_eq!(simple_name("Order"), "Order");
    }
}
