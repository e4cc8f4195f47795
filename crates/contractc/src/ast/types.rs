//! Type annotations as written in the source

use std::fmt;
use crate::common::Span;

/// Syntactic type name, resolved to a type symbol during type resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub kind: TypeNameKind,
    pub span: Span,
}

impl TypeName {
    pub fn new(kind: TypeNameKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn named(name: impl Into<String>, span: Span) -> Self {
        Self::new(TypeNameKind::Named(name.into()), span)
    }

    pub fn is_void(&self) -> bool {
        matches!(self.kind, TypeNameKind::Void)
    }
}

/// Type annotation kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNameKind {
    /// Basic or struct type: int, bool, Account
    Named(String),

    /// Array type: int[]
    Array(Box<TypeName>),

    /// Map type: mapping(string => int)
    Map {
        key: Box<TypeName>,
        value: Box<TypeName>,
    },

    /// The void marker of a return-type list
    Void,
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeNameKind::Named(name) => write!(f, "{}", name),
            TypeNameKind::Array(element) => write!(f, "{}[]", element),
            TypeNameKind::Map { key, value } => write!(f, "mapping({} => {})", key, value),
            TypeNameKind::Void => write!(f, "void"),
        }
    }
}
