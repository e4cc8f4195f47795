//! Symbols produced by the analysis

use std::collections::HashSet;

use string_interner::DefaultSymbol;

use super::scope::{ScopeId, SymbolId};
use crate::ast::NodeId;
use crate::common::Span;

/// Interned identifier
pub type Name = DefaultSymbol;

/// A declared entity
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: Name,
    /// Scope whose declaration list holds this symbol
    pub scope: ScopeId,
    pub span: Span,
    pub kind: SymbolKind,
}

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType {
    Bool,
    Char,
    Int,
    String,
    /// Type of the `null` constant, not spellable in source
    Null,
    /// Type of a call to a function without return values, not spellable
    Void,
}

impl BasicType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BasicType::Bool => "bool",
            BasicType::Char => "char",
            BasicType::Int => "int",
            BasicType::String => "string",
            BasicType::Null => "null",
            BasicType::Void => "void",
        }
    }
}

/// Variant-specific symbol data
///
/// Types that are still `None` are filled in by type resolution.
#[derive(Debug, Clone)]
pub enum SymbolKind {
    Basic(BasicType),
    Struct {
        scope: ScopeId,
        fields: Vec<SymbolId>,
    },
    /// Interned, so equal element types give the same symbol
    Array {
        element: SymbolId,
    },
    /// Interned like arrays
    Map {
        key: SymbolId,
        value: SymbolId,
    },
    Contract(ContractInfo),
    Field {
        ty: Option<SymbolId>,
    },
    Constant {
        ty: SymbolId,
    },
    Function(FunctionInfo),
    Parameter {
        ty: Option<SymbolId>,
    },
    Local {
        ty: Option<SymbolId>,
        /// Statements in which the variable may be read or written
        visibility: HashSet<NodeId>,
    },
}

#[derive(Debug, Clone)]
pub struct ContractInfo {
    pub scope: ScopeId,
    pub fields: Vec<SymbolId>,
    pub structs: Vec<SymbolId>,
    pub constructor: Option<SymbolId>,
    pub functions: Vec<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub scope: ScopeId,
    pub is_constructor: bool,
    /// Empty for void functions
    pub returns: Vec<SymbolId>,
    pub params: Vec<SymbolId>,
    pub locals: Vec<SymbolId>,
}

impl SymbolKind {
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            SymbolKind::Basic(_)
                | SymbolKind::Struct { .. }
                | SymbolKind::Array { .. }
                | SymbolKind::Map { .. }
                | SymbolKind::Contract(_)
        )
    }

    /// Whether a name reference may denote this symbol as a value
    pub fn is_value(&self) -> bool {
        matches!(
            self,
            SymbolKind::Field { .. }
                | SymbolKind::Constant { .. }
                | SymbolKind::Parameter { .. }
                | SymbolKind::Local { .. }
        )
    }

    /// Declared type of a value symbol
    pub fn value_type(&self) -> Option<SymbolId> {
        match self {
            SymbolKind::Field { ty } | SymbolKind::Parameter { ty } | SymbolKind::Local { ty, .. } => *ty,
            SymbolKind::Constant { ty } => Some(*ty),
            _ => None,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            SymbolKind::Basic(_) => "basic type",
            SymbolKind::Struct { .. } => "struct type",
            SymbolKind::Array { .. } => "array type",
            SymbolKind::Map { .. } => "map type",
            SymbolKind::Contract(_) => "contract",
            SymbolKind::Field { .. } => "field",
            SymbolKind::Constant { .. } => "constant",
            SymbolKind::Function(_) => "function",
            SymbolKind::Parameter { .. } => "parameter",
            SymbolKind::Local { .. } => "local variable",
        }
    }
}
