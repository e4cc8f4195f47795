//! Scope records and arena identifiers

use std::fmt;

use super::symbol::Name;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub const fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            pub const fn to_raw(self) -> u32 {
                self.0
            }

            pub(crate) fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

define_id!(SymbolId);
define_id!(ScopeId);

/// What kind of entity owns a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Contract,
    Struct,
    Function,
}

/// A searchable owner of declarations
///
/// Lookups walk `parent` links: function -> contract -> global, and
/// struct -> contract -> global.
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Symbol this scope belongs to; `None` for the global scope
    pub owner: Option<SymbolId>,
    pub parent: Option<ScopeId>,
    declarations: Vec<(Name, SymbolId)>,
}

impl Scope {
    pub fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            owner: None,
            parent,
            declarations: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, name: Name, symbol: SymbolId) {
        self.declarations.push((name, symbol));
    }

    /// Direct declarations in declaration order
    pub fn declarations(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.declarations.iter().map(|(_, id)| *id)
    }

    /// First direct declaration with the given name
    pub fn lookup_local(&self, name: Name) -> Option<SymbolId> {
        self.declarations
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, id)| *id)
    }

    /// Every direct declaration with the given name
    pub fn lookup_all(&self, name: Name) -> impl Iterator<Item = SymbolId> + '_ {
        self.declarations
            .iter()
            .filter(move |(n, _)| *n == name)
            .map(|(_, id)| *id)
    }
}
