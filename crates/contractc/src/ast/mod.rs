//! Syntax tree consumed by the semantic analysis
//!
//! The tree is produced by the parser, which lives outside this crate. Every
//! node that the analysis needs to refer back to carries a [`NodeId`] that is
//! unique within one tree; [`TreeBuilder`] hands those out.

mod types;
mod expr;
mod stmt;
mod decl;
mod builder;

pub use types::*;
pub use expr::*;
pub use stmt::*;
pub use decl::*;
pub use builder::TreeBuilder;

use std::fmt;
use crate::common::Span;

/// Identity of a syntax node within one tree
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Root of the tree: one source file holding at most one contract
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub contract: Option<Contract>,
    pub span: Span,
}

impl Program {
    pub fn new(contract: Option<Contract>, span: Span) -> Self {
        Self { contract, span }
    }
}
