//! Statement AST nodes

use super::{Designator, Expr, Ident, NodeId, TypeName};
use crate::common::Span;

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(id: NodeId, kind: StmtKind, span: Span) -> Self {
        Self { id, kind, span }
    }
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Variable declaration: `int x = 1` or `(int a, bool b) = f()`
    ///
    /// A multi-variable declaration always has a call as its initializer.
    VarDecl {
        vars: Vec<LocalDecl>,
        init: Option<Expr>,
    },

    /// Assignment: x = expr
    Assign {
        target: Designator,
        value: Expr,
    },

    /// Multi-assignment from a call: a, b = f()
    MultiAssign {
        targets: Vec<Designator>,
        value: Expr,
    },

    /// If statement: if (cond) { .. } [else { .. }]
    If {
        condition: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },

    /// Return statement: return [expr, ...]
    Return(Vec<Expr>),
}

/// One declared name of a variable declaration statement
#[derive(Debug, Clone, PartialEq)]
pub struct LocalDecl {
    pub id: NodeId,
    pub name: Ident,
    pub ty: TypeName,
    pub span: Span,
}

/// Statement block
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Self { stmts, span }
    }
}
