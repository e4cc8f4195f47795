//! Expression AST nodes

use super::{Ident, NodeId};
use crate::common::Span;

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind, span: Span) -> Self {
        Self { id, kind, span }
    }
}

/// Expression kinds
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Integer literal: 42
    IntLiteral(i64),

    /// Boolean literal: true, false
    BoolLiteral(bool),

    /// Character literal: 'c'
    CharLiteral(char),

    /// String literal: "hello"
    StringLiteral(String),

    /// Name reference read as a value: x, xs[i], xs.length
    Designator(Designator),

    /// Function call: f(a, b)
    Call {
        callee: Designator,
        args: Vec<Expr>,
    },

    /// Binary operation: a + b
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary operation: -x, !flag
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
}

/// Name reference, used both as a value and as an assignment target
#[derive(Debug, Clone, PartialEq)]
pub struct Designator {
    pub id: NodeId,
    pub kind: DesignatorKind,
    pub span: Span,
}

impl Designator {
    pub fn new(id: NodeId, kind: DesignatorKind, span: Span) -> Self {
        Self { id, kind, span }
    }

    /// Source-like rendering used in diagnostics
    pub fn describe(&self) -> String {
        match &self.kind {
            DesignatorKind::Name(name) => name.clone(),
            DesignatorKind::Index { base, .. } => format!("{}[..]", base.describe()),
            DesignatorKind::Member { base, member } => {
                format!("{}.{}", base.describe(), member.name)
            }
        }
    }
}

/// Designator kinds
#[derive(Debug, Clone, PartialEq)]
pub enum DesignatorKind {
    /// Simple name: balance
    Name(String),

    /// Array element access: xs[i]
    Index {
        base: Box<Designator>,
        index: Box<Expr>,
    },

    /// Member access: xs.length
    Member {
        base: Box<Designator>,
        member: Ident,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // Logical
    And,
    Or,

    // Equality
    Eq,
    Ne,

    // Relational
    Lt,
    Le,
    Gt,
    Ge,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Sub
                | BinaryOp::Mul
                | BinaryOp::Div
                | BinaryOp::Mod
                | BinaryOp::Pow
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_relational(&self) -> bool {
        matches!(self, BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus, // +x
    Neg,  // -x
    Not,  // !x
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}
