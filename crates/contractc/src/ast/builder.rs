//! Node construction with fresh ids
//!
//! Spans are synthetic unless the caller provides real ones: every node gets
//! a one-byte span at its id, which keeps diagnostic positions distinct and
//! comparable in tests.

use std::cell::Cell;

use super::*;
use crate::common::Span;

/// Allocator of node ids plus terse constructors for every node kind
///
/// Methods take `&self` so that nodes can be nested directly in calls:
/// `b.field(b.ty("int"), "x", Some(b.int(1)))`.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    next_id: Cell<u32>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a fresh node id
    pub fn next_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId::from_raw(id)
    }

    fn fresh(&self) -> (NodeId, Span) {
        let id = self.next_id();
        let at = id.to_raw() as usize;
        (id, Span::new(at, at + 1))
    }

    fn ident(&self, name: &str) -> Ident {
        let (_, span) = self.fresh();
        Ident::new(name, span)
    }

    fn block(&self, stmts: Vec<Stmt>) -> Block {
        let span = stmts
            .iter()
            .map(|s| s.span)
            .reduce(Span::merge)
            .unwrap_or_default();
        Block::new(stmts, span)
    }

    // ==================== Declarations ====================

    pub fn program(&self, contract: Option<Contract>) -> Program {
        let span = contract.as_ref().map(|c| c.span).unwrap_or_default();
        Program::new(contract, span)
    }

    pub fn contract(&self, name: &str) -> Contract {
        let (id, span) = self.fresh();
        Contract::new(id, self.ident(name), span)
    }

    pub fn field(&self, ty: TypeName, name: &str, init: Option<Expr>) -> FieldDecl {
        let (id, span) = self.fresh();
        FieldDecl { id, name: self.ident(name), ty, init, span }
    }

    pub fn struct_decl(&self, name: &str, fields: Vec<FieldDecl>) -> StructDecl {
        let (id, span) = self.fresh();
        StructDecl { id, name: self.ident(name), fields, span }
    }

    pub fn constructor(&self, params: Vec<Param>, body: Vec<Stmt>) -> ConstructorDecl {
        let (id, span) = self.fresh();
        ConstructorDecl { id, params, body: self.block(body), span }
    }

    pub fn function(
        &self,
        name: &str,
        returns: Vec<TypeName>,
        params: Vec<Param>,
        body: Vec<Stmt>,
    ) -> FunctionDecl {
        let (id, span) = self.fresh();
        FunctionDecl {
            id,
            name: self.ident(name),
            returns,
            params,
            body: self.block(body),
            span,
        }
    }

    pub fn param(&self, ty: TypeName, name: &str) -> Param {
        let (id, span) = self.fresh();
        Param { id, name: self.ident(name), ty, span }
    }

    // ==================== Types ====================

    pub fn ty(&self, name: &str) -> TypeName {
        let (_, span) = self.fresh();
        TypeName::named(name, span)
    }

    pub fn array_of(&self, element: TypeName) -> TypeName {
        let (_, span) = self.fresh();
        TypeName::new(TypeNameKind::Array(Box::new(element)), span)
    }

    pub fn map_of(&self, key: TypeName, value: TypeName) -> TypeName {
        let (_, span) = self.fresh();
        TypeName::new(
            TypeNameKind::Map {
                key: Box::new(key),
                value: Box::new(value),
            },
            span,
        )
    }

    pub fn void(&self) -> TypeName {
        let (_, span) = self.fresh();
        TypeName::new(TypeNameKind::Void, span)
    }

    // ==================== Statements ====================

    fn stmt(&self, kind: StmtKind) -> Stmt {
        let (id, span) = self.fresh();
        Stmt::new(id, kind, span)
    }

    pub fn local(&self, ty: TypeName, name: &str) -> LocalDecl {
        let (id, span) = self.fresh();
        LocalDecl { id, name: self.ident(name), ty, span }
    }

    /// Single-variable declaration: `T name [= init]`
    pub fn var(&self, ty: TypeName, name: &str, init: Option<Expr>) -> Stmt {
        let local = self.local(ty, name);
        self.stmt(StmtKind::VarDecl { vars: vec![local], init })
    }

    /// Multi-variable declaration: `(T1 a, T2 b) = call`
    pub fn vars(&self, vars: Vec<LocalDecl>, init: Expr) -> Stmt {
        self.stmt(StmtKind::VarDecl { vars, init: Some(init) })
    }

    pub fn assign(&self, target: Designator, value: Expr) -> Stmt {
        self.stmt(StmtKind::Assign { target, value })
    }

    pub fn multi_assign(&self, targets: Vec<Designator>, value: Expr) -> Stmt {
        self.stmt(StmtKind::MultiAssign { targets, value })
    }

    pub fn if_stmt(&self, condition: Expr, then_body: Vec<Stmt>, else_body: Option<Vec<Stmt>>) -> Stmt {
        let then_block = self.block(then_body);
        let else_block = else_body.map(|body| self.block(body));
        self.stmt(StmtKind::If { condition, then_block, else_block })
    }

    pub fn ret(&self, values: Vec<Expr>) -> Stmt {
        self.stmt(StmtKind::Return(values))
    }

    // ==================== Expressions ====================

    fn expr(&self, kind: ExprKind) -> Expr {
        let (id, span) = self.fresh();
        Expr::new(id, kind, span)
    }

    pub fn int(&self, value: i64) -> Expr {
        self.expr(ExprKind::IntLiteral(value))
    }

    pub fn boolean(&self, value: bool) -> Expr {
        self.expr(ExprKind::BoolLiteral(value))
    }

    pub fn chr(&self, value: char) -> Expr {
        self.expr(ExprKind::CharLiteral(value))
    }

    pub fn string(&self, value: &str) -> Expr {
        self.expr(ExprKind::StringLiteral(value.to_string()))
    }

    pub fn binary(&self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        self.expr(ExprKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn unary(&self, op: UnaryOp, operand: Expr) -> Expr {
        self.expr(ExprKind::Unary { op, operand: Box::new(operand) })
    }

    /// Call of a function by simple name
    pub fn call(&self, name: &str, args: Vec<Expr>) -> Expr {
        let callee = self.name(name);
        self.expr(ExprKind::Call { callee, args })
    }

    /// Designator read as a value
    pub fn load(&self, designator: Designator) -> Expr {
        self.expr(ExprKind::Designator(designator))
    }

    /// Shorthand for `load(name(..))`
    pub fn read(&self, name: &str) -> Expr {
        self.load(self.name(name))
    }

    // ==================== Designators ====================

    pub fn name(&self, name: &str) -> Designator {
        let (id, span) = self.fresh();
        Designator::new(id, DesignatorKind::Name(name.to_string()), span)
    }

    pub fn index(&self, base: Designator, index: Expr) -> Designator {
        let (id, span) = self.fresh();
        Designator::new(
            id,
            DesignatorKind::Index {
                base: Box::new(base),
                index: Box::new(index),
            },
            span,
        )
    }

    pub fn member(&self, base: Designator, member: &str) -> Designator {
        let (id, span) = self.fresh();
        Designator::new(
            id,
            DesignatorKind::Member {
                base: Box::new(base),
                member: self.ident(member),
            },
            span,
        )
    }
}
