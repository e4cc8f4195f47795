//! Designator resolution: bind every name reference to its declaration

use tracing::{debug, instrument};

use super::scope::{ScopeId, SymbolId};
use super::symbol::SymbolKind;
use super::table::SymbolTable;
use crate::ast::*;
use crate::common::CompileError;

/// Third analysis phase
///
/// Fills the designator→declaration map and records the type of every
/// value designator it resolves.
pub struct DesignatorResolver<'t> {
    table: &'t mut SymbolTable,
    errors: Vec<CompileError>,
    current_function: Option<SymbolId>,
    /// Statement whose expressions are being resolved
    current_stmt: Option<NodeId>,
}

impl<'t> DesignatorResolver<'t> {
    pub fn new(table: &'t mut SymbolTable) -> Self {
        Self {
            table,
            errors: Vec::new(),
            current_function: None,
            current_stmt: None,
        }
    }

    #[instrument(skip_all)]
    pub fn resolve(mut self, program: &Program) -> Vec<CompileError> {
        let Some(contract) = &program.contract else {
            return self.errors;
        };

        let contract_scope = self.table.contract_scope();
        for field in &contract.fields {
            if let Some(init) = &field.init {
                self.resolve_expr(contract_scope, init);
            }
        }

        for decl in &contract.structs {
            let scope = match self.table.symbol_of(decl.id).map(|s| &self.table.symbol(s).kind) {
                Some(SymbolKind::Struct { scope, .. }) => *scope,
                _ => continue,
            };
            for field in &decl.fields {
                if let Some(init) = &field.init {
                    self.resolve_expr(scope, init);
                }
            }
        }

        for callable in contract.callables() {
            let Some(func) = self.table.symbol_of(callable.id) else {
                continue;
            };
            let Some(scope) = self.table.function(func).map(|f| f.scope) else {
                continue;
            };
            self.current_function = Some(func);
            self.resolve_block(scope, callable.body);
            self.current_function = None;
        }

        debug!(
            bindings = self.table.designator_bindings().len(),
            errors = self.errors.len(),
            "designator resolution finished"
        );
        self.errors
    }

    fn resolve_block(&mut self, scope: ScopeId, block: &Block) {
        for stmt in &block.stmts {
            self.resolve_stmt(scope, stmt);
        }
    }

    fn resolve_stmt(&mut self, scope: ScopeId, stmt: &Stmt) {
        let enclosing = self.current_stmt.replace(stmt.id);

        match &stmt.kind {
            StmtKind::VarDecl { init, .. } => {
                if let Some(init) = init {
                    self.resolve_expr(scope, init);
                }
            }
            StmtKind::Assign { target, value } => {
                self.resolve_designator(scope, target);
                self.resolve_expr(scope, value);
            }
            StmtKind::MultiAssign { targets, value } => {
                for target in targets {
                    self.resolve_designator(scope, target);
                }
                self.resolve_expr(scope, value);
            }
            StmtKind::If { condition, then_block, else_block } => {
                self.resolve_expr(scope, condition);
                self.resolve_block(scope, then_block);
                if let Some(else_block) = else_block {
                    self.resolve_block(scope, else_block);
                }
            }
            StmtKind::Return(values) => {
                for value in values {
                    self.resolve_expr(scope, value);
                }
            }
        }

        self.current_stmt = enclosing;
    }

    fn resolve_expr(&mut self, scope: ScopeId, expr: &Expr) {
        match &expr.kind {
            ExprKind::IntLiteral(_)
            | ExprKind::BoolLiteral(_)
            | ExprKind::CharLiteral(_)
            | ExprKind::StringLiteral(_) => {}
            ExprKind::Designator(designator) => {
                self.resolve_designator(scope, designator);
            }
            ExprKind::Call { callee, args } => {
                self.resolve_callee(scope, callee);
                for arg in args {
                    self.resolve_expr(scope, arg);
                }
            }
            ExprKind::Binary { left, right, .. } => {
                self.resolve_expr(scope, left);
                self.resolve_expr(scope, right);
            }
            ExprKind::Unary { operand, .. } => self.resolve_expr(scope, operand),
        }
    }

    /// Resolve a value designator and return its type
    fn resolve_designator(&mut self, scope: ScopeId, designator: &Designator) -> Option<SymbolId> {
        match &designator.kind {
            DesignatorKind::Name(name) => {
                let symbol = self.lookup_value(scope, name, designator)?;
                self.table.bind_designator(designator.id, symbol);
                let ty = self.table.value_type(symbol)?;
                self.table.annotate_type(designator.id, ty);
                Some(ty)
            }
            DesignatorKind::Index { base, index } => {
                let base_ty = self.resolve_designator(scope, base);
                self.resolve_expr(scope, index);
                let base_ty = base_ty?;

                let Some(element) = self.table.element_type(base_ty) else {
                    self.errors.push(CompileError::designator(
                        format!(
                            "cannot index '{}' of type {}, only arrays can be indexed",
                            base.describe(),
                            self.table.type_name(base_ty)
                        ),
                        designator.span,
                    ));
                    return None;
                };
                if let Some(array) = self.table.declaration_of(base.id) {
                    self.table.bind_designator(designator.id, array);
                }
                self.table.annotate_type(designator.id, element);
                Some(element)
            }
            DesignatorKind::Member { base, member } => {
                let base_ty = self.resolve_designator(scope, base)?;
                if self.table.element_type(base_ty).is_none() || member.name != "length" {
                    self.errors.push(CompileError::designator(
                        format!(
                            "type {} has no member '{}'",
                            self.table.type_name(base_ty),
                            member.name
                        ),
                        member.span,
                    ));
                    return None;
                }
                let length = self.table.length_field();
                let int = self.table.int_type();
                self.table.bind_designator(designator.id, length);
                self.table.annotate_type(designator.id, int);
                Some(int)
            }
        }
    }

    /// Bind the callee of a call; its type is settled during type checking
    fn resolve_callee(&mut self, scope: ScopeId, callee: &Designator) {
        let DesignatorKind::Name(name) = &callee.kind else {
            self.resolve_designator(scope, callee);
            return;
        };
        match self.table.find(scope, name) {
            Some(symbol) => self.table.bind_designator(callee.id, symbol),
            None => self.errors.push(undefined(name, callee)),
        }
    }

    /// Nearest value declaration of `name`, honoring local visibility
    fn lookup_value(&mut self, scope: ScopeId, name: &str, designator: &Designator) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let candidates = self.table.find_in(id, name);
            if let Some(&first) = candidates.first() {
                return self.select_candidate(&candidates, first, name, designator);
            }
            current = self.table.scope(id).parent;
        }
        self.errors.push(undefined(name, designator));
        None
    }

    fn select_candidate(
        &mut self,
        candidates: &[SymbolId],
        first: SymbolId,
        name: &str,
        designator: &Designator,
    ) -> Option<SymbolId> {
        let kind = &self.table.symbol(first).kind;
        if !kind.is_value() {
            self.errors.push(undefined(name, designator));
            return None;
        }
        if !matches!(kind, SymbolKind::Local { .. }) {
            return Some(first);
        }

        // Sibling blocks may declare the same name; pick the one in reach.
        let visible = self
            .current_stmt
            .and_then(|stmt| candidates.iter().copied().find(|&c| self.table.is_visible_in(c, stmt)));
        if visible.is_none() {
            self.errors.push(CompileError::designator(
                format!("local variable '{}' is not visible here", name),
                designator.span,
            ));
        }
        visible
    }
}

fn undefined(name: &str, designator: &Designator) -> CompileError {
    CompileError::designator(format!("undefined designator '{}'", name), designator.span)
}
