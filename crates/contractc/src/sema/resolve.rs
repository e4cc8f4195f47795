//! Type resolution: turn type annotations into type symbols

use tracing::{debug, instrument};

use super::scope::SymbolId;
use super::table::SymbolTable;
use crate::ast::*;
use crate::common::CompileError;

/// Upper bound on the return-type list of a function
pub const MAX_RETURN_VALUES: usize = 3;

/// Second analysis phase
///
/// Every annotation is attempted even after a failure, so one run reports
/// all unknown types.
pub struct TypeResolver<'t> {
    table: &'t mut SymbolTable,
    errors: Vec<CompileError>,
}

impl<'t> TypeResolver<'t> {
    pub fn new(table: &'t mut SymbolTable) -> Self {
        Self {
            table,
            errors: Vec::new(),
        }
    }

    #[instrument(skip_all)]
    pub fn resolve(mut self, program: &Program) -> Vec<CompileError> {
        let Some(contract) = &program.contract else {
            return self.errors;
        };

        for field in &contract.fields {
            self.resolve_declared(field.id, &field.ty);
        }

        for decl in &contract.structs {
            for field in &decl.fields {
                self.resolve_declared(field.id, &field.ty);
            }
        }

        for callable in contract.callables() {
            let Some(func) = self.table.symbol_of(callable.id) else {
                continue;
            };
            for param in callable.params {
                self.resolve_declared(param.id, &param.ty);
            }
            self.resolve_returns(func, callable);
            self.resolve_block(callable.body);
        }

        debug!(errors = self.errors.len(), "type resolution finished");
        self.errors
    }

    fn resolve_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            match &stmt.kind {
                StmtKind::VarDecl { vars, .. } => {
                    // Each name of a multi-variable declaration carries its own annotation.
                    for var in vars {
                        self.resolve_declared(var.id, &var.ty);
                    }
                }
                StmtKind::If { then_block, else_block, .. } => {
                    self.resolve_block(then_block);
                    if let Some(else_block) = else_block {
                        self.resolve_block(else_block);
                    }
                }
                StmtKind::Assign { .. } | StmtKind::MultiAssign { .. } | StmtKind::Return(_) => {}
            }
        }
    }

    /// Resolve the annotation of a field, parameter or local variable
    fn resolve_declared(&mut self, node: NodeId, ty: &TypeName) {
        let Some(symbol) = self.table.symbol_of(node) else {
            return;
        };
        if ty.is_void() {
            self.errors.push(CompileError::type_resolution(
                "void is only allowed as a return type",
                ty.span,
            ));
            return;
        }
        if let Some(resolved) = self.lookup(ty) {
            self.table.set_value_type(symbol, resolved);
        }
    }

    fn resolve_returns(&mut self, func: SymbolId, callable: Callable<'_>) {
        let returns = callable.returns;
        let name = callable.name.map_or("constructor", |n| n.name.as_str());

        if returns.len() > MAX_RETURN_VALUES {
            self.errors.push(CompileError::type_resolution(
                format!(
                    "function '{}' declares {} return types, at most {} are allowed",
                    name,
                    returns.len(),
                    MAX_RETURN_VALUES
                ),
                callable.span,
            ));
        }

        if returns.len() > 1 {
            if let Some(void) = returns.iter().find(|ty| ty.is_void()) {
                self.errors.push(CompileError::type_resolution(
                    format!("void must be the only return type of function '{}'", name),
                    void.span,
                ));
            }
        }

        let resolved: Vec<SymbolId> = returns
            .iter()
            .filter(|ty| !ty.is_void())
            .filter_map(|ty| self.lookup(ty))
            .collect();

        if let Some(info) = self.table.function_mut(func) {
            info.returns = resolved;
        }
    }

    fn lookup(&mut self, ty: &TypeName) -> Option<SymbolId> {
        let resolved = self.table.find_type_by_name(ty);
        if resolved.is_none() {
            self.errors.push(CompileError::type_resolution(
                format!("unknown type '{}'", ty),
                ty.span,
            ));
        }
        resolved
    }
}
