//! Symbol construction: declare every entity and check identifiers
//!
//! Runs once over the tree before any type is known. Besides creating the
//! symbols, this pass computes each local variable's visibility set from the
//! static block structure of its function body.

use std::collections::HashSet;

use tracing::{debug, instrument};

use super::scope::{ScopeId, ScopeKind, SymbolId};
use super::symbol::{ContractInfo, FunctionInfo, SymbolKind};
use super::table::{SymbolTable, CONSTRUCTOR_NAME};
use crate::ast::*;
use crate::common::{CompileError, Span};

/// Identifiers that no declaration may use
pub const RESERVED_KEYWORDS: &[&str] = &["char", "int", "bool", "string", "this", "null", "void"];

/// First analysis phase
pub struct SymbolCollector<'t> {
    table: &'t mut SymbolTable,
    errors: Vec<CompileError>,
    struct_names: HashSet<String>,
    /// Locals declared in each currently open block, innermost last
    open_blocks: Vec<Vec<SymbolId>>,
}

impl<'t> SymbolCollector<'t> {
    pub fn new(table: &'t mut SymbolTable) -> Self {
        Self {
            table,
            errors: Vec::new(),
            struct_names: HashSet::new(),
            open_blocks: Vec::new(),
        }
    }

    /// Declare every symbol of the program
    ///
    /// A program without a contract yields exactly one structural error and
    /// nothing else is examined.
    #[instrument(skip_all)]
    pub fn collect(mut self, program: &Program) -> Vec<CompileError> {
        let Some(contract) = &program.contract else {
            return vec![CompileError::structure("program does not declare a contract", program.span)];
        };

        self.collect_contract(contract);
        debug!(errors = self.errors.len(), "symbol construction finished");
        self.errors
    }

    fn collect_contract(&mut self, contract: &Contract) {
        let global = self.table.global_scope();
        self.struct_names = contract.structs.iter().map(|s| s.name.name.clone()).collect();
        self.check_identifier(&contract.name, contract.span, true);
        self.check_unique(global, &contract.name, contract.span);

        let scope = self.table.new_scope(ScopeKind::Contract, Some(global));
        let info = ContractInfo {
            scope,
            fields: Vec::new(),
            structs: Vec::new(),
            constructor: None,
            functions: Vec::new(),
        };
        let symbol = self.table.declare(global, &contract.name.name, contract.span, SymbolKind::Contract(info));
        self.table.set_scope_owner(scope, symbol);
        self.table.set_contract(symbol);
        self.table.associate(contract.id, symbol);

        for field in &contract.fields {
            let id = self.declare_field(scope, field, false);
            if let Some(info) = self.table.contract_info_mut() {
                info.fields.push(id);
            }
        }

        for decl in &contract.structs {
            let id = self.collect_struct(scope, decl);
            if let Some(info) = self.table.contract_info_mut() {
                info.structs.push(id);
            }
        }

        for callable in contract.callables() {
            let id = self.collect_callable(scope, callable);
            if let Some(info) = self.table.contract_info_mut() {
                if callable.name.is_none() {
                    info.constructor = Some(id);
                } else {
                    info.functions.push(id);
                }
            }
        }

        debug!(
            contract = %contract.name.name,
            fields = contract.fields.len(),
            structs = contract.structs.len(),
            functions = contract.functions.len(),
            "declared contract members"
        );
    }

    fn declare_field(&mut self, scope: ScopeId, field: &FieldDecl, check_struct_names: bool) -> SymbolId {
        self.check_identifier(&field.name, field.span, check_struct_names);
        self.check_unique(scope, &field.name, field.span);

        let id = self.table.declare(scope, &field.name.name, field.span, SymbolKind::Field { ty: None });
        self.table.associate(field.id, id);
        id
    }

    fn collect_struct(&mut self, contract_scope: ScopeId, decl: &StructDecl) -> SymbolId {
        self.check_identifier(&decl.name, decl.span, false);
        self.check_unique(contract_scope, &decl.name, decl.span);

        let scope = self.table.new_scope(ScopeKind::Struct, Some(contract_scope));
        let kind = SymbolKind::Struct { scope, fields: Vec::new() };
        let id = self.table.declare(contract_scope, &decl.name.name, decl.span, kind);
        self.table.set_scope_owner(scope, id);
        self.table.associate(decl.id, id);

        for field in &decl.fields {
            let field_id = self.declare_field(scope, field, true);
            if let SymbolKind::Struct { fields, .. } = &mut self.table.symbol_mut(id).kind {
                fields.push(field_id);
            }
        }
        id
    }

    fn collect_callable(&mut self, contract_scope: ScopeId, callable: Callable<'_>) -> SymbolId {
        let name = match callable.name {
            Some(ident) => {
                self.check_identifier(ident, callable.span, false);
                self.check_unique(contract_scope, ident, callable.span);
                ident.name.as_str()
            }
            None => CONSTRUCTOR_NAME,
        };

        let scope = self.table.new_scope(ScopeKind::Function, Some(contract_scope));
        let info = FunctionInfo {
            scope,
            is_constructor: callable.name.is_none(),
            returns: Vec::new(),
            params: Vec::new(),
            locals: Vec::new(),
        };
        let func = self.table.declare(contract_scope, name, callable.span, SymbolKind::Function(info));
        self.table.set_scope_owner(scope, func);
        self.table.associate(callable.id, func);

        for param in callable.params {
            self.check_identifier(&param.name, param.span, true);
            self.check_unique(scope, &param.name, param.span);

            let id = self.table.declare(scope, &param.name.name, param.span, SymbolKind::Parameter { ty: None });
            self.table.associate(param.id, id);
            if let Some(info) = self.table.function_mut(func) {
                info.params.push(id);
            }
        }

        self.open_blocks.clear();
        self.discover_block(func, scope, callable.body);
        func
    }

    // ==================== Local variable discovery ====================

    fn discover_block(&mut self, func: SymbolId, scope: ScopeId, block: &Block) {
        self.open_blocks.push(Vec::new());
        for stmt in &block.stmts {
            self.discover_stmt(func, scope, stmt);
        }
        self.open_blocks.pop();
    }

    fn discover_stmt(&mut self, func: SymbolId, scope: ScopeId, stmt: &Stmt) {
        // Record first: a declaration is not visible in its own statement.
        self.record_visibility(stmt.id);

        match &stmt.kind {
            StmtKind::VarDecl { vars, .. } => {
                for var in vars {
                    self.declare_local(func, scope, var);
                }
            }
            StmtKind::If { then_block, else_block, .. } => {
                self.discover_block(func, scope, then_block);
                if let Some(else_block) = else_block {
                    self.discover_block(func, scope, else_block);
                }
            }
            StmtKind::Assign { .. } | StmtKind::MultiAssign { .. } | StmtKind::Return(_) => {}
        }
    }

    fn record_visibility(&mut self, stmt: NodeId) {
        for &local in self.open_blocks.iter().flatten() {
            if let SymbolKind::Local { visibility, .. } = &mut self.table.symbol_mut(local).kind {
                visibility.insert(stmt);
            }
        }
    }

    fn declare_local(&mut self, func: SymbolId, scope: ScopeId, var: &LocalDecl) {
        self.check_identifier(&var.name, var.span, true);

        let name = var.name.name.as_str();
        let params = self.table.function(func).map(|f| f.params.as_slice()).unwrap_or_default();
        let clashes = params
            .iter()
            .chain(self.open_blocks.iter().flatten())
            .any(|&other| self.table.name_of(other) == name);
        if clashes {
            self.errors.push(duplicate(name, var.span));
        }

        let kind = SymbolKind::Local { ty: None, visibility: HashSet::new() };
        let id = self.table.declare(scope, name, var.span, kind);
        self.table.associate(var.id, id);
        if let Some(info) = self.table.function_mut(func) {
            info.locals.push(id);
        }
        if let Some(block) = self.open_blocks.last_mut() {
            block.push(id);
        }
    }

    // ==================== Identifier rules ====================

    fn check_identifier(&mut self, ident: &Ident, span: Span, check_struct_names: bool) {
        let name = ident.name.as_str();
        if RESERVED_KEYWORDS.contains(&name) {
            self.errors.push(CompileError::declaration(
                format!("'{}' is a reserved keyword and cannot be used as an identifier", name),
                span,
            ));
        } else if check_struct_names && self.struct_names.contains(name) {
            self.errors.push(CompileError::declaration(
                format!("'{}' collides with the struct type of the same name", name),
                span,
            ));
        }
    }

    fn check_unique(&mut self, scope: ScopeId, ident: &Ident, span: Span) {
        if !self.table.find_in(scope, &ident.name).is_empty() {
            self.errors.push(duplicate(&ident.name, span));
        }
    }
}

fn duplicate(name: &str, span: Span) -> CompileError {
    CompileError::declaration(format!("duplicate declaration of '{}'", name), span)
}
