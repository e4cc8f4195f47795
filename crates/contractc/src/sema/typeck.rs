//! Type checking: compatibility rules and expression typing
//!
//! Types are compared by identity. Built-ins are unique per table and array
//! and map types are interned, so symbol equality is type equality.

use tracing::{debug, instrument};

use super::scope::SymbolId;
use super::table::SymbolTable;
use crate::ast::*;
use crate::common::{CompileError, Span};

/// Fourth analysis phase
///
/// Every expression that can be typed gets an entry in the expression→type
/// map. An expression whose operand type is unknown does not produce further
/// errors, so one mistake is reported once.
pub struct TypeChecker<'t> {
    table: &'t mut SymbolTable,
    errors: Vec<CompileError>,
    current_function: Option<SymbolId>,
}

impl<'t> TypeChecker<'t> {
    pub fn new(table: &'t mut SymbolTable) -> Self {
        Self {
            table,
            errors: Vec::new(),
            current_function: None,
        }
    }

    #[instrument(skip_all)]
    pub fn check(mut self, program: &Program) -> Vec<CompileError> {
        let Some(contract) = &program.contract else {
            return self.errors;
        };

        let struct_fields = contract.structs.iter().flat_map(|s| &s.fields);
        for field in contract.fields.iter().chain(struct_fields) {
            if let Some(init) = &field.init {
                self.check_initializer(field.id, &field.name.name, init);
            }
        }

        for callable in contract.callables() {
            self.current_function = self.table.symbol_of(callable.id);
            self.check_block(callable.body);
        }
        self.current_function = None;

        debug!(
            typed = self.table.expression_types().len(),
            errors = self.errors.len(),
            "type checking finished"
        );
        self.errors
    }

    // ==================== Statements ====================

    fn check_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.check_stmt(stmt);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::VarDecl { vars, init } => match (vars.as_slice(), init) {
                (_, None) => {}
                ([var], Some(init)) => self.check_initializer(var.id, &var.name.name, init),
                (vars, Some(init)) => {
                    let targets = vars
                        .iter()
                        .map(|v| self.table.symbol_of(v.id).and_then(|s| self.table.value_type(s)))
                        .collect();
                    self.check_multi_target(targets, init, stmt.span);
                }
            },
            StmtKind::Assign { target, value } => {
                let target_ty = self.check_designator(target);
                let value_ty = self.check_expr(value);
                if let (Some(expected), Some(found)) = (target_ty, value_ty) {
                    if expected != found {
                        self.errors.push(CompileError::type_error(
                            format!(
                                "cannot assign {} to '{}' of type {}",
                                self.table.type_name(found),
                                target.describe(),
                                self.table.type_name(expected)
                            ),
                            value.span,
                        ));
                    }
                }
            }
            StmtKind::MultiAssign { targets, value } => {
                let targets = targets.iter().map(|t| self.check_designator(t)).collect();
                self.check_multi_target(targets, value, stmt.span);
            }
            StmtKind::If { condition, then_block, else_block } => {
                if let Some(found) = self.check_expr(condition) {
                    if found != self.table.bool_type() {
                        self.errors.push(CompileError::type_error(
                            format!("if condition must be bool, found {}", self.table.type_name(found)),
                            condition.span,
                        ));
                    }
                }
                self.check_block(then_block);
                if let Some(else_block) = else_block {
                    self.check_block(else_block);
                }
            }
            StmtKind::Return(values) => self.check_return(values, stmt.span),
        }
    }

    fn check_initializer(&mut self, node: NodeId, name: &str, init: &Expr) {
        let declared = self.table.symbol_of(node).and_then(|s| self.table.value_type(s));
        let found = self.check_expr(init);
        if let (Some(declared), Some(found)) = (declared, found) {
            if declared != found {
                self.errors.push(CompileError::type_error(
                    format!(
                        "type mismatch: '{}' is declared as {} but initialized with {}",
                        name,
                        self.table.type_name(declared),
                        self.table.type_name(found)
                    ),
                    init.span,
                ));
            }
        }
    }

    /// Check a call that feeds several targets at once
    fn check_multi_target(&mut self, targets: Vec<Option<SymbolId>>, source: &Expr, span: Span) {
        let ExprKind::Call { callee, .. } = &source.kind else {
            self.check_expr(source);
            self.errors.push(CompileError::type_error(
                format!("{} targets need a function call as their source", targets.len()),
                source.span,
            ));
            return;
        };

        self.check_expr(source);
        let Some(returns) = self.callee_returns(callee) else {
            return;
        };

        if returns.len() != targets.len() {
            self.errors.push(CompileError::type_error(
                format!(
                    "expected {} values, but '{}' returns {}",
                    targets.len(),
                    callee.describe(),
                    returns.len()
                ),
                span,
            ));
            return;
        }

        for (position, (target, found)) in targets.into_iter().zip(returns).enumerate() {
            if let Some(expected) = target {
                if expected != found {
                    self.errors.push(CompileError::type_error(
                        format!(
                            "value {}: expected {}, found {}",
                            position + 1,
                            self.table.type_name(expected),
                            self.table.type_name(found)
                        ),
                        span,
                    ));
                }
            }
        }
    }

    fn check_return(&mut self, values: &[Expr], span: Span) {
        let found: Vec<Option<SymbolId>> = values.iter().map(|v| self.check_expr(v)).collect();
        let Some(expected) = self.current_function.and_then(|f| self.table.function(f)).map(|f| f.returns.clone())
        else {
            return;
        };

        if expected.is_empty() {
            if !values.is_empty() {
                self.errors.push(CompileError::type_error("void function cannot return a value", span));
            }
            return;
        }

        // Arity mismatch alone; positions are only compared when counts agree.
        if values.len() != expected.len() {
            self.errors.push(CompileError::type_error(
                format!(
                    "wrong number of return values: expected {}, given {}",
                    expected.len(),
                    values.len()
                ),
                span,
            ));
            return;
        }

        for (position, (expected, found)) in expected.into_iter().zip(found).enumerate() {
            let Some(found) = found else { continue };
            if expected != found {
                self.errors.push(CompileError::type_error(
                    format!(
                        "return value {}: expected {}, found {}",
                        position + 1,
                        self.table.type_name(expected),
                        self.table.type_name(found)
                    ),
                    values[position].span,
                ));
            }
        }
    }

    // ==================== Expressions ====================

    fn check_expr(&mut self, expr: &Expr) -> Option<SymbolId> {
        let ty = match &expr.kind {
            ExprKind::IntLiteral(_) => Some(self.table.int_type()),
            ExprKind::BoolLiteral(_) => Some(self.table.bool_type()),
            ExprKind::CharLiteral(_) => Some(self.table.char_type()),
            ExprKind::StringLiteral(_) => Some(self.table.string_type()),
            ExprKind::Designator(designator) => self.check_designator(designator),
            ExprKind::Call { callee, args } => self.check_call(callee, args, expr.span),
            ExprKind::Binary { op, left, right } => {
                let left = self.check_expr(left);
                let right = self.check_expr(right);
                Some(self.check_binary(*op, left, right, expr.span))
            }
            ExprKind::Unary { op, operand } => {
                let found = self.check_expr(operand);
                Some(self.check_unary(*op, found, expr.span))
            }
        };

        if let Some(ty) = ty {
            self.table.annotate_type(expr.id, ty);
        }
        ty
    }

    /// Type index expressions nested in a designator and return its type
    fn check_designator(&mut self, designator: &Designator) -> Option<SymbolId> {
        match &designator.kind {
            DesignatorKind::Name(_) => {}
            DesignatorKind::Index { base, index } => {
                self.check_designator(base);
                self.check_expr(index);
            }
            DesignatorKind::Member { base, .. } => {
                self.check_designator(base);
            }
        }
        self.table.type_of(designator.id)
    }

    fn check_call(&mut self, callee: &Designator, args: &[Expr], span: Span) -> Option<SymbolId> {
        let found: Vec<Option<SymbolId>> = args.iter().map(|a| self.check_expr(a)).collect();
        if !matches!(callee.kind, DesignatorKind::Name(_)) {
            self.check_designator(callee);
        }

        let symbol = self.table.declaration_of(callee.id)?;
        let Some(info) = self.table.function(symbol) else {
            self.errors.push(CompileError::type_error(
                format!("'{}' is not a function", callee.describe()),
                callee.span,
            ));
            return None;
        };
        let (params, returns) = (info.params.clone(), info.returns.clone());

        if !returns.is_empty() {
            self.check_arguments(callee, &params, &found, args, span);
        }
        Some(returns.first().copied().unwrap_or_else(|| self.table.void_type()))
    }

    fn check_arguments(
        &mut self,
        callee: &Designator,
        params: &[SymbolId],
        found: &[Option<SymbolId>],
        args: &[Expr],
        span: Span,
    ) {
        if params.len() != found.len() {
            self.errors.push(CompileError::type_error(
                format!(
                    "function '{}' expects {} arguments, given {}",
                    callee.describe(),
                    params.len(),
                    found.len()
                ),
                span,
            ));
            return;
        }

        for (position, (&param, &found)) in params.iter().zip(found).enumerate() {
            let (Some(expected), Some(found)) = (self.table.value_type(param), found) else {
                continue;
            };
            if expected != found {
                self.errors.push(CompileError::type_error(
                    format!(
                        "argument {} of '{}': expected {}, found {}",
                        position + 1,
                        callee.describe(),
                        self.table.type_name(expected),
                        self.table.type_name(found)
                    ),
                    args[position].span,
                ));
            }
        }
    }

    fn check_binary(&mut self, op: BinaryOp, left: Option<SymbolId>, right: Option<SymbolId>, span: Span) -> SymbolId {
        let (int_ty, char_ty, bool_ty) = (self.table.int_type(), self.table.char_type(), self.table.bool_type());
        let result = if op.is_arithmetic() { int_ty } else { bool_ty };
        let (Some(left), Some(right)) = (left, right) else {
            return result;
        };

        let (accepted, expectation) = if op.is_arithmetic() {
            (left == int_ty && right == int_ty, "int operands")
        } else if op.is_logical() {
            (left == bool_ty && right == bool_ty, "bool operands")
        } else if op.is_relational() {
            (
                left == right && (left == int_ty || left == char_ty),
                "two int or two char operands",
            )
        } else {
            (left == right, "operands of the same type")
        };

        if !accepted {
            self.errors.push(CompileError::type_error(
                format!(
                    "operator '{}' requires {}, found {} and {}",
                    op.as_str(),
                    expectation,
                    self.table.type_name(left),
                    self.table.type_name(right)
                ),
                span,
            ));
        }
        result
    }

    fn check_unary(&mut self, op: UnaryOp, operand: Option<SymbolId>, span: Span) -> SymbolId {
        let expected = match op {
            UnaryOp::Plus | UnaryOp::Neg => self.table.int_type(),
            UnaryOp::Not => self.table.bool_type(),
        };
        if let Some(found) = operand {
            if found != expected {
                self.errors.push(CompileError::type_error(
                    format!(
                        "operator '{}' requires a {} operand, found {}",
                        op.as_str(),
                        self.table.type_name(expected),
                        self.table.type_name(found)
                    ),
                    span,
                ));
            }
        }
        expected
    }

    fn callee_returns(&self, callee: &Designator) -> Option<Vec<SymbolId>> {
        let symbol = self.table.declaration_of(callee.id)?;
        self.table.function(symbol).map(|f| f.returns.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ErrorKind;
    use crate::sema::{DesignatorResolver, SymbolCollector, TypeResolver};
    use pretty_assertions::assert_eq;

    fn check(program: &Program) -> (SymbolTable, Vec<CompileError>) {
        let mut table = SymbolTable::new();
        assert_eq!(SymbolCollector::new(&mut table).collect(program), vec![]);
        assert_eq!(TypeResolver::new(&mut table).resolve(program), vec![]);
        assert_eq!(DesignatorResolver::new(&mut table).resolve(program), vec![]);
        let errors = TypeChecker::new(&mut table).check(program);
        (table, errors)
    }

    fn single_function(b: &TreeBuilder, returns: Vec<TypeName>, body: Vec<Stmt>) -> Program {
        let contract = b.contract("C").with_function(b.function("f", returns, vec![], body));
        b.program(Some(contract))
    }

    #[test]
    fn test_literal_initializer_matrix() {
        let types = ["int", "bool", "char", "string"];
        for (declared_index, declared) in types.iter().enumerate() {
            for literal_index in 0..types.len() {
                let b = TreeBuilder::new();
                let literal = match literal_index {
                    0 => b.int(1),
                    1 => b.boolean(true),
                    2 => b.chr('a'),
                    _ => b.string("s"),
                };
                let body = vec![b.var(b.ty(declared), "v", Some(literal))];
                let (_, errors) = check(&single_function(&b, vec![], body));

                let expected = usize::from(declared_index != literal_index);
                assert_eq!(errors.len(), expected, "{} initialized with literal #{}", declared, literal_index);
            }
        }
    }

    #[test]
    fn test_return_lists() {
        let returns = |b: &TreeBuilder| vec![b.ty("int"), b.ty("char"), b.ty("bool")];

        let b = TreeBuilder::new();
        let exact = vec![b.ret(vec![b.int(1), b.chr('c'), b.boolean(true)])];
        let (_, errors) = check(&single_function(&b, returns(&b), exact));
        assert_eq!(errors, vec![]);

        let b = TreeBuilder::new();
        let short = vec![b.ret(vec![b.int(1), b.chr('c')])];
        let (_, errors) = check(&single_function(&b, returns(&b), short));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "wrong number of return values: expected 3, given 2");

        let b = TreeBuilder::new();
        let permuted = vec![b.ret(vec![b.chr('c'), b.boolean(true), b.int(1)])];
        let (_, errors) = check(&single_function(&b, returns(&b), permuted));
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].message(), "return value 1: expected int, found char");
        assert_eq!(errors[1].message(), "return value 2: expected char, found bool");
        assert_eq!(errors[2].message(), "return value 3: expected bool, found int");
    }

    #[test]
    fn test_void_function_returning_value() {
        let b = TreeBuilder::new();
        let body = vec![b.ret(vec![]), b.ret(vec![b.int(1)])];
        let (_, errors) = check(&single_function(&b, vec![], body));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "void function cannot return a value");
    }

    #[test]
    fn test_operators() {
        let b = TreeBuilder::new();
        let sum = b.binary(BinaryOp::Add, b.int(1), b.int(2));
        let compare = b.binary(BinaryOp::Lt, b.chr('a'), b.chr('b'));
        let negate = b.unary(UnaryOp::Not, b.boolean(false));
        let (sum_id, compare_id, negate_id) = (sum.id, compare.id, negate.id);
        let body = vec![
            b.var(b.ty("int"), "a", Some(sum)),
            b.var(b.ty("bool"), "b", Some(compare)),
            b.var(b.ty("bool"), "c", Some(negate)),
        ];
        let (table, errors) = check(&single_function(&b, vec![], body));

        assert_eq!(errors, vec![]);
        assert_eq!(table.type_of(sum_id), Some(table.int_type()));
        assert_eq!(table.type_of(compare_id), Some(table.bool_type()));
        assert_eq!(table.type_of(negate_id), Some(table.bool_type()));
    }

    #[test]
    fn test_operator_misuse() {
        let b = TreeBuilder::new();
        let bad_sum = b.binary(BinaryOp::Add, b.int(1), b.boolean(true));
        let bad_sum_id = bad_sum.id;
        let body = vec![
            b.var(b.ty("int"), "a", Some(bad_sum)),
            b.var(b.ty("bool"), "b", Some(b.binary(BinaryOp::Lt, b.boolean(true), b.boolean(false)))),
            b.var(b.ty("bool"), "c", Some(b.binary(BinaryOp::Eq, b.int(1), b.chr('x')))),
            b.var(b.ty("bool"), "d", Some(b.binary(BinaryOp::And, b.int(1), b.boolean(true)))),
            b.var(b.ty("int"), "e", Some(b.unary(UnaryOp::Neg, b.string("s")))),
        ];
        let (table, errors) = check(&single_function(&b, vec![], body));

        assert_eq!(errors.len(), 5);
        assert!(errors.iter().all(|e| e.kind() == ErrorKind::Type));
        assert_eq!(errors[0].message(), "operator '+' requires int operands, found int and bool");
        assert_eq!(table.type_of(bad_sum_id), Some(table.int_type()));
    }

    #[test]
    fn test_if_condition_must_be_bool() {
        let b = TreeBuilder::new();
        let body = vec![b.if_stmt(b.int(1), vec![], None)];
        let (_, errors) = check(&single_function(&b, vec![], body));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "if condition must be bool, found int");
    }

    #[test]
    fn test_calls() {
        let b = TreeBuilder::new();
        let good = b.call("g", vec![b.int(1), b.boolean(true)]);
        let notify = b.call("notify", vec![b.string("ignored")]);
        let (good_id, notify_id) = (good.id, notify.id);
        let body = vec![
            b.var(b.ty("char"), "c", Some(good)),
            b.var(b.ty("char"), "d", Some(b.call("g", vec![b.int(1)]))),
            b.var(b.ty("char"), "e", Some(b.call("g", vec![b.boolean(true), b.int(1)]))),
            b.assign(b.name("total"), b.load(b.name("total"))),
            b.if_stmt(b.boolean(true), vec![b.var(b.ty("int"), "x", Some(notify))], None),
        ];
        let params = vec![b.param(b.ty("int"), "n"), b.param(b.ty("bool"), "flag")];
        let contract = b
            .contract("C")
            .with_field(b.field(b.ty("int"), "total", None))
            .with_function(b.function("g", vec![b.ty("char")], params, vec![]))
            .with_function(b.function("notify", vec![], vec![], vec![]))
            .with_function(b.function("f", vec![], vec![], body));
        let (table, errors) = check(&b.program(Some(contract)));

        assert_eq!(errors.len(), 4);
        assert_eq!(errors[0].message(), "function 'g' expects 2 arguments, given 1");
        assert_eq!(errors[1].message(), "argument 1 of 'g': expected int, found bool");
        assert_eq!(errors[2].message(), "argument 2 of 'g': expected bool, found int");
        assert_eq!(errors[3].message(), "type mismatch: 'x' is declared as int but initialized with void");
        assert_eq!(table.type_of(good_id), Some(table.char_type()));
        assert_eq!(table.type_of(notify_id), Some(table.void_type()));
    }

    #[test]
    fn test_calling_a_value_is_rejected() {
        let b = TreeBuilder::new();
        let contract = b
            .contract("C")
            .with_field(b.field(b.ty("int"), "total", None))
            .with_function(b.function("f", vec![], vec![], vec![b.ret(vec![])]))
            .with_function(b.function(
                "h",
                vec![b.ty("int")],
                vec![],
                vec![b.ret(vec![b.call("total", vec![])])],
            ));
        let (_, errors) = check(&b.program(Some(contract)));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message(), "'total' is not a function");
    }

    #[test]
    fn test_multi_value_targets() {
        let b = TreeBuilder::new();
        let body = vec![
            b.vars(vec![b.local(b.ty("int"), "a"), b.local(b.ty("bool"), "ok")], b.call("pair", vec![])),
            b.multi_assign(vec![b.name("ok"), b.name("a")], b.call("pair", vec![])),
            b.vars(vec![b.local(b.ty("int"), "x"), b.local(b.ty("int"), "y")], b.call("single", vec![])),
        ];
        let contract = b
            .contract("C")
            .with_function(b.function("pair", vec![b.ty("int"), b.ty("bool")], vec![], vec![]))
            .with_function(b.function("single", vec![b.ty("int")], vec![], vec![]))
            .with_function(b.function("f", vec![], vec![], body));
        let (_, errors) = check(&b.program(Some(contract)));

        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0].message(), "value 1: expected bool, found int");
        assert_eq!(errors[1].message(), "value 2: expected int, found bool");
        assert_eq!(errors[2].message(), "expected 2 values, but 'single' returns 1");
    }

    #[test]
    fn test_multi_assign_from_literal() {
        let b = TreeBuilder::new();
        let body = vec![
            b.var(b.ty("int"), "a", None),
            b.var(b.ty("int"), "c", None),
            b.multi_assign(vec![b.name("a"), b.name("c")], b.int(1)),
        ];
        let (_, errors) = check(&single_function(&b, vec![], body));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind(), ErrorKind::Type);
        assert_eq!(errors[0].message(), "2 targets need a function call as their source");
    }

    #[test]
    fn test_structural_array_types_are_compatible() {
        let b = TreeBuilder::new();
        let body = vec![
            b.var(b.array_of(b.ty("int")), "local", None),
            b.assign(b.name("local"), b.read("xs")),
            b.assign(b.index(b.name("local"), b.int(0)), b.load(b.member(b.name("xs"), "length"))),
        ];
        let contract = b
            .contract("C")
            .with_field(b.field(b.array_of(b.ty("int")), "xs", None))
            .with_function(b.function("f", vec![], vec![], body));
        let (_, errors) = check(&b.program(Some(contract)));

        assert_eq!(errors, vec![]);
    }

    #[test]
    fn test_struct_field_initializer_checked() {
        let b = TreeBuilder::new();
        let contract = b
            .contract("C")
            .with_struct(b.struct_decl("S", vec![b.field(b.ty("bool"), "flag", Some(b.int(0)))]));
        let (_, errors) = check(&b.program(Some(contract)));

        assert_eq!(errors.len(), 1);
        assert!(errors[0].message().contains("'flag' is declared as bool"));
    }
}
