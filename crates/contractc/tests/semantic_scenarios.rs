use contract_compiler::ast::*;
use contract_compiler::sema::SymbolTable;
use contract_compiler::{analyze, AnalysisConfig, DiagnosticReporter, ErrorKind, Phase, Pipeline};
use pretty_assertions::assert_eq;

fn collect_expr_ids(program: &Program) -> Vec<NodeId> {
    let mut ids = Vec::new();
    let Some(contract) = &program.contract else {
        return ids;
    };
    let struct_fields = contract.structs.iter().flat_map(|s| &s.fields);
    for field in contract.fields.iter().chain(struct_fields) {
        if let Some(init) = &field.init {
            expr_ids(init, &mut ids);
        }
    }
    for callable in contract.callables() {
        block_expr_ids(callable.body, &mut ids);
    }
    ids
}

fn block_expr_ids(block: &Block, ids: &mut Vec<NodeId>) {
    for stmt in &block.stmts {
        match &stmt.kind {
            StmtKind::VarDecl { init, .. } => {
                if let Some(init) = init {
                    expr_ids(init, ids);
                }
            }
            StmtKind::Assign { target, value } => {
                designator_expr_ids(target, ids);
                expr_ids(value, ids);
            }
            StmtKind::MultiAssign { targets, value } => {
                for target in targets {
                    designator_expr_ids(target, ids);
                }
                expr_ids(value, ids);
            }
            StmtKind::If { condition, then_block, else_block } => {
                expr_ids(condition, ids);
                block_expr_ids(then_block, ids);
                if let Some(else_block) = else_block {
                    block_expr_ids(else_block, ids);
                }
            }
            StmtKind::Return(values) => {
                for value in values {
                    expr_ids(value, ids);
                }
            }
        }
    }
}

fn expr_ids(expr: &Expr, ids: &mut Vec<NodeId>) {
    ids.push(expr.id);
    match &expr.kind {
        ExprKind::Designator(designator) => designator_expr_ids(designator, ids),
        ExprKind::Call { args, .. } => {
            for arg in args {
                expr_ids(arg, ids);
            }
        }
        ExprKind::Binary { left, right, .. } => {
            expr_ids(left, ids);
            expr_ids(right, ids);
        }
        ExprKind::Unary { operand, .. } => expr_ids(operand, ids),
        ExprKind::IntLiteral(_)
        | ExprKind::BoolLiteral(_)
        | ExprKind::CharLiteral(_)
        | ExprKind::StringLiteral(_) => {}
    }
}

fn designator_expr_ids(designator: &Designator, ids: &mut Vec<NodeId>) {
    match &designator.kind {
        DesignatorKind::Name(_) => {}
        DesignatorKind::Index { base, index } => {
            designator_expr_ids(base, ids);
            expr_ids(index, ids);
        }
        DesignatorKind::Member { base, .. } => designator_expr_ids(base, ids),
    }
}

fn function_named(table: &SymbolTable, name: &str) -> contract_compiler::sema::SymbolId {
    let info = table.contract_info().unwrap();
    *info.functions.iter().find(|&&f| table.name_of(f) == name).unwrap()
}

#[test]
fn well_typed_program_types_every_expression() {
    let b = TreeBuilder::new();

    let ctor_body = vec![
        b.assign(b.name("owner"), b.read("initial_owner")),
        b.assign(b.name("open"), b.read("true")),
    ];
    let deposit_body = vec![
        b.if_stmt(
            b.binary(
                BinaryOp::And,
                b.read("open"),
                b.binary(BinaryOp::Gt, b.read("amount"), b.int(0)),
            ),
            vec![
                b.var(b.ty("int"), "fee", Some(b.binary(BinaryOp::Div, b.read("amount"), b.int(100)))),
                b.assign(
                    b.name("total"),
                    b.binary(
                        BinaryOp::Add,
                        b.read("total"),
                        b.binary(BinaryOp::Sub, b.read("amount"), b.read("fee")),
                    ),
                ),
            ],
            Some(vec![b.ret(vec![b.boolean(false), b.int(0)])]),
        ),
        b.ret(vec![b.unary(UnaryOp::Not, b.boolean(false)), b.read("total")]),
    ];
    let audit_body = vec![
        b.vars(
            vec![b.local(b.ty("bool"), "ok"), b.local(b.ty("int"), "balance")],
            b.call("deposit", vec![b.unary(UnaryOp::Neg, b.int(5))]),
        ),
        b.multi_assign(
            vec![b.name("ok"), b.name("balance")],
            b.call("deposit", vec![b.binary(BinaryOp::Pow, b.int(2), b.int(3))]),
        ),
        b.if_stmt(
            b.binary(BinaryOp::Ne, b.read("grade"), b.chr('F')),
            vec![b.assign(b.name("balance"), b.int(0))],
            None,
        ),
        b.ret(vec![b.binary(BinaryOp::Eq, b.read("owner"), b.string("bank"))]),
    ];

    let contract = b
        .contract("Bank")
        .with_field(b.field(b.ty("int"), "total", Some(b.int(0))))
        .with_field(b.field(b.ty("string"), "owner", None))
        .with_field(b.field(b.ty("bool"), "open", Some(b.read("false"))))
        .with_constructor(b.constructor(vec![b.param(b.ty("string"), "initial_owner")], ctor_body))
        .with_function(b.function(
            "deposit",
            vec![b.ty("bool"), b.ty("int")],
            vec![b.param(b.ty("int"), "amount")],
            deposit_body,
        ))
        .with_function(b.function("reset", vec![b.void()], vec![], vec![b.assign(b.name("total"), b.int(0))]))
        .with_function(b.function(
            "audit",
            vec![b.ty("bool")],
            vec![b.param(b.ty("char"), "grade")],
            audit_body,
        ));
    let program = b.program(Some(contract));

    let analysis = analyze(&program);
    assert_eq!(analysis.diagnostics, vec![]);
    assert!(analysis.is_complete());

    let types = analysis.table.expression_types();
    let ids = collect_expr_ids(&program);
    assert!(ids.len() > 30);
    for id in ids {
        assert!(types.contains_key(&id), "expression {:?} has no type", id);
    }
}

fn literal(b: &TreeBuilder, ty: &str) -> Expr {
    match ty {
        "int" => b.int(7),
        "bool" => b.boolean(false),
        "char" => b.chr('z'),
        _ => b.string("text"),
    }
}

#[test]
fn literal_declarations_match_only_their_own_type() {
    let types = ["int", "bool", "char", "string"];
    for declared in types {
        for given in types {
            let b = TreeBuilder::new();
            let field = b.field(b.ty(declared), "f", Some(literal(&b, given)));
            let body = vec![b.var(b.ty(declared), "v", Some(literal(&b, given)))];
            let contract = b
                .contract("C")
                .with_field(field)
                .with_function(b.function("run", vec![], vec![], body));

            let analysis = analyze(&b.program(Some(contract)));
            let expected = if declared == given { 0 } else { 2 };
            assert_eq!(analysis.diagnostics.len(), expected, "{} = <{} literal>", declared, given);
            assert!(analysis.diagnostics.iter().all(|d| d.kind() == ErrorKind::Type));
        }
    }
}

#[test]
fn triple_return_exact() {
    let b = TreeBuilder::new();
    let values = vec![b.int(1), b.chr('c'), b.boolean(true)];
    let value_ids: Vec<NodeId> = values.iter().map(|v| v.id).collect();
    let returns = vec![b.ty("int"), b.ty("char"), b.ty("bool")];
    let contract = b
        .contract("C")
        .with_function(b.function("test", returns, vec![], vec![b.ret(values)]));

    let analysis = analyze(&b.program(Some(contract)));
    assert_eq!(analysis.diagnostics, vec![]);

    let table = &analysis.table;
    let expected = vec![table.int_type(), table.char_type(), table.bool_type()];
    let typed: Vec<_> = value_ids.iter().map(|&id| table.type_of(id).unwrap()).collect();
    assert_eq!(typed, expected);

    let test = function_named(table, "test");
    assert_eq!(table.function(test).unwrap().returns, expected);
}

#[test]
fn triple_return_short_and_permuted() {
    let returns = |b: &TreeBuilder| vec![b.ty("int"), b.ty("char"), b.ty("bool")];

    let b = TreeBuilder::new();
    let short = b.ret(vec![b.int(1), b.chr('c')]);
    let contract = b.contract("C").with_function(b.function("test", returns(&b), vec![], vec![short]));
    let analysis = analyze(&b.program(Some(contract)));
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(analysis.diagnostics[0].message().contains("expected 3, given 2"));

    let b = TreeBuilder::new();
    let permuted = b.ret(vec![b.chr('c'), b.boolean(true), b.int(1)]);
    let contract = b.contract("C").with_function(b.function("test", returns(&b), vec![], vec![permuted]));
    let analysis = analyze(&b.program(Some(contract)));
    assert_eq!(analysis.diagnostics.len(), 3);
    assert_eq!(analysis.failed_phase, Some(Phase::TypeChecking));
}

#[test]
fn then_block_local_stays_inside_its_block() {
    let b = TreeBuilder::new();
    let body = vec![b.if_stmt(
        b.boolean(true),
        vec![
            b.var(b.ty("int"), "inner", Some(b.int(1))),
            b.assign(b.name("inner"), b.int(2)),
        ],
        Some(vec![b.assign(b.name("inner"), b.int(3))]),
    )];
    let contract = b.contract("C").with_function(b.function("run", vec![], vec![], body));
    let analysis = analyze(&b.program(Some(contract)));
    assert_eq!(analysis.diagnostics.len(), 1);
    assert_eq!(analysis.diagnostics[0].kind(), ErrorKind::Designator);
    assert!(analysis.diagnostics[0].message().contains("not visible"));

    let b = TreeBuilder::new();
    let body = vec![
        b.if_stmt(b.boolean(true), vec![b.var(b.ty("int"), "inner", None)], None),
        b.ret(vec![b.read("inner")]),
    ];
    let contract = b.contract("C").with_function(b.function("run", vec![b.ty("int")], vec![], body));
    let analysis = analyze(&b.program(Some(contract)));
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(analysis.diagnostics[0].message().contains("not visible"));
}

#[test]
fn duplicate_locals_by_block() {
    let b = TreeBuilder::new();
    let body = vec![b.if_stmt(
        b.boolean(true),
        vec![b.var(b.ty("int"), "tmp", None)],
        Some(vec![b.var(b.ty("int"), "tmp", None)]),
    )];
    let contract = b.contract("C").with_function(b.function("run", vec![], vec![], body));
    assert!(analyze(&b.program(Some(contract))).is_complete());

    let b = TreeBuilder::new();
    let body = vec![b.var(b.ty("int"), "amount", None)];
    let params = vec![b.param(b.ty("int"), "amount")];
    let contract = b.contract("C").with_function(b.function("run", vec![], params, body));
    let analysis = analyze(&b.program(Some(contract)));
    assert_eq!(analysis.failed_phase, Some(Phase::SymbolConstruction));
    assert_eq!(analysis.diagnostics.len(), 1);
    assert_eq!(analysis.diagnostics[0].kind(), ErrorKind::Declaration);
}

#[test]
fn duplicate_local_in_one_body() {
    let b = TreeBuilder::new();
    let second = b.var(b.ty("int"), "x", None);
    let StmtKind::VarDecl { vars, .. } = &second.kind else {
        unreachable!()
    };
    let second_span = vars[0].span;
    let body = vec![b.var(b.ty("int"), "x", None), second];
    let contract = b.contract("C").with_function(b.function("run", vec![], vec![], body));

    let analysis = analyze(&b.program(Some(contract)));
    assert_eq!(analysis.diagnostics.len(), 1);
    assert!(analysis.diagnostics[0].message().contains("duplicate"));
    assert_eq!(analysis.diagnostics[0].span(), second_span);
}

#[test]
fn structural_array_types_are_identical() {
    let b = TreeBuilder::new();
    let contract = b
        .contract("C")
        .with_field(b.field(b.array_of(b.ty("int")), "a", None))
        .with_field(b.field(b.array_of(b.ty("int")), "b", None))
        .with_field(b.field(b.ty("int"), "c", None));
    let config = AnalysisConfig::new().with_stop_after(Phase::TypeResolution);
    let analysis = Pipeline::with_config(config).run(&b.program(Some(contract)));
    assert!(analysis.is_ok());

    let table = &analysis.table;
    let fields = &table.contract_info().unwrap().fields;
    let (a, bb, c) = (
        table.value_type(fields[0]).unwrap(),
        table.value_type(fields[1]).unwrap(),
        table.value_type(fields[2]).unwrap(),
    );
    assert_eq!(a, bb);
    assert_ne!(a, c);
    assert_eq!(table.element_type(a), Some(c));
}

#[test]
fn bool_field_initialized_with_int() {
    let b = TreeBuilder::new();
    let contract = b.contract("C").with_field(b.field(b.ty("bool"), "b", Some(b.int(2))));
    let analysis = analyze(&b.program(Some(contract)));

    assert_eq!(analysis.diagnostics.len(), 1);
    let message = analysis.diagnostics[0].message();
    assert!(message.contains("type mismatch"));
    assert!(message.contains("bool"));
    assert!(message.contains("int"));
}

#[test]
fn missing_contract_stops_everything() {
    let b = TreeBuilder::new();
    let failure = analyze(&b.program(None)).into_result().unwrap_err();

    assert_eq!(failure.phase, Phase::SymbolConstruction);
    assert_eq!(failure.errors.len(), 1);
    assert_eq!(failure.errors[0].kind(), ErrorKind::Structure);
}

#[test]
fn diagnostics_render_against_source() {
    let source = "contract C {\n    bool b = 2;\n}\n";
    let span = contract_compiler::Span::new(26, 27);

    let b = TreeBuilder::new();
    let init = Expr::new(b.next_id(), ExprKind::IntLiteral(2), span);
    let contract = b.contract("C").with_field(b.field(b.ty("bool"), "b", Some(init)));
    let analysis = analyze(&b.program(Some(contract)));

    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file("bank.contract", source);
    let rendered = reporter.render(file_id, &analysis.diagnostics);

    assert!(rendered.contains("error: Type error"));
    assert!(rendered.contains("bank.contract:2:14"));
}
