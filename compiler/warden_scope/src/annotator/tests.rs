#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::test_helpers::*;
use crate::annotate_in_place;
use pretty_assertions::assert_eq;
use serde_json::json;

// Hoisting

#[test]
fn test_var_in_nested_blocks_is_hoisted_to_function() {
    let doc = program(vec![function(
        "f",
        &[],
        vec![block(vec![block(vec![declare("var", "a", Some(number(1)))])])],
    )]);
    let (tree, table) = analyze(&doc);
    let scope = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    let declarator = nodes_of(&tree, &NodeKind::VariableDeclarator)[0];
    assert_eq!(scope.vars().get("a"), Some(&declarator));
    assert!(table
        .function_scope(tree.root())
        .unwrap()
        .vars()
        .get("a")
        .is_none());
}

#[test]
fn test_function_declarations_hoist_into_vars_and_funcs() {
    let doc = program(vec![
        expr(call(ident("g"), vec![])),
        function("g", &[], vec![]),
    ]);
    let (tree, table) = analyze(&doc);
    let g = nodes_of(&tree, &NodeKind::FunctionDeclaration)[0];
    let root = table.function_scope(tree.root()).unwrap();
    assert_eq!(root.vars().get("g"), Some(&g));
    assert_eq!(root.funcs().get("g"), Some(&g));
    assert!(root.freevars().is_empty());
}

#[test]
fn test_params_bind_to_function_node() {
    let doc = program(vec![function(
        "f",
        &["a", "b"],
        vec![ret(binary("+", ident("a"), ident("b")))],
    )]);
    let (tree, table) = analyze(&doc);
    let f = nodes_of(&tree, &NodeKind::FunctionDeclaration)[0];
    let scope = table.function_scope(f).unwrap();
    assert_eq!(scope.vars().get("a"), Some(&f));
    assert_eq!(scope.vars().get("b"), Some(&f));
    assert!(scope.upvars().is_empty());
    assert!(scope.freevars().is_empty());
}

#[test]
fn test_nested_function_body_is_not_hoisted_into_parent() {
    let doc = program(vec![function(
        "outer",
        &[],
        vec![function("inner", &[], vec![declare("var", "hidden", None)])],
    )]);
    let (tree, table) = analyze(&doc);
    let outer = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    let inner = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 1);
    assert_eq!(sorted(outer.vars().keys()), vec!["inner"]);
    assert_eq!(sorted(inner.vars().keys()), vec!["hidden"]);
}

// Closure classification

#[test]
fn test_upvar_from_non_nearest_enclosing_function() {
    let doc = program(vec![function(
        "outer",
        &[],
        vec![
            declare("var", "x", Some(number(1))),
            function(
                "mid",
                &[],
                vec![function("inner", &[], vec![ret(ident("x"))])],
            ),
        ],
    )]);
    let (tree, table) = analyze(&doc);
    let outer = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    let mid = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 1);
    let inner = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 2);
    assert_eq!(sorted(inner.upvars()), vec!["x"]);
    assert_eq!(sorted(mid.upvars()), vec!["x"]);
    assert!(outer.upvars().is_empty());
    assert!(inner.freevars().is_empty());
}

#[test]
fn test_unresolved_names_are_freevars_all_the_way_up() {
    let doc = program(vec![function("f", &[], vec![ret(ident("console"))])]);
    let (tree, table) = analyze(&doc);
    let f = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    assert_eq!(sorted(f.freevars()), vec!["console"]);
    assert!(f.upvars().is_empty());
    let root = table.function_scope(tree.root()).unwrap();
    assert_eq!(sorted(root.freevars()), vec!["console"]);
}

#[test]
fn test_upvar_and_freevar_are_disjoint() {
    let doc = program(vec![
        declare("var", "shared", None),
        function(
            "f",
            &["own"],
            vec![ret(binary(
                "+",
                binary("+", ident("own"), ident("shared")),
                ident("missing"),
            ))],
        ),
    ]);
    let (tree, table) = analyze(&doc);
    let f = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    assert_eq!(sorted(f.upvars()), vec!["shared"]);
    assert_eq!(sorted(f.freevars()), vec!["missing"]);
}

#[test]
fn test_member_property_name_is_not_a_reference() {
    let doc = program(vec![function(
        "f",
        &[],
        vec![
            ret(member(ident("o"), ident("p"), false)),
            expr(member(ident("q"), ident("k"), true)),
        ],
    )]);
    let (tree, table) = analyze(&doc);
    let f = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    assert_eq!(sorted(f.freevars()), vec!["k", "o", "q"]);
}

#[test]
fn test_arguments_is_implicit_except_in_arrows() {
    let doc = program(vec![function(
        "f",
        &[],
        vec![
            expr(ident("arguments")),
            ret(arrow(&[], ident("arguments"))),
        ],
    )]);
    let (tree, table) = analyze(&doc);
    let f = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    let arrow = scope_of(&tree, &table, &NodeKind::ArrowFunctionExpression, 0);
    assert!(f.freevars().is_empty());
    assert_eq!(sorted(arrow.upvars()), vec!["arguments"]);
}

#[test]
fn test_named_function_expression_binds_its_own_name() {
    let doc = program(vec![declare(
        "var",
        "g",
        Some(function_expr(
            Some("fact"),
            &["n"],
            vec![ret(call(ident("fact"), vec![ident("n")]))],
        )),
    )]);
    let (tree, table) = analyze(&doc);
    let fact = scope_of(&tree, &table, &NodeKind::FunctionExpression, 0);
    assert!(fact.freevars().is_empty());
    assert!(fact.upvars().is_empty());
    let root = table.function_scope(tree.root()).unwrap();
    assert!(root.vars().get("fact").is_none());
}

#[test]
fn test_lexical_bindings_are_tracked_by_default() {
    let doc = program(vec![function(
        "f",
        &[],
        vec![
            declare("let", "y", Some(number(1))),
            ret(function_expr(None, &[], vec![ret(ident("y"))])),
        ],
    )]);
    let (tree, table) = analyze(&doc);
    let f = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    let inner = scope_of(&tree, &table, &NodeKind::FunctionExpression, 0);
    assert_eq!(sorted(f.lexicals().keys()), vec!["y"]);
    assert!(f.vars().get("y").is_none());
    assert_eq!(sorted(inner.upvars()), vec!["y"]);
}

#[test]
fn test_lexical_tracking_can_be_disabled() {
    let doc = program(vec![function(
        "f",
        &[],
        vec![
            declare("const", "y", Some(number(1))),
            ret(function_expr(None, &[], vec![ret(ident("y"))])),
        ],
    )]);
    let tree = SyntaxTree::from_json(&doc).unwrap();
    let table = Annotator::new().track_lexical_bindings(false).annotate(&tree);
    let f = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    let inner = scope_of(&tree, &table, &NodeKind::FunctionExpression, 0);
    assert!(f.lexicals().is_empty());
    assert_eq!(sorted(inner.freevars()), vec!["y"]);
    assert_eq!(sorted(f.freevars()), vec!["y"]);
}

#[test]
fn test_catch_parameter_is_bound() {
    let doc = program(vec![json!({
        "type": "TryStatement",
        "block": block(vec![]),
        "handler": {
            "type": "CatchClause",
            "param": ident("e"),
            "body": block(vec![expr(ident("e"))]),
        },
        "finalizer": null,
    })]);
    let (tree, table) = analyze(&doc);
    let root = table.function_scope(tree.root()).unwrap();
    let clause = nodes_of(&tree, &NodeKind::CatchClause)[0];
    assert_eq!(root.lexicals().get("e"), Some(&clause));
    assert!(root.freevars().is_empty());
}

// Block scopes

#[test]
fn test_block_binding_does_not_reach_past_its_block() {
    // function f() { { let x = 1; } return x; }
    let doc = program(vec![function(
        "f",
        &[],
        vec![
            block(vec![declare("let", "x", Some(number(1)))]),
            ret(ident("x")),
        ],
    )]);
    let (tree, table) = analyze(&doc);
    let f = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    assert!(f.lexicals().contains_key("x"));
    assert_eq!(sorted(f.freevars()), vec!["x"]);
    let root = table.function_scope(tree.root()).unwrap();
    assert_eq!(sorted(root.freevars()), vec!["x"]);
}

#[test]
fn test_block_binding_is_invisible_to_function_outside_the_block() {
    // function outer() { { let y; } function inner() { return y; } }
    let doc = program(vec![function(
        "outer",
        &[],
        vec![
            block(vec![declare("let", "y", None)]),
            function("inner", &[], vec![ret(ident("y"))]),
        ],
    )]);
    let (tree, table) = analyze(&doc);
    let outer = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    let inner = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 1);
    assert_eq!(sorted(inner.freevars()), vec!["y"]);
    assert!(inner.upvars().is_empty());
    assert_eq!(sorted(outer.freevars()), vec!["y"]);
}

#[test]
fn test_function_inside_block_captures_block_binding() {
    // function outer() { { let y; return function () { return y; }; } }
    let doc = program(vec![function(
        "outer",
        &[],
        vec![block(vec![
            declare("let", "y", None),
            ret(function_expr(None, &[], vec![ret(ident("y"))])),
        ])],
    )]);
    let (tree, table) = analyze(&doc);
    let outer = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    let inner = scope_of(&tree, &table, &NodeKind::FunctionExpression, 0);
    assert_eq!(sorted(inner.upvars()), vec!["y"]);
    assert!(inner.freevars().is_empty());
    assert!(outer.upvars().is_empty());
    assert!(outer.freevars().is_empty());
}

#[test]
fn test_block_binding_shadows_var_only_inside_its_block() {
    // function f() { var x; function g() { { let x; x; } return x; } }
    let doc = program(vec![function(
        "f",
        &[],
        vec![
            declare("var", "x", None),
            function(
                "g",
                &[],
                vec![
                    block(vec![declare("let", "x", None), expr(ident("x"))]),
                    ret(ident("x")),
                ],
            ),
        ],
    )]);
    let (tree, table) = analyze(&doc);
    let f = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    let g = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 1);
    assert_eq!(sorted(g.upvars()), vec!["x"]);
    assert!(g.freevars().is_empty());
    assert!(f.upvars().is_empty());
    assert!(f.freevars().is_empty());
}

#[test]
fn test_for_loop_binding_is_scoped_to_the_loop() {
    // for (let i = 0; i; ) { () => i; } i;
    let doc = program(vec![
        json!({
            "type": "ForStatement",
            "init": declare("let", "i", Some(number(0))),
            "test": ident("i"),
            "update": null,
            "body": block(vec![expr(arrow(&[], ident("i")))]),
        }),
        expr(ident("i")),
    ]);
    let (tree, table) = analyze(&doc);
    let closure = scope_of(&tree, &table, &NodeKind::ArrowFunctionExpression, 0);
    assert_eq!(sorted(closure.upvars()), vec!["i"]);
    let root = table.function_scope(tree.root()).unwrap();
    assert!(root.lexicals().contains_key("i"));
    assert_eq!(sorted(root.freevars()), vec!["i"]);
}

#[test]
fn test_resolve_reports_declaring_context() {
    let doc = program(vec![
        declare("var", "x", None),
        function("f", &[], vec![ret(ident("x"))]),
    ]);
    let (tree, table) = analyze(&doc);
    let root_scope = table.info(tree.root()).unwrap().scope.unwrap();
    let f = nodes_of(&tree, &NodeKind::FunctionDeclaration)[0];
    let f_scope = table.info(f).unwrap().scope.unwrap();
    let declarator = nodes_of(&tree, &NodeKind::VariableDeclarator)[0];
    assert_eq!(
        table.resolve(f_scope, "x"),
        Resolution::Upvar {
            scope: root_scope,
            declaration: declarator
        }
    );
    assert_eq!(table.resolve(f_scope, "nope"), Resolution::Free);
    assert_eq!(table.scope(f_scope).parent(), Some(root_scope));
}

// Strictness

#[test]
fn test_use_strict_directive_marks_program() {
    let doc = program(vec![expr(string("use strict")), expr(ident("x"))]);
    let (tree, table) = analyze(&doc);
    assert_eq!(table.strict(tree.root()), Some(true));
}

#[test]
fn test_strict_absent_when_directive_missing_or_late() {
    let doc = program(vec![
        function("late", &[], vec![expr(ident("x")), expr(string("use strict"))]),
        function("none", &[], vec![]),
        function("strict", &[], vec![expr(string("use strict"))]),
    ]);
    let (tree, table) = analyze(&doc);
    let functions = nodes_of(&tree, &NodeKind::FunctionDeclaration);
    assert_eq!(table.strict(tree.root()), None);
    assert_eq!(table.strict(functions[0]), None);
    assert_eq!(table.strict(functions[1]), None);
    assert_eq!(table.strict(functions[2]), Some(true));
}

// Labels and srcName

#[test]
fn test_labeled_statement_labels_its_body() {
    let doc = program(vec![json!({
        "type": "LabeledStatement",
        "label": ident("outer"),
        "body": {
            "type": "WhileStatement",
            "test": ident("go"),
            "body": block(vec![json!({ "type": "BreakStatement", "label": ident("outer") })]),
        },
    })]);
    let (tree, table) = analyze(&doc);
    let while_id = nodes_of(&tree, &NodeKind::WhileStatement)[0];
    assert_eq!(table.label(while_id), Some("outer"));
    let root = table.function_scope(tree.root()).unwrap();
    assert_eq!(sorted(root.freevars()), vec!["go"]);
}

#[test]
fn test_src_name_of_call_chain() {
    let doc = program(vec![expr(call(
        member(member(ident("a"), ident("b"), false), ident("c"), false),
        vec![number(1), string("s")],
    ))]);
    let (tree, table) = analyze(&doc);
    let call_id = nodes_of(&tree, &NodeKind::CallExpression)[0];
    let members = nodes_of(&tree, &NodeKind::MemberExpression);
    assert_eq!(table.src_name(call_id), Some("a.b.c(...)"));
    assert_eq!(table.src_name(members[0]), Some("a.b.c"));
    assert_eq!(table.src_name(members[1]), Some("a.b"));
}

#[test]
fn test_src_name_of_expressions() {
    let doc = program(vec![
        expr(member(ident("x"), number(0), true)),
        expr(binary("===", ident("a"), string("q"))),
        expr(json!({ "type": "ThisExpression" })),
        expr(json!({
            "type": "ArrayExpression",
            "elements": [number(1), null, ident("z")],
        })),
        expr(json!({
            "type": "NewExpression",
            "callee": ident("Thing"),
            "arguments": [],
        })),
        expr(json!({
            "type": "Literal",
            "value": {},
            "raw": "/ab+c/gi",
            "regex": { "pattern": "ab+c", "flags": "gi" },
        })),
        function("named", &[], vec![]),
    ]);
    let (tree, table) = analyze(&doc);
    let label = |kind: &NodeKind| table.src_name(nodes_of(&tree, kind)[0]);
    assert_eq!(label(&NodeKind::MemberExpression), Some("x[0]"));
    assert_eq!(label(&NodeKind::BinaryExpression), Some("a === \"q\""));
    assert_eq!(label(&NodeKind::ThisExpression), Some("this"));
    assert_eq!(label(&NodeKind::ArrayExpression), Some("[1,,z]"));
    assert_eq!(label(&NodeKind::NewExpression), Some("new Thing(...)"));
    assert_eq!(label(&NodeKind::FunctionDeclaration), Some("function named {"));
    let regex = nodes_of(&tree, &NodeKind::Literal)
        .into_iter()
        .find(|id| tree[*id].data("regex").is_some())
        .unwrap();
    assert_eq!(table.src_name(regex), Some("/ab+c/gi"));
}

// Whole-document behavior

#[test]
fn test_annotate_in_place_writes_annotations() {
    let mut doc = program(vec![
        declare("var", "a", Some(number(1))),
        function("f", &["b"], vec![ret(ident("a"))]),
    ]);
    annotate_in_place(&mut doc).unwrap();
    assert_eq!(doc["nodeId"], json!(0));
    assert_eq!(doc["vars"], json!({ "a": 2, "f": 4 }));
    assert_eq!(doc["funcs"], json!({ "f": 4 }));
    assert_eq!(doc["freevars"], json!({}));
    assert!(doc.get("strict").is_none());

    let f = &doc["body"][1];
    assert_eq!(f["nodeId"], json!(4));
    assert_eq!(f["srcName"], json!("function f {"));
    assert_eq!(f["vars"], json!({ "b": 4 }));
    assert_eq!(f["upvars"], json!({ "a": true }));
    assert_eq!(f["body"]["body"][0]["argument"]["nodeId"], json!(7));
    assert_eq!(f["params"][0].get("nodeId"), None);
}

#[test]
fn test_deeply_nested_blocks_do_not_overflow() {
    let mut inner = expr(ident("deep"));
    for _ in 0..2_000 {
        inner = block(vec![inner]);
    }
    let doc = program(vec![function("f", &[], vec![inner])]);
    let (tree, table) = analyze(&doc);
    let f = scope_of(&tree, &table, &NodeKind::FunctionDeclaration, 0);
    assert_eq!(sorted(f.freevars()), vec!["deep"]);
}

#[test]
fn test_annotator_config_defaults() {
    assert!(AnnotatorConfig::default().track_lexical_bindings);
    let annotator = Annotator::with_config(AnnotatorConfig {
        track_lexical_bindings: false,
    });
    assert!(!annotator.config().track_lexical_bindings);
}
