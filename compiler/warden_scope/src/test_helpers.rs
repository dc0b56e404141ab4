//! ESTree builders shared by the unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::{json, Value as Json};
use warden_ir::{NodeId, NodeKind, SyntaxTree};

use crate::{annotate, FunctionScope, ScopeTable};

pub(crate) fn program(body: Vec<Json>) -> Json {
    json!({ "type": "Program", "body": body })
}

pub(crate) fn ident(name: &str) -> Json {
    json!({ "type": "Identifier", "name": name })
}

pub(crate) fn string(value: &str) -> Json {
    json!({ "type": "Literal", "value": value, "raw": format!("\"{value}\"") })
}

pub(crate) fn number(value: i64) -> Json {
    json!({ "type": "Literal", "value": value, "raw": value.to_string() })
}

pub(crate) fn expr(expression: Json) -> Json {
    json!({ "type": "ExpressionStatement", "expression": expression })
}

pub(crate) fn block(body: Vec<Json>) -> Json {
    json!({ "type": "BlockStatement", "body": body })
}

pub(crate) fn declare(kind: &str, name: &str, init: Option<Json>) -> Json {
    json!({
        "type": "VariableDeclaration",
        "kind": kind,
        "declarations": [{
            "type": "VariableDeclarator",
            "id": ident(name),
            "init": init,
        }]
    })
}

pub(crate) fn function(name: &str, params: &[&str], body: Vec<Json>) -> Json {
    json!({
        "type": "FunctionDeclaration",
        "id": ident(name),
        "params": params.iter().map(|p| ident(p)).collect::<Vec<_>>(),
        "body": block(body),
    })
}

pub(crate) fn function_expr(name: Option<&str>, params: &[&str], body: Vec<Json>) -> Json {
    json!({
        "type": "FunctionExpression",
        "id": name.map(ident),
        "params": params.iter().map(|p| ident(p)).collect::<Vec<_>>(),
        "body": block(body),
    })
}

pub(crate) fn arrow(params: &[&str], body: Json) -> Json {
    json!({
        "type": "ArrowFunctionExpression",
        "params": params.iter().map(|p| ident(p)).collect::<Vec<_>>(),
        "body": body,
    })
}

pub(crate) fn call(callee: Json, arguments: Vec<Json>) -> Json {
    json!({ "type": "CallExpression", "callee": callee, "arguments": arguments })
}

pub(crate) fn member(object: Json, property: Json, computed: bool) -> Json {
    json!({
        "type": "MemberExpression",
        "object": object,
        "property": property,
        "computed": computed,
    })
}

pub(crate) fn binary(operator: &str, left: Json, right: Json) -> Json {
    json!({ "type": "BinaryExpression", "operator": operator, "left": left, "right": right })
}

pub(crate) fn ret(argument: Json) -> Json {
    json!({ "type": "ReturnStatement", "argument": argument })
}

/// Lower and annotate `document`.
pub(crate) fn analyze(document: &Json) -> (SyntaxTree, ScopeTable) {
    let tree = SyntaxTree::from_json(document).unwrap();
    let table = annotate(&tree);
    (tree, table)
}

/// Ids of every node of `kind`, in traversal order.
pub(crate) fn nodes_of(tree: &SyntaxTree, kind: &NodeKind) -> Vec<NodeId> {
    tree.iter()
        .filter(|(_, node)| node.kind() == kind)
        .map(|(id, _)| id)
        .collect()
}

/// The function context owned by the `nth` node of `kind`.
pub(crate) fn scope_of<'t>(
    tree: &SyntaxTree,
    table: &'t ScopeTable,
    kind: &NodeKind,
    nth: usize,
) -> &'t FunctionScope {
    let id = nodes_of(tree, kind)[nth];
    table.function_scope(id).unwrap()
}

pub(crate) fn sorted<'a>(names: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    let mut out: Vec<&str> = names.into_iter().map(String::as_str).collect();
    out.sort_unstable();
    out
}
