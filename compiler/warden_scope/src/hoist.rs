//! Declaration scanning run when a function context is entered.

use serde_json::Value as Json;
use warden_ir::{Node, NodeId, NodeKind, SyntaxTree};

/// Where a declaration is recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BindingKind {
    /// Hoisted to the function context (`var`, function declarations).
    Var,
    /// Block scoped (`let`, `const`, classes, catch parameters).
    Lexical,
}

/// A name and the node that declares it.
pub(crate) type Declaration = (String, NodeId, BindingKind);

/// Names bound by a binding pattern, left to right.
///
/// Patterns are kept as raw data by the tree lowering, so this walks JSON.
pub(crate) fn pattern_names(pattern: &Json) -> Vec<String> {
    let mut names = Vec::new();
    let mut pending = vec![pattern];
    while let Some(pattern) = pending.pop() {
        match pattern.get("type").and_then(Json::as_str) {
            Some("Identifier") => {
                if let Some(name) = pattern.get("name").and_then(Json::as_str) {
                    names.push(name.to_string());
                }
            }
            Some("AssignmentPattern") => pending.extend(pattern.get("left")),
            Some("RestElement") => pending.extend(pattern.get("argument")),
            Some("ArrayPattern") => {
                if let Some(elements) = pattern.get("elements").and_then(Json::as_array) {
                    pending.extend(elements.iter().rev().filter(|e| !e.is_null()));
                }
            }
            Some("ObjectPattern") => {
                if let Some(props) = pattern.get("properties").and_then(Json::as_array) {
                    for prop in props.iter().rev() {
                        match prop.get("type").and_then(Json::as_str) {
                            Some("RestElement") => pending.extend(prop.get("argument")),
                            _ => pending.extend(prop.get("value")),
                        }
                    }
                }
            }
            _ => {}
        }
    }
    names
}

/// Statements forming the body of a function context.
fn body_statements(tree: &SyntaxTree, node: &Node) -> Vec<NodeId> {
    if matches!(node.kind(), NodeKind::Program) {
        return node.list("body").map(flatten).unwrap_or_default();
    }
    match node.child("body") {
        Some(body) if matches!(tree[body].kind(), NodeKind::BlockStatement) => {
            tree[body].list("body").map(flatten).unwrap_or_default()
        }
        Some(body) => vec![body],
        None => Vec::new(),
    }
}

fn flatten(items: &[Option<NodeId>]) -> Vec<NodeId> {
    items.iter().flatten().copied().collect()
}

/// Declarations made by a single declaring node: a `VariableDeclarator`, a
/// `FunctionDeclaration`, a `ClassDeclaration` or a `CatchClause`.
pub(crate) fn declarations_of(tree: &SyntaxTree, id: NodeId) -> Vec<Declaration> {
    let node = &tree[id];
    match node.kind() {
        NodeKind::VariableDeclarator => {
            let kind = node
                .parent()
                .map(|p| &tree[p])
                .filter(|p| matches!(p.kind(), NodeKind::VariableDeclaration))
                .map(|p| p.str_data("kind"));
            let binding = match kind {
                // A declarator outside any declaration behaves like `var`.
                None | Some(Some("var")) => BindingKind::Var,
                Some(_) => BindingKind::Lexical,
            };
            node.data("id")
                .map(pattern_names)
                .unwrap_or_default()
                .into_iter()
                .map(|name| (name, id, binding))
                .collect()
        }
        NodeKind::FunctionDeclaration => name_of(node)
            .map(|name| vec![(name, id, BindingKind::Var)])
            .unwrap_or_default(),
        NodeKind::ClassDeclaration => name_of(node)
            .map(|name| vec![(name, id, BindingKind::Lexical)])
            .unwrap_or_default(),
        NodeKind::CatchClause => node
            .data("param")
            .map(pattern_names)
            .unwrap_or_default()
            .into_iter()
            .map(|name| (name, id, BindingKind::Lexical))
            .collect(),
        _ => Vec::new(),
    }
}

/// The `id.name` of a declaration or named function expression.
pub(crate) fn name_of(node: &Node) -> Option<String> {
    node.data("id")?
        .get("name")?
        .as_str()
        .map(str::to_string)
}

/// Declarations visible from the top of the context owned by `context`.
///
/// Direct statements contribute `var` declarations and function
/// declarations. Nested blocks contribute `var` and block-scoped
/// declarations but not function declarations; nested functions are never
/// entered.
pub(crate) fn hoisted_declarations(tree: &SyntaxTree, context: NodeId) -> Vec<Declaration> {
    let mut out = Vec::new();
    let direct = body_statements(tree, &tree[context]);
    let mut pending: Vec<(NodeId, bool)> = direct.into_iter().rev().map(|id| (id, true)).collect();

    while let Some((id, is_direct)) = pending.pop() {
        let node = &tree[id];
        match node.kind() {
            NodeKind::FunctionDeclaration => {
                if is_direct {
                    out.extend(declarations_of(tree, id));
                }
                continue;
            }
            NodeKind::FunctionExpression | NodeKind::ArrowFunctionExpression => continue,
            NodeKind::VariableDeclarator | NodeKind::ClassDeclaration | NodeKind::CatchClause => {
                out.extend(declarations_of(tree, id));
            }
            _ => {}
        }
        pending.extend(node.children().iter().rev().map(|child| (*child, false)));
    }
    out
}

/// Whether `kind` opens a block scope for `let`, `const`, classes and catch
/// parameters.
pub(crate) fn opens_block(kind: &NodeKind) -> bool {
    match kind {
        NodeKind::Program | NodeKind::BlockStatement | NodeKind::CatchClause => true,
        NodeKind::Other(tag) => matches!(
            &**tag,
            "ForStatement" | "ForInStatement" | "ForOfStatement" | "SwitchStatement"
        ),
        _ => false,
    }
}

/// Block-scoped names owned by the block `block`.
///
/// Nested blocks and functions own their declarations and are not entered.
/// A catch clause owns its parameter.
pub(crate) fn block_declarations(tree: &SyntaxTree, block: NodeId) -> Vec<String> {
    let mut names = Vec::new();
    if matches!(tree[block].kind(), NodeKind::CatchClause) {
        names.extend(declarations_of(tree, block).into_iter().map(|(name, ..)| name));
    }
    let mut pending = tree[block].children().to_vec();
    while let Some(id) = pending.pop() {
        let node = &tree[id];
        match node.kind() {
            NodeKind::FunctionDeclaration
            | NodeKind::FunctionExpression
            | NodeKind::ArrowFunctionExpression => continue,
            kind if opens_block(kind) => continue,
            NodeKind::VariableDeclarator | NodeKind::ClassDeclaration => {
                names.extend(
                    declarations_of(tree, id)
                        .into_iter()
                        .filter(|(.., kind)| *kind == BindingKind::Lexical)
                        .map(|(name, ..)| name),
                );
            }
            _ => {}
        }
        pending.extend(node.children());
    }
    names
}

/// A body is strict when its first statement is the bare string literal
/// `"use strict"`.
pub(crate) fn detect_strict(tree: &SyntaxTree, context: NodeId) -> bool {
    let node = &tree[context];
    let first = if matches!(node.kind(), NodeKind::Program) {
        node.list("body").and_then(|items| items.first().copied().flatten())
    } else {
        node.child("body")
            .filter(|body| matches!(tree[*body].kind(), NodeKind::BlockStatement))
            .and_then(|body| tree[body].list("body"))
            .and_then(|items| items.first().copied().flatten())
    };
    let Some(first) = first else { return false };
    if !matches!(tree[first].kind(), NodeKind::ExpressionStatement) {
        return false;
    }
    tree[first].child("expression").is_some_and(|expr| {
        let expr = &tree[expr];
        matches!(expr.kind(), NodeKind::Literal) && expr.str_data("value") == Some("use strict")
    })
}
