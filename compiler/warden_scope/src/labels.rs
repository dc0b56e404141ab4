//! Debug labels (`srcName`): a rough reconstruction of source text.
//!
//! Labels are built bottom-up from the children's labels once a node has
//! been fully visited. They feed error messages only.

use serde_json::Value as Json;
use warden_ir::{Node, NodeKind};

use crate::table::ScopeTable;

/// Stand-in when the object side of a member expression has no label.
const UNKNOWN_OBJECT: &str = "??";

/// Stand-in when the property side of a member expression has no label.
const INTERMEDIATE: &str = "(intermediate value)";

/// Label for `node` once its children are labelled, if it gets one.
pub(crate) fn exit_label(table: &ScopeTable, node: &Node) -> Option<String> {
    let label_of = |key: &str| node.child(key).and_then(|id| table.src_name(id));
    match node.kind() {
        NodeKind::Identifier => node.str_data("name").map(str::to_string),
        NodeKind::Literal => Some(literal_label(node)),
        NodeKind::BinaryExpression | NodeKind::LogicalExpression => Some(format!(
            "{} {} {}",
            label_of("left").unwrap_or(UNKNOWN_OBJECT),
            node.str_data("operator").unwrap_or("?"),
            label_of("right").unwrap_or(UNKNOWN_OBJECT),
        )),
        NodeKind::MemberExpression => {
            let object = label_of("object").unwrap_or(UNKNOWN_OBJECT);
            let property = label_of("property").unwrap_or(INTERMEDIATE);
            if node.bool_data("computed").unwrap_or(false) {
                Some(format!("{object}[{property}]"))
            } else {
                Some(format!("{object}.{property}"))
            }
        }
        NodeKind::CallExpression => Some(format!(
            "{}(...)",
            label_of("callee").unwrap_or(UNKNOWN_OBJECT)
        )),
        NodeKind::NewExpression => Some(format!(
            "new {}(...)",
            label_of("callee").unwrap_or(UNKNOWN_OBJECT)
        )),
        NodeKind::ArrayExpression => {
            let elements: Vec<&str> = node
                .list("elements")
                .unwrap_or_default()
                .iter()
                .map(|slot| slot.and_then(|id| table.src_name(id)).unwrap_or(""))
                .collect();
            Some(format!("[{}]", elements.join(",")))
        }
        _ => None,
    }
}

/// Regex literals render as `/pattern/flags`, a literal without a value as
/// `undefined`, everything else as its raw source text.
fn literal_label(node: &Node) -> String {
    if let Some(regex) = node.data("regex").filter(|r| r.is_object()) {
        let part = |key: &str| regex.get(key).and_then(Json::as_str).unwrap_or_default();
        return format!("/{}/{}", part("pattern"), part("flags"));
    }
    match (node.data("value"), node.str_data("raw")) {
        (None, _) => "undefined".to_string(),
        (Some(_), Some(raw)) => raw.to_string(),
        (Some(value), None) => value.to_string(),
    }
}

/// Label assigned when a function declaration is entered.
pub(crate) fn function_declaration_label(name: &str) -> String {
    format!("function {name} {{")
}

/// Label of a `this` expression.
pub(crate) const THIS: &str = "this";
