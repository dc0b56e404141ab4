//! Flat syntax tree lowered from an ESTree JSON document.
//!
//! # Traversal Order
//!
//! Children are numbered in the order the scope annotator visits them:
//!
//! | Node | Visited fields, in order |
//! |------|--------------------------|
//! | `Program`, `BlockStatement` | `body[]` |
//! | `CallExpression`, `NewExpression` | `arguments[]`, then `callee` |
//! | `WhileStatement`, `DoWhileStatement` | `test`, then `body` |
//! | `VariableDeclaration` | `declarations[]` |
//! | `VariableDeclarator` | `init` |
//! | function-like nodes | `body` |
//! | `ArrayExpression` | `elements[]` (holes skipped) |
//! | `LabeledStatement` | `label`, `body` |
//! | `ClassDeclaration` | `superClass`, `body` |
//! | `CatchClause` | `body` |
//! | anything else | every field holding a node or a list of nodes |
//!
//! Anything not visited (declarator `id`, function `params`, `loc`, regex
//! metadata, ...) is kept as [`Field::Data`].

use std::ops::Index;

use serde_json::{Map, Value as Json};

use crate::stack::ensure_sufficient_stack;
use crate::{NodeId, NodeKind};

/// Fields never descended into by the generic walk.
const SKIPPED_KEYS: &[&str] = &[
    "type", "loc", "range", "parent", "nodeId", "vars", "funcs", "upvars", "freevars", "srcName",
    "strict", "label",
];

/// Error lowering a document into a [`SyntaxTree`].
///
/// Only the root is checked; malformed descendants degrade to opaque data.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("syntax tree root is not a node (expected an object with a string `type` field)")]
    RootNotANode,
}

/// A field of a lowered node.
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    /// A visited child node.
    Node(NodeId),
    /// A visited list of child nodes; `None` marks a hole or `null` slot.
    List(Vec<Option<NodeId>>),
    /// Anything the traversal does not descend into, kept verbatim.
    Data(Json),
}

/// Whether a child sits where an identifier is a reference or merely a name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Reference,
    Name,
}

/// A single node in the arena.
#[derive(Clone, Debug)]
pub struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    fields: Vec<(Box<str>, Field)>,
    name_position: bool,
}

impl Node {
    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The enclosing node. Non-owning; only meaningful within the same tree.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Visited children in traversal order.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// True for identifiers that name something rather than reference a
    /// binding: non-computed member properties and object keys, and labels.
    #[inline]
    pub fn is_name_position(&self) -> bool {
        self.name_position
    }

    /// All fields in their original document order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(key, field)| (&**key, field))
    }

    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, field)| field)
    }

    /// A visited single-node field.
    pub fn child(&self, key: &str) -> Option<NodeId> {
        match self.field(key)? {
            Field::Node(id) => Some(*id),
            _ => None,
        }
    }

    /// A visited node-list field.
    pub fn list(&self, key: &str) -> Option<&[Option<NodeId>]> {
        match self.field(key)? {
            Field::List(items) => Some(items),
            _ => None,
        }
    }

    /// A field kept as raw data.
    pub fn data(&self, key: &str) -> Option<&Json> {
        match self.field(key)? {
            Field::Data(value) => Some(value),
            _ => None,
        }
    }

    pub fn str_data(&self, key: &str) -> Option<&str> {
        self.data(key)?.as_str()
    }

    pub fn bool_data(&self, key: &str) -> Option<bool> {
        self.data(key)?.as_bool()
    }
}

/// Arena of nodes indexed by [`NodeId`]; the root is always [`NodeId::ROOT`].
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    /// Lower an ESTree document. The input is not modified.
    pub fn from_json(document: &Json) -> Result<Self, TreeError> {
        let root = as_node(document).ok_or(TreeError::RootNotANode)?;
        let mut lowering = Lowering { nodes: Vec::new() };
        lowering.lower(root, None, Role::Reference);
        Ok(SyntaxTree {
            nodes: lowering.nodes,
        })
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Nodes in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        (0u32..).map(NodeId::new).zip(self.nodes.iter())
    }

    /// Walk the parent chain of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).and_then(Node::parent), |cur| {
            self.get(*cur).and_then(Node::parent)
        })
    }

    /// Rebuild the original document.
    pub fn to_json(&self) -> Json {
        self.to_json_with(|_, _| {})
    }

    /// Rebuild the document, letting `decorate` add fields to each node
    /// object after its original fields have been written.
    pub fn to_json_with(&self, mut decorate: impl FnMut(NodeId, &mut Map<String, Json>)) -> Json {
        self.node_to_json(NodeId::ROOT, &mut decorate)
    }

    fn node_to_json(
        &self,
        id: NodeId,
        decorate: &mut dyn FnMut(NodeId, &mut Map<String, Json>),
    ) -> Json {
        ensure_sufficient_stack(|| {
            let node = &self[id];
            let mut map = Map::with_capacity(node.fields.len());
            for (key, field) in &node.fields {
                let value = match field {
                    Field::Node(child) => self.node_to_json(*child, decorate),
                    Field::List(items) => {
                        let mut out = Vec::with_capacity(items.len());
                        for item in items {
                            match item {
                                Some(child) => out.push(self.node_to_json(*child, decorate)),
                                None => out.push(Json::Null),
                            }
                        }
                        Json::Array(out)
                    }
                    Field::Data(value) => value.clone(),
                };
                map.insert(key.to_string(), value);
            }
            decorate(id, &mut map);
            Json::Object(map)
        })
    }
}

impl Index<NodeId> for SyntaxTree {
    type Output = Node;

    #[inline]
    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

/// The object behind `value` if it carries a string `type` tag.
fn as_node(value: &Json) -> Option<&Map<String, Json>> {
    let obj = value.as_object()?;
    obj.get("type")?.as_str()?;
    Some(obj)
}

/// Every element is a node or `null`.
fn is_node_list(items: &[Json]) -> bool {
    items
        .iter()
        .all(|item| item.is_null() || as_node(item).is_some())
}

/// `key`/`property` fields of non-computed members and object keys are names.
fn generic_role(key: &str, obj: &Map<String, Json>) -> Role {
    let computed = obj.get("computed").and_then(Json::as_bool).unwrap_or(false);
    if (key == "key" || key == "property") && !computed {
        Role::Name
    } else {
        Role::Reference
    }
}

/// Fields visited for a node of `kind`, in traversal order.
fn visit_plan<'a>(kind: &NodeKind, obj: &'a Map<String, Json>) -> Vec<(&'a str, Role)> {
    use Role::{Name, Reference};

    let fixed: &[(&'static str, Role)] = match kind {
        NodeKind::Program | NodeKind::BlockStatement => &[("body", Reference)],
        NodeKind::CallExpression | NodeKind::NewExpression => {
            &[("arguments", Reference), ("callee", Reference)]
        }
        NodeKind::WhileStatement | NodeKind::DoWhileStatement => {
            &[("test", Reference), ("body", Reference)]
        }
        NodeKind::VariableDeclaration => &[("declarations", Reference)],
        NodeKind::VariableDeclarator => &[("init", Reference)],
        NodeKind::FunctionDeclaration
        | NodeKind::FunctionExpression
        | NodeKind::ArrowFunctionExpression
        | NodeKind::CatchClause => &[("body", Reference)],
        NodeKind::Identifier | NodeKind::Literal | NodeKind::ThisExpression => &[],
        NodeKind::ArrayExpression => &[("elements", Reference)],
        NodeKind::LabeledStatement => &[("label", Name), ("body", Reference)],
        NodeKind::BreakStatement | NodeKind::ContinueStatement => &[("label", Name)],
        NodeKind::ClassDeclaration => &[("superClass", Reference), ("body", Reference)],
        _ => {
            return obj
                .iter()
                .filter(|(key, value)| {
                    !SKIPPED_KEYS.contains(&key.as_str())
                        && (as_node(value).is_some()
                            || value.as_array().is_some_and(|items| {
                                is_node_list(items) && items.iter().any(|i| as_node(i).is_some())
                            }))
                })
                .map(|(key, _)| (key.as_str(), generic_role(key, obj)))
                .collect();
        }
    };

    fixed
        .iter()
        .filter(|(key, _)| obj.contains_key(*key))
        .map(|(key, role)| (*key, *role))
        .collect()
}

struct Lowering {
    nodes: Vec<Node>,
}

impl Lowering {
    fn lower(&mut self, obj: &Map<String, Json>, parent: Option<NodeId>, role: Role) -> NodeId {
        ensure_sufficient_stack(|| self.lower_node(obj, parent, role))
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "arena sizes are bounded by source size, far below u32::MAX"
    )]
    fn lower_node(&mut self, obj: &Map<String, Json>, parent: Option<NodeId>, role: Role) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        let tag = obj.get("type").and_then(Json::as_str).unwrap_or_default();
        let kind = NodeKind::from_tag(tag);
        let plan = visit_plan(&kind, obj);
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
            fields: Vec::new(),
            name_position: role == Role::Name,
        });

        let mut children = Vec::new();
        let mut lowered: Vec<(&str, Field)> = Vec::with_capacity(plan.len());
        for (key, role) in plan {
            let Some(value) = obj.get(key) else { continue };
            let field = if let Some(child) = as_node(value) {
                let child = self.lower(child, Some(id), role);
                children.push(child);
                Field::Node(child)
            } else if let Some(items) = value.as_array().filter(|items| is_node_list(items)) {
                let mut slots = Vec::with_capacity(items.len());
                for item in items {
                    let slot = as_node(item).map(|child| self.lower(child, Some(id), role));
                    children.extend(slot);
                    slots.push(slot);
                }
                Field::List(slots)
            } else {
                continue;
            };
            lowered.push((key, field));
        }

        let fields = obj
            .iter()
            .map(|(key, value)| {
                let field = match lowered.iter().position(|(k, _)| *k == key.as_str()) {
                    Some(pos) => lowered.swap_remove(pos).1,
                    None => Field::Data(value.clone()),
                };
                (Box::from(key.as_str()), field)
            })
            .collect();

        let node = &mut self.nodes[id.index()];
        node.children = children;
        node.fields = fields;
        id
    }
}
