//! Annotation side table produced by the scope annotator.
//!
//! Nothing is written onto the syntax tree itself. Every annotation lives
//! here, keyed by [`NodeId`], and function contexts are stored in an arena
//! indexed by [`ScopeId`] with an explicit parent link. Lookups walk that
//! chain instead of relying on any implicit inheritance.

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;
use std::fmt;

use warden_ir::NodeId;

/// Index into [`ScopeTable`]'s function-context arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(transparent)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

/// Per-node annotations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NodeInfo {
    /// Human-readable reconstruction of the node, for diagnostics only.
    pub src_name: Option<String>,
    /// `Some(true)` when a `"use strict"` directive was detected. Absent
    /// means "inherit from the enclosing context", never "sloppy".
    pub strict: Option<bool>,
    /// Label attached by an enclosing `LabeledStatement`.
    pub label: Option<String>,
    /// Function context owned by this node (programs and functions only).
    pub scope: Option<ScopeId>,
}

/// The bindings and closure classification of one function context.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FunctionScope {
    pub(crate) node: NodeId,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) binds_arguments: bool,
    pub(crate) vars: FxHashMap<String, NodeId>,
    pub(crate) funcs: FxHashMap<String, NodeId>,
    pub(crate) lexicals: FxHashMap<String, NodeId>,
    pub(crate) upvars: FxHashSet<String>,
    pub(crate) freevars: FxHashSet<String>,
}

impl FunctionScope {
    pub(crate) fn new(node: NodeId, parent: Option<ScopeId>, binds_arguments: bool) -> Self {
        FunctionScope {
            node,
            parent,
            binds_arguments,
            vars: FxHashMap::default(),
            funcs: FxHashMap::default(),
            lexicals: FxHashMap::default(),
            upvars: FxHashSet::default(),
            freevars: FxHashSet::default(),
        }
    }

    /// The program or function node that owns this context.
    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The enclosing function context.
    #[inline]
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// Hoisted names: `var` declarators, function declarations and
    /// parameters, each mapped to its declaring node.
    #[inline]
    pub fn vars(&self) -> &FxHashMap<String, NodeId> {
        &self.vars
    }

    /// Function declarations nested directly in this context.
    #[inline]
    pub fn funcs(&self) -> &FxHashMap<String, NodeId> {
        &self.funcs
    }

    /// Block-scoped declarations (`let`, `const`, classes, catch parameters).
    #[inline]
    pub fn lexicals(&self) -> &FxHashMap<String, NodeId> {
        &self.lexicals
    }

    /// Names captured from an enclosing function context.
    #[inline]
    pub fn upvars(&self) -> &FxHashSet<String> {
        &self.upvars
    }

    /// Names bound by no enclosing context; resolved against globals.
    #[inline]
    pub fn freevars(&self) -> &FxHashSet<String> {
        &self.freevars
    }

    /// Whether `name` is bound throughout this context. Block-scoped
    /// declarations only bind inside their block and do not count.
    pub fn binds(&self, name: &str) -> bool {
        self.vars.contains_key(name) || (self.binds_arguments && name == "arguments")
    }

    /// The node declaring `name` throughout this context, if any.
    pub fn declaration(&self, name: &str) -> Option<NodeId> {
        self.vars
            .get(name)
            .copied()
            .or_else(|| (self.binds_arguments && name == "arguments").then_some(self.node))
    }
}

/// How an identifier resolves from a given function context.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Bound by the context itself.
    Local(NodeId),
    /// Bound by an enclosing context.
    Upvar { scope: ScopeId, declaration: NodeId },
    /// Bound nowhere; look it up on the global object or host.
    Free,
}

/// Annotations for every node of one tree.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScopeTable {
    pub(crate) nodes: Vec<NodeInfo>,
    pub(crate) scopes: Vec<FunctionScope>,
}

impl ScopeTable {
    pub(crate) fn with_capacity(nodes: usize) -> Self {
        ScopeTable {
            nodes: vec![NodeInfo::default(); nodes],
            scopes: Vec::new(),
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "there are never more scopes than nodes, and node ids are u32"
    )]
    pub(crate) fn push_scope(&mut self, scope: FunctionScope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let node = scope.node;
        self.scopes.push(scope);
        if let Some(info) = self.nodes.get_mut(node.index()) {
            info.scope = Some(id);
        }
        id
    }

    pub(crate) fn scope_mut(&mut self, id: ScopeId) -> &mut FunctionScope {
        &mut self.scopes[id.index()]
    }

    pub(crate) fn info_mut(&mut self, id: NodeId) -> Option<&mut NodeInfo> {
        self.nodes.get_mut(id.index())
    }

    pub fn info(&self, id: NodeId) -> Option<&NodeInfo> {
        self.nodes.get(id.index())
    }

    pub fn src_name(&self, id: NodeId) -> Option<&str> {
        self.info(id)?.src_name.as_deref()
    }

    pub fn strict(&self, id: NodeId) -> Option<bool> {
        self.info(id)?.strict
    }

    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.info(id)?.label.as_deref()
    }

    #[inline]
    pub fn scope(&self, id: ScopeId) -> &FunctionScope {
        &self.scopes[id.index()]
    }

    /// The function context owned by `node`, if it is a program or function.
    pub fn function_scope(&self, node: NodeId) -> Option<&FunctionScope> {
        let id = self.info(node)?.scope?;
        Some(self.scope(id))
    }

    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &FunctionScope)> {
        (0u32..).map(ScopeId).zip(self.scopes.iter())
    }

    /// Resolve `name` starting at `from`, walking the explicit parent chain.
    /// Only function-wide bindings are consulted; block-scoped names depend on
    /// where the reference sits and are settled by the annotation pass.
    pub fn resolve(&self, from: ScopeId, name: &str) -> Resolution {
        let start = self.scope(from);
        if let Some(declaration) = start.declaration(name) {
            return Resolution::Local(declaration);
        }
        let mut cursor = start.parent;
        while let Some(id) = cursor {
            let scope = self.scope(id);
            if let Some(declaration) = scope.declaration(name) {
                return Resolution::Upvar {
                    scope: id,
                    declaration,
                };
            }
            cursor = scope.parent;
        }
        Resolution::Free
    }

    /// Add this table's visible annotation fields to the JSON object of
    /// `id`. Key sets are sorted so output is deterministic.
    pub fn write_annotations(&self, id: NodeId, map: &mut Map<String, Json>) {
        map.insert("nodeId".to_string(), Json::from(id.raw()));
        let Some(info) = self.info(id) else { return };
        if let Some(src_name) = &info.src_name {
            map.insert("srcName".to_string(), Json::from(src_name.as_str()));
        }
        if let Some(strict) = info.strict {
            map.insert("strict".to_string(), Json::from(strict));
        }
        if let Some(label) = &info.label {
            map.insert("label".to_string(), Json::from(label.as_str()));
        }
        if let Some(scope) = info.scope {
            let scope = self.scope(scope);
            map.insert("vars".to_string(), id_map(&scope.vars));
            map.insert("funcs".to_string(), id_map(&scope.funcs));
            map.insert("lexicals".to_string(), id_map(&scope.lexicals));
            map.insert("upvars".to_string(), flag_map(&scope.upvars));
            map.insert("freevars".to_string(), flag_map(&scope.freevars));
        }
    }
}

fn id_map(names: &FxHashMap<String, NodeId>) -> Json {
    let sorted: BTreeMap<_, _> = names.iter().collect();
    Json::Object(
        sorted
            .into_iter()
            .map(|(name, node)| (name.clone(), Json::from(node.raw())))
            .collect(),
    )
}

fn flag_map(names: &FxHashSet<String>) -> Json {
    let mut sorted: Vec<_> = names.iter().collect();
    sorted.sort();
    Json::Object(
        sorted
            .into_iter()
            .map(|name| (name.clone(), Json::Bool(true)))
            .collect(),
    )
}
