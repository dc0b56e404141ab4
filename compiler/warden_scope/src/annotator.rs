//! The annotation pass.
//!
//! A single depth-first walk over the tree in [`SyntaxTree`] order. Each
//! node gets an enter hook, its children, and an exit hook; function
//! contexts additionally push a frame on entry (after hoisting their
//! declarations) and classify every name referenced inside them on exit.
//!
//! Block-scoped bindings are resolved where the reference sits: each frame
//! keeps the blocks currently open inside it, so a `let` only binds the
//! references made inside its block.

use rustc_hash::FxHashSet;
use serde_json::Value as Json;
use warden_ir::{ensure_sufficient_stack, Node, NodeId, NodeKind, SyntaxTree};

use crate::hoist::{self, BindingKind, Declaration};
use crate::labels;
use crate::table::{FunctionScope, Resolution, ScopeId, ScopeTable};

/// Options for the annotation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatorConfig {
    /// Record `let`/`const`, class and catch bindings in each function
    /// context's `lexicals` and resolve references against the blocks
    /// enclosing them. When off, only `var`-kind and function declarations
    /// bind.
    pub track_lexical_bindings: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        AnnotatorConfig {
            track_lexical_bindings: true,
        }
    }
}

/// Entry point for annotating a [`SyntaxTree`].
///
/// ```text
/// let table = Annotator::new().track_lexical_bindings(false).annotate(&tree);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Annotator {
    config: AnnotatorConfig,
}

impl Annotator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnnotatorConfig) -> Self {
        Annotator { config }
    }

    #[must_use]
    pub fn track_lexical_bindings(mut self, track: bool) -> Self {
        self.config.track_lexical_bindings = track;
        self
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Annotate `tree`. Never fails: shapes the pass does not understand
    /// simply end up with fewer annotations.
    #[tracing::instrument(level = "debug", skip_all, fields(nodes = tree.len()))]
    pub fn annotate(&self, tree: &SyntaxTree) -> ScopeTable {
        let mut pass = Pass {
            tree,
            config: &self.config,
            table: ScopeTable::with_capacity(tree.len()),
            frames: Vec::new(),
            depth: 0,
        };
        if !tree.is_empty() {
            pass.visit(tree.root());
        }
        tracing::debug!(scopes = pass.table.scopes.len(), "annotation complete");
        pass.table
    }
}

/// A function context being walked.
struct Frame {
    scope: ScopeId,
    /// Every name referenced inside the context, including names nested
    /// functions could not resolve themselves. Dropped on exit.
    refs: FxHashSet<String>,
    /// Names bound by each block open inside the context, innermost last.
    blocks: Vec<FxHashSet<String>>,
    /// Names bound by an open block of an enclosing context.
    captured: FxHashSet<String>,
}

struct Pass<'a> {
    tree: &'a SyntaxTree,
    config: &'a AnnotatorConfig,
    table: ScopeTable,
    /// Enclosing function contexts, innermost last.
    frames: Vec<Frame>,
    depth: usize,
}

impl<'a> Pass<'a> {
    fn visit(&mut self, id: NodeId) {
        ensure_sufficient_stack(|| self.visit_node(id));
    }

    fn visit_node(&mut self, id: NodeId) {
        let tree: &'a SyntaxTree = self.tree;
        let node = &tree[id];
        self.enter(id, node);
        match node.kind() {
            NodeKind::Program
            | NodeKind::FunctionExpression
            | NodeKind::ArrowFunctionExpression => {
                self.enter_context(id, node);
                self.visit_block(id, node);
                self.exit_context();
            }
            NodeKind::FunctionDeclaration => {
                self.declare(id);
                self.enter_context(id, node);
                self.visit_children(node);
                self.exit_context();
            }
            NodeKind::VariableDeclarator | NodeKind::ClassDeclaration | NodeKind::CatchClause => {
                self.declare(id);
                self.visit_block(id, node);
            }
            _ => self.visit_block(id, node),
        }
        self.exit(id, node);
    }

    fn visit_children(&mut self, node: &Node) {
        for &child in node.children() {
            self.visit(child);
        }
    }

    /// Visit the children of `node`, opening a block around them when the
    /// node owns one.
    fn visit_block(&mut self, id: NodeId, node: &Node) {
        let opens = self.config.track_lexical_bindings && hoist::opens_block(node.kind());
        if !opens {
            self.visit_children(node);
            return;
        }
        let names: FxHashSet<String> = hoist::block_declarations(self.tree, id).into_iter().collect();
        if let Some(frame) = self.frames.last_mut() {
            frame.blocks.push(names);
        }
        self.visit_children(node);
        if let Some(frame) = self.frames.last_mut() {
            frame.blocks.pop();
        }
    }

    fn enter(&mut self, id: NodeId, node: &Node) {
        self.depth += 1;
        tracing::trace!(depth = self.depth, node = %id, kind = %node.kind(), "enter");
        match node.kind() {
            NodeKind::Identifier if !node.is_name_position() => {
                if let Some(name) = node.str_data("name") {
                    self.reference(name);
                }
            }
            NodeKind::ThisExpression => self.set_src_name(id, labels::THIS.to_string()),
            NodeKind::LabeledStatement => {
                let label = node
                    .child("label")
                    .and_then(|label| self.tree[label].str_data("name"));
                if let (Some(body), Some(label)) = (node.child("body"), label) {
                    if let Some(info) = self.table.info_mut(body) {
                        info.label = Some(label.to_string());
                    }
                }
            }
            NodeKind::FunctionDeclaration => {
                if let Some(name) = hoist::name_of(node) {
                    self.set_src_name(id, labels::function_declaration_label(&name));
                    if let Some(frame) = self.frames.last() {
                        self.table.scope_mut(frame.scope).funcs.insert(name, id);
                    }
                }
            }
            _ => {}
        }
    }

    /// Note a reference to `name` from the innermost context.
    ///
    /// A name bound by an open block is settled here: local when the block
    /// belongs to the innermost context, otherwise an upvar of every context
    /// between the owner and the reference. Anything else is classified on
    /// exit against function-wide bindings.
    fn reference(&mut self, name: &str) {
        match self.block_owner(name) {
            Some(owner) => {
                for frame in &mut self.frames[owner + 1..] {
                    frame.captured.insert(name.to_string());
                }
            }
            None => {
                if let Some(frame) = self.frames.last_mut() {
                    frame.refs.insert(name.to_string());
                }
            }
        }
    }

    /// Index of the frame whose open blocks bind `name`, searching outward
    /// and stopping at the first context that binds it function-wide.
    fn block_owner(&self, name: &str) -> Option<usize> {
        for (index, frame) in self.frames.iter().enumerate().rev() {
            if frame.blocks.iter().any(|block| block.contains(name)) {
                return Some(index);
            }
            if self.table.scope(frame.scope).binds(name) {
                return None;
            }
        }
        None
    }

    fn exit(&mut self, id: NodeId, node: &Node) {
        if let Some(label) = labels::exit_label(&self.table, node) {
            self.set_src_name(id, label);
        }
        tracing::trace!(depth = self.depth, node = %id, kind = %node.kind(), "exit");
        self.depth -= 1;
    }

    fn set_src_name(&mut self, id: NodeId, label: String) {
        if let Some(info) = self.table.info_mut(id) {
            info.src_name = Some(label);
        }
    }

    /// Register the declarations made by `id` in the current context.
    fn declare(&mut self, id: NodeId) {
        let Some(scope) = self.frames.last().map(|frame| frame.scope) else {
            return;
        };
        for declaration in hoist::declarations_of(self.tree, id) {
            self.record(scope, declaration);
        }
    }

    fn record(&mut self, scope: ScopeId, (name, node, kind): Declaration) {
        match kind {
            BindingKind::Var => {
                self.table.scope_mut(scope).vars.insert(name, node);
            }
            BindingKind::Lexical if self.config.track_lexical_bindings => {
                self.table.scope_mut(scope).lexicals.insert(name, node);
            }
            BindingKind::Lexical => {}
        }
    }

    fn enter_context(&mut self, id: NodeId, node: &Node) {
        let parent = self.frames.last().map(|frame| frame.scope);
        let binds_arguments = matches!(
            node.kind(),
            NodeKind::FunctionDeclaration | NodeKind::FunctionExpression
        );
        let mut scope = FunctionScope::new(id, parent, binds_arguments);

        if let Some(params) = node.data("params").and_then(Json::as_array) {
            for param in params {
                for name in hoist::pattern_names(param) {
                    scope.vars.insert(name, id);
                }
            }
        }
        if matches!(node.kind(), NodeKind::FunctionExpression) {
            if let Some(name) = hoist::name_of(node) {
                scope.vars.entry(name).or_insert(id);
            }
        }

        let scope = self.table.push_scope(scope);
        for declaration in hoist::hoisted_declarations(self.tree, id) {
            self.record(scope, declaration);
        }
        if hoist::detect_strict(self.tree, id) {
            if let Some(info) = self.table.info_mut(id) {
                info.strict = Some(true);
            }
        }
        self.frames.push(Frame {
            scope,
            refs: FxHashSet::default(),
            blocks: Vec::new(),
            captured: FxHashSet::default(),
        });
    }

    /// Classify every referenced name as local, upvar or freevar, and hand
    /// anything not local to the enclosing context. Block-bound captures
    /// were classified when referenced and stay here.
    fn exit_context(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let mut upvars = frame.captured;
        let mut freevars = FxHashSet::default();
        for name in frame.refs {
            match self.table.resolve(frame.scope, &name) {
                Resolution::Local(_) => continue,
                Resolution::Upvar { .. } => upvars.insert(name.clone()),
                Resolution::Free => freevars.insert(name.clone()),
            };
            if let Some(parent) = self.frames.last_mut() {
                parent.refs.insert(name);
            }
        }
        tracing::trace!(
            scope = ?frame.scope,
            upvars = upvars.len(),
            freevars = freevars.len(),
            "classified captures"
        );
        let scope = self.table.scope_mut(frame.scope);
        scope.upvars = upvars;
        scope.freevars = freevars;
    }
}

#[cfg(test)]
mod tests;
