//! Warden Scope - Static scope and closure annotation.
//!
//! Walks a [`SyntaxTree`] once and records, per node, what the interpreter
//! needs before it can run anything:
//!
//! - hoisted `var` and function declarations of every function context,
//! - which referenced names are captured from an enclosing function
//!   (`upvars`) and which resolve nowhere (`freevars`),
//! - `"use strict"` directives,
//! - statement labels,
//! - short source reconstructions (`srcName`) used in error messages.
//!
//! The result is a [`ScopeTable`] side table; the tree is never mutated.
//! [`annotate_in_place`] exists for callers that want the annotations
//! written back onto the JSON document instead.

mod annotator;
mod hoist;
mod labels;
mod table;

#[cfg(test)]
mod test_helpers;

pub use annotator::{Annotator, AnnotatorConfig};
pub use table::{FunctionScope, NodeInfo, Resolution, ScopeId, ScopeTable};

use serde_json::Value as Json;
use warden_ir::{SyntaxTree, TreeError};

/// Annotate `tree` with the default configuration.
pub fn annotate(tree: &SyntaxTree) -> ScopeTable {
    Annotator::new().annotate(tree)
}

/// Annotate `tree` with an explicit configuration.
pub fn annotate_with(tree: &SyntaxTree, config: &AnnotatorConfig) -> ScopeTable {
    Annotator::with_config(config.clone()).annotate(tree)
}

/// Lower an ESTree document and annotate it.
pub fn annotate_json(document: &Json) -> Result<(SyntaxTree, ScopeTable), TreeError> {
    let tree = SyntaxTree::from_json(document)?;
    let table = annotate(&tree);
    Ok((tree, table))
}

/// Annotate an ESTree document and write `nodeId`, `srcName`, `strict`,
/// `label`, `vars`, `funcs`, `lexicals`, `upvars` and `freevars` onto its
/// node objects.
pub fn annotate_in_place(document: &mut Json) -> Result<ScopeTable, TreeError> {
    let (tree, table) = annotate_json(document)?;
    *document = tree.to_json_with(|id, map| table.write_annotations(id, map));
    Ok(table)
}
