//! Warden IR - Syntax tree arena for the Warden interpreter.
//!
//! An external parser hands Warden an ESTree-shaped JSON document. This crate
//! lowers that document into a flat arena ([`SyntaxTree`]) so later passes can
//! refer to nodes by [`NodeId`] instead of by pointer.
//!
//! # Numbering
//!
//! Node ids are assigned in the scope annotator's traversal pre-order, which
//! is *not* plain field order: call expressions number their arguments before
//! their callee, loops number their test before their body, and so on (see
//! [`tree`]). Downstream consumers rely on that numbering being stable.
//!
//! # Shape Preservation
//!
//! Fields the traversal never descends into (`loc`, `regex`, declarator ids,
//! function parameters, ...) are kept verbatim as [`Field::Data`], so
//! [`SyntaxTree::to_json`] reproduces the input document.

mod kind;
mod node_id;
mod stack;
pub mod tree;

pub use kind::NodeKind;
pub use node_id::NodeId;
pub use stack::ensure_sufficient_stack;
pub use tree::{Field, Node, SyntaxTree, TreeError};
