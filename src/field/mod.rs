//! Field resolution against heterogeneous object shapes.
//!
//! Objects expose themselves as a `Node` tree through `FieldSource`; a `FieldPath`
//! walks that tree, matching each step by wire name and then by native name.

mod node;
mod path;

pub use node::{Field, FieldSource, Node, Record};
pub use path::{FieldPath, Step};

/// Resolves `path` against `source`, cloning the addressed value. Missing steps yield `Node::Null`.
#[must_use]
pub fn resolve<S: FieldSource + ?Sized>(source: &S, path: &FieldPath) -> Node {
    let tree = source.to_node();
    path.resolve(&tree).cloned().unwrap_or(Node::Null)
}
