//! Derivation trees.
//!
//! A [`Tree`] wraps a root [`Node`] and is immutable from the outside: every
//! transformation returns a new tree and leaves the original untouched.
//! Traversals are pre-order, root first, and that order is what every
//! "pick a random node" operation indexes into.

mod node;
mod path;
mod pretty;

pub use node::Node;
pub use path::Path;
pub use pretty::pretty;

use crate::error::TreeError;
use crate::grammar::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard ceiling on tree depth.
///
/// Every traversal in the crate is recursive, and checkpoints nest two JSON
/// levels per tree level, so depth is bounded well below the serializer's
/// recursion limit.
pub const MAX_TREE_DEPTH: usize = 48;

/// A derivation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree {
    root: Node,
}

impl Tree {
    /// Wrap a root node.
    #[must_use]
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Take the root node out of the tree.
    #[must_use]
    pub fn into_root(self) -> Node {
        self.root
    }

    /// 1 for a single leaf, otherwise 1 + the deepest child.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Total node count.
    #[must_use]
    pub fn size(&self) -> usize {
        self.root.size()
    }

    /// Symbol of the root node.
    #[must_use]
    pub fn symbol(&self) -> Symbol {
        self.root.symbol()
    }

    /// Every node paired with its path, in pre-order.
    #[must_use]
    pub fn nodes_with_paths(&self) -> Vec<(Path, &Node)> {
        let mut out = Vec::with_capacity(self.size());
        collect(&self.root, Path::root(), &mut out);
        out
    }

    /// Paths of all nodes matching `predicate`, in pre-order.
    pub fn find_paths<P>(&self, mut predicate: P) -> Vec<Path>
    where
        P: FnMut(&Node) -> bool,
    {
        self.nodes_with_paths()
            .into_iter()
            .filter(|(_, node)| predicate(node))
            .map(|(path, _)| path)
            .collect()
    }

    /// Node at `path`, if the path exists.
    #[must_use]
    pub fn node_at(&self, path: &Path) -> Option<&Node> {
        path.as_slice()
            .iter()
            .try_fold(&self.root, |node, &index| node.children().get(index))
    }

    /// New tree with the node at `path` replaced by `subtree`.
    ///
    /// Ancestors along the path are rebuilt so their derived metadata stays
    /// consistent; siblings are cloned.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidPath`] if `path` does not address a node.
    pub fn replace_at(&self, path: &Path, subtree: Node) -> Result<Tree, TreeError> {
        replaced(&self.root, path.as_slice(), subtree)
            .map(Tree::new)
            .ok_or_else(|| TreeError::InvalidPath(path.clone()))
    }
}

impl From<Node> for Tree {
    fn from(root: Node) -> Self {
        Self::new(root)
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::grammar::render(self))
    }
}

fn collect<'a>(node: &'a Node, path: Path, out: &mut Vec<(Path, &'a Node)>) {
    out.push((path.clone(), node));
    for (i, child) in node.children().iter().enumerate() {
        collect(child, path.child(i), out);
    }
}

fn replaced(node: &Node, path: &[usize], subtree: Node) -> Option<Node> {
    let Some((&index, rest)) = path.split_first() else {
        return Some(subtree);
    };
    let child = node.children().get(index)?;
    let new_child = replaced(child, rest, subtree)?;
    let mut children = node.children().to_vec();
    children[index] = new_child;
    Some(Node::rule(node.symbol(), children))
}
