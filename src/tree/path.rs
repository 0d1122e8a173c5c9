//! Child-index paths into a tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequence of child indices leading from the root to a node.
///
/// The empty path addresses the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path(Vec<usize>);

impl Path {
    /// The root path.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path to the `index`-th child of the node at `self`.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path to the parent, or `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// Index of this node within its parent, or `None` at the root.
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Whether this is the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of steps from the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path has no steps. Same as [`Path::is_root`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The raw indices.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_and_parent() {
        let root = Path::root();
        let p = root.child(1).child(3);
        assert_eq!(p.as_slice(), &[1, 3]);
        assert_eq!(p.last(), Some(3));
        assert_eq!(p.parent(), Some(Path::from(vec![1])));
        assert_eq!(root.parent(), None);
        assert!(root.is_root());
    }

    #[test]
    fn test_display() {
        assert_eq!(Path::root().to_string(), "/");
        assert_eq!(Path::from(vec![0, 2]).to_string(), "/0/2");
    }
}
