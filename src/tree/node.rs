//! Derivation-tree nodes.

use crate::grammar::Symbol;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// One node of a derivation tree.
///
/// A node with children is a rule node. A childless node with a literal is a
/// terminal. A childless node without a literal is a rule-leaf (a rule that
/// derived nothing). Nodes own their children outright; nothing is shared
/// between trees.
///
/// The `audible` flag is computed once at construction: a sound atom is
/// audible, and any other node is audible when one of its children is.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "NodeRepr")]
pub struct Node {
    symbol: Symbol,
    children: Vec<Node>,
    literal: Option<String>,
    audible: bool,
}

impl Node {
    /// Build a rule node over `children`.
    #[must_use]
    pub fn rule(symbol: Symbol, children: Vec<Node>) -> Self {
        let audible = symbol == Symbol::SoundAtom || children.iter().any(Node::is_audible);
        Self {
            symbol,
            children,
            literal: None,
            audible,
        }
    }

    /// Build a terminal carrying the exact token text.
    #[must_use]
    pub fn terminal(symbol: Symbol, literal: impl Into<String>) -> Self {
        Self {
            symbol,
            children: Vec::new(),
            literal: Some(literal.into()),
            audible: false,
        }
    }

    /// Build a rule-leaf: a rule with no derived content.
    #[must_use]
    pub fn leaf(symbol: Symbol) -> Self {
        Self {
            symbol,
            children: Vec::new(),
            literal: None,
            audible: symbol == Symbol::SoundAtom,
        }
    }

    /// The grammar symbol labelling this node.
    #[must_use]
    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Ordered children.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Token text for terminals.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }

    /// Whether this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether this node is a terminal (leaf with a literal).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.children.is_empty() && self.literal.is_some()
    }

    /// Whether this subtree produces sound on its own.
    #[must_use]
    pub fn is_audible(&self) -> bool {
        self.audible
    }

    /// 1 for a leaf, otherwise 1 + the deepest child.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Node::depth).max().unwrap_or(0)
    }

    /// Number of nodes in this subtree.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Node::size).sum::<usize>()
    }

    /// Take the children out of this node.
    #[must_use]
    pub fn into_children(self) -> Vec<Node> {
        self.children
    }

    /// Copy of this node with a different literal. Only meaningful for
    /// terminals.
    #[must_use]
    pub fn with_literal(&self, literal: impl Into<String>) -> Self {
        Self {
            literal: Some(literal.into()),
            ..self.clone()
        }
    }
}

// Equality is structural over symbol, children and literal. The audible flag
// is derived from those and never compared.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
            && self.literal == other.literal
            && self.children == other.children
    }
}

impl Eq for Node {}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Node", 3)?;
        state.serialize_field("symbol", &self.symbol)?;
        state.serialize_field("children", &self.children)?;
        state.serialize_field("literal", &self.literal)?;
        state.end()
    }
}

/// Wire form of a node; the audible flag is recomputed on load.
#[derive(Deserialize)]
struct NodeRepr {
    symbol: Symbol,
    #[serde(default)]
    children: Vec<Node>,
    #[serde(default)]
    literal: Option<String>,
}

impl From<NodeRepr> for Node {
    fn from(repr: NodeRepr) -> Self {
        match repr.literal {
            Some(literal) if repr.children.is_empty() => Node::terminal(repr.symbol, literal),
            _ if repr.children.is_empty() => Node::leaf(repr.symbol),
            _ => Node::rule(repr.symbol, repr.children),
        }
    }
}
