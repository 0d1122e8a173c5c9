//! Error types shared across the grammar, tree and operator layers.
//!
//! Persistence and evolution errors live next to the code that raises them
//! ([`crate::gp::PersistenceError`], [`crate::gp::EvolutionError`]).

use crate::tree::Path;
use thiserror::Error;

/// Errors raised while parsing pattern text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text does not match the grammar.
    #[error("syntax error:\n{0}")]
    Syntax(String),
    /// The grammar produced a rule the tree builder does not know.
    #[error("unexpected grammar rule: {0}")]
    UnexpectedRule(String),
}

/// Errors raised by tree surgery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The path does not address a node of the tree.
    #[error("no node at path {0}")]
    InvalidPath(Path),
}

/// Errors raised when a mutation cannot produce an acceptable tree.
///
/// A mutation that finds nowhere to apply is not an error: it returns its
/// input unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    /// The result would exceed the hard depth ceiling.
    #[error("mutation result depth {depth} exceeds limit {limit}")]
    DepthLimit {
        /// Depth of the rejected result.
        depth: usize,
        /// The ceiling.
        limit: usize,
    },
    /// Tree surgery failed.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Errors raised when building a [`crate::grammar::Catalog`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// A value pool has no entries.
    #[error("value pool `{0}` is empty")]
    EmptyPool(&'static str),
    /// A min/max pair is inverted or out of bounds.
    #[error("invalid range for `{name}`: {min}..={max}")]
    InvalidRange {
        /// Name of the range.
        name: &'static str,
        /// Lower bound.
        min: usize,
        /// Upper bound.
        max: usize,
    },
    /// A numeric pool entry is unusable.
    #[error("invalid value in pool `{name}`: {value}")]
    InvalidValue {
        /// Name of the pool.
        name: &'static str,
        /// The offending value, as text.
        value: String,
    },
}
