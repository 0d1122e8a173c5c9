// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! tidal-gp: grammar-constrained evolution of Tidal-style control patterns.
//!
//! Patterns are held as derivation trees of a small pest grammar. A closed
//! set of structural mutation operators rewrites those trees so that every
//! result is again a legal derivation, and a genetic-programming loop
//! (selection, crossover, mutation, elitism) drives a population of them
//! toward higher fitness.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   gp: evolution, genome, operators  │
//! ├─────────────────────────────────────┤
//! │   tree: Node, Path, Tree            │
//! ├─────────────────────────────────────┤
//! │   grammar: Symbol, parse, render    │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use tidal_gp::grammar::{parse, render};
//!
//! let tree = parse(r#"stack [s("bd"), s("sn") # n "0 4"]"#)?;
//! assert_eq!(tree.size(), 22);
//! assert_eq!(render(&tree), r#"stack [s("bd"), s("sn") # n "0 4"]"#);
//! # Ok::<(), tidal_gp::error::ParseError>(())
//! ```

pub mod error;
pub mod gp;
pub mod grammar;
pub mod tree;

pub use error::{CatalogError, MutationError, ParseError, TreeError};
pub use gp::{Genome, Operator, Population};
pub use grammar::{Catalog, Symbol, parse, render};
pub use tree::{MAX_TREE_DEPTH, Node, Path, Tree};
