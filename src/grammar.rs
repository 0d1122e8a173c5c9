//! Pattern-language grammar.
//!
//! Symbols, the anchor/value catalog, the pest-derived parser, the renderer
//! and the typed shape constructors the mutation operators build with.
//!
//! The grammar covers the control-pattern subset the engine produces:
//!
//! ```text
//! s("bd") # n "0 4"
//! stack [s("bd"), s("sn")]
//! overlay (s("hh")) (fast 2 (s("bd")))
//! euclid (3) (8) (struct ("t f t t") (s("sn")))
//! s("superpiano") # n (scale "major" "0 2 4")
//! ```

mod catalog;
mod codegen;
mod parser;
pub mod shapes;
mod symbol;

pub use catalog::{Anchor, Catalog, Pools};
pub use codegen::{render, render_node, round_trips};
pub use parser::parse;
pub use symbol::{Symbol, UnknownSymbol};
