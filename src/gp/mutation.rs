//! Structural mutation operators.
//!
//! Each operator is a pure function from a tree (plus the catalog and a
//! random source) to a new tree, and belongs to exactly one [`Category`]:
//!
//! - **Grow** operators wrap or extend the tree; size and depth never drop.
//! - **Value** operators rewrite terminal literals only; size and depth are
//!   unchanged.
//! - **Shrink** operators replace a composite subtree with one of its own
//!   operands; size never grows.
//!
//! Every operator builds its output from [`crate::grammar::shapes`], so a
//! valid input always yields a valid derivation. An operator that finds
//! nowhere to apply returns its input unchanged.

mod grow;
mod substitute;
mod truncate;

use crate::error::MutationError;
use crate::grammar::Catalog;
use crate::tree::{MAX_TREE_DEPTH, Tree};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Structural effect class of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Increases size and depth.
    Grow,
    /// Rewrites literals in place.
    Value,
    /// Collapses a combinator to one of its operands.
    Shrink,
}

/// The closed set of mutation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `stack [tree, seed]`
    StackWrap,
    /// `overlay (a) (b)` with tree and seed in random order.
    OverlayWrap,
    /// `append`/`fastAppend (a) (b)` with tree and seed in random order.
    AppendWrap,
    /// `struct ("t f ...") (tree)`
    Struct,
    /// `euclid (p) (s) (tree)`, optionally under `rev`/`fast 2`/`slow 2`/`iter 2`.
    Euclid,
    /// `tree # n (scale "..." "...")`, plus a sound when the tree is silent.
    ScaleWrap,
    /// `tree # n "..."`, plus a sound when the tree is silent.
    NoteWrap,
    /// `fast k (tree)` or `slow k (tree)`.
    Speed,
    /// `striate (n) (tree)`
    Striate,
    /// Append 1-3 seeds to an existing list combinator.
    StackEnrich,
    /// Re-roll sample, note, scale and degree literals.
    TerminalSubstitution,
    /// Replace a combinator with one of its operands.
    Truncate,
}

impl Operator {
    /// Every operator.
    pub const ALL: [Operator; 12] = [
        Operator::StackWrap,
        Operator::OverlayWrap,
        Operator::AppendWrap,
        Operator::Struct,
        Operator::Euclid,
        Operator::ScaleWrap,
        Operator::NoteWrap,
        Operator::Speed,
        Operator::Striate,
        Operator::StackEnrich,
        Operator::TerminalSubstitution,
        Operator::Truncate,
    ];

    /// Structural effect class.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Operator::TerminalSubstitution => Category::Value,
            Operator::Truncate => Category::Shrink,
            _ => Category::Grow,
        }
    }

    /// Stable `snake_case` name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Operator::StackWrap => "stack_wrap",
            Operator::OverlayWrap => "overlay_wrap",
            Operator::AppendWrap => "append_wrap",
            Operator::Struct => "struct",
            Operator::Euclid => "euclid",
            Operator::ScaleWrap => "scale_wrap",
            Operator::NoteWrap => "note_wrap",
            Operator::Speed => "speed",
            Operator::Striate => "striate",
            Operator::StackEnrich => "stack_enrich",
            Operator::TerminalSubstitution => "terminal_substitution",
            Operator::Truncate => "truncate",
        }
    }

    /// Operators of `category` within `allowed`, in `allowed` order.
    #[must_use]
    pub fn in_category(allowed: &[Operator], category: Category) -> Vec<Operator> {
        allowed
            .iter()
            .copied()
            .filter(|op| op.category() == category)
            .collect()
    }

    /// Apply this operator to `tree`.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::DepthLimit`] if the result would be deeper
    /// than [`MAX_TREE_DEPTH`]. Finding no applicable site is not an error.
    pub fn apply<R: Rng + ?Sized>(
        self,
        tree: &Tree,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<Tree, MutationError> {
        let result = match self {
            Operator::StackWrap => grow::stack_wrap(tree, catalog, rng),
            Operator::OverlayWrap => grow::overlay_wrap(tree, catalog, rng),
            Operator::AppendWrap => grow::append_wrap(tree, catalog, rng),
            Operator::Struct => grow::struct_wrap(tree, catalog, rng),
            Operator::Euclid => grow::euclid_wrap(tree, catalog, rng),
            Operator::ScaleWrap => grow::scale_wrap(tree, catalog, rng),
            Operator::NoteWrap => grow::note_wrap(tree, catalog, rng),
            Operator::Speed => grow::speed(tree, catalog, rng),
            Operator::Striate => grow::striate(tree, catalog, rng),
            Operator::StackEnrich => grow::stack_enrich(tree, catalog, rng)?,
            Operator::TerminalSubstitution => substitute::terminal_substitution(tree, catalog, rng),
            Operator::Truncate => truncate::truncate(tree, rng)?,
        };

        let depth = result.depth();
        if depth > MAX_TREE_DEPTH {
            return Err(MutationError::DepthLimit {
                depth,
                limit: MAX_TREE_DEPTH,
            });
        }
        Ok(result)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string does not name an operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mutation operator: {0}")]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.name() == s)
            .ok_or_else(|| UnknownOperator(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Symbol, parse, round_trips};
    use crate::gp::seeds::random_seed;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_categories() {
        let grow = Operator::in_category(&Operator::ALL, Category::Grow);
        assert_eq!(grow.len(), 10);
        assert_eq!(
            Operator::in_category(&Operator::ALL, Category::Value),
            vec![Operator::TerminalSubstitution]
        );
        assert_eq!(
            Operator::in_category(&Operator::ALL, Category::Shrink),
            vec![Operator::Truncate]
        );
    }

    #[test]
    fn test_names_round_trip() {
        for op in Operator::ALL {
            assert_eq!(op.name().parse::<Operator>().unwrap(), op);
        }
        assert!("jux".parse::<Operator>().is_err());
    }

    #[test]
    fn test_serde_names_match_display() {
        for op in Operator::ALL {
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{op}\""));
        }
    }

    #[test]
    fn test_every_operator_keeps_trees_valid() {
        let catalog = Catalog::default();
        let mut rng = SmallRng::seed_from_u64(1234);
        for op in Operator::ALL {
            let mut tree = random_seed(&catalog, &mut rng);
            for _ in 0..6 {
                tree = op.apply(&tree, &catalog, &mut rng).unwrap();
                assert!(round_trips(&tree), "{op}: {tree}");
            }
        }
    }

    #[test]
    fn test_depth_limit_rejected() {
        let catalog = Catalog::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut tree = parse(r#"s("bd")"#).unwrap();
        let mut hit_limit = false;
        for _ in 0..MAX_TREE_DEPTH {
            match Operator::Striate.apply(&tree, &catalog, &mut rng) {
                Ok(next) => tree = next,
                Err(MutationError::DepthLimit { depth, limit }) => {
                    assert_eq!(limit, MAX_TREE_DEPTH);
                    assert!(depth > limit);
                    hit_limit = true;
                    break;
                }
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert!(hit_limit);
        assert!(tree.depth() <= MAX_TREE_DEPTH);
        assert_eq!(tree.symbol(), Symbol::StriatePlayable);
    }
}
