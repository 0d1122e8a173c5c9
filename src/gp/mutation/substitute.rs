//! Terminal substitution.

use crate::grammar::shapes::{quoted, unquoted};
use crate::grammar::{Catalog, Symbol};
use crate::tree::{Node, Tree};
use rand::Rng;
use rand::seq::SliceRandom;

/// Chance that each eligible terminal is re-rolled.
const SUBSTITUTION_PROBABILITY: f64 = 0.5;

/// Visit every node and independently re-roll sample names, note patterns,
/// scale names and scale-degree patterns. Shape is untouched.
pub(super) fn terminal_substitution<R: Rng + ?Sized>(
    tree: &Tree,
    catalog: &Catalog,
    rng: &mut R,
) -> Tree {
    Tree::new(substitute(tree.root(), catalog, rng))
}

fn substitute<R: Rng + ?Sized>(node: &Node, catalog: &Catalog, rng: &mut R) -> Node {
    if let Some(literal) = node.literal() {
        return match reroll(node.symbol(), literal, catalog, rng) {
            Some(replacement) => node.with_literal(replacement),
            None => node.clone(),
        };
    }
    if node.is_leaf() {
        return node.clone();
    }
    let children = node
        .children()
        .iter()
        .map(|child| substitute(child, catalog, rng))
        .collect();
    Node::rule(node.symbol(), children)
}

/// New quoted literal for an eligible terminal, or `None` to keep it.
fn reroll<R: Rng + ?Sized>(
    symbol: Symbol,
    literal: &str,
    catalog: &Catalog,
    rng: &mut R,
) -> Option<String> {
    let pools = catalog.pools();
    let eligible = matches!(
        symbol,
        Symbol::SampleString | Symbol::NoteString | Symbol::ScaleString | Symbol::DegreeString
    );
    if !eligible || !rng.gen_bool(SUBSTITUTION_PROBABILITY) {
        return None;
    }
    match symbol {
        Symbol::SampleString => pick_different(&pools.sounds, unquoted(literal), rng),
        Symbol::ScaleString => pick_different(&pools.scales, unquoted(literal), rng),
        Symbol::NoteString => Some(catalog.note_pattern(rng)),
        Symbol::DegreeString => Some(catalog.degree_pattern(rng)),
        _ => None,
    }
    .map(|value| quoted(&value))
}

/// Random pool entry, avoiding `current` when there is an alternative.
fn pick_different<R: Rng + ?Sized>(pool: &[String], current: &str, rng: &mut R) -> Option<String> {
    let others: Vec<&String> = pool.iter().filter(|v| v.as_str() != current).collect();
    if pool.len() > 1 && !others.is_empty() && others.len() < pool.len() {
        others.choose(rng).map(|v| (*v).clone())
    } else {
        pool.choose(rng).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Pools, parse, round_trips};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_shape_preserved() {
        let catalog = Catalog::default();
        let mut rng = SmallRng::seed_from_u64(21);
        let tree = parse(r#"stack [s("bd") # n "0 4", s("sn") # n (scale "major" "0 2")]"#).unwrap();
        for _ in 0..50 {
            let next = terminal_substitution(&tree, &catalog, &mut rng);
            assert_eq!(next.size(), tree.size());
            assert_eq!(next.depth(), tree.depth());
            assert!(round_trips(&next), "{next}");
        }
    }

    #[test]
    fn test_sample_prefers_different_value() {
        let pools = Pools {
            sounds: vec!["bd".to_string(), "sn".to_string()],
            ..Pools::default()
        };
        let catalog = Catalog::new(pools).unwrap();
        let mut rng = SmallRng::seed_from_u64(22);
        let tree = parse(r#"s("bd")"#).unwrap();
        let mut changed = 0;
        for _ in 0..100 {
            let next = terminal_substitution(&tree, &catalog, &mut rng);
            let text = next.to_string();
            assert!(text == r#"s("bd")"# || text == r#"s("sn")"#);
            if text == r#"s("sn")"# {
                changed += 1;
            }
        }
        // Re-roll chance is one half and a re-roll always changes the value.
        assert!((30..=70).contains(&changed), "changed={changed}");
    }

    #[test]
    fn test_single_entry_pool_keeps_value() {
        let pools = Pools {
            scales: vec!["minor".to_string()],
            ..Pools::default()
        };
        let catalog = Catalog::new(pools).unwrap();
        let mut rng = SmallRng::seed_from_u64(23);
        let tree = parse(r#"n (scale "minor" "0 1")"#).unwrap();
        for _ in 0..20 {
            let next = terminal_substitution(&tree, &catalog, &mut rng);
            assert!(next.to_string().contains("\"minor\""));
        }
    }

    #[test]
    fn test_structural_terminals_untouched() {
        let catalog = Catalog::default();
        let mut rng = SmallRng::seed_from_u64(24);
        let tree = parse(r#"euclid (3) (8) (struct ("t f t f") (s("bd")))"#).unwrap();
        for _ in 0..20 {
            let next = terminal_substitution(&tree, &catalog, &mut rng);
            let text = next.to_string();
            assert!(text.starts_with(r#"euclid (3) (8) (struct ("t f t f") (s("#));
        }
    }

    #[test]
    fn test_pick_different() {
        let pool = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut rng = SmallRng::seed_from_u64(25);
        for _ in 0..50 {
            assert_ne!(pick_different(&pool, "a", &mut rng).unwrap(), "a");
        }
        // A value outside the pool may map to anything in it.
        assert!(pick_different(&pool, "zz", &mut rng).is_some());
    }
}
