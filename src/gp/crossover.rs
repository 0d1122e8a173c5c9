//! Subtree crossover.
//!
//! Rule nodes of both parents are indexed by symbol. A symbol present in
//! both is picked uniformly, one occurrence per parent is picked uniformly,
//! and the two subtrees are swapped. Same-symbol subtrees always fit each
//! other's slot, so both children stay valid derivations.

use crate::gp::genome::Genome;
use crate::grammar::Symbol;
use crate::tree::{MAX_TREE_DEPTH, Path, Tree};
use log::{debug, warn};
use rand::Rng;
use std::collections::BTreeMap;

/// Paths of every rule node in `tree`, grouped by symbol.
fn rule_index(tree: &Tree) -> BTreeMap<Symbol, Vec<Path>> {
    let mut index: BTreeMap<Symbol, Vec<Path>> = BTreeMap::new();
    for (path, node) in tree.nodes_with_paths() {
        if node.symbol().is_rule() && !node.is_leaf() {
            index.entry(node.symbol()).or_default().push(path);
        }
    }
    index
}

fn pick<'a, T, R: Rng + ?Sized>(items: &'a [T], rng: &mut R) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        Some(&items[rng.gen_range(0..items.len())])
    }
}

/// Swap one same-symbol subtree between `a` and `b`.
///
/// When the parents share no rule symbol, or a child would exceed the depth
/// ceiling, both parents are returned unchanged with their fitness.
/// Otherwise both children come back unevaluated.
#[must_use]
pub fn crossover<R: Rng + ?Sized>(a: &Genome, b: &Genome, rng: &mut R) -> (Genome, Genome) {
    let index_a = rule_index(a.tree());
    let index_b = rule_index(b.tree());
    let shared: Vec<Symbol> = index_a
        .keys()
        .filter(|s| index_b.contains_key(s))
        .copied()
        .collect();

    let Some(symbol) = pick(&shared, rng) else {
        debug!("crossover: no shared rule, returning parents");
        return (a.clone(), b.clone());
    };
    let (Some(path_a), Some(path_b)) = (
        index_a.get(symbol).and_then(|paths| pick(paths, rng)),
        index_b.get(symbol).and_then(|paths| pick(paths, rng)),
    ) else {
        return (a.clone(), b.clone());
    };
    let (Some(sub_a), Some(sub_b)) = (a.tree().node_at(path_a), b.tree().node_at(path_b)) else {
        return (a.clone(), b.clone());
    };

    match (
        a.tree().replace_at(path_a, sub_b.clone()),
        b.tree().replace_at(path_b, sub_a.clone()),
    ) {
        (Ok(ta), Ok(tb)) if ta.depth() <= MAX_TREE_DEPTH && tb.depth() <= MAX_TREE_DEPTH => {
            debug!("crossover on {symbol}: {path_a} <-> {path_b}");
            (Genome::new(ta), Genome::new(tb))
        }
        (Ok(_), Ok(_)) => {
            debug!("crossover on {symbol} exceeds depth limit, returning parents");
            (a.clone(), b.clone())
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!("crossover failed, returning parents: {e}");
            (a.clone(), b.clone())
        }
    }
}
