//! Truncation: collapse a combinator onto one of its operands.

use crate::error::MutationError;
use crate::grammar::Symbol;
use crate::tree::{Node, Path, Tree};
use rand::Rng;
use rand::seq::SliceRandom;

/// Operands a combinator could be replaced by, or empty if `node` is not a
/// binary term or list combinator.
fn operands(node: &Node) -> &[Node] {
    match node.symbol() {
        Symbol::PlayableTerm
            if node.children().len() == 3
                && node.children()[0].symbol() == Symbol::BinaryNamed =>
        {
            &node.children()[1..]
        }
        Symbol::ListsPlayable => node.children().get(1).map_or(&[][..], Node::children),
        _ => &[],
    }
}

/// Whether `survivor` may occupy the slot below `parent`.
///
/// A chain base must be a playable; every other slot accepts any expression.
fn fits(parent: Option<&Node>, survivor: &Node) -> bool {
    match parent {
        Some(p) if p.symbol() == Symbol::ControlPattern => survivor.symbol().is_playable(),
        _ => survivor.symbol() == Symbol::ControlPattern || survivor.symbol().is_playable(),
    }
}

pub(super) fn truncate<R: Rng + ?Sized>(tree: &Tree, rng: &mut R) -> Result<Tree, MutationError> {
    let mut sites: Vec<(Path, Vec<&Node>)> = Vec::new();
    for (path, node) in tree.nodes_with_paths() {
        let parent = path.parent().and_then(|p| tree.node_at(&p));
        let survivors: Vec<&Node> = operands(node)
            .iter()
            .filter(|s| fits(parent, s))
            .collect();
        if !survivors.is_empty() {
            sites.push((path, survivors));
        }
    }

    let Some((path, survivors)) = sites.choose(rng) else {
        return Ok(tree.clone());
    };
    let Some(survivor) = survivors.choose(rng) else {
        return Ok(tree.clone());
    };
    Ok(tree.replace_at(path, (*survivor).clone())?)
}
