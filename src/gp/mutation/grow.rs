//! Grow operators.
//!
//! All but stack-enrich wrap the whole tree, so the old root becomes a
//! proper subtree of the new one.

use crate::error::MutationError;
use crate::gp::seeds;
use crate::grammar::shapes::{self, BinaryHead, ListHead, NoteFn, Prefix};
use crate::grammar::{Catalog, Symbol};
use crate::tree::{Node, Tree};
use rand::Rng;

/// Outer transforms for euclid; `None` leaves the euclid node as the root.
const EUCLID_TRANSFORMS: [Option<Prefix>; 5] = [
    None,
    Some(Prefix::Rev),
    Some(Prefix::Fast(2.0)),
    Some(Prefix::Slow(2.0)),
    Some(Prefix::Iter(2)),
];

fn fresh_branch<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Node {
    seeds::seed_node(catalog, rng).unwrap_or_else(|| seeds::fallback_seed().into_root())
}

fn root(tree: &Tree) -> Node {
    tree.root().clone()
}

/// Randomly ordered pair of the existing root and a fresh branch.
fn shuffled_pair<R: Rng + ?Sized>(tree: &Tree, catalog: &Catalog, rng: &mut R) -> (Node, Node) {
    let branch = fresh_branch(catalog, rng);
    if rng.gen_bool(0.5) {
        (root(tree), branch)
    } else {
        (branch, root(tree))
    }
}

pub(super) fn stack_wrap<R: Rng + ?Sized>(tree: &Tree, catalog: &Catalog, rng: &mut R) -> Tree {
    let branch = fresh_branch(catalog, rng);
    Tree::new(shapes::lists(ListHead::Stack, vec![root(tree), branch]))
}

pub(super) fn overlay_wrap<R: Rng + ?Sized>(tree: &Tree, catalog: &Catalog, rng: &mut R) -> Tree {
    let (left, right) = shuffled_pair(tree, catalog, rng);
    Tree::new(shapes::binary(BinaryHead::Overlay, left, right))
}

pub(super) fn append_wrap<R: Rng + ?Sized>(tree: &Tree, catalog: &Catalog, rng: &mut R) -> Tree {
    let head = if rng.gen_bool(0.5) {
        BinaryHead::Append
    } else {
        BinaryHead::FastAppend
    };
    let (left, right) = shuffled_pair(tree, catalog, rng);
    Tree::new(shapes::binary(head, left, right))
}

pub(super) fn struct_wrap<R: Rng + ?Sized>(tree: &Tree, catalog: &Catalog, rng: &mut R) -> Tree {
    let bits = catalog.mask(rng);
    Tree::new(shapes::mask(&bits, root(tree)))
}

pub(super) fn euclid_wrap<R: Rng + ?Sized>(tree: &Tree, catalog: &Catalog, rng: &mut R) -> Tree {
    let steps = catalog.euclid_steps(rng).unwrap_or(8);
    let pulses = rng.gen_range(1..=steps);
    let euclid = shapes::euclid(pulses, steps, root(tree));
    match EUCLID_TRANSFORMS[rng.gen_range(0..EUCLID_TRANSFORMS.len())] {
        None => Tree::new(euclid),
        Some(prefix) => Tree::new(shapes::prefixed(prefix, euclid)),
    }
}

/// Chain `modifier` onto the root, adding a sound when the root is silent.
fn chain_modifier<R: Rng + ?Sized>(
    tree: &Tree,
    modifier: Node,
    catalog: &Catalog,
    rng: &mut R,
) -> Tree {
    let base = root(tree);
    let mut operands = vec![modifier];
    if !base.is_audible() {
        let sample = catalog.sound(rng).unwrap_or("bd");
        operands.push(shapes::sound_atom(sample));
    }
    Tree::new(shapes::chain(base, operands))
}

pub(super) fn scale_wrap<R: Rng + ?Sized>(tree: &Tree, catalog: &Catalog, rng: &mut R) -> Tree {
    let scale = catalog.scale(rng).unwrap_or("major").to_string();
    let degrees = catalog.degree_pattern(rng);
    let modifier = shapes::scale_note_atom(&scale, &degrees);
    chain_modifier(tree, modifier, catalog, rng)
}

pub(super) fn note_wrap<R: Rng + ?Sized>(tree: &Tree, catalog: &Catalog, rng: &mut R) -> Tree {
    let func = if rng.gen_bool(0.5) { NoteFn::N } else { NoteFn::Note };
    let pattern = catalog.note_pattern(rng);
    let modifier = shapes::note_atom(func, &pattern);
    chain_modifier(tree, modifier, catalog, rng)
}

pub(super) fn speed<R: Rng + ?Sized>(tree: &Tree, catalog: &Catalog, rng: &mut R) -> Tree {
    let factor = catalog.speed_factor(rng).unwrap_or(2.0);
    let prefix = if rng.gen_bool(0.5) {
        Prefix::Fast(factor)
    } else {
        Prefix::Slow(factor)
    };
    Tree::new(shapes::prefixed(prefix, root(tree)))
}

pub(super) fn striate<R: Rng + ?Sized>(tree: &Tree, catalog: &Catalog, rng: &mut R) -> Tree {
    let n = catalog.striate_count(rng).unwrap_or(2);
    Tree::new(shapes::striate(n, root(tree)))
}

pub(super) fn stack_enrich<R: Rng + ?Sized>(
    tree: &Tree,
    catalog: &Catalog,
    rng: &mut R,
) -> Result<Tree, MutationError> {
    let lists = tree.find_paths(|n| n.symbol() == Symbol::ListPlayable);
    if lists.is_empty() {
        return Ok(tree.clone());
    }
    let path = &lists[rng.gen_range(0..lists.len())];
    let Some(list) = tree.node_at(path) else {
        return Ok(tree.clone());
    };

    let mut elements = list.children().to_vec();
    let extra = rng.gen_range(1..=3);
    elements.extend((0..extra).map(|_| fresh_branch(catalog, rng)));

    Ok(tree.replace_at(path, Node::rule(Symbol::ListPlayable, elements))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{parse, round_trips};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn catalog() -> Catalog {
        Catalog::default()
    }

    #[test]
    fn test_stack_wrap_shape() {
        let mut rng = SmallRng::seed_from_u64(1);
        let tree = parse(r#"s("bd")"#).unwrap();
        let wrapped = stack_wrap(&tree, &catalog(), &mut rng);

        assert_eq!(wrapped.symbol(), Symbol::ListsPlayable);
        let list = &wrapped.root().children()[1];
        assert_eq!(list.children().len(), 2);
        assert_eq!(&list.children()[0], tree.root());
        assert!(round_trips(&wrapped));
    }

    #[test]
    fn test_binary_wraps_randomize_order() {
        let mut rng = SmallRng::seed_from_u64(2);
        let tree = parse(r#"n "0 1 2" # s("superpiano")"#).unwrap();
        let mut left = 0;
        let mut right = 0;
        for _ in 0..100 {
            let wrapped = overlay_wrap(&tree, &catalog(), &mut rng);
            let children = wrapped.root().children();
            if &children[1] == tree.root() {
                left += 1;
            } else {
                assert_eq!(&children[2], tree.root());
                right += 1;
            }
        }
        assert!(left > 20 && right > 20, "left={left} right={right}");
    }

    #[test]
    fn test_append_heads() {
        let mut rng = SmallRng::seed_from_u64(3);
        let tree = parse(r#"s("hh")"#).unwrap();
        for _ in 0..20 {
            let wrapped = append_wrap(&tree, &catalog(), &mut rng);
            let head = wrapped.root().children()[0].children()[0].symbol();
            assert!(matches!(head, Symbol::Append | Symbol::FastAppend));
        }
    }

    #[test]
    fn test_euclid_pulses_within_steps() {
        let mut rng = SmallRng::seed_from_u64(4);
        let tree = parse(r#"s("bd")"#).unwrap();
        for _ in 0..100 {
            let wrapped = euclid_wrap(&tree, &catalog(), &mut rng);
            assert!(round_trips(&wrapped), "{wrapped}");
            let euclid = wrapped
                .nodes_with_paths()
                .into_iter()
                .map(|(_, n)| n)
                .find(|n| n.symbol() == Symbol::EuclidPlayable)
                .unwrap()
                .clone();
            let int = |i: usize| -> u32 {
                euclid.children()[i].children()[0].literal().unwrap().parse().unwrap()
            };
            let (pulses, steps) = (int(2), int(5));
            assert!([8, 12, 16, 24, 32].contains(&steps));
            assert!((1..=steps).contains(&pulses));
        }
    }

    #[test]
    fn test_note_wrap_adds_sound_only_when_silent() {
        let mut rng = SmallRng::seed_from_u64(5);

        let audible = parse(r#"stack [s("bd"), s("sn")]"#).unwrap();
        let wrapped = note_wrap(&audible, &catalog(), &mut rng);
        assert_eq!(wrapped.root().children().len(), 3);

        let silent = parse(r#"n "0 4""#).unwrap();
        let wrapped = note_wrap(&silent, &catalog(), &mut rng);
        let children = wrapped.root().children();
        assert_eq!(children.len(), 5);
        assert_eq!(children[4].symbol(), Symbol::SoundAtom);
        assert!(wrapped.root().is_audible());
    }

    #[test]
    fn test_scale_wrap_extends_existing_chain() {
        let mut rng = SmallRng::seed_from_u64(6);
        let tree = parse(r#"s("bd") # n "0 4""#).unwrap();
        let wrapped = scale_wrap(&tree, &catalog(), &mut rng);
        assert_eq!(wrapped.symbol(), Symbol::ControlPattern);
        assert_eq!(wrapped.root().children().len(), 5);
        assert_eq!(wrapped.root().children()[4].children()[1].symbol(), Symbol::ScaleCtor);
        assert!(round_trips(&wrapped));
    }

    #[test]
    fn test_stack_enrich_without_lists_is_noop() {
        let mut rng = SmallRng::seed_from_u64(7);
        let tree = parse(r#"fast 2 (s("bd"))"#).unwrap();
        assert_eq!(stack_enrich(&tree, &catalog(), &mut rng).unwrap(), tree);
    }

    #[test]
    fn test_stack_enrich_appends_one_to_three() {
        let mut rng = SmallRng::seed_from_u64(8);
        let tree = parse(r#"rev (stack [s("bd"), s("sn")])"#).unwrap();
        for _ in 0..30 {
            let enriched = stack_enrich(&tree, &catalog(), &mut rng).unwrap();
            let list = &enriched.root().children()[1].children()[1];
            assert!((3..=5).contains(&list.children().len()));
            assert!(round_trips(&enriched));
        }
    }

    #[test]
    fn test_speed_factor_literals() {
        let mut rng = SmallRng::seed_from_u64(9);
        let tree = parse(r#"s("bd")"#).unwrap();
        for _ in 0..50 {
            let fast = speed(&tree, &catalog(), &mut rng);
            let factor = fast.root().children()[0].children()[1].literal().unwrap();
            assert!(["0.5", "1.5", "2", "3"].contains(&factor), "{factor}");
        }
    }
}
