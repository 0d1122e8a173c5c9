//! Seed patterns.
//!
//! Seeds are tiny valid trees built directly from shape constructors (no
//! text round trip), used as the starting point for growth and as the fresh
//! material that grow operators splice in.

use crate::grammar::shapes::{self, BinaryHead, ListHead, NoteFn, Prefix};
use crate::grammar::{Anchor, Catalog, Symbol};
use crate::tree::{Node, Tree};
use rand::Rng;

/// Sample used when a pool draw yields nothing.
const FALLBACK_SOUND: &str = "bd";

/// Smallest valid pattern: `s("bd")`.
#[must_use]
pub fn fallback_seed() -> Tree {
    Tree::new(shapes::sound_atom(FALLBACK_SOUND))
}

/// Random seed: a sound atom, a sound with a note pattern, or a stack of
/// 2-3 sounds, with equal probability.
pub fn random_seed<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Tree {
    seed_node(catalog, rng).map_or_else(fallback_seed, Tree::new)
}

/// Seed as a bare node, for splicing into a larger tree.
pub(crate) fn seed_node<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Option<Node> {
    match rng.gen_range(0..3) {
        0 => sound(catalog, rng),
        1 => {
            let base = sound(catalog, rng)?;
            let pattern = catalog.note_pattern(rng);
            Some(shapes::chain(base, vec![shapes::note_atom(NoteFn::N, &pattern)]))
        }
        _ => {
            let count = rng.gen_range(2..=3);
            let sounds = (0..count)
                .map(|_| sound(catalog, rng))
                .collect::<Option<Vec<_>>>()?;
            Some(shapes::lists(ListHead::Stack, sounds))
        }
    }
}

fn sound<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Option<Node> {
    catalog.sound(rng).map(shapes::sound_atom)
}

fn sound_or_fallback<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Node {
    sound(catalog, rng).unwrap_or_else(|| shapes::sound_atom(FALLBACK_SOUND))
}

/// Minimal tree rooted at `anchor`.
///
/// Wrapper anchors wrap a single sound atom; note atoms carry a fresh note
/// pattern; chains pair a sound with a note pattern.
pub fn anchored_seed<R: Rng + ?Sized>(anchor: Anchor, catalog: &Catalog, rng: &mut R) -> Tree {
    let body = sound_or_fallback(catalog, rng);
    let node = match anchor.symbol() {
        Symbol::SoundAtom => body,
        Symbol::NoteAtom => shapes::note_atom(NoteFn::N, &catalog.note_pattern(rng)),
        Symbol::ControlPattern => {
            let note = shapes::note_atom(NoteFn::N, &catalog.note_pattern(rng));
            shapes::chain(body, vec![note])
        }
        Symbol::ListsPlayable => {
            let second = sound_or_fallback(catalog, rng);
            shapes::lists(ListHead::Stack, vec![body, second])
        }
        Symbol::PlayableTerm => {
            if rng.gen_bool(0.5) {
                shapes::prefixed(Prefix::Rev, body)
            } else {
                let other = sound_or_fallback(catalog, rng);
                shapes::binary(BinaryHead::Overlay, body, other)
            }
        }
        Symbol::MaskPlayable => shapes::mask(&catalog.mask(rng), body),
        Symbol::EuclidPlayable => {
            let steps = catalog.euclid_steps(rng).unwrap_or(8);
            let pulses = rng.gen_range(1..=steps);
            shapes::euclid(pulses, steps, body)
        }
        Symbol::StriatePlayable => {
            let n = catalog.striate_count(rng).unwrap_or(2);
            shapes::striate(n, body)
        }
        // The catalog only hands out the anchors matched above.
        _ => body,
    };
    Tree::new(node)
}
