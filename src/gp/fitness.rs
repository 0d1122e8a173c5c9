//! Built-in structural fitness.
//!
//! Scores a pattern on shape alone, with no audio involved:
//!
//! - 0.4 × depth, saturating at depth 5
//! - 0.3 × distinct symbols, saturating at 10
//! - 0.3 × distinct samples, saturating at 4
//!
//! It is the evaluator the CLI uses when nothing perceptual is wired in, and
//! a deterministic stand-in for tests and benchmarks.

// Counts are small and converted to f64 for scoring
#![allow(clippy::cast_precision_loss)]

use crate::gp::genome::Genome;
use crate::grammar::Symbol;
use crate::grammar::shapes::unquoted;
use std::collections::BTreeSet;
use std::convert::Infallible;

const DEPTH_WEIGHT: f64 = 0.4;
const VARIETY_WEIGHT: f64 = 0.3;
const SOUND_WEIGHT: f64 = 0.3;

const DEPTH_TARGET: f64 = 5.0;
const VARIETY_TARGET: f64 = 10.0;
const SOUND_TARGET: f64 = 4.0;

/// Structural score in `[0, 1]`.
#[must_use]
pub fn structural(genome: &Genome) -> f64 {
    let tree = genome.tree();
    let mut symbols = BTreeSet::new();
    let mut samples = BTreeSet::new();
    for (_, node) in tree.nodes_with_paths() {
        symbols.insert(node.symbol());
        if node.symbol() == Symbol::SampleString
            && let Some(literal) = node.literal()
        {
            samples.insert(unquoted(literal));
        }
    }

    let depth = (tree.depth() as f64 / DEPTH_TARGET).min(1.0);
    let variety = (symbols.len() as f64 / VARIETY_TARGET).min(1.0);
    let sounds = (samples.len() as f64 / SOUND_TARGET).min(1.0);
    DEPTH_WEIGHT * depth + VARIETY_WEIGHT * variety + SOUND_WEIGHT * sounds
}

/// [`structural`] in the fallible shape the evolution runner expects.
///
/// # Errors
///
/// Never fails.
pub fn structural_fitness(genome: &Genome) -> Result<f64, Infallible> {
    Ok(structural(genome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse;

    fn score(text: &str) -> f64 {
        structural(&Genome::new(parse(text).unwrap()))
    }

    #[test]
    fn test_single_atom() {
        // depth 3, symbols {SoundAtom, S, LPar, SampleLiteral, SampleString, RPar}, one sample
        let expected = 0.4 * (3.0 / 5.0) + 0.3 * (6.0 / 10.0) + 0.3 * (1.0 / 4.0);
        assert!((score(r#"s("bd")"#) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_more_variety_scores_higher() {
        let plain = score(r#"s("bd")"#);
        let rich = score(r#"stack [s("bd"), s("sn") # n "0 4", fast 2 (s("hh"))]"#);
        assert!(rich > plain);
    }

    #[test]
    fn test_bounded() {
        let busy = score(
            r#"euclid (3) (8) (overlay (stack [s("bd"), s("sn"), s("hh"), s("superpiano") # n (scale "major" "0 2")]) (striate (2) (s("cp"))))"#,
        );
        assert!(busy <= 1.0);
        assert!((busy - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_samples_count_once() {
        let twice = score(r#"stack [s("bd"), s("bd")]"#);
        let distinct = score(r#"stack [s("bd"), s("sn")]"#);
        assert!(distinct > twice);
    }
}
