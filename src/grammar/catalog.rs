//! Grammar rule catalog and value pools.
//!
//! One [`Catalog`] is built at startup and passed by reference to every
//! component that needs to know which rules may anchor a fresh subtree or
//! which literal values an operator may draw.

use crate::error::CatalogError;
use crate::grammar::Symbol;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rules usable as standalone subtree-generation entry points.
const ANCHORS: [Symbol; 8] = [
    Symbol::ControlPattern,
    Symbol::PlayableTerm,
    Symbol::SoundAtom,
    Symbol::NoteAtom,
    Symbol::ListsPlayable,
    Symbol::MaskPlayable,
    Symbol::EuclidPlayable,
    Symbol::StriatePlayable,
];

/// A rule verified to be a mutation anchor.
///
/// Only [`Catalog::anchor`] hands these out, so code that receives an
/// `Anchor` cannot be asked to generate from a non-anchor rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Anchor(Symbol);

impl Anchor {
    /// The anchored rule.
    #[must_use]
    pub fn symbol(self) -> Symbol {
        self.0
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Finite value pools operators draw literals from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pools {
    /// Sample names for sound atoms.
    pub sounds: Vec<String>,
    /// Scale names for scale constructors.
    pub scales: Vec<String>,
    /// Highest semitone in note patterns (lowest is 0).
    pub note_max: u8,
    /// Highest degree in scale-degree patterns (lowest is 0).
    pub degree_max: u8,
    /// Fewest values in a note or degree pattern.
    pub pattern_min_len: usize,
    /// Most values in a note or degree pattern.
    pub pattern_max_len: usize,
    /// Step counts for euclidean rhythms.
    pub euclid_steps: Vec<u32>,
    /// Rate factors for `fast`/`slow`.
    pub speed_factors: Vec<f64>,
    /// Slice counts for `striate`.
    pub striate_counts: Vec<u32>,
    /// Shortest boolean mask.
    pub mask_min_len: usize,
    /// Longest boolean mask.
    pub mask_max_len: usize,
}

impl Default for Pools {
    fn default() -> Self {
        Self {
            sounds: ["bd", "sn", "hh", "superpiano"].map(String::from).to_vec(),
            scales: ["major", "minor"].map(String::from).to_vec(),
            note_max: 11,
            degree_max: 7,
            pattern_min_len: 2,
            pattern_max_len: 5,
            euclid_steps: vec![8, 12, 16, 24, 32],
            speed_factors: vec![0.5, 1.5, 2.0, 3.0],
            striate_counts: vec![2, 3, 4, 5, 6],
            mask_min_len: 4,
            mask_max_len: 16,
        }
    }
}

/// Immutable catalog of anchors and value pools.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pools: Pools,
}

impl Catalog {
    /// Build a catalog, validating the pools.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if a pool is empty, a range is inverted, or
    /// a pool entry could not be rendered as a valid literal.
    pub fn new(pools: Pools) -> Result<Self, CatalogError> {
        validate(&pools)?;
        Ok(Self { pools })
    }

    /// The value pools.
    #[must_use]
    pub fn pools(&self) -> &Pools {
        &self.pools
    }

    /// All anchor rules.
    pub fn anchors(&self) -> impl Iterator<Item = Anchor> + '_ {
        ANCHORS.iter().copied().map(Anchor)
    }

    /// Whether `symbol` is a mutation anchor.
    #[must_use]
    pub fn is_anchor(&self, symbol: Symbol) -> bool {
        ANCHORS.contains(&symbol)
    }

    /// `symbol` as an [`Anchor`], or `None` if it is not one.
    #[must_use]
    pub fn anchor(&self, symbol: Symbol) -> Option<Anchor> {
        self.is_anchor(symbol).then_some(Anchor(symbol))
    }

    /// Random sample name.
    pub fn sound<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.pools.sounds.choose(rng).map(String::as_str)
    }

    /// Random scale name.
    pub fn scale<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.pools.scales.choose(rng).map(String::as_str)
    }

    /// Random euclid step count.
    pub fn euclid_steps<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u32> {
        self.pools.euclid_steps.choose(rng).copied()
    }

    /// Random `fast`/`slow` factor.
    pub fn speed_factor<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<f64> {
        self.pools.speed_factors.choose(rng).copied()
    }

    /// Random `striate` count.
    pub fn striate_count<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u32> {
        self.pools.striate_counts.choose(rng).copied()
    }

    /// Ascending semitone pattern such as `0 4 7`, unquoted.
    pub fn note_pattern<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.ascending_pattern(self.pools.note_max, rng)
    }

    /// Ascending scale-degree pattern such as `0 2 4`, unquoted.
    pub fn degree_pattern<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        self.ascending_pattern(self.pools.degree_max, rng)
    }

    /// Boolean mask such as `t f t t`, unquoted.
    pub fn mask<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        let len = rng.gen_range(self.pools.mask_min_len..=self.pools.mask_max_len);
        (0..len)
            .map(|_| if rng.gen_bool(0.5) { "t" } else { "f" })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Distinct values from `0..=max`, sorted, joined by spaces.
    fn ascending_pattern<R: Rng + ?Sized>(&self, max: u8, rng: &mut R) -> String {
        let universe = usize::from(max) + 1;
        let len = rng
            .gen_range(self.pools.pattern_min_len..=self.pools.pattern_max_len)
            .min(universe);
        let mut values = rand::seq::index::sample(rng, universe, len).into_vec();
        values.sort_unstable();
        values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn validate(pools: &Pools) -> Result<(), CatalogError> {
    if pools.sounds.is_empty() {
        return Err(CatalogError::EmptyPool("sounds"));
    }
    if pools.scales.is_empty() {
        return Err(CatalogError::EmptyPool("scales"));
    }
    if pools.euclid_steps.is_empty() {
        return Err(CatalogError::EmptyPool("euclid_steps"));
    }
    if pools.speed_factors.is_empty() {
        return Err(CatalogError::EmptyPool("speed_factors"));
    }
    if pools.striate_counts.is_empty() {
        return Err(CatalogError::EmptyPool("striate_counts"));
    }
    check_range("pattern_len", pools.pattern_min_len, pools.pattern_max_len)?;
    check_range("mask_len", pools.mask_min_len, pools.mask_max_len)?;

    let word = |s: &String| {
        s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && s.chars().all(|c| c.is_ascii_alphanumeric())
    };
    if let Some(bad) = pools.sounds.iter().find(|s| !word(s)) {
        return Err(invalid("sounds", bad));
    }
    if let Some(bad) = pools.scales.iter().find(|s| !word(s)) {
        return Err(invalid("scales", bad));
    }
    if let Some(bad) = pools.euclid_steps.iter().find(|&&s| s == 0) {
        return Err(invalid("euclid_steps", bad));
    }
    if let Some(bad) = pools.striate_counts.iter().find(|&&n| n == 0) {
        return Err(invalid("striate_counts", bad));
    }
    if let Some(bad) = pools
        .speed_factors
        .iter()
        .find(|f| !f.is_finite() || **f <= 0.0)
    {
        return Err(invalid("speed_factors", bad));
    }
    Ok(())
}

fn check_range(name: &'static str, min: usize, max: usize) -> Result<(), CatalogError> {
    if min == 0 || min > max {
        return Err(CatalogError::InvalidRange { name, min, max });
    }
    Ok(())
}

fn invalid(name: &'static str, value: impl fmt::Display) -> CatalogError {
    CatalogError::InvalidValue {
        name,
        value: value.to_string(),
    }
}
