//! Genome: one derivation tree and its fitness.
//!
//! Trees are held behind an [`Arc`], so elites and fitness-preserving copies
//! share a single allocation. No operator mutates a tree in place; every
//! change produces a new tree and a new genome with fitness reset.

use crate::gp::crossover;
use crate::gp::mutation::Operator;
use crate::gp::selection::chance;
use crate::grammar::Catalog;
use crate::tree::Tree;
use log::{debug, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// Fitness of a genome.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fitness {
    /// Not yet scored.
    #[default]
    Unevaluated,
    /// Score in `[0, 1]`, higher is better.
    Scored(f64),
}

impl Fitness {
    /// Score from a raw evaluator value, clamped into `[0, 1]`.
    ///
    /// NaN scores 0.0 and logs a warning.
    #[must_use]
    pub fn scored(raw: f64) -> Self {
        if raw.is_nan() {
            warn!("fitness evaluator returned NaN, scoring 0.0");
            return Fitness::Scored(0.0);
        }
        Fitness::Scored(raw.clamp(0.0, 1.0))
    }

    /// The score, if evaluated.
    #[must_use]
    pub const fn value(self) -> Option<f64> {
        match self {
            Fitness::Unevaluated => None,
            Fitness::Scored(v) => Some(v),
        }
    }

    /// Whether a score has been assigned.
    #[must_use]
    pub const fn is_evaluated(self) -> bool {
        matches!(self, Fitness::Scored(_))
    }

    /// Best-first ordering: higher scores first, unevaluated last.
    #[must_use]
    pub fn rank(self, other: Self) -> Ordering {
        match (self, other) {
            (Fitness::Scored(a), Fitness::Scored(b)) => b.total_cmp(&a),
            (Fitness::Scored(_), Fitness::Unevaluated) => Ordering::Less,
            (Fitness::Unevaluated, Fitness::Scored(_)) => Ordering::Greater,
            (Fitness::Unevaluated, Fitness::Unevaluated) => Ordering::Equal,
        }
    }
}

/// A derivation tree plus its fitness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    tree: Arc<Tree>,
    fitness: Fitness,
}

impl Genome {
    /// Unevaluated genome over `tree`.
    #[must_use]
    pub fn new(tree: Tree) -> Self {
        Self::from_shared(Arc::new(tree))
    }

    /// Unevaluated genome over an already shared tree.
    #[must_use]
    pub fn from_shared(tree: Arc<Tree>) -> Self {
        Self {
            tree,
            fitness: Fitness::Unevaluated,
        }
    }

    /// Same tree, given fitness.
    #[must_use]
    pub fn with_fitness(mut self, fitness: Fitness) -> Self {
        self.fitness = fitness;
        self
    }

    /// The tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The shared tree handle.
    #[must_use]
    pub fn shared_tree(&self) -> &Arc<Tree> {
        &self.tree
    }

    /// Current fitness.
    #[must_use]
    pub fn fitness(&self) -> Fitness {
        self.fitness
    }

    /// Score, if evaluated.
    #[must_use]
    pub fn score(&self) -> Option<f64> {
        self.fitness.value()
    }

    /// With probability `rate`, apply one operator drawn uniformly from
    /// `allowed`; otherwise return a fitness-preserving copy.
    ///
    /// A mutation that fails (depth limit) also yields a fitness-preserving
    /// copy.
    #[must_use]
    pub fn mutate<R: Rng + ?Sized>(
        &self,
        rate: f64,
        allowed: &[Operator],
        catalog: &Catalog,
        rng: &mut R,
    ) -> Genome {
        if allowed.is_empty() || !chance(rng, rate) {
            return self.clone();
        }
        let op = allowed[rng.gen_range(0..allowed.len())];
        match op.apply(&self.tree, catalog, rng) {
            Ok(tree) => {
                debug!("mutated with {op}: size {} -> {}", self.tree.size(), tree.size());
                Genome::new(tree)
            }
            Err(e) => {
                warn!("{op} failed, keeping parent: {e}");
                self.clone()
            }
        }
    }

    /// Subtree crossover with `other`; see [`crossover::crossover`].
    #[must_use]
    pub fn crossover<R: Rng + ?Sized>(&self, other: &Genome, rng: &mut R) -> (Genome, Genome) {
        crossover::crossover(self, other, rng)
    }
}

impl From<Tree> for Genome {
    fn from(tree: Tree) -> Self {
        Genome::new(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn genome(text: &str) -> Genome {
        Genome::new(parse(text).unwrap())
    }

    #[test]
    fn test_fitness_clamped() {
        assert_eq!(Fitness::scored(1.7), Fitness::Scored(1.0));
        assert_eq!(Fitness::scored(-0.2), Fitness::Scored(0.0));
        assert_eq!(Fitness::scored(f64::NAN), Fitness::Scored(0.0));
        assert_eq!(Fitness::scored(0.25).value(), Some(0.25));
        assert!(!Fitness::Unevaluated.is_evaluated());
    }

    #[test]
    fn test_fitness_rank() {
        let mut values = vec![
            Fitness::Unevaluated,
            Fitness::Scored(0.2),
            Fitness::Scored(0.9),
            Fitness::Scored(0.5),
        ];
        values.sort_by(|a, b| a.rank(*b));
        assert_eq!(
            values,
            vec![
                Fitness::Scored(0.9),
                Fitness::Scored(0.5),
                Fitness::Scored(0.2),
                Fitness::Unevaluated
            ]
        );
    }

    #[test]
    fn test_zero_rate_preserves_fitness_and_tree() {
        let catalog = Catalog::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let parent = genome(r#"s("bd")"#).with_fitness(Fitness::Scored(0.4));
        let child = parent.mutate(0.0, &Operator::ALL, &catalog, &mut rng);
        assert!(Arc::ptr_eq(child.shared_tree(), parent.shared_tree()));
        assert_eq!(child.fitness(), Fitness::Scored(0.4));
    }

    #[test]
    fn test_full_rate_resets_fitness() {
        let catalog = Catalog::default();
        let mut rng = SmallRng::seed_from_u64(2);
        let parent = genome(r#"s("bd")"#).with_fitness(Fitness::Scored(0.4));
        let child = parent.mutate(1.0, &[Operator::StackWrap], &catalog, &mut rng);
        assert_eq!(child.fitness(), Fitness::Unevaluated);
        assert!(child.tree().size() > parent.tree().size());
    }

    #[test]
    fn test_no_operators_is_copy() {
        let catalog = Catalog::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let parent = genome(r#"s("sn")"#);
        let child = parent.mutate(1.0, &[], &catalog, &mut rng);
        assert_eq!(child, parent);
    }

    #[test]
    fn test_serde_round_trip() {
        let g = genome(r#"stack [s("bd"), s("sn")]"#).with_fitness(Fitness::Scored(0.75));
        let json = serde_json::to_string(&g).unwrap();
        let back: Genome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }
}
