//! Parent selection and population statistics.
//!
//! Parents are drawn from a population sorted best-first with a quadratic
//! bias toward the front: index `floor(U² × N)` for `U` uniform in `[0, 1)`.

// Index and statistics math converts between usize and f64
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Index into a best-first population of length `len`, biased toward 0.
///
/// Returns 0 for an empty population; callers check emptiness first.
pub fn biased_index<R: Rng + ?Sized>(len: usize, rng: &mut R) -> usize {
    if len == 0 {
        return 0;
    }
    let u: f64 = rng.gen_range(0.0..1.0);
    ((u * u * len as f64).floor() as usize).min(len - 1)
}

/// Bernoulli trial that tolerates out-of-range probabilities.
///
/// Values at or below 0 (and NaN) never fire, values at or above 1 always do.
pub(crate) fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    if probability.is_nan() || probability <= 0.0 {
        false
    } else if probability >= 1.0 {
        true
    } else {
        rng.gen_bool(probability)
    }
}

/// Summary statistics over a set of fitness values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionStats {
    /// Mean fitness of the population.
    pub mean_fitness: f64,
    /// Best fitness in the population.
    pub best_fitness: f64,
    /// Worst fitness in the population.
    pub worst_fitness: f64,
    /// Standard deviation of fitness.
    pub fitness_std: f64,
}

impl SelectionStats {
    /// Calculate statistics from fitness values.
    #[must_use]
    pub fn from_fitness(fitness: &[f64]) -> Self {
        if fitness.is_empty() {
            return Self {
                mean_fitness: 0.0,
                best_fitness: 0.0,
                worst_fitness: 0.0,
                fitness_std: 0.0,
            };
        }

        let sum: f64 = fitness.iter().sum();
        let mean = sum / fitness.len() as f64;

        let best = fitness.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst = fitness.iter().copied().fold(f64::INFINITY, f64::min);

        let variance: f64 = fitness
            .iter()
            .map(|f| (f - mean).powi(2))
            .sum::<f64>()
            / fitness.len() as f64;

        Self {
            mean_fitness: mean,
            best_fitness: best,
            worst_fitness: worst,
            fitness_std: variance.sqrt(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_biased_index_prefers_front() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut counts = [0usize; 10];
        for _ in 0..10_000 {
            counts[biased_index(10, &mut rng)] += 1;
        }
        // P(index 0) = P(U < sqrt(0.1)) ≈ 0.316
        assert!(counts[0] > 2_800 && counts[0] < 3_500, "{counts:?}");
        assert!(counts[0] > counts[9] * 3);
        assert!(counts.iter().all(|&c| c > 0));
    }

    #[test]
    fn test_biased_index_bounds() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(biased_index(0, &mut rng), 0);
        for _ in 0..100 {
            assert_eq!(biased_index(1, &mut rng), 0);
            assert!(biased_index(3, &mut rng) < 3);
        }
    }

    #[test]
    fn test_chance_out_of_range() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..20 {
            assert!(!chance(&mut rng, 0.0));
            assert!(!chance(&mut rng, -1.0));
            assert!(!chance(&mut rng, f64::NAN));
            assert!(chance(&mut rng, 1.0));
            assert!(chance(&mut rng, 7.5));
        }
    }

    #[test]
    fn test_selection_stats() {
        let fitness = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = SelectionStats::from_fitness(&fitness);

        assert!((stats.mean_fitness - 3.0).abs() < 0.001);
        assert!((stats.best_fitness - 5.0).abs() < 0.001);
        assert!((stats.worst_fitness - 1.0).abs() < 0.001);
        assert!((stats.fitness_std - 2.0_f64.sqrt()).abs() < 0.001);
    }

    #[test]
    fn test_selection_stats_empty() {
        let stats = SelectionStats::from_fitness(&[]);
        assert!(stats.mean_fitness.abs() < f64::EPSILON);
        assert!(stats.fitness_std.abs() < f64::EPSILON);
    }
}
