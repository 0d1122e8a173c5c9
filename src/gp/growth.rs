//! Growth-controlled generation.
//!
//! Each expression starts from a random seed and takes a random number of
//! operator steps. Before every step the tree is measured against the
//! configured bounds: too big picks a Shrink operator, too small picks a
//! Grow operator, and in range picks Grow/Value/Shrink at 0.5/0.3/0.2.
//! Failed steps are abandoned and the last valid tree kept, so generation
//! itself never fails.

use crate::gp::mutation::{Category, Operator};
use crate::gp::seeds::random_seed;
use crate::grammar::{Catalog, round_trips};
use crate::tree::Tree;
use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Category weights when the tree is within bounds.
const CATEGORY_WEIGHTS: [(Category, f64); 3] = [
    (Category::Grow, 0.5),
    (Category::Value, 0.3),
    (Category::Shrink, 0.2),
];

/// Bounds and knobs for the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Smallest target node count.
    pub min_size: usize,
    /// Largest target node count.
    pub max_size: usize,
    /// Smallest target depth.
    pub min_depth: usize,
    /// Largest target depth.
    pub max_depth: usize,
    /// Fewest operator steps per expression.
    pub min_steps: usize,
    /// Most operator steps per expression.
    pub max_steps: usize,
    /// Check `parse(render(t)) == t` on every result.
    pub verify_round_trip: bool,
    /// Attempts before falling back to a fresh seed when verifying.
    pub max_attempts: usize,
    /// Operators the generator may apply.
    pub operators: Vec<Operator>,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            min_size: 10,
            max_size: 120,
            min_depth: 3,
            max_depth: 12,
            min_steps: 3,
            max_steps: 12,
            verify_round_trip: false,
            max_attempts: 5,
            operators: Operator::ALL.to_vec(),
        }
    }
}

impl GrowthConfig {
    fn category_for<R: Rng + ?Sized>(&self, tree: &Tree, rng: &mut R) -> Category {
        let (size, depth) = (tree.size(), tree.depth());
        if size > self.max_size || depth > self.max_depth {
            return Category::Shrink;
        }
        if size < self.min_size || depth < self.min_depth {
            return Category::Grow;
        }
        let mut roll: f64 = rng.gen_range(0.0..1.0);
        for (category, weight) in CATEGORY_WEIGHTS {
            if roll < weight {
                return category;
            }
            roll -= weight;
        }
        Category::Shrink
    }

    fn step_count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let max = self.max_steps.max(self.min_steps);
        rng.gen_range(self.min_steps..=max)
    }
}

/// Grow one tree from a fresh seed, without verification.
fn grow_once<R: Rng + ?Sized>(config: &GrowthConfig, catalog: &Catalog, rng: &mut R) -> Tree {
    let mut tree = random_seed(catalog, rng);
    let steps = config.step_count(rng);
    for step in 0..steps {
        let category = config.category_for(&tree, rng);
        let candidates = Operator::in_category(&config.operators, category);
        if candidates.is_empty() {
            debug!("step {step}: no {category:?} operator allowed, skipping");
            continue;
        }
        let op = candidates[rng.gen_range(0..candidates.len())];
        match op.apply(&tree, catalog, rng) {
            Ok(next) => tree = next,
            Err(e) => debug!("step {step}: {op} abandoned: {e}"),
        }
    }
    tree
}

/// Generate one expression.
///
/// With `verify_round_trip`, a result that does not survive
/// `parse(render(t))` is regenerated up to `max_attempts` times, then
/// replaced with a fresh seed.
pub fn generate<R: Rng + ?Sized>(config: &GrowthConfig, catalog: &Catalog, rng: &mut R) -> Tree {
    if !config.verify_round_trip {
        return grow_once(config, catalog, rng);
    }
    for attempt in 1..=config.max_attempts.max(1) {
        let tree = grow_once(config, catalog, rng);
        if round_trips(&tree) {
            return tree;
        }
        warn!("attempt {attempt}: generated tree failed round trip: {tree}");
    }
    warn!("giving up after {} attempts, using a seed", config.max_attempts);
    random_seed(catalog, rng)
}

/// Generate `count` expressions sequentially from one random source.
pub fn generate_many<R: Rng + ?Sized>(
    count: usize,
    config: &GrowthConfig,
    catalog: &Catalog,
    rng: &mut R,
) -> Vec<Tree> {
    (0..count).map(|_| generate(config, catalog, rng)).collect()
}

/// Generate `count` expressions on the rayon pool.
///
/// Expression `i` uses its own generator seeded from `base_seed + i`, so the
/// output does not depend on the number of threads.
#[must_use]
pub fn generate_many_par(
    count: usize,
    config: &GrowthConfig,
    catalog: &Catalog,
    base_seed: u64,
) -> Vec<Tree> {
    (0..count)
        .into_par_iter()
        .map(|i| {
            let mut rng = Xoshiro256StarStar::seed_from_u64(base_seed.wrapping_add(i as u64));
            generate(config, catalog, &mut rng)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;

    #[test]
    fn test_generated_trees_round_trip() {
        let catalog = Catalog::default();
        let config = GrowthConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);
        for tree in generate_many(50, &config, &catalog, &mut rng) {
            assert!(round_trips(&tree), "{tree}");
        }
    }

    #[test]
    fn test_growth_reaches_lower_bound() {
        let catalog = Catalog::default();
        let config = GrowthConfig {
            min_steps: 12,
            ..GrowthConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(7);
        let trees = generate_many(40, &config, &catalog, &mut rng);
        let big_enough = trees.iter().filter(|t| t.size() >= config.min_size).count();
        assert!(big_enough >= 30, "only {big_enough} of 40 reached min size");
    }

    #[test]
    fn test_category_steering() {
        let config = GrowthConfig::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let small = crate::gp::seeds::fallback_seed();
        for _ in 0..20 {
            assert_eq!(config.category_for(&small, &mut rng), Category::Grow);
        }

        let tight = GrowthConfig {
            max_size: 3,
            ..GrowthConfig::default()
        };
        for _ in 0..20 {
            assert_eq!(tight.category_for(&small, &mut rng), Category::Shrink);
        }
    }

    #[test]
    fn test_in_range_category_weights() {
        let config = GrowthConfig {
            min_size: 0,
            min_depth: 0,
            ..GrowthConfig::default()
        };
        let tree = crate::gp::seeds::fallback_seed();
        let mut rng = SmallRng::seed_from_u64(11);
        let mut grow = 0;
        let mut value = 0;
        let mut shrink = 0;
        for _ in 0..10_000 {
            match config.category_for(&tree, &mut rng) {
                Category::Grow => grow += 1,
                Category::Value => value += 1,
                Category::Shrink => shrink += 1,
            }
        }
        assert!((4_700..5_300).contains(&grow), "grow={grow}");
        assert!((2_700..3_300).contains(&value), "value={value}");
        assert!((1_700..2_300).contains(&shrink), "shrink={shrink}");
    }

    #[test]
    fn test_no_operators_yields_seed() {
        let catalog = Catalog::default();
        let config = GrowthConfig {
            operators: Vec::new(),
            ..GrowthConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(5);
        let tree = generate(&config, &catalog, &mut rng);
        assert!(tree.size() <= 30);
        assert!(round_trips(&tree));
    }

    #[test]
    fn test_verified_generation() {
        let catalog = Catalog::default();
        let config = GrowthConfig {
            verify_round_trip: true,
            ..GrowthConfig::default()
        };
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..10 {
            assert!(round_trips(&generate(&config, &catalog, &mut rng)));
        }
    }

    #[test]
    fn test_parallel_generation_is_deterministic() {
        let catalog = Catalog::default();
        let config = GrowthConfig::default();
        let first = generate_many_par(16, &config, &catalog, 99);
        let second = generate_many_par(16, &config, &catalog, 99);
        assert_eq!(first, second);

        let mut rng = Xoshiro256StarStar::seed_from_u64(99 + 3);
        assert_eq!(first[3], generate(&config, &catalog, &mut rng));
    }
}
