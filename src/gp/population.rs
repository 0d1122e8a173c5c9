//! Population and the single-generation evolutionary step.

use crate::gp::genome::{Fitness, Genome};
use crate::gp::mutation::Operator;
use crate::gp::selection::{SelectionStats, biased_index, chance};
use crate::grammar::Catalog;
use crate::tree::Tree;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rates and limits for one call to [`Population::evolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolveParams {
    /// Probability that an offspring is mutated.
    pub mutation_rate: f64,
    /// Probability that a reproduction event uses crossover.
    pub crossover_rate: f64,
    /// Number of top genomes carried over unchanged.
    pub elitism: usize,
    /// Operators mutation may draw from.
    pub operators: Vec<Operator>,
}

impl Default for EvolveParams {
    fn default() -> Self {
        Self {
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            elitism: 2,
            operators: Operator::ALL.to_vec(),
        }
    }
}

/// An ordered, fixed-size collection of genomes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Population {
    genomes: Vec<Genome>,
}

impl Population {
    /// Wrap `genomes` in their current order.
    #[must_use]
    pub fn new(genomes: Vec<Genome>) -> Self {
        Self { genomes }
    }

    /// Unevaluated population over `trees`.
    #[must_use]
    pub fn from_trees(trees: impl IntoIterator<Item = Tree>) -> Self {
        Self::new(trees.into_iter().map(Genome::new).collect())
    }

    /// Number of genomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    /// Whether the population is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Genomes in order.
    #[must_use]
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Take the genomes out.
    #[must_use]
    pub fn into_genomes(self) -> Vec<Genome> {
        self.genomes
    }

    /// The highest-scoring evaluated genome.
    #[must_use]
    pub fn best(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .filter(|g| g.fitness().is_evaluated())
            .min_by(|a, b| a.fitness().rank(b.fitness()))
    }

    /// Scores of every evaluated genome, in order.
    #[must_use]
    pub fn scores(&self) -> Vec<f64> {
        self.genomes.iter().filter_map(Genome::score).collect()
    }

    /// Fitness statistics over the evaluated genomes.
    #[must_use]
    pub fn stats(&self) -> SelectionStats {
        SelectionStats::from_fitness(&self.scores())
    }

    /// Score every unevaluated genome with `fitness_fn`.
    ///
    /// # Errors
    ///
    /// Returns the first error from `fitness_fn`; genomes scored before it
    /// keep their score.
    pub fn evaluate<F, E>(&mut self, fitness_fn: &mut F) -> Result<(), E>
    where
        F: FnMut(&Genome) -> Result<f64, E>,
    {
        for genome in &mut self.genomes {
            if !genome.fitness().is_evaluated() {
                let score = fitness_fn(genome)?;
                *genome = genome.clone().with_fitness(Fitness::scored(score));
            }
        }
        Ok(())
    }

    /// Sort best-first; ties keep their relative order.
    pub fn sort(&mut self) {
        self.genomes.sort_by(|a, b| a.fitness().rank(b.fitness()));
    }

    /// Produce the next generation.
    ///
    /// Unevaluated genomes are scored first, then the population is sorted
    /// best-first and the top `elitism` genomes are carried over unchanged.
    /// The rest are bred: with probability `crossover_rate` two biased
    /// parents are crossed and each child mutated, otherwise one biased
    /// parent is mutated. Offspring are scored as they are produced. The
    /// result has the same size as `self`; only the elite prefix is sorted.
    ///
    /// # Errors
    ///
    /// Returns the first error from `fitness_fn`.
    pub fn evolve<F, E, R>(
        &self,
        fitness_fn: &mut F,
        params: &EvolveParams,
        catalog: &Catalog,
        rng: &mut R,
    ) -> Result<Population, E>
    where
        F: FnMut(&Genome) -> Result<f64, E>,
        R: Rng + ?Sized,
    {
        let mut current = self.clone();
        current.evaluate(fitness_fn)?;
        current.sort();

        let n = current.len();
        let parents = current.genomes();
        let mut next: Vec<Genome> = parents.iter().take(params.elitism.min(n)).cloned().collect();

        while next.len() < n {
            if chance(rng, params.crossover_rate) {
                let a = &parents[biased_index(n, rng)];
                let b = &parents[biased_index(n, rng)];
                let (x, y) = a.crossover(b, rng);
                for child in [x, y] {
                    if next.len() == n {
                        break;
                    }
                    let child = child.mutate(params.mutation_rate, &params.operators, catalog, rng);
                    next.push(scored(child, fitness_fn)?);
                }
            } else {
                let parent = &parents[biased_index(n, rng)];
                let child = parent.mutate(params.mutation_rate, &params.operators, catalog, rng);
                next.push(scored(child, fitness_fn)?);
            }
        }

        Ok(Population::new(next))
    }
}

/// `genome` with a score, calling `fitness_fn` only if it has none.
fn scored<F, E>(genome: Genome, fitness_fn: &mut F) -> Result<Genome, E>
where
    F: FnMut(&Genome) -> Result<f64, E>,
{
    if genome.fitness().is_evaluated() {
        return Ok(genome);
    }
    let score = fitness_fn(&genome)?;
    Ok(genome.with_fitness(Fitness::scored(score)))
}

impl FromIterator<Genome> for Population {
    fn from_iter<I: IntoIterator<Item = Genome>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::seeds::random_seed;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::convert::Infallible;
    use std::sync::Arc;

    fn population(n: usize, rng: &mut SmallRng) -> Population {
        let catalog = Catalog::default();
        Population::from_trees((0..n).map(|_| random_seed(&catalog, rng)))
    }

    #[test]
    fn test_evolve_keeps_size_and_elites() {
        let catalog = Catalog::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let pop = population(10, &mut rng);
        let mut fitness =
            |g: &Genome| -> Result<f64, Infallible> { Ok(g.tree().size() as f64 / 100.0) };

        let next = pop
            .evolve(&mut fitness, &EvolveParams::default(), &catalog, &mut rng)
            .unwrap();
        assert_eq!(next.len(), 10);
        assert!(next.genomes().iter().all(|g| g.fitness().is_evaluated()));

        let mut evaluated = pop.clone();
        evaluated.evaluate(&mut fitness).unwrap();
        evaluated.sort();
        for (elite, original) in next.genomes().iter().zip(evaluated.genomes()).take(2) {
            assert!(Arc::ptr_eq(elite.shared_tree(), original.shared_tree()));
            assert_eq!(elite.fitness(), original.fitness());
        }
    }

    #[test]
    fn test_only_unevaluated_are_scored() {
        let catalog = Catalog::default();
        let mut rng = SmallRng::seed_from_u64(2);
        let pop: Population = population(6, &mut rng)
            .into_genomes()
            .into_iter()
            .map(|g| g.with_fitness(Fitness::Scored(0.5)))
            .collect();
        let params = EvolveParams {
            mutation_rate: 0.0,
            crossover_rate: 0.0,
            ..EvolveParams::default()
        };
        let mut fitness = |_: &Genome| -> Result<f64, Infallible> {
            panic!("no genome should need scoring");
        };
        let next = pop.evolve(&mut fitness, &params, &catalog, &mut rng).unwrap();
        assert_eq!(next.len(), 6);
    }

    #[test]
    fn test_evaluation_error_propagates() {
        let catalog = Catalog::default();
        let mut rng = SmallRng::seed_from_u64(3);
        let pop = population(4, &mut rng);
        let mut fitness = |_: &Genome| -> Result<f64, String> { Err("renderer down".into()) };
        let err = pop
            .evolve(&mut fitness, &EvolveParams::default(), &catalog, &mut rng)
            .unwrap_err();
        assert_eq!(err, "renderer down");
    }

    #[test]
    fn test_elitism_larger_than_population() {
        let catalog = Catalog::default();
        let mut rng = SmallRng::seed_from_u64(4);
        let pop = population(3, &mut rng);
        let params = EvolveParams {
            elitism: 10,
            ..EvolveParams::default()
        };
        let mut fitness = |_: &Genome| -> Result<f64, Infallible> { Ok(0.1) };
        let next = pop.evolve(&mut fitness, &params, &catalog, &mut rng).unwrap();
        assert_eq!(next.len(), 3);
    }

    #[test]
    fn test_empty_population() {
        let catalog = Catalog::default();
        let mut rng = SmallRng::seed_from_u64(5);
        let mut fitness = |_: &Genome| -> Result<f64, Infallible> { Ok(0.0) };
        let next = Population::default()
            .evolve(&mut fitness, &EvolveParams::default(), &catalog, &mut rng)
            .unwrap();
        assert!(next.is_empty());
    }

    #[test]
    fn test_best_and_stats() {
        let mut rng = SmallRng::seed_from_u64(6);
        let genomes: Vec<Genome> = population(3, &mut rng)
            .into_genomes()
            .into_iter()
            .zip([0.2, 0.9, 0.4])
            .map(|(g, s)| g.with_fitness(Fitness::Scored(s)))
            .collect();
        let pop = Population::new(genomes);
        assert_eq!(pop.best().and_then(Genome::score), Some(0.9));
        let stats = pop.stats();
        assert!((stats.mean_fitness - 0.5).abs() < 1e-9);
    }
}
