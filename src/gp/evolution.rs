//! Multi-generation evolution runner.
//!
//! Builds the initial population with the growth generator, then calls
//! [`Population::evolve`] once per generation, tracking statistics and the
//! best genome seen. With an output directory configured, checkpoints are
//! written between generations every `checkpoint_interval` generations and
//! at the end, together with the best-pattern export and a JSON-lines
//! history. A run can be resumed from any checkpoint.

// Statistics divide sums by population sizes
#![allow(clippy::cast_precision_loss)]

use crate::error::CatalogError;
use crate::gp::genome::Genome;
use crate::gp::growth::{GrowthConfig, generate_many_par};
use crate::gp::mutation::Operator;
use crate::gp::persistence::{
    Checkpoint, PersistenceError, append_history, checkpoint_path, load_checkpoint, save_best,
    save_checkpoint,
};
use crate::gp::population::{EvolveParams, Population};
use crate::grammar::{Catalog, Pools};
use log::{debug, info};
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Configuration for an evolution run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Population size.
    pub population_size: usize,
    /// Number of generations to run.
    pub generations: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
    /// Probability that an offspring is mutated.
    pub mutation_rate: f64,
    /// Probability that a reproduction event uses crossover.
    pub crossover_rate: f64,
    /// Number of top genomes carried over unchanged.
    pub elitism: usize,
    /// Operators mutation may draw from.
    pub operators: Vec<Operator>,
    /// Initial population generator settings.
    pub growth: GrowthConfig,
    /// Value pools for the catalog.
    pub pools: Pools,
    /// Directory for checkpoints and exports; nothing is written if unset.
    pub output_dir: Option<PathBuf>,
    /// Checkpoint every N generations; 0 writes only the final checkpoint.
    pub checkpoint_interval: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 32,
            generations: 20,
            seed: 42,
            mutation_rate: 0.1,
            crossover_rate: 0.8,
            elitism: 2,
            operators: Operator::ALL.to_vec(),
            growth: GrowthConfig::default(),
            pools: Pools::default(),
            output_dir: None,
            checkpoint_interval: 5,
        }
    }
}

impl EvolutionConfig {
    /// Per-generation parameters.
    #[must_use]
    pub fn params(&self) -> EvolveParams {
        EvolveParams {
            mutation_rate: self.mutation_rate,
            crossover_rate: self.crossover_rate,
            elitism: self.elitism,
            operators: self.operators.clone(),
        }
    }

    /// Check values a run cannot start with.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size == 0 {
            return Err("population_size must be at least 1".to_string());
        }
        for (name, rate) in [
            ("mutation_rate", self.mutation_rate),
            ("crossover_rate", self.crossover_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(format!("{name} must be within [0, 1], got {rate}"));
            }
        }
        Ok(())
    }
}

/// Statistics for a single generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number, starting at 0.
    pub generation: usize,
    /// Best fitness in this generation.
    pub best_fitness: f64,
    /// Mean fitness.
    pub mean_fitness: f64,
    /// Worst fitness.
    pub worst_fitness: f64,
    /// Fitness standard deviation.
    pub fitness_std: f64,
    /// Mean tree size.
    pub mean_size: f64,
    /// Mean tree depth.
    pub mean_depth: f64,
}

impl GenerationStats {
    fn of(generation: usize, population: &Population) -> Self {
        let stats = population.stats();
        let n = population.len().max(1) as f64;
        let genomes = population.genomes();
        Self {
            generation,
            best_fitness: stats.best_fitness,
            mean_fitness: stats.mean_fitness,
            worst_fitness: stats.worst_fitness,
            fitness_std: stats.fitness_std,
            mean_size: genomes.iter().map(|g| g.tree().size() as f64).sum::<f64>() / n,
            mean_depth: genomes.iter().map(|g| g.tree().depth() as f64).sum::<f64>() / n,
        }
    }
}

/// Overall statistics from an evolution run.
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionStats {
    /// Statistics per generation run by this call.
    pub generations: Vec<GenerationStats>,
    /// Best fitness achieved.
    pub best_fitness: f64,
    /// Generation where best fitness was achieved.
    pub best_generation: usize,
    /// Total time in seconds.
    pub elapsed_seconds: f64,
}

/// Result of a finished run.
#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    /// Final population.
    pub population: Population,
    /// Best genome seen during the run.
    pub best: Genome,
    /// Run statistics.
    pub stats: EvolutionStats,
}

/// Error during an evolution run.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError<E> {
    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Invalid value pools.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Checkpoint or export failure.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// The fitness function failed.
    #[error("fitness evaluation failed: {0}")]
    Evaluation(#[source] E),
}

/// State carried from one generation to the next.
struct RunState {
    generation: usize,
    population: Population,
    rng: Xoshiro256StarStar,
    best: Option<(usize, Genome)>,
}

/// Run a fresh evolution.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a file cannot be
/// written, or `fitness_fn` fails.
pub fn evolve<F, E>(
    config: &EvolutionConfig,
    fitness_fn: F,
) -> Result<EvolutionOutcome, EvolutionError<E>>
where
    F: FnMut(&Genome) -> Result<f64, E>,
    E: std::error::Error + 'static,
{
    evolve_with(config, fitness_fn, |_| {})
}

/// Run a fresh evolution, calling `observer` after each generation.
///
/// # Errors
///
/// See [`evolve`].
pub fn evolve_with<F, E, O>(
    config: &EvolutionConfig,
    fitness_fn: F,
    observer: O,
) -> Result<EvolutionOutcome, EvolutionError<E>>
where
    F: FnMut(&Genome) -> Result<f64, E>,
    E: std::error::Error + 'static,
    O: FnMut(&GenerationStats),
{
    config.validate().map_err(EvolutionError::InvalidConfig)?;
    let catalog = Catalog::new(config.pools.clone())?;

    let mut rng = Xoshiro256StarStar::seed_from_u64(config.seed);
    let base_seed = rng.next_u64();
    let trees = generate_many_par(config.population_size, &config.growth, &catalog, base_seed);
    info!(
        "initial population: {} patterns, seed {}",
        trees.len(),
        config.seed
    );

    let state = RunState {
        generation: 0,
        population: Population::from_trees(trees),
        rng,
        best: None,
    };
    run(config, &catalog, state, fitness_fn, observer)
}

/// Continue a run from the checkpoint at `path`.
///
/// The checkpoint supplies the generation index, population, generator
/// state and best genome; `config` supplies everything else, including the
/// total generation count.
///
/// # Errors
///
/// See [`evolve`]; also fails if the checkpoint cannot be loaded.
pub fn resume<F, E>(
    config: &EvolutionConfig,
    path: &Path,
    fitness_fn: F,
) -> Result<EvolutionOutcome, EvolutionError<E>>
where
    F: FnMut(&Genome) -> Result<f64, E>,
    E: std::error::Error + 'static,
{
    resume_with(config, path, fitness_fn, |_| {})
}

/// [`resume`] with a per-generation observer.
///
/// # Errors
///
/// See [`resume`].
pub fn resume_with<F, E, O>(
    config: &EvolutionConfig,
    path: &Path,
    fitness_fn: F,
    observer: O,
) -> Result<EvolutionOutcome, EvolutionError<E>>
where
    F: FnMut(&Genome) -> Result<f64, E>,
    E: std::error::Error + 'static,
    O: FnMut(&GenerationStats),
{
    config.validate().map_err(EvolutionError::InvalidConfig)?;
    let catalog = Catalog::new(config.pools.clone())?;
    let checkpoint = load_checkpoint(path)?;
    if checkpoint.population.is_empty() {
        return Err(EvolutionError::InvalidConfig(format!(
            "checkpoint {} has an empty population",
            path.display()
        )));
    }
    info!(
        "resuming from {} at generation {}",
        path.display(),
        checkpoint.generation
    );

    let state = RunState {
        generation: checkpoint.generation,
        population: checkpoint.population,
        rng: checkpoint.rng_state,
        best: checkpoint.best,
    };
    run(config, &catalog, state, fitness_fn, observer)
}

fn run<F, E, O>(
    config: &EvolutionConfig,
    catalog: &Catalog,
    mut state: RunState,
    mut fitness_fn: F,
    mut observer: O,
) -> Result<EvolutionOutcome, EvolutionError<E>>
where
    F: FnMut(&Genome) -> Result<f64, E>,
    E: std::error::Error + 'static,
    O: FnMut(&GenerationStats),
{
    let start_time = Instant::now();
    let params = config.params();
    let mut gen_stats = Vec::new();

    state
        .population
        .evaluate(&mut fitness_fn)
        .map_err(EvolutionError::Evaluation)?;
    update_best(&mut state);

    while state.generation < config.generations {
        let generation = state.generation;
        state.population = state
            .population
            .evolve(&mut fitness_fn, &params, catalog, &mut state.rng)
            .map_err(EvolutionError::Evaluation)?;
        state.generation += 1;

        let stats = GenerationStats::of(generation, &state.population);
        info!(
            "gen {:>5}: best={:.4} mean={:.4} std={:.4} size={:.1} depth={:.1}",
            generation,
            stats.best_fitness,
            stats.mean_fitness,
            stats.fitness_std,
            stats.mean_size,
            stats.mean_depth
        );
        update_best(&mut state);
        observer(&stats);

        if let Some(dir) = &config.output_dir {
            append_history(dir, &stats)?;
            let due = config.checkpoint_interval > 0
                && state.generation.is_multiple_of(config.checkpoint_interval);
            if due && state.generation < config.generations {
                write_checkpoint(config, dir, &state)?;
            }
        }
        gen_stats.push(stats);
    }

    if let Some(dir) = &config.output_dir {
        write_checkpoint(config, dir, &state)?;
    }

    let Some((best_generation, best)) = state.best else {
        return Err(EvolutionError::InvalidConfig(
            "population is empty".to_string(),
        ));
    };
    if let Some(dir) = &config.output_dir {
        let path = save_best(dir, best_generation, &best)?;
        info!("best pattern written to {}", path.display());
    }

    Ok(EvolutionOutcome {
        population: state.population,
        stats: EvolutionStats {
            generations: gen_stats,
            best_fitness: best.score().unwrap_or(0.0),
            best_generation,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
        },
        best,
    })
}

/// Replace the tracked best genome if the current population beats it.
fn update_best(state: &mut RunState) {
    let Some(candidate) = state.population.best() else {
        return;
    };
    let improved = match &state.best {
        None => true,
        Some((_, best)) => candidate.fitness().rank(best.fitness()).is_lt(),
    };
    if improved {
        debug!(
            "new best at generation {}: {:?} {}",
            state.generation,
            candidate.score(),
            candidate.tree()
        );
        state.best = Some((state.generation, candidate.clone()));
    }
}

fn write_checkpoint(
    config: &EvolutionConfig,
    dir: &Path,
    state: &RunState,
) -> Result<(), PersistenceError> {
    let mut checkpoint = Checkpoint::new(
        state.generation,
        state.population.clone(),
        state.rng.clone(),
        state.best.clone(),
    );
    checkpoint
        .metadata
        .insert("seed".to_string(), serde_json::json!(config.seed));
    checkpoint.metadata.insert(
        "population_size".to_string(),
        serde_json::json!(config.population_size),
    );
    checkpoint.metadata.insert(
        "crate_version".to_string(),
        serde_json::json!(env!("CARGO_PKG_VERSION")),
    );
    let path = checkpoint_path(dir, state.generation);
    save_checkpoint(&checkpoint, &path)?;
    info!("checkpoint written to {}", path.display());
    Ok(())
}
