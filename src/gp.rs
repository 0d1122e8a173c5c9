//! Genetic programming over pattern trees.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Evolution runner + checkpoints    │
//! ├─────────────────────────────────────┤
//! │  Selection │ Crossover │ Mutation   │
//! ├─────────────────────────────────────┤
//! │  Genome (Arc<Tree> + Fitness)       │
//! ├─────────────────────────────────────┤
//! │  Seeds → Growth-controlled generator│
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tidal_gp::gp::{EvolutionConfig, evolve, structural_fitness};
//!
//! let config = EvolutionConfig::default();
//! let outcome = evolve(&config, structural_fitness)?;
//! println!("{}", outcome.best.tree());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod crossover;
mod evolution;
mod fitness;
mod genome;
mod growth;
mod mutation;
mod persistence;
mod population;
mod seeds;
mod selection;

pub use crossover::crossover;
pub use evolution::{
    EvolutionConfig, EvolutionError, EvolutionOutcome, EvolutionStats, GenerationStats, evolve,
    evolve_with, resume, resume_with,
};
pub use fitness::{structural, structural_fitness};
pub use genome::{Fitness, Genome};
pub use growth::{GrowthConfig, generate, generate_many, generate_many_par};
pub use mutation::{Category, Operator, UnknownOperator};
pub use persistence::{
    BestPattern, CHECKPOINT_VERSION, Checkpoint, PersistenceError, append_history, best_path,
    checkpoint_path, history_path, latest_checkpoint, load_checkpoint, save_best,
    save_checkpoint,
};
pub use population::{EvolveParams, Population};
pub use seeds::{anchored_seed, fallback_seed, random_seed};
pub use selection::{SelectionStats, biased_index};
