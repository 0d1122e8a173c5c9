//! CLI commands for running and resuming evolution.

#![allow(clippy::needless_pass_by_value)]

use super::{CliError, load_config};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tidal_gp::gp::{
    EvolutionConfig, EvolutionOutcome, GenerationStats, evolve_with, latest_checkpoint,
    resume_with, structural_fitness,
};

/// Execute the evolve command.
pub(crate) fn execute(
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    population: Option<usize>,
    generations: Option<usize>,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), CliError> {
    let mut config = load_config(config.as_deref())?;
    if let Some(output) = output {
        config.output_dir = Some(output);
    }
    if let Some(population) = population {
        config.population_size = population;
    }
    if let Some(generations) = generations {
        config.generations = generations;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }

    println!("Starting evolution:");
    println!("  Population: {}", config.population_size);
    println!("  Generations: {}", config.generations);
    println!("  Seed: {}", config.seed);
    if let Some(dir) = &config.output_dir {
        println!("  Output: {}", dir.display());
    }
    println!();

    let pb = progress_bar(config.generations, 0, quiet)?;
    let outcome = evolve_with(&config, structural_fitness, |stats| tick(pb.as_ref(), stats))?;
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    print_results(&config, &outcome);
    Ok(())
}

/// Execute the resume command.
pub(crate) fn resume(
    checkpoint: PathBuf,
    config: Option<PathBuf>,
    generations: Option<usize>,
    quiet: bool,
) -> Result<(), CliError> {
    let mut config = load_config(config.as_deref())?;
    if let Some(generations) = generations {
        config.generations = generations;
    }
    let path = if checkpoint.is_dir() {
        if config.output_dir.is_none() {
            config.output_dir = Some(checkpoint.clone());
        }
        latest_checkpoint(&checkpoint)?
    } else {
        checkpoint
    };

    println!("Resuming evolution from checkpoint: {}", path.display());
    let start = checkpoint_generation(&path);
    let pb = progress_bar(config.generations, start, quiet)?;
    let outcome = resume_with(&config, &path, structural_fitness, |stats| {
        tick(pb.as_ref(), stats);
    })?;
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    print_results(&config, &outcome);
    Ok(())
}

fn progress_bar(total: usize, start: usize, quiet: bool) -> Result<Option<ProgressBar>, CliError> {
    if quiet {
        return Ok(None);
    }
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} generations {msg}",
        )
        .map_err(|e| CliError::new(format!("invalid progress template: {e}")))?
        .progress_chars("=>-");
    let pb = ProgressBar::new(total as u64);
    pb.set_style(style);
    pb.set_position(start as u64);
    Ok(Some(pb))
}

fn tick(pb: Option<&ProgressBar>, stats: &GenerationStats) {
    if let Some(pb) = pb {
        pb.set_message(format!(
            "best={:.4} mean={:.4}",
            stats.best_fitness, stats.mean_fitness
        ));
        pb.inc(1);
    }
}

/// Generation index encoded in a checkpoint file name, or 0.
fn checkpoint_generation(path: &Path) -> usize {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.strip_prefix("gen_"))
        .and_then(|s| s.parse().ok())
        .unwrap_or(0)
}

fn print_results(config: &EvolutionConfig, outcome: &EvolutionOutcome) {
    let stats = &outcome.stats;
    println!();
    println!("Evolution complete!");
    println!("  Best fitness: {:.4}", stats.best_fitness);
    println!("  Best generation: {}", stats.best_generation);
    println!("  Best pattern: {}", outcome.best.tree());
    println!("  Elapsed time: {:.1}s", stats.elapsed_seconds);
    if let Some(dir) = &config.output_dir {
        println!();
        println!("Output files:");
        println!("  Best pattern: {}/best.json", dir.display());
        println!("  Checkpoints: {}/gen_*.json", dir.display());
        println!("  History: {}/history.jsonl", dir.display());
    }
}
