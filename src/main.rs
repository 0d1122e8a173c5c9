//! tidal-gp CLI: generate, inspect, mutate and evolve patterns.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// tidal-gp - grammar-constrained evolution of Tidal control patterns
#[derive(Parser, Debug)]
#[command(name = "tidal-gp")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate random patterns with the growth-controlled generator
    Generate {
        /// Number of patterns
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON config file (growth and pools sections are used)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Re-generate patterns that fail a parse/render round trip
        #[arg(long)]
        verify: bool,

        /// Output format: text, json, or tree
        #[arg(short, long, default_value = "text")]
        format: cli::PatternFormat,
    },

    /// Parse a pattern and show its derivation tree
    Parse {
        /// Pattern text
        #[arg(required = true)]
        pattern: String,

        /// Output format: text, json, or tree
        #[arg(short, long, default_value = "tree")]
        format: cli::PatternFormat,
    },

    /// Apply mutation operators to a pattern
    Mutate {
        /// Pattern text
        #[arg(required = true)]
        pattern: String,

        /// Operator name (default: random from all operators)
        #[arg(short, long)]
        operator: Option<String>,

        /// Number of successive mutations
        #[arg(short = 'n', long, default_value = "1")]
        steps: usize,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// JSON config file (pools section is used)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Evolve a population using the built-in structural fitness
    Evolve {
        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory for checkpoints and the best pattern
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Population size
        #[arg(short, long)]
        population: Option<usize>,

        /// Number of generations
        #[arg(short, long)]
        generations: Option<usize>,

        /// Random seed (default: from config)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Resume an evolution run from a checkpoint
    Resume {
        /// Checkpoint file, or an output directory to take the latest from
        #[arg(required = true)]
        checkpoint: PathBuf,

        /// JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Total number of generations to reach
        #[arg(short, long)]
        generations: Option<usize>,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let result = match args.command {
        Commands::Generate {
            count,
            seed,
            config,
            verify,
            format,
        } => cli::generate::execute(count, seed, config, verify, format),

        Commands::Parse { pattern, format } => cli::parse::execute(&pattern, format),

        Commands::Mutate {
            pattern,
            operator,
            steps,
            seed,
            config,
        } => cli::mutate::execute(&pattern, operator.as_deref(), steps, seed, config),

        Commands::Evolve {
            config,
            output,
            population,
            generations,
            seed,
            quiet,
        } => cli::evolve::execute(config, output, population, generations, seed, quiet),

        Commands::Resume {
            checkpoint,
            config,
            generations,
            quiet,
        } => cli::evolve::resume(checkpoint, config, generations, quiet),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
