//! Mutate command implementation.

#![allow(clippy::needless_pass_by_value)]

use super::{CliError, load_config, resolve_seed};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use std::path::PathBuf;
use tidal_gp::gp::Operator;
use tidal_gp::grammar::{Catalog, parse};

/// Execute the mutate command.
pub(crate) fn execute(
    pattern: &str,
    operator: Option<&str>,
    steps: usize,
    seed: Option<u64>,
    config: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref())?;
    let catalog = Catalog::new(config.pools)?;
    let fixed = operator.map(str::parse::<Operator>).transpose()?;
    let mut rng = Xoshiro256StarStar::seed_from_u64(resolve_seed(seed));

    let mut tree = parse(pattern)?;
    println!("   {tree}");
    for step in 1..=steps {
        let op = fixed.unwrap_or_else(|| Operator::ALL[rng.gen_range(0..Operator::ALL.len())]);
        match op.apply(&tree, &catalog, &mut rng) {
            Ok(next) => {
                tree = next;
                println!("{step:>2} {op}: {tree}");
            }
            Err(e) => {
                eprintln!("{step:>2} {op}: skipped ({e})");
            }
        }
    }
    println!("size={} depth={}", tree.size(), tree.depth());
    Ok(())
}
