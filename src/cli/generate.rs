//! Generate command implementation.

#![allow(clippy::needless_pass_by_value)]

use super::{CliError, PatternFormat, format_tree, load_config, resolve_seed};
use std::path::PathBuf;
use tidal_gp::gp::generate_many_par;
use tidal_gp::grammar::Catalog;

/// Execute the generate command.
pub(crate) fn execute(
    count: usize,
    seed: Option<u64>,
    config: Option<PathBuf>,
    verify: bool,
    format: PatternFormat,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref())?;
    let catalog = Catalog::new(config.pools.clone())?;
    let mut growth = config.growth;
    growth.verify_round_trip |= verify;

    let seed = resolve_seed(seed);
    log::info!("generating {count} patterns with seed {seed}");
    let trees = generate_many_par(count, &growth, &catalog, seed);

    if format == PatternFormat::Json {
        println!("{}", serde_json::to_string_pretty(&trees)?);
        return Ok(());
    }
    for tree in &trees {
        println!("{}", format_tree(tree, format)?);
    }
    Ok(())
}
