//! Parse command implementation.

use super::{CliError, PatternFormat, format_tree};
use tidal_gp::grammar::{parse, round_trips};

/// Execute the parse command.
pub(crate) fn execute(pattern: &str, format: PatternFormat) -> Result<(), CliError> {
    let tree = parse(pattern)?;
    println!("{}", format_tree(&tree, format)?);
    if format != PatternFormat::Json {
        println!(
            "size={} depth={} audible={} round_trip={}",
            tree.size(),
            tree.depth(),
            tree.root().is_audible(),
            round_trips(&tree)
        );
    }
    Ok(())
}
