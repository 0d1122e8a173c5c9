//! CLI command implementations for tidal-gp.

pub(crate) mod evolve;
pub(crate) mod generate;
pub(crate) mod mutate;
pub(crate) mod parse;

use clap::ValueEnum;
use std::convert::Infallible;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use tidal_gp::gp::{EvolutionConfig, EvolutionError, PersistenceError, UnknownOperator};
use tidal_gp::tree::{Tree, pretty};
use tidal_gp::{CatalogError, ParseError};

/// How a pattern is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum PatternFormat {
    /// Rendered pattern text, one per line.
    Text,
    /// The derivation tree as JSON.
    Json,
    /// Indented derivation tree.
    Tree,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON error: {e}"))
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<CatalogError> for CliError {
    fn from(e: CatalogError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<UnknownOperator> for CliError {
    fn from(e: UnknownOperator) -> Self {
        Self::new(e.to_string())
    }
}

impl From<PersistenceError> for CliError {
    fn from(e: PersistenceError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<EvolutionError<Infallible>> for CliError {
    fn from(e: EvolutionError<Infallible>) -> Self {
        Self::new(e.to_string())
    }
}

/// Load an [`EvolutionConfig`] from a JSON file, or the defaults.
///
/// Missing fields take their default values.
pub(crate) fn load_config(path: Option<&Path>) -> Result<EvolutionConfig, CliError> {
    let Some(path) = path else {
        return Ok(EvolutionConfig::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::new(format!("Invalid config {}: {e}", path.display())))
}

/// The given seed, or one derived from the clock.
pub(crate) fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(42)
    })
}

/// Format one tree for output.
pub(crate) fn format_tree(tree: &Tree, format: PatternFormat) -> Result<String, CliError> {
    Ok(match format {
        PatternFormat::Text => tree.to_string(),
        PatternFormat::Json => serde_json::to_string_pretty(tree)?,
        PatternFormat::Tree => format!("{tree}\n{}", pretty(tree)),
    })
}
