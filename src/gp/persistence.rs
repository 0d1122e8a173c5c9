//! Checkpoints, run history and best-pattern export.
//!
//! Everything is JSON via `serde_json`. Checkpoints carry a format version
//! and are written to a temporary file first and renamed into place, so an
//! interrupted write never leaves a truncated checkpoint behind.

use crate::gp::evolution::GenerationStats;
use crate::gp::genome::Genome;
use crate::gp::population::Population;
use crate::tree::Tree;
use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Current checkpoint format version.
pub const CHECKPOINT_VERSION: u32 = 1;

/// File name prefix for generation checkpoints.
const CHECKPOINT_PREFIX: &str = "gen_";

/// Error reading or writing run state.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// Malformed JSON or a record that does not match the schema.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// Checkpoint written by an incompatible format version.
    #[error("unsupported checkpoint version {found} (expected {expected})")]
    Version {
        /// Version in the file.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },
    /// No checkpoint in the directory.
    #[error("no checkpoint found in {0}")]
    NoCheckpoint(PathBuf),
}

impl PersistenceError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Run state between two generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Format version.
    pub version: u32,
    /// Number of completed generations; a resumed run starts here.
    pub generation: usize,
    /// Population after `generation` generations.
    pub population: Population,
    /// Generator state after `generation` generations.
    pub rng_state: Xoshiro256StarStar,
    /// Best genome seen so far and the generation it appeared in.
    pub best: Option<(usize, Genome)>,
    /// Free-form run metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Checkpoint {
    /// Checkpoint at the current format version.
    #[must_use]
    pub fn new(
        generation: usize,
        population: Population,
        rng_state: Xoshiro256StarStar,
        best: Option<(usize, Genome)>,
    ) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            generation,
            population,
            rng_state,
            best,
            metadata: BTreeMap::new(),
        }
    }
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

/// Best genome, exported with its rendered text for easy inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestPattern {
    /// Generation the genome appeared in.
    pub generation: usize,
    /// Its score.
    pub fitness: Option<f64>,
    /// Rendered pattern text.
    pub pattern: String,
    /// Node count.
    pub size: usize,
    /// Tree depth.
    pub depth: usize,
    /// The tree itself.
    pub tree: Tree,
}

impl BestPattern {
    /// Export record for `genome`.
    #[must_use]
    pub fn new(generation: usize, genome: &Genome) -> Self {
        let tree = genome.tree().clone();
        Self {
            generation,
            fitness: genome.score(),
            pattern: tree.to_string(),
            size: tree.size(),
            depth: tree.depth(),
            tree,
        }
    }
}

/// Path of the checkpoint after `generation` completed generations.
#[must_use]
pub fn checkpoint_path(output_dir: &Path, generation: usize) -> PathBuf {
    output_dir.join(format!("{CHECKPOINT_PREFIX}{generation:05}.json"))
}

/// Path of the best-pattern export.
#[must_use]
pub fn best_path(output_dir: &Path) -> PathBuf {
    output_dir.join("best.json")
}

/// Path of the per-generation statistics log.
#[must_use]
pub fn history_path(output_dir: &Path) -> PathBuf {
    output_dir.join("history.jsonl")
}

/// Serialize `value` as pretty JSON to `path` via a temporary file and rename.
fn write_json_atomic<T: Serialize>(value: &T, path: &Path) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| PersistenceError::io(parent, e))?;
    }
    let json = serde_json::to_vec_pretty(value).map_err(|e| PersistenceError::json(path, e))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| PersistenceError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        PersistenceError::io(path, e)
    })
}

/// Write a checkpoint atomically.
///
/// # Errors
///
/// Returns an error if serialization or file I/O fails.
pub fn save_checkpoint(checkpoint: &Checkpoint, path: &Path) -> Result<(), PersistenceError> {
    write_json_atomic(checkpoint, path)
}

/// Load a checkpoint, rejecting other format versions.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or its version is
/// not [`CHECKPOINT_VERSION`].
pub fn load_checkpoint(path: &Path) -> Result<Checkpoint, PersistenceError> {
    let text = fs::read_to_string(path).map_err(|e| PersistenceError::io(path, e))?;
    let probe: VersionProbe =
        serde_json::from_str(&text).map_err(|e| PersistenceError::json(path, e))?;
    if probe.version != CHECKPOINT_VERSION {
        return Err(PersistenceError::Version {
            found: probe.version,
            expected: CHECKPOINT_VERSION,
        });
    }
    serde_json::from_str(&text).map_err(|e| PersistenceError::json(path, e))
}

/// The checkpoint with the highest generation in `output_dir`.
///
/// # Errors
///
/// Returns [`PersistenceError::NoCheckpoint`] if there is none, or an I/O
/// error if the directory cannot be read.
pub fn latest_checkpoint(output_dir: &Path) -> Result<PathBuf, PersistenceError> {
    let entries = fs::read_dir(output_dir).map_err(|e| PersistenceError::io(output_dir, e))?;
    let mut latest: Option<(usize, PathBuf)> = None;
    for entry in entries {
        let path = entry.map_err(|e| PersistenceError::io(output_dir, e))?.path();
        let generation = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix(CHECKPOINT_PREFIX))
            .and_then(|rest| rest.strip_suffix(".json"))
            .and_then(|digits| digits.parse::<usize>().ok());
        if let Some(generation) = generation
            && latest.as_ref().is_none_or(|(best, _)| generation > *best)
        {
            latest = Some((generation, path));
        }
    }
    latest
        .map(|(_, path)| path)
        .ok_or_else(|| PersistenceError::NoCheckpoint(output_dir.to_path_buf()))
}

/// Export the best genome to `best.json` in `output_dir`.
///
/// # Errors
///
/// Returns an error if serialization or file I/O fails.
pub fn save_best(
    output_dir: &Path,
    generation: usize,
    genome: &Genome,
) -> Result<PathBuf, PersistenceError> {
    let path = best_path(output_dir);
    write_json_atomic(&BestPattern::new(generation, genome), &path)?;
    Ok(path)
}

/// Append one line of generation statistics to `history.jsonl`.
///
/// # Errors
///
/// Returns an error if serialization or file I/O fails.
pub fn append_history(output_dir: &Path, stats: &GenerationStats) -> Result<(), PersistenceError> {
    fs::create_dir_all(output_dir).map_err(|e| PersistenceError::io(output_dir, e))?;
    let path = history_path(output_dir);
    let mut line = serde_json::to_string(stats).map_err(|e| PersistenceError::json(&path, e))?;
    line.push('\n');
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut file| file.write_all(line.as_bytes()))
        .map_err(|e| PersistenceError::io(&path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::genome::Fitness;
    use crate::gp::seeds::random_seed;
    use crate::grammar::Catalog;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn checkpoint(generation: usize) -> Checkpoint {
        let catalog = Catalog::default();
        let mut rng = Xoshiro256StarStar::seed_from_u64(42);
        let population: Population = (0..5)
            .map(|i| {
                Genome::new(random_seed(&catalog, &mut rng))
                    .with_fitness(Fitness::Scored(f64::from(i) * 0.2))
            })
            .collect();
        let best = population.best().cloned().map(|g| (generation, g));
        let mut checkpoint = Checkpoint::new(generation, population, rng, best);
        checkpoint
            .metadata
            .insert("seed".to_string(), serde_json::json!(42));
        checkpoint
    }

    #[test]
    fn test_checkpoint_roundtrip() {
        let dir = tempdir().unwrap();
        let path = checkpoint_path(dir.path(), 3);
        let original = checkpoint(3);

        save_checkpoint(&original, &path).unwrap();
        let loaded = load_checkpoint(&path).unwrap();

        assert_eq!(loaded, original);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gen_00001.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), b"x").unwrap();

        assert!(save_checkpoint(&checkpoint(1), &path).is_err());
        assert!(!path.with_extension("json.tmp").exists());
        assert!(path.join("occupied").exists());
    }

    #[test]
    fn test_rng_state_survives() {
        use rand::RngCore;

        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let original = checkpoint(1);
        save_checkpoint(&original, &path).unwrap();

        let mut a = original.rng_state.clone();
        let mut b = load_checkpoint(&path).unwrap().rng_state;
        for _ in 0..10 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_version_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("old.json");
        let mut old = checkpoint(0);
        old.version = 99;
        save_checkpoint(&old, &path).unwrap();

        match load_checkpoint(&path) {
            Err(PersistenceError::Version { found, expected }) => {
                assert_eq!(found, 99);
                assert_eq!(expected, CHECKPOINT_VERSION);
            }
            other => panic!("expected version error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(
            load_checkpoint(&path),
            Err(PersistenceError::Json { .. })
        ));
    }

    #[test]
    fn test_latest_checkpoint() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            latest_checkpoint(dir.path()),
            Err(PersistenceError::NoCheckpoint(_))
        ));

        for generation in [2, 10, 4] {
            save_checkpoint(&checkpoint(generation), &checkpoint_path(dir.path(), generation))
                .unwrap();
        }
        fs::write(dir.path().join("best.json"), b"{}").unwrap();

        let latest = latest_checkpoint(dir.path()).unwrap();
        assert_eq!(latest, checkpoint_path(dir.path(), 10));
    }

    #[test]
    fn test_save_best() {
        let dir = tempdir().unwrap();
        let genome = Genome::new(crate::grammar::parse(r#"s("bd") # n "0 4""#).unwrap())
            .with_fitness(Fitness::Scored(0.6));
        let path = save_best(dir.path(), 7, &genome).unwrap();

        let text = fs::read_to_string(path).unwrap();
        let best: BestPattern = serde_json::from_str(&text).unwrap();
        assert_eq!(best.pattern, r#"s("bd") # n "0 4""#);
        assert_eq!(best.generation, 7);
        assert_eq!(best.fitness, Some(0.6));
        assert_eq!(&best.tree, genome.tree());
    }
}
