//! Puzzle definitions loaded from TOML files.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use rope_timer_core::{PuzzleDefinition, REFERENCE_DURATION_MINUTES, TARGET_TOLERANCE_SECONDS};
use serde::Deserialize;

const DEFAULT_TARGET_MINUTES: f64 = 45.0;

/// Puzzle description as written in a TOML file.
///
/// ```toml
/// target_minutes = 45.0
/// tolerance_seconds = 1
///
/// [ropes]
/// a = [0.4, 1.6, 0.8, 1.2]
/// b = [1.2, 0.7, 1.4, 0.5]
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PuzzleFile {
    #[serde(default = "default_reference_minutes")]
    reference_minutes: f64,
    #[serde(default = "default_target_minutes")]
    target_minutes: f64,
    #[serde(default = "default_tolerance_seconds")]
    tolerance_seconds: u64,
    ropes: RopeWeights,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RopeWeights {
    a: Vec<f64>,
    b: Vec<f64>,
}

fn default_reference_minutes() -> f64 {
    REFERENCE_DURATION_MINUTES
}

fn default_target_minutes() -> f64 {
    DEFAULT_TARGET_MINUTES
}

fn default_tolerance_seconds() -> u64 {
    TARGET_TOLERANCE_SECONDS
}

/// Reads and validates a puzzle definition from a TOML file.
pub(crate) fn load(path: &Path) -> Result<PuzzleDefinition> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read puzzle file at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid puzzle file {}", path.display()))
}

/// Parses and validates a puzzle definition from TOML text.
pub(crate) fn parse(contents: &str) -> Result<PuzzleDefinition> {
    let file: PuzzleFile =
        toml::from_str(contents).context("failed to parse puzzle toml contents")?;

    let target_seconds = (file.target_minutes * 60.0).round();
    if !target_seconds.is_finite() || target_seconds < 0.0 {
        bail!(
            "target_minutes must be a non-negative number, got {}",
            file.target_minutes
        );
    }

    let puzzle = PuzzleDefinition::new(
        &file.ropes.a,
        &file.ropes.b,
        file.reference_minutes,
        target_seconds as u64,
        file.tolerance_seconds,
    )?;
    Ok(puzzle)
}
