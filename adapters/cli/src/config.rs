use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use isleweave_core::GridSpec;
use isleweave_system_generation::GenerationOptions;
use serde::Deserialize;

/// Options file read from the working directory when `--options` is omitted.
pub(crate) const DEFAULT_OPTIONS_FILE: &str = "isleweave.toml";

/// On-disk shape of the generation options.
///
/// ```toml
/// [grid]
/// side = 21
/// spacing = 100.0
///
/// [generation]
/// target_cells = 32
/// starting_forks = 2
/// fork_weights = [1.0, 4.0, 2.0, 0.5]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OptionsFile {
    grid: Option<GridSpec>,
    generation: GenerationTable,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GenerationTable {
    target_cells: Option<u32>,
    starting_forks: Option<u32>,
    fork_weights: Option<[f64; 4]>,
}

impl OptionsFile {
    fn into_options(self) -> GenerationOptions {
        let defaults = GenerationOptions::default();
        GenerationOptions {
            grid: self.grid.unwrap_or(defaults.grid),
            target_cells: self.generation.target_cells.unwrap_or(defaults.target_cells),
            starting_forks: self
                .generation
                .starting_forks
                .unwrap_or(defaults.starting_forks),
            fork_weights: self.generation.fork_weights.unwrap_or(defaults.fork_weights),
        }
    }
}

/// Parses an options file, filling omitted keys with defaults.
pub(crate) fn parse_options(contents: &str) -> Result<GenerationOptions> {
    let file: OptionsFile = toml::from_str(contents).context("invalid options file")?;
    Ok(file.into_options())
}

/// Loads generation options.
///
/// An explicit path must exist. Without one, [`DEFAULT_OPTIONS_FILE`] is read
/// if present and defaults are used otherwise.
pub(crate) fn load_options(path: Option<&Path>) -> Result<GenerationOptions> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_OPTIONS_FILE);
            if !fallback.exists() {
                tracing::debug!(target: "isleweave::cli", "options.defaults");
                return Ok(GenerationOptions::default());
            }
            fallback
        }
    };

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read options file {}", path.display()))?;
    let options = parse_options(&contents)
        .with_context(|| format!("failed to load options from {}", path.display()))?;
    tracing::info!(
        target: "isleweave::cli",
        path = %path.display(),
        target_cells = options.target_cells,
        side = options.grid.side(),
        "options.loaded"
    );
    Ok(options)
}
