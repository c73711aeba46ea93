//! Configuration file loading for the match runner.
//!
//! The file declares external engines, which become playable under their
//! table name, and presets, which bundle match settings under one name.

use match_engine::registry::EngineSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or querying the configuration file.
#[derive(Error, Debug)]
pub enum ConfigFileError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or does not match the expected layout.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
}

/// Named bundle of match settings.
///
/// Every field is optional; unset fields fall through to the built-in
/// defaults, and flags given on the command line win over both.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PresetConfig {
    pub timer: Option<String>,
    pub start_seconds: Option<f64>,
    pub increment_seconds: Option<f64>,
    pub wins_required: Option<u32>,
    /// FEN every game starts from.
    pub initial_board_state: Option<String>,
}

/// Contents of `match.toml`.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct MatchConfig {
    /// External UCI engines, playable by table name.
    #[serde(default)]
    pub engines: HashMap<String, EngineSpec>,
    #[serde(default)]
    pub presets: HashMap<String, PresetConfig>,
}

impl MatchConfig {
    /// Loads the configuration.
    ///
    /// With no explicit path, `match.toml` in the working directory is used
    /// and a missing file yields an empty configuration. An explicit path
    /// must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Read`] if the file cannot be read, or
    /// [`ConfigFileError::Parse`] if it contains invalid TOML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigFileError> {
        match path {
            Some(path) => Self::read(path),
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::read(&default_path)
                } else {
                    tracing::debug!("No {} found, using defaults", default_path.display());
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigFileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!(
            engines = config.engines.len(),
            presets = config.presets.len(),
            "Loaded {}",
            path.display()
        );
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from("match.toml")
    }

    /// Retrieves a preset by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::UnknownPreset`] if no preset has that name.
    pub fn preset(&self, name: &str) -> Result<&PresetConfig, ConfigFileError> {
        self.presets
            .get(name)
            .ok_or_else(|| ConfigFileError::UnknownPreset(name.to_string()))
    }
}
