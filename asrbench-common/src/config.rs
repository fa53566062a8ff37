//! Configuration loading for the asrbench tools
//!
//! Tunables live in an optional TOML file and resolve with priority:
//! command line > environment > config file > built-in default. The file
//! only supplies defaults; every component receives an explicit config
//! struct at construction and never reads ambient globals.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Environment variable naming an explicit config file path
pub const CONFIG_ENV_VAR: &str = "ASRBENCH_CONFIG";

/// Shared tunables, loadable from a TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Duration tolerance in seconds for duration matching
    #[serde(default = "default_duration_tolerance_sec")]
    pub duration_tolerance_sec: f64,

    /// Similarity acceptance threshold for fuzzy text matching, in [0,1]
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Audio file extensions recognized when scanning clip directories
    #[serde(default = "default_audio_extensions")]
    pub audio_extensions: Vec<String>,
}

fn default_duration_tolerance_sec() -> f64 {
    // 10 ms: tight enough that only a re-encode of the same source matches
    0.010
}

fn default_fuzzy_threshold() -> f64 {
    0.6
}

fn default_audio_extensions() -> Vec<String> {
    ["mp3", "wav", "flac", "ogg", "m4a", "opus"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            duration_tolerance_sec: default_duration_tolerance_sec(),
            fuzzy_threshold: default_fuzzy_threshold(),
            audio_extensions: default_audio_extensions(),
        }
    }
}

impl ToolConfig {
    /// Load tunables from a TOML file
    pub fn load(path: &Path) -> Result<ToolConfig> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        let config: ToolConfig = toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("invalid config file {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Resolve tunables from the usual sources
    ///
    /// Resolution order for the file path:
    /// 1. Explicit CLI argument (must exist; error if unreadable)
    /// 2. `ASRBENCH_CONFIG` environment variable (must exist)
    /// 3. OS config directory (`asrbench/config.toml`), if present
    /// 4. Built-in defaults
    pub fn resolve(cli_arg: Option<PathBuf>) -> Result<ToolConfig> {
        if let Some(path) = cli_arg {
            info!(path = %path.display(), "using config file from command line");
            return ToolConfig::load(&path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(env_path);
            info!(path = %path.display(), "using config file from {}", CONFIG_ENV_VAR);
            return ToolConfig::load(&path);
        }

        if let Some(path) = default_config_path() {
            if path.exists() {
                info!(path = %path.display(), "using config file from OS config directory");
                return ToolConfig::load(&path);
            }
        }

        debug!("no config file found, using built-in defaults");
        Ok(ToolConfig::default())
    }
}

/// Default config file location under the OS config directory
pub fn default_config_path() -> Option<PathBuf> {
    match dirs::config_dir() {
        Some(dir) => Some(dir.join("asrbench").join("config.toml")),
        None => {
            warn!("no OS config directory available");
            None
        }
    }
}
