//! Reconciliation run configuration
//!
//! One `ReconcileConfig` is assembled in `main` from CLI flags, environment
//! variables, and the shared TOML config, then passed by reference into
//! every component. Components never read ambient configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use asrbench_common::config::ToolConfig;
use asrbench_common::error::Error;
use asrbench_common::lang::Language;

/// Which matching passes a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStrategy {
    /// Duration matching only
    Duration,
    /// Fuzzy hypothesis-text matching only
    FuzzyText,
    /// Duration first, fuzzy fallback for clips left unmatched
    Auto,
}

impl RunStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStrategy::Duration => "duration",
            RunStrategy::FuzzyText => "fuzzy-text",
            RunStrategy::Auto => "auto",
        }
    }

    /// Whether this run performs the duration pass
    pub fn uses_duration(&self) -> bool {
        matches!(self, RunStrategy::Duration | RunStrategy::Auto)
    }

    /// Whether this run performs the fuzzy text pass
    pub fn uses_fuzzy(&self) -> bool {
        matches!(self, RunStrategy::FuzzyText | RunStrategy::Auto)
    }
}

impl FromStr for RunStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "duration" => Ok(RunStrategy::Duration),
            "fuzzy-text" | "fuzzy_text" | "fuzzy" => Ok(RunStrategy::FuzzyText),
            "auto" => Ok(RunStrategy::Auto),
            other => Err(Error::InvalidInput(format!(
                "unknown strategy: {} (expected duration, fuzzy-text, or auto)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for RunStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full configuration for one reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Corpus transcript manifest (TSV with `path` and `sentence` columns)
    pub manifest: PathBuf,
    /// Directory of corpus audio files named by the manifest `path` column
    pub corpus_audio_dir: PathBuf,
    /// Directory of local clips named `{lang}{seq:04}.<ext>`
    pub clips_dir: PathBuf,
    /// Directory of ASR hypothesis outputs keyed by clip stem, if any
    pub hypotheses_dir: Option<PathBuf>,
    /// Working reference store; recovered references and reports land here
    pub output_dir: PathBuf,
    /// Audit table destination; default is `reconciliation_audit.tsv`
    /// inside the output directory
    pub audit_path: Option<PathBuf>,
    /// Restrict the run to clips of one language
    pub language: Option<Language>,
    pub strategy: RunStrategy,
    /// Duration tolerance in seconds (inclusive boundary)
    pub duration_tolerance_sec: f64,
    /// Fuzzy similarity acceptance threshold in [0,1] (inclusive boundary)
    pub fuzzy_threshold: f64,
    /// Audio file extensions recognized when scanning
    pub audio_extensions: Vec<String>,
}

impl ReconcileConfig {
    /// Merge CLI-level overrides with shared tunables
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        manifest: PathBuf,
        corpus_audio_dir: PathBuf,
        clips_dir: PathBuf,
        hypotheses_dir: Option<PathBuf>,
        output_dir: PathBuf,
        audit_path: Option<PathBuf>,
        language: Option<Language>,
        strategy: RunStrategy,
        tolerance_override: Option<f64>,
        threshold_override: Option<f64>,
        tool_config: &ToolConfig,
    ) -> Self {
        ReconcileConfig {
            manifest,
            corpus_audio_dir,
            clips_dir,
            hypotheses_dir,
            output_dir,
            audit_path,
            language,
            strategy,
            duration_tolerance_sec: tolerance_override
                .unwrap_or(tool_config.duration_tolerance_sec),
            fuzzy_threshold: threshold_override.unwrap_or(tool_config.fuzzy_threshold),
            audio_extensions: tool_config.audio_extensions.clone(),
        }
    }
}
