//! Core types for the reconciliation pipeline
//!
//! The data model is deliberately small:
//! - **CorpusEntry** - one manifest row (corpus-relative path + reference)
//! - **Candidate** - a corpus entry in the matching pool, with derived fields
//! - **LocalClip** - one locally held audio file awaiting a reference
//! - **MatchResult** - the outcome of matching one clip, at most one per run
//!
//! Confidence semantics differ by strategy: duration matches report the
//! absolute duration difference in seconds (lower is better), fuzzy text
//! matches report a similarity ratio in [0,1] (higher is better). The two
//! scales are not comparable and are always kept in separate summaries.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use asrbench_common::lang::ClipId;
use asrbench_common::textnorm;

// ============================================================================
// Corpus side
// ============================================================================

/// One row of the corpus transcript manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    /// Corpus-relative audio filename (the manifest `path` column)
    pub source_id: String,
    /// Reference transcript (the manifest `sentence` column), never empty
    pub reference_text: String,
}

/// A corpus entry held in the candidate pool, with derived match keys
#[derive(Debug, Clone)]
pub struct Candidate {
    pub entry: CorpusEntry,
    /// Probed duration in seconds at ms precision; `None` when the corpus
    /// audio was missing or unreadable, or when no duration pass ran
    pub duration_sec: Option<f64>,
    /// Normalized reference text; may be empty for scripts that normalize
    /// away entirely (Cyrillic), which excludes the entry from fuzzy search
    pub normalized_reference: String,
}

impl Candidate {
    /// Build a candidate from a manifest entry and an optional probed duration
    pub fn new(entry: CorpusEntry, duration_sec: Option<f64>) -> Self {
        let normalized_reference = textnorm::normalize(&entry.reference_text);
        Candidate {
            entry,
            duration_sec,
            normalized_reference,
        }
    }

    pub fn source_id(&self) -> &str {
        &self.entry.source_id
    }
}

// ============================================================================
// Local side
// ============================================================================

/// One locally held audio clip awaiting a recovered reference
#[derive(Debug, Clone)]
pub struct LocalClip {
    /// Language + sequence identity parsed from the file stem
    pub id: ClipId,
    /// Full path to the audio file
    pub path: PathBuf,
    /// File name component, for audit rows
    pub file_name: String,
    /// Probed duration in seconds; `None` when unreadable or not probed
    pub duration_sec: Option<f64>,
    /// Raw ASR hypothesis text, when a hypothesis file exists for the stem
    pub hypothesis: Option<String>,
}

impl LocalClip {
    pub fn new(id: ClipId, path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| id.stem());
        LocalClip {
            id,
            path,
            file_name,
            duration_sec: None,
            hypothesis: None,
        }
    }

    /// Hypothesis text after normalization; `None` when absent or when it
    /// normalizes to nothing (no usable text signal)
    pub fn normalized_hypothesis(&self) -> Option<String> {
        let raw = self.hypothesis.as_deref()?;
        let normalized = textnorm::normalize(raw);
        if normalized.is_empty() {
            None
        } else {
            Some(normalized)
        }
    }
}

// ============================================================================
// Match outcome
// ============================================================================

/// Which matching strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Nearest audio duration within a fixed tolerance
    Duration,
    /// Highest normalized-text similarity at or above a fixed threshold
    FuzzyText,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::Duration => "duration",
            MatchStrategy::FuzzyText => "fuzzy_text",
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of matching one clip against the candidate pool
///
/// At most one result exists per clip per run. `accepted == false` records
/// the nearest candidate that was still outside tolerance or below the
/// similarity threshold, so weak near-misses stay auditable. Clips with no
/// usable signal at all (unreadable audio and no hypothesis) produce no
/// result; the audit table still carries a row for them.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub clip_id: ClipId,
    /// `source_id` of the matched (or nearest rejected) corpus entry
    pub corpus_id: String,
    pub strategy: MatchStrategy,
    /// Strategy-specific confidence; see module docs for the two scales
    pub confidence: f64,
    pub accepted: bool,
    /// Recovered reference text, present exactly when `accepted`
    pub reference_text: Option<String>,
}
