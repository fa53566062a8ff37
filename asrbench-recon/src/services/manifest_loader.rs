//! Corpus manifest loading
//!
//! The manifest is a TSV export with a header row; only the `path` and
//! `sentence` columns matter here, located by name so column order and
//! extra columns do not. Rows with an empty path or an empty sentence are
//! excluded at load time, since they can never produce a usable reference.
//!
//! A missing or unreadable manifest is fatal to the caller: the candidate
//! pool must be fully known before without-replacement matching starts.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::types::CorpusEntry;

/// Errors from manifest loading
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Manifest file does not exist
    #[error("Manifest not found: {0}")]
    NotFound(String),

    /// Manifest could not be read
    #[error("IO error reading manifest: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest is empty (no header row)
    #[error("Manifest has no header row: {0}")]
    NoHeader(String),

    /// Header row lacks a required column
    #[error("Manifest {path} is missing required column: {column}")]
    MissingColumn { path: String, column: String },
}

/// Load corpus entries from a TSV manifest
///
/// Returns entries in file order, which later fixes the first-seen
/// tie-break order of the candidate pool.
pub fn load_manifest(path: &Path) -> Result<Vec<CorpusEntry>, ManifestError> {
    if !path.exists() {
        return Err(ManifestError::NotFound(path.display().to_string()));
    }

    let file = File::open(path)?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(ManifestError::NoHeader(path.display().to_string())),
    };
    let columns: Vec<&str> = header.trim_end_matches('\r').split('\t').collect();
    let path_idx = column_index(&columns, "path").ok_or_else(|| ManifestError::MissingColumn {
        path: path.display().to_string(),
        column: "path".to_string(),
    })?;
    let sentence_idx =
        column_index(&columns, "sentence").ok_or_else(|| ManifestError::MissingColumn {
            path: path.display().to_string(),
            column: "sentence".to_string(),
        })?;

    let mut entries = Vec::new();
    let mut skipped_short = 0usize;
    let mut skipped_empty = 0usize;

    for (line_no, line) in lines.enumerate() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() <= path_idx.max(sentence_idx) {
            // data row with fewer columns than the header promises
            warn!(line = line_no + 2, "skipping malformed manifest row");
            skipped_short += 1;
            continue;
        }

        let source_id = fields[path_idx].trim();
        let sentence = fields[sentence_idx].trim();
        if source_id.is_empty() || sentence.is_empty() {
            debug!(line = line_no + 2, "skipping row with empty path or sentence");
            skipped_empty += 1;
            continue;
        }

        entries.push(CorpusEntry {
            source_id: source_id.to_string(),
            reference_text: sentence.to_string(),
        });
    }

    info!(
        manifest = %path.display(),
        entries = entries.len(),
        skipped_malformed = skipped_short,
        skipped_empty = skipped_empty,
        "manifest loaded"
    );
    Ok(entries)
}

fn column_index(columns: &[&str], name: &str) -> Option<usize> {
    columns.iter().position(|c| c.trim() == name)
}
