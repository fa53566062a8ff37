//! Batch duration probing
//!
//! Builds the duration side of the match keys: file identifier to duration
//! in seconds at ms precision, for the corpus store and for the local clip
//! set alike. A file that cannot be probed gets an explicit `Unreadable`
//! marker, never a zero; nearest-duration search has to distinguish "empty
//! clip" from "probe failed". Unreadable files are logged and excluded,
//! they do not abort the run.

use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

use asrbench_common::audio;

/// Probe outcome for one file
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbedDuration {
    /// Duration in seconds, rounded to millisecond precision
    Seconds(f64),
    /// Header read and decode both failed, or the file is missing
    Unreadable,
}

/// Identifier-to-duration mapping for one directory of audio files
#[derive(Debug, Default)]
pub struct DurationIndex {
    map: HashMap<String, ProbedDuration>,
}

impl DurationIndex {
    /// Probe every `(identifier, path)` pair into an index
    pub fn probe_files<I>(files: I) -> DurationIndex
    where
        I: IntoIterator<Item = (String, PathBuf)>,
    {
        let mut map = HashMap::new();
        let mut unreadable = 0usize;

        for (id, path) in files {
            match audio::probe_duration_sec(&path) {
                Ok(duration_sec) => {
                    map.insert(id, ProbedDuration::Seconds(duration_sec));
                }
                Err(e) => {
                    warn!(
                        id = %id,
                        path = %path.display(),
                        error = %e,
                        "audio unreadable, excluded from duration matching"
                    );
                    map.insert(id, ProbedDuration::Unreadable);
                    unreadable += 1;
                }
            }
        }

        info!(
            probed = map.len(),
            unreadable = unreadable,
            "duration index built"
        );
        DurationIndex { map }
    }

    pub fn get(&self, id: &str) -> Option<&ProbedDuration> {
        self.map.get(id)
    }

    /// Duration for an identifier; `None` when absent or unreadable
    pub fn duration_sec(&self, id: &str) -> Option<f64> {
        match self.map.get(id) {
            Some(ProbedDuration::Seconds(sec)) => Some(*sec),
            _ => None,
        }
    }

    pub fn is_unreadable(&self, id: &str) -> bool {
        matches!(self.map.get(id), Some(ProbedDuration::Unreadable))
    }

    pub fn unreadable_count(&self) -> usize {
        self.map
            .values()
            .filter(|d| matches!(d, ProbedDuration::Unreadable))
            .count()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
