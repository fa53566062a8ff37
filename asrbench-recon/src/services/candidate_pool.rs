//! Candidate pool with without-replacement semantics
//!
//! Every matching pass scans this pool and removes the candidate it
//! accepts, so no corpus entry can ever be assigned to two clips in one
//! run. Removal is an explicit `take`, and the pool preserves manifest
//! order throughout, which is what makes the first-seen tie-break rule
//! deterministic even after arbitrary removals.

use crate::services::duration_index::DurationIndex;
use crate::types::{Candidate, CorpusEntry};

/// Unmatched corpus entries, in manifest order
#[derive(Debug)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        CandidatePool { candidates }
    }

    /// Build the pool from manifest entries, attaching probed durations
    ///
    /// Entries whose corpus audio is unreadable (or was never probed) get
    /// `duration_sec = None` and stay in the pool; they are invisible to
    /// duration matching but still reachable by fuzzy text matching.
    pub fn build(entries: Vec<CorpusEntry>, durations: &DurationIndex) -> CandidatePool {
        let candidates = entries
            .into_iter()
            .map(|entry| {
                let duration = durations.duration_sec(&entry.source_id);
                Candidate::new(entry, duration)
            })
            .collect();
        CandidatePool { candidates }
    }

    /// Remaining candidates, in manifest order
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Remove and return the candidate at `index`
    ///
    /// `index` must come from a scan of `candidates()` with no intervening
    /// mutation. Relative order of the remaining candidates is preserved.
    pub fn take(&mut self, index: usize) -> Candidate {
        self.candidates.remove(index)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
