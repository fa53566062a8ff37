//! # asrbench-recon
//!
//! Reference reconciliation pipeline. Locally held benchmark clips lost
//! their pairing with the corpus transcripts they were cut from; this crate
//! recovers it by matching each clip against the corpus manifest, either by
//! audio duration or by fuzzy similarity between an ASR hypothesis and the
//! normalized reference texts. Accepted matches are written to the working
//! reference store and every attempt is recorded in an audit table.

pub mod config;
pub mod pipeline;
pub mod services;
pub mod types;

pub use config::{ReconcileConfig, RunStrategy};
pub use types::{Candidate, CorpusEntry, LocalClip, MatchResult, MatchStrategy};
