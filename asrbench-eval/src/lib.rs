//! # asrbench-eval
//!
//! Benchmark scoring and measurement. `asrbench-eval` compares ASR
//! hypotheses against the reconciled reference transcripts and reports
//! word and character error rates per clip, per language, and overall.
//! `asrbench-measure` runs an external ASR command over a clips directory
//! and reports real-time factor plus CPU and memory usage sampled while
//! it ran.

pub mod eval;
pub mod perf;
pub mod report;
pub mod stats;
pub mod wer;

pub use eval::EvalConfig;
pub use perf::MeasureConfig;
pub use report::{EvalReport, PerfReport};
