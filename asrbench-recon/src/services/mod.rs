//! Service modules for the reconciliation pipeline

pub mod candidate_pool;
pub mod clip_scanner;
pub mod duration_index;
pub mod manifest_loader;
pub mod matcher;
pub mod report_writer;

pub use candidate_pool::CandidatePool;
pub use clip_scanner::{ClipScanner, ScanError};
pub use duration_index::{DurationIndex, ProbedDuration};
pub use manifest_loader::{load_manifest, ManifestError};
pub use matcher::{Matcher, MatcherConfig};
pub use report_writer::{
    build_audit_rows, AuditRecord, CliFormatter, ReconciliationReport, ReportTotals, ReportWriter,
    SessionInfo,
};
