//! Reconciliation output
//!
//! Three artifacts land in the output directory:
//!
//! - one reference transcript per accepted match, named `{stem}.txt` after
//!   the local clip. Existing reference files are never overwritten, so
//!   re-runs with different settings only fill gaps.
//! - `reconciliation_audit.tsv`, one row per scanned clip. A rejected row
//!   names the nearest candidate that was considered, so near-misses can
//!   be reviewed. Regenerated on every run.
//! - `reconciliation_report.json`, the full session report with totals.
//!   Regenerated on every run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use asrbench_common::lang::ClipId;

use crate::types::{LocalClip, MatchResult, MatchStrategy};

pub const AUDIT_FILENAME: &str = "reconciliation_audit.tsv";
pub const REPORT_FILENAME: &str = "reconciliation_report.json";

/// Complete reconciliation session report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Session metadata
    pub session: SessionInfo,

    /// Aggregate counters
    pub totals: ReportTotals,

    /// One record per scanned clip, in clip id order
    pub rows: Vec<AuditRecord>,
}

/// Reconciliation session metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Session timestamp (ISO 8601)
    pub timestamp: String,

    /// Strategy the run was invoked with
    pub strategy: String,

    /// Duration tolerance in seconds
    pub duration_tolerance_sec: f64,

    /// Fuzzy similarity threshold
    pub fuzzy_threshold: f64,

    /// Language filter, if one was set
    pub language: Option<String>,
}

/// Aggregate counters for one reconciliation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportTotals {
    pub clips_scanned: usize,
    pub corpus_entries: usize,
    pub accepted: usize,
    pub accepted_by_duration: usize,
    pub accepted_by_fuzzy_text: usize,
    pub rejected: usize,
    /// Clips where no comparison was possible at all
    pub unmatched: usize,
    pub unreadable_local: usize,
    pub unreadable_corpus: usize,
    pub references_written: usize,
    pub references_preserved: usize,
}

impl ReportTotals {
    /// Derive the per-outcome counters from the audit rows
    ///
    /// Counters the rows cannot see (corpus size, unreadable files,
    /// reference write stats) stay at zero for the caller to fill in.
    pub fn from_rows(rows: &[AuditRecord]) -> Self {
        let mut totals = ReportTotals {
            clips_scanned: rows.len(),
            ..Default::default()
        };
        for row in rows {
            if row.accepted {
                totals.accepted += 1;
                match row.strategy.as_deref() {
                    Some(s) if s == MatchStrategy::Duration.as_str() => {
                        totals.accepted_by_duration += 1
                    }
                    Some(s) if s == MatchStrategy::FuzzyText.as_str() => {
                        totals.accepted_by_fuzzy_text += 1
                    }
                    _ => {}
                }
            } else if row.strategy.is_some() {
                totals.rejected += 1;
            } else {
                totals.unmatched += 1;
            }
        }
        totals
    }
}

/// One audit row: the outcome of one clip's matching attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub local_file: String,
    /// Accepted: the matched entry. Rejected: the nearest candidate.
    pub matched_corpus_file: Option<String>,
    pub strategy: Option<String>,
    pub confidence: Option<f64>,
    pub accepted: bool,
}

impl AuditRecord {
    pub fn from_clip(clip: &LocalClip, result: Option<&MatchResult>) -> Self {
        match result {
            Some(r) => AuditRecord {
                local_file: clip.file_name.clone(),
                matched_corpus_file: Some(r.corpus_id.clone()),
                strategy: Some(r.strategy.as_str().to_string()),
                confidence: Some(r.confidence),
                accepted: r.accepted,
            },
            None => AuditRecord {
                local_file: clip.file_name.clone(),
                matched_corpus_file: None,
                strategy: None,
                confidence: None,
                accepted: false,
            },
        }
    }

    fn tsv_line(&self) -> String {
        let dash = || "-".to_string();
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.local_file,
            self.matched_corpus_file.clone().unwrap_or_else(dash),
            self.strategy.clone().unwrap_or_else(dash),
            self.confidence
                .map(|c| format!("{:.4}", c))
                .unwrap_or_else(dash),
            self.accepted
        )
    }
}

impl ReconciliationReport {
    pub fn new(session: SessionInfo, totals: ReportTotals, rows: Vec<AuditRecord>) -> Self {
        Self {
            session,
            totals,
            rows,
        }
    }

    /// Export report to JSON file
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Import report from JSON file
    pub fn import_json<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let report: ReconciliationReport = serde_json::from_reader(file)?;
        Ok(report)
    }
}

impl SessionInfo {
    pub fn now(
        strategy: &str,
        duration_tolerance_sec: f64,
        fuzzy_threshold: f64,
        language: Option<String>,
    ) -> Self {
        SessionInfo {
            timestamp: chrono::Utc::now().to_rfc3339(),
            strategy: strategy.to_string(),
            duration_tolerance_sec,
            fuzzy_threshold,
            language,
        }
    }
}

/// Reference/audit write statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefWriteStats {
    pub written: usize,
    pub preserved: usize,
}

/// Writes reconciliation artifacts into the output directory
pub struct ReportWriter {
    output_dir: PathBuf,
    audit_path: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        let audit_path = output_dir.join(AUDIT_FILENAME);
        ReportWriter {
            output_dir,
            audit_path,
        }
    }

    /// Redirect the audit table away from its default location
    pub fn with_audit_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.audit_path = path.into();
        self
    }

    /// Create the output directory (and audit parent) if missing
    pub fn prepare(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        if let Some(parent) = self.audit_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Write one reference file per accepted match, first writer wins
    pub fn write_references(&self, results: &[MatchResult]) -> std::io::Result<RefWriteStats> {
        let mut stats = RefWriteStats::default();
        for result in results {
            if !result.accepted {
                continue;
            }
            let text = match &result.reference_text {
                Some(text) => text,
                None => continue,
            };
            let path = self.output_dir.join(result.clip_id.reference_filename());
            if path.exists() {
                debug!(
                    path = %path.display(),
                    "reference already present, keeping existing file"
                );
                stats.preserved += 1;
                continue;
            }
            std::fs::write(&path, text)?;
            stats.written += 1;
        }
        info!(
            written = stats.written,
            preserved = stats.preserved,
            "reference files updated"
        );
        Ok(stats)
    }

    /// Write the audit table, replacing any previous one
    pub fn write_audit_tsv(&self, rows: &[AuditRecord]) -> std::io::Result<PathBuf> {
        let path = self.audit_path.clone();
        let mut out =
            String::from("local_file\tmatched_corpus_file\tstrategy\tconfidence\taccepted\n");
        for row in rows {
            out.push_str(&row.tsv_line());
            out.push('\n');
        }
        std::fs::write(&path, out)?;
        Ok(path)
    }

    /// Write the JSON session report, replacing any previous one
    pub fn write_report(&self, report: &ReconciliationReport) -> std::io::Result<PathBuf> {
        let path = self.output_dir.join(REPORT_FILENAME);
        report.export_json(&path)?;
        Ok(path)
    }
}

/// Pair each scanned clip with its match outcome, in clip id order
pub fn build_audit_rows(clips: &[LocalClip], results: &[MatchResult]) -> Vec<AuditRecord> {
    let by_clip: HashMap<ClipId, &MatchResult> =
        results.iter().map(|r| (r.clip_id, r)).collect();
    clips
        .iter()
        .map(|clip| AuditRecord::from_clip(clip, by_clip.get(&clip.id).copied()))
        .collect()
}

/// CLI formatter for reconciliation results
pub struct CliFormatter;

impl CliFormatter {
    /// Format the end-of-run summary
    pub fn format_summary(report: &ReconciliationReport) -> String {
        let mut output = String::new();
        let t = &report.totals;

        output.push_str("\n╔════════════════════════════════════════╗\n");
        output.push_str("║      Reconciliation Complete           ║\n");
        output.push_str("╚════════════════════════════════════════╝\n\n");

        output.push_str(&format!("Strategy: {}\n", report.session.strategy));
        if let Some(lang) = &report.session.language {
            output.push_str(&format!("Language: {}\n", lang));
        }
        output.push_str(&format!(
            "Clips scanned: {} (corpus entries: {})\n",
            t.clips_scanned, t.corpus_entries
        ));
        output.push_str(&format!(
            "Accepted: {} (duration: {}, fuzzy text: {})\n",
            t.accepted, t.accepted_by_duration, t.accepted_by_fuzzy_text
        ));
        output.push_str(&format!(
            "Rejected: {}, no comparison possible: {}\n",
            t.rejected, t.unmatched
        ));
        if t.unreadable_local > 0 || t.unreadable_corpus > 0 {
            output.push_str(&format!(
                "Unreadable audio: {} local, {} corpus\n",
                t.unreadable_local, t.unreadable_corpus
            ));
        }
        output.push_str(&format!(
            "References: {} written, {} preserved\n",
            t.references_written, t.references_preserved
        ));

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asrbench_common::lang::Language;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn clip(seq: u32) -> LocalClip {
        let id = ClipId::new(Language::Spanish, seq);
        LocalClip::new(id, PathBuf::from(format!("/clips/{}.mp3", id.stem())))
    }

    fn accepted_result(seq: u32, text: &str) -> MatchResult {
        MatchResult {
            clip_id: ClipId::new(Language::Spanish, seq),
            corpus_id: format!("corpus_{}.mp3", seq),
            strategy: MatchStrategy::Duration,
            confidence: 0.002,
            accepted: true,
            reference_text: Some(text.to_string()),
        }
    }

    #[test]
    fn test_build_audit_rows_covers_every_clip() {
        let clips = vec![clip(1), clip(2), clip(3)];
        let results = vec![
            accepted_result(1, "hola"),
            MatchResult {
                clip_id: ClipId::new(Language::Spanish, 3),
                corpus_id: "near.mp3".to_string(),
                strategy: MatchStrategy::FuzzyText,
                confidence: 0.41,
                accepted: false,
                reference_text: None,
            },
        ];

        let rows = build_audit_rows(&clips, &results);
        assert_eq!(rows.len(), 3);

        assert!(rows[0].accepted);
        assert_eq!(rows[0].matched_corpus_file.as_deref(), Some("corpus_1.mp3"));

        // clip 2 never got a comparison
        assert!(!rows[1].accepted);
        assert_eq!(rows[1].matched_corpus_file, None);
        assert_eq!(rows[1].strategy, None);
        assert_eq!(rows[1].confidence, None);

        // clip 3 was compared and rejected
        assert!(!rows[2].accepted);
        assert_eq!(rows[2].matched_corpus_file.as_deref(), Some("near.mp3"));
        assert_eq!(rows[2].strategy.as_deref(), Some("fuzzy_text"));
    }

    #[test]
    fn test_totals_from_rows() {
        let rows = vec![
            AuditRecord {
                local_file: "es0001.mp3".to_string(),
                matched_corpus_file: Some("a.mp3".to_string()),
                strategy: Some("duration".to_string()),
                confidence: Some(0.0),
                accepted: true,
            },
            AuditRecord {
                local_file: "es0002.mp3".to_string(),
                matched_corpus_file: Some("b.mp3".to_string()),
                strategy: Some("fuzzy_text".to_string()),
                confidence: Some(0.8),
                accepted: true,
            },
            AuditRecord {
                local_file: "es0003.mp3".to_string(),
                matched_corpus_file: Some("c.mp3".to_string()),
                strategy: Some("duration".to_string()),
                confidence: Some(0.5),
                accepted: false,
            },
            AuditRecord {
                local_file: "es0004.mp3".to_string(),
                matched_corpus_file: None,
                strategy: None,
                confidence: None,
                accepted: false,
            },
        ];

        let totals = ReportTotals::from_rows(&rows);
        assert_eq!(totals.clips_scanned, 4);
        assert_eq!(totals.accepted, 2);
        assert_eq!(totals.accepted_by_duration, 1);
        assert_eq!(totals.accepted_by_fuzzy_text, 1);
        assert_eq!(totals.rejected, 1);
        assert_eq!(totals.unmatched, 1);
    }

    #[test]
    fn test_write_references_first_writer_wins() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path());

        let stats = writer
            .write_references(&[accepted_result(1, "hola amigo")])
            .unwrap();
        assert_eq!(stats, RefWriteStats { written: 1, preserved: 0 });

        let ref_path = dir.path().join("es0001.txt");
        assert_eq!(std::fs::read_to_string(&ref_path).unwrap(), "hola amigo");

        // a second run must not touch the existing file
        let stats = writer
            .write_references(&[accepted_result(1, "different text")])
            .unwrap();
        assert_eq!(stats, RefWriteStats { written: 0, preserved: 1 });
        assert_eq!(std::fs::read_to_string(&ref_path).unwrap(), "hola amigo");
    }

    #[test]
    fn test_write_references_skips_rejected() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path());

        let rejected = MatchResult {
            clip_id: ClipId::new(Language::Spanish, 7),
            corpus_id: "near.mp3".to_string(),
            strategy: MatchStrategy::Duration,
            confidence: 0.5,
            accepted: false,
            reference_text: None,
        };

        let stats = writer.write_references(&[rejected]).unwrap();
        assert_eq!(stats, RefWriteStats::default());
        assert!(!dir.path().join("es0007.txt").exists());
    }

    #[test]
    fn test_audit_tsv_format() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path());

        let rows = vec![
            AuditRecord {
                local_file: "es0001.mp3".to_string(),
                matched_corpus_file: Some("corpus_a.mp3".to_string()),
                strategy: Some("duration".to_string()),
                confidence: Some(0.011),
                accepted: false,
            },
            AuditRecord {
                local_file: "es0002.mp3".to_string(),
                matched_corpus_file: None,
                strategy: None,
                confidence: None,
                accepted: false,
            },
        ];

        let path = writer.write_audit_tsv(&rows).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(
            lines[0],
            "local_file\tmatched_corpus_file\tstrategy\tconfidence\taccepted"
        );
        assert_eq!(lines[1], "es0001.mp3\tcorpus_a.mp3\tduration\t0.0110\tfalse");
        assert_eq!(lines[2], "es0002.mp3\t-\t-\t-\tfalse");
    }

    #[test]
    fn test_audit_tsv_custom_path() {
        let dir = TempDir::new().unwrap();
        let custom = dir.path().join("audits").join("run7.tsv");
        let writer = ReportWriter::new(dir.path().join("refs")).with_audit_path(&custom);
        writer.prepare().unwrap();

        let written = writer.write_audit_tsv(&[]).unwrap();
        assert_eq!(written, custom);
        assert!(custom.exists());
        assert!(!dir.path().join("refs").join(AUDIT_FILENAME).exists());
    }

    #[test]
    fn test_json_export_import() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path());

        let rows = vec![AuditRecord::from_clip(
            &clip(1),
            Some(&accepted_result(1, "hola")),
        )];
        let totals = ReportTotals::from_rows(&rows);
        let session = SessionInfo::now("auto", 0.010, 0.6, Some("es".to_string()));
        let report = ReconciliationReport::new(session, totals, rows);

        let path = writer.write_report(&report).unwrap();
        let imported = ReconciliationReport::import_json(path).unwrap();

        assert_eq!(imported.session.strategy, "auto");
        assert_eq!(imported.totals.accepted, 1);
        assert_eq!(imported.rows.len(), 1);
        assert!(!imported.session.timestamp.is_empty());
    }

    #[test]
    fn test_format_summary() {
        let session = SessionInfo::now("auto", 0.010, 0.6, None);
        let mut totals = ReportTotals {
            clips_scanned: 10,
            corpus_entries: 25,
            accepted: 7,
            accepted_by_duration: 5,
            accepted_by_fuzzy_text: 2,
            rejected: 2,
            unmatched: 1,
            ..Default::default()
        };
        totals.references_written = 6;
        totals.references_preserved = 1;

        let report = ReconciliationReport::new(session, totals, vec![]);
        let summary = CliFormatter::format_summary(&report);

        assert!(summary.contains("Reconciliation Complete"));
        assert!(summary.contains("Accepted: 7 (duration: 5, fuzzy text: 2)"));
        assert!(summary.contains("6 written, 1 preserved"));
    }
}
