//! Report generation and formatting
//!
//! JSON export plus console tables for both tools: accuracy scoring
//! (`asrbench-eval`) and performance measurement (`asrbench-measure`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::perf::ResourceSample;
use crate::stats::{DurationBuckets, SummaryStats};
use crate::wer::ErrorCounts;

pub const EVAL_TSV_FILENAME: &str = "eval_scores.tsv";
pub const EVAL_REPORT_FILENAME: &str = "eval_report.json";

// ============================================================================
// Accuracy scoring report
// ============================================================================

/// Complete accuracy scoring report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    /// Session metadata
    pub session: EvalSessionInfo,

    /// Aggregate over every scored clip
    pub overall: GroupSummary,

    /// Aggregates per language code, sorted
    pub per_language: BTreeMap<String, GroupSummary>,

    /// Per-clip scores in clip order
    pub clips: Vec<ClipScore>,
}

/// Scoring session metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalSessionInfo {
    /// Session timestamp (ISO 8601)
    pub timestamp: String,
    pub refs_dir: String,
    pub hypotheses_dir: String,
    /// Whether missing hypotheses were scored as empty text
    pub score_missing: bool,
}

/// One clip's accuracy scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipScore {
    /// Clip stem, `es0001`
    pub clip: String,
    pub language: String,
    pub ref_words: usize,
    pub word_edits: usize,
    pub ref_chars: usize,
    pub char_edits: usize,
    pub wer: f64,
    pub cer: f64,
}

/// Aggregate scores for one group of clips (a language, or everything)
///
/// The micro rates pool edit counts and reference lengths before dividing,
/// so long clips weigh more. The `wer`/`cer` summaries describe the
/// per-clip rate distribution (their mean is the macro average).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    pub clips_scored: usize,
    pub skipped_no_hypothesis: usize,
    pub skipped_empty_reference: usize,
    pub micro_wer: f64,
    pub micro_cer: f64,
    pub wer: Option<SummaryStats>,
    pub cer: Option<SummaryStats>,
}

impl GroupSummary {
    pub fn build(
        scores: &[&ClipScore],
        skipped_no_hypothesis: usize,
        skipped_empty_reference: usize,
    ) -> GroupSummary {
        let pooled_words = ErrorCounts {
            edits: scores.iter().map(|s| s.word_edits).sum(),
            ref_len: scores.iter().map(|s| s.ref_words).sum(),
        };
        let pooled_chars = ErrorCounts {
            edits: scores.iter().map(|s| s.char_edits).sum(),
            ref_len: scores.iter().map(|s| s.ref_chars).sum(),
        };
        let wers: Vec<f64> = scores.iter().map(|s| s.wer).collect();
        let cers: Vec<f64> = scores.iter().map(|s| s.cer).collect();
        GroupSummary {
            clips_scored: scores.len(),
            skipped_no_hypothesis,
            skipped_empty_reference,
            micro_wer: pooled_words.rate(),
            micro_cer: pooled_chars.rate(),
            wer: SummaryStats::compute(&wers),
            cer: SummaryStats::compute(&cers),
        }
    }
}

impl EvalReport {
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
        let report: EvalReport = serde_json::from_reader(file)?;
        Ok(report)
    }

    /// Write the per-clip TSV and the JSON report into a directory
    pub fn write_outputs(&self, dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;

        let mut tsv = String::from("clip\tlanguage\tref_words\twer\tcer\n");
        for score in &self.clips {
            tsv.push_str(&format!(
                "{}\t{}\t{}\t{:.4}\t{:.4}\n",
                score.clip, score.language, score.ref_words, score.wer, score.cer
            ));
        }
        std::fs::write(dir.join(EVAL_TSV_FILENAME), tsv)?;

        self.export_json(dir.join(EVAL_REPORT_FILENAME))
    }
}

// ============================================================================
// Performance measurement report
// ============================================================================

/// Complete performance measurement report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfReport {
    /// Session metadata
    pub session: PerfSessionInfo,

    /// Audio files found under the clips directory
    pub clips: usize,
    pub unreadable_clips: usize,
    pub total_audio_sec: f64,

    /// Wall-clock runtime of the measured command
    pub elapsed_sec: f64,
    /// Real-time factor: elapsed / total audio (0.0 when no audio measured)
    pub rtf: f64,
    /// Child exit code; `None` when terminated by a signal
    pub exit_code: Option<i32>,

    pub buckets: DurationBuckets,
    pub samples: Vec<ResourceSample>,
    pub sample_summary: SampleSummary,
}

/// Measurement session metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfSessionInfo {
    /// Session timestamp (ISO 8601)
    pub timestamp: String,
    /// The measured command line
    pub tool: String,
}

/// Distribution of resource samples taken while the child ran
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSummary {
    pub cpu_percent: Option<SummaryStats>,
    pub rss_mb: Option<SummaryStats>,
}

impl SampleSummary {
    pub fn from_samples(samples: &[ResourceSample]) -> Self {
        let cpu: Vec<f64> = samples.iter().map(|s| s.cpu_percent as f64).collect();
        let rss: Vec<f64> = samples
            .iter()
            .map(|s| s.rss_bytes as f64 / 1_048_576.0)
            .collect();
        SampleSummary {
            cpu_percent: SummaryStats::compute(&cpu),
            rss_mb: SummaryStats::compute(&rss),
        }
    }
}

impl PerfReport {
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
        let report: PerfReport = serde_json::from_reader(file)?;
        Ok(report)
    }
}

// ============================================================================
// Console formatting
// ============================================================================

/// CLI formatter for evaluation results
pub struct CliFormatter;

impl CliFormatter {
    /// Format the accuracy summary table, one row per language plus overall
    pub fn format_eval_table(report: &EvalReport) -> String {
        let mut output = String::new();

        output.push_str("\nAccuracy Summary:\n");
        output.push_str("┌──────────┬───────┬───────────┬──────────┬───────────┬─────────┐\n");
        output.push_str("│ Language │ Clips │ Micro WER │ Mean WER │ Micro CER │ Skipped │\n");
        output.push_str("├──────────┼───────┼───────────┼──────────┼───────────┼─────────┤\n");

        for (language, summary) in &report.per_language {
            output.push_str(&Self::format_eval_row(language, summary));
        }
        output.push_str("├──────────┼───────┼───────────┼──────────┼───────────┼─────────┤\n");
        output.push_str(&Self::format_eval_row("overall", &report.overall));
        output.push_str("└──────────┴───────┴───────────┴──────────┴───────────┴─────────┘\n");

        output
    }

    fn format_eval_row(label: &str, summary: &GroupSummary) -> String {
        let mean_wer = summary
            .wer
            .as_ref()
            .map(|s| format!("{:8.4}", s.mean))
            .unwrap_or_else(|| "       -".to_string());
        let skipped = summary.skipped_no_hypothesis + summary.skipped_empty_reference;
        format!(
            "│ {:<8} │ {:>5} │ {:>9.4} │ {} │ {:>9.4} │ {:>7} │\n",
            label, summary.clips_scored, summary.micro_wer, mean_wer, summary.micro_cer, skipped
        )
    }

    /// Format the measurement summary
    pub fn format_perf_summary(report: &PerfReport) -> String {
        let mut output = String::new();

        output.push_str("\n╔════════════════════════════════════════╗\n");
        output.push_str("║       Measurement Complete             ║\n");
        output.push_str("╚════════════════════════════════════════╝\n\n");

        output.push_str(&format!("Tool: {}\n", report.session.tool));
        output.push_str(&format!(
            "Clips: {} ({:.1} s of audio",
            report.clips, report.total_audio_sec
        ));
        if report.unreadable_clips > 0 {
            output.push_str(&format!(", {} unreadable", report.unreadable_clips));
        }
        output.push_str(")\n");
        output.push_str(&format!(
            "Elapsed: {:.1} s  (RTF {:.3})\n",
            report.elapsed_sec, report.rtf
        ));
        if let Some(cpu) = &report.sample_summary.cpu_percent {
            output.push_str(&format!(
                "CPU: mean {:.1}%, max {:.1}%\n",
                cpu.mean, cpu.max
            ));
        }
        if let Some(rss) = &report.sample_summary.rss_mb {
            output.push_str(&format!(
                "RSS: mean {:.1} MB, max {:.1} MB\n",
                rss.mean, rss.max
            ));
        }
        let b = &report.buckets;
        output.push_str(&format!(
            "Clip lengths: 0-5s: {}, 5-10s: {}, 10-30s: {}, 30s+: {}\n",
            b.short, b.medium, b.long, b.very_long
        ));
        match report.exit_code {
            Some(0) => {}
            Some(code) => output.push_str(&format!("Tool exited with code {}\n", code)),
            None => output.push_str("Tool was terminated by a signal\n"),
        }

        output
    }
}
