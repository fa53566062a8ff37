//! Accuracy scoring pipeline
//!
//! Walks a directory of reference transcripts (`{language}{sequence:04}.txt`,
//! as written by the reconciliation tool), pairs each one with a hypothesis
//! by stem, and scores word and character error rates over normalized text.
//!
//! Clips whose reference normalizes to empty are excluded from aggregation
//! and reported as skipped. Clips without a hypothesis are skipped by
//! default; with `score_missing` they are scored against empty text instead,
//! which yields WER and CER of 1.0.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use asrbench_common::hypothesis::HypothesisStore;
use asrbench_common::textnorm;
use asrbench_common::{ClipId, Language};

use crate::report::{ClipScore, EvalReport, EvalSessionInfo, GroupSummary};
use crate::wer;

/// Configuration for one scoring run
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Directory of reference transcript files
    pub refs_dir: PathBuf,
    /// Directory of hypothesis files (JSON or plain text)
    pub hypotheses_dir: PathBuf,
    /// Where to write the TSV and JSON outputs; console-only when absent
    pub output_dir: Option<PathBuf>,
    /// Restrict scoring to one language
    pub language: Option<Language>,
    /// Score missing hypotheses as empty text instead of skipping them
    pub score_missing: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct SkipCounts {
    no_hypothesis: usize,
    empty_reference: usize,
}

/// Run one scoring pass and build the report
pub fn run(config: &EvalConfig) -> Result<EvalReport> {
    if !config.refs_dir.is_dir() {
        bail!(
            "reference directory not found: {}",
            config.refs_dir.display()
        );
    }
    if !config.hypotheses_dir.is_dir() {
        bail!(
            "hypothesis directory not found: {}",
            config.hypotheses_dir.display()
        );
    }

    let store = HypothesisStore::new(&config.hypotheses_dir);

    let mut scores: Vec<ClipScore> = Vec::new();
    let mut skips: BTreeMap<String, SkipCounts> = BTreeMap::new();

    for entry in WalkDir::new(&config.refs_dir)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if file_name.starts_with('.') {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }

        let stem = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) => stem,
            None => continue,
        };
        let id = match ClipId::parse_stem(stem) {
            Some(id) => id,
            None => {
                debug!(file = file_name, "reference file stem is not a clip identity");
                continue;
            }
        };
        if let Some(language) = config.language {
            if id.language != language {
                continue;
            }
        }
        let language_code = id.language.code().to_string();

        let raw_reference = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!(file = file_name, error = %e, "skipping unreadable reference");
                continue;
            }
        };
        let reference = textnorm::normalize(&raw_reference);
        if reference.is_empty() {
            debug!(file = file_name, "reference normalizes to empty, skipping");
            skips.entry(language_code).or_default().empty_reference += 1;
            continue;
        }

        let hypothesis = match store.lookup(stem) {
            Some(text) => textnorm::normalize(&text),
            None if config.score_missing => String::new(),
            None => {
                debug!(clip = stem, "no hypothesis found, skipping");
                skips.entry(language_code).or_default().no_hypothesis += 1;
                continue;
            }
        };

        let words = wer::word_counts(&reference, &hypothesis);
        let chars = wer::char_counts(&reference, &hypothesis);
        scores.push(ClipScore {
            clip: stem.to_string(),
            language: language_code,
            ref_words: words.ref_len,
            word_edits: words.edits,
            ref_chars: chars.ref_len,
            char_edits: chars.edits,
            wer: words.rate(),
            cer: chars.rate(),
        });
    }

    let report = build_report(config, scores, &skips);

    if let Some(output_dir) = &config.output_dir {
        report
            .write_outputs(output_dir)
            .with_context(|| format!("writing outputs to {}", output_dir.display()))?;
    }

    info!(
        clips_scored = report.overall.clips_scored,
        micro_wer = report.overall.micro_wer,
        "scoring complete"
    );

    Ok(report)
}

fn build_report(
    config: &EvalConfig,
    scores: Vec<ClipScore>,
    skips: &BTreeMap<String, SkipCounts>,
) -> EvalReport {
    let mut languages: Vec<String> = scores.iter().map(|s| s.language.clone()).collect();
    languages.extend(skips.keys().cloned());
    languages.sort();
    languages.dedup();

    let mut per_language = BTreeMap::new();
    for language in languages {
        let group: Vec<&ClipScore> = scores.iter().filter(|s| s.language == language).collect();
        let skip = skips.get(&language).copied().unwrap_or_default();
        per_language.insert(
            language,
            GroupSummary::build(&group, skip.no_hypothesis, skip.empty_reference),
        );
    }

    let all: Vec<&ClipScore> = scores.iter().collect();
    let overall = GroupSummary::build(
        &all,
        skips.values().map(|s| s.no_hypothesis).sum(),
        skips.values().map(|s| s.empty_reference).sum(),
    );

    EvalReport {
        session: EvalSessionInfo {
            timestamp: chrono::Utc::now().to_rfc3339(),
            refs_dir: config.refs_dir.display().to_string(),
            hypotheses_dir: config.hypotheses_dir.display().to_string(),
            score_missing: config.score_missing,
        },
        overall,
        per_language,
        clips: scores,
    }
}
