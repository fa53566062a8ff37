//! Reconciliation pipeline
//!
//! One run walks these stages in order:
//!
//! 1. Validate inputs. Every fatal condition (missing manifest, corpus
//!    directory, clips directory, or a fuzzy run without hypotheses) is
//!    raised here, before any output file or directory is created.
//! 2. Load the corpus manifest and probe corpus audio durations.
//! 3. Scan local clips, probe their durations, attach hypothesis text.
//! 4. Match each clip against the candidate pool. Accepted candidates
//!    leave the pool, so no corpus entry is handed to two clips.
//! 5. Write reference files (first writer wins), the audit table, and
//!    the JSON session report.
//!
//! Under the `auto` strategy each clip tries duration first. When that
//! pass accepts, it is final. Otherwise the fuzzy pass runs, and its
//! outcome (accepted or nearest-rejected) becomes the clip's record;
//! when the fuzzy pass has nothing to compare, the duration rejection
//! stands as the record instead.

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use asrbench_common::hypothesis::HypothesisStore;

use crate::config::{ReconcileConfig, RunStrategy};
use crate::services::{
    build_audit_rows, load_manifest, CandidatePool, ClipScanner, DurationIndex, Matcher,
    MatcherConfig, ReconciliationReport, ReportTotals, ReportWriter, SessionInfo,
};
use crate::types::{LocalClip, MatchResult, MatchStrategy};

/// Execute one reconciliation run and return the session report
pub fn run(config: &ReconcileConfig) -> Result<ReconciliationReport> {
    // ------------------------------------------------------------------
    // Validate inputs before creating anything
    // ------------------------------------------------------------------
    if !config.corpus_audio_dir.is_dir() {
        bail!(
            "corpus audio directory not found: {}",
            config.corpus_audio_dir.display()
        );
    }

    let hypothesis_store = match (&config.hypotheses_dir, config.strategy) {
        (Some(dir), _) => {
            if !dir.is_dir() {
                bail!("hypotheses directory not found: {}", dir.display());
            }
            Some(HypothesisStore::new(dir))
        }
        (None, RunStrategy::FuzzyText) => {
            bail!("strategy fuzzy-text requires a hypotheses directory")
        }
        (None, _) => None,
    };

    let duration_enabled = config.strategy.uses_duration();
    let fuzzy_enabled = config.strategy.uses_fuzzy() && hypothesis_store.is_some();
    if config.strategy == RunStrategy::Auto && hypothesis_store.is_none() {
        info!("no hypotheses directory given, fuzzy fallback disabled for this run");
    }

    let entries = load_manifest(&config.manifest).context("loading corpus manifest")?;
    let corpus_count = entries.len();

    let scanner = ClipScanner::new(&config.audio_extensions, config.language);
    let mut clips = scanner
        .scan(&config.clips_dir)
        .context("scanning local clips")?;

    // ------------------------------------------------------------------
    // Probe durations and attach hypotheses
    // ------------------------------------------------------------------
    let corpus_durations = if duration_enabled {
        info!(
            dir = %config.corpus_audio_dir.display(),
            entries = corpus_count,
            "probing corpus audio durations"
        );
        DurationIndex::probe_files(entries.iter().map(|entry| {
            (
                entry.source_id.clone(),
                config.corpus_audio_dir.join(&entry.source_id),
            )
        }))
    } else {
        DurationIndex::default()
    };

    let mut unreadable_local = 0;
    if duration_enabled {
        let local_durations =
            DurationIndex::probe_files(clips.iter().map(|clip| (clip.id.stem(), clip.path.clone())));
        for clip in &mut clips {
            clip.duration_sec = local_durations.duration_sec(&clip.id.stem());
        }
        unreadable_local = local_durations.unreadable_count();
    }

    if let (true, Some(store)) = (fuzzy_enabled, &hypothesis_store) {
        let mut found = 0usize;
        for clip in &mut clips {
            clip.hypothesis = store.lookup(&clip.id.stem());
            if clip.hypothesis.is_some() {
                found += 1;
            }
        }
        info!(found, clips = clips.len(), "attached hypothesis transcripts");
    }

    // ------------------------------------------------------------------
    // Match clips against the pool
    // ------------------------------------------------------------------
    let mut pool = CandidatePool::build(entries, &corpus_durations);
    let matcher = Matcher::new(MatcherConfig {
        duration_tolerance_sec: config.duration_tolerance_sec,
        fuzzy_threshold: config.fuzzy_threshold,
    });

    let mut results: Vec<MatchResult> = Vec::new();
    for clip in &clips {
        match match_one(&matcher, clip, &mut pool, duration_enabled, fuzzy_enabled) {
            Some(result) => results.push(result),
            None => debug!(clip = %clip.id, "no comparison possible for clip"),
        }
    }

    // ------------------------------------------------------------------
    // Write outputs
    // ------------------------------------------------------------------
    let mut writer = ReportWriter::new(&config.output_dir);
    if let Some(path) = &config.audit_path {
        writer = writer.with_audit_path(path);
    }
    writer.prepare().with_context(|| {
        format!(
            "creating output directory {}",
            config.output_dir.display()
        )
    })?;

    let ref_stats = writer
        .write_references(&results)
        .context("writing reference files")?;

    let rows = build_audit_rows(&clips, &results);
    let mut totals = ReportTotals::from_rows(&rows);
    totals.corpus_entries = corpus_count;
    totals.unreadable_local = unreadable_local;
    totals.unreadable_corpus = corpus_durations.unreadable_count();
    totals.references_written = ref_stats.written;
    totals.references_preserved = ref_stats.preserved;

    let session = SessionInfo::now(
        config.strategy.as_str(),
        config.duration_tolerance_sec,
        config.fuzzy_threshold,
        config.language.map(|l| l.code().to_string()),
    );
    let report = ReconciliationReport::new(session, totals, rows);

    writer
        .write_audit_tsv(&report.rows)
        .context("writing audit table")?;
    writer
        .write_report(&report)
        .context("writing session report")?;

    info!(
        accepted = report.totals.accepted,
        rejected = report.totals.rejected,
        unmatched = report.totals.unmatched,
        "reconciliation complete"
    );
    Ok(report)
}

/// Run the configured passes for one clip and pick its final record
fn match_one(
    matcher: &Matcher,
    clip: &LocalClip,
    pool: &mut CandidatePool,
    duration_enabled: bool,
    fuzzy_enabled: bool,
) -> Option<MatchResult> {
    let mut duration_outcome = None;
    if duration_enabled {
        duration_outcome = matcher.match_clip(clip, pool, MatchStrategy::Duration);
        if matches!(&duration_outcome, Some(r) if r.accepted) {
            return duration_outcome;
        }
    }
    if fuzzy_enabled {
        if let Some(fuzzy_outcome) = matcher.match_clip(clip, pool, MatchStrategy::FuzzyText) {
            return Some(fuzzy_outcome);
        }
    }
    duration_outcome
}
