//! Reference transcript reconciliation tool
//!
//! Rebuilds missing reference transcripts for benchmark clips by matching
//! each clip back to its corpus release entry, by audio duration or by
//! fuzzy hypothesis text.
//!
//! **Usage:**
//! ```bash
//! asrbench-recon --manifest validated.tsv --corpus-audio corpus/clips \
//!     --clips bench/clips --output bench/refs \
//!     [--strategy auto] [--hypotheses runs/whisper] [--language es]
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use asrbench_common::config::ToolConfig;
use asrbench_common::lang::Language;
use asrbench_recon::services::CliFormatter;
use asrbench_recon::{pipeline, ReconcileConfig, RunStrategy};

/// Reference transcript reconciliation
#[derive(Parser, Debug)]
#[clap(name = "asrbench-recon")]
#[clap(about = "Reconcile benchmark clips with corpus reference transcripts")]
struct Args {
    /// Corpus transcript manifest (TSV with `path` and `sentence` columns)
    #[clap(long, value_name = "FILE")]
    manifest: PathBuf,

    /// Directory holding the corpus audio the manifest refers to
    #[clap(long, value_name = "DIR")]
    corpus_audio: PathBuf,

    /// Directory of local benchmark clips named `{lang}{seq:04}.<ext>`
    #[clap(long, value_name = "DIR")]
    clips: PathBuf,

    /// Directory of ASR hypothesis files keyed by clip stem
    #[clap(long, value_name = "DIR")]
    hypotheses: Option<PathBuf>,

    /// Output directory for recovered references and reports
    #[clap(long, value_name = "DIR")]
    output: PathBuf,

    /// Write the audit table here instead of into the output directory
    #[clap(long, value_name = "FILE")]
    audit: Option<PathBuf>,

    /// Restrict matching to clips of one language (mn, hu, es, fr)
    #[clap(long)]
    language: Option<Language>,

    /// Matching strategy: duration, fuzzy-text, or auto
    #[clap(long, default_value = "auto")]
    strategy: RunStrategy,

    /// Duration tolerance in seconds, overrides the config file
    #[clap(long, env = "ASRBENCH_TOLERANCE")]
    tolerance: Option<f64>,

    /// Fuzzy similarity threshold in [0,1], overrides the config file
    #[clap(long, env = "ASRBENCH_THRESHOLD")]
    threshold: Option<f64>,

    /// Path to the shared TOML config file
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let tool_config = match ToolConfig::resolve(args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let config = ReconcileConfig::from_parts(
        args.manifest,
        args.corpus_audio,
        args.clips,
        args.hypotheses,
        args.output,
        args.audit,
        args.language,
        args.strategy,
        args.tolerance,
        args.threshold,
        &tool_config,
    );

    info!(
        strategy = %config.strategy,
        tolerance_sec = config.duration_tolerance_sec,
        threshold = config.fuzzy_threshold,
        "starting reconciliation"
    );

    match pipeline::run(&config) {
        Ok(report) => {
            println!("{}", CliFormatter::format_summary(&report));
        }
        Err(e) => {
            error!("Reconciliation failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
