//! ASR accuracy scoring tool
//!
//! Scores hypothesis transcripts against the reconciled references and
//! reports WER/CER per clip, per language, and overall.
//!
//! **Usage:**
//! ```bash
//! asrbench-eval --refs bench/refs --hypotheses runs/whisper \
//!     [--output scores/whisper] [--language es] [--score-missing]
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing::error;

use asrbench_common::lang::Language;
use asrbench_eval::eval::{self, EvalConfig};
use asrbench_eval::report::CliFormatter;

/// ASR accuracy scoring
#[derive(Parser, Debug)]
#[clap(name = "asrbench-eval")]
#[clap(about = "Score ASR hypotheses against reference transcripts")]
struct Args {
    /// Directory of reference transcripts named `{lang}{seq:04}.txt`
    #[clap(long, value_name = "DIR")]
    refs: PathBuf,

    /// Directory of ASR hypothesis files keyed by clip stem
    #[clap(long, value_name = "DIR")]
    hypotheses: PathBuf,

    /// Output directory for the per-clip TSV and JSON report
    #[clap(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Restrict scoring to one language (mn, hu, es, fr)
    #[clap(long)]
    language: Option<Language>,

    /// Score references without a hypothesis as WER/CER 1.0 instead of
    /// skipping them
    #[clap(long)]
    score_missing: bool,
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

    let config = EvalConfig {
        refs_dir: args.refs,
        hypotheses_dir: args.hypotheses,
        output_dir: args.output,
        language: args.language,
        score_missing: args.score_missing,
    };

    match eval::run(&config) {
        Ok(report) => {
            println!("{}", CliFormatter::format_eval_table(&report));
        }
        Err(e) => {
            error!("Scoring failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
