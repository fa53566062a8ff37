//! ASR performance measurement tool
//!
//! Runs an external ASR command over a clips directory and reports the
//! real-time factor plus CPU and memory usage sampled while it ran.
//!
//! **Usage:**
//! ```bash
//! asrbench-measure --clips bench/clips [--output measure_report.json] \
//!     -- whisper --model small --output_dir runs/whisper bench/clips
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing::error;

use asrbench_common::config::ToolConfig;
use asrbench_eval::perf::{self, MeasureConfig};
use asrbench_eval::report::CliFormatter;

/// ASR performance measurement
#[derive(Parser, Debug)]
#[clap(name = "asrbench-measure")]
#[clap(about = "Measure runtime and resource usage of an ASR command")]
struct Args {
    /// Directory of audio clips the measured command will process
    #[clap(long, value_name = "DIR")]
    clips: PathBuf,

    /// Write the JSON measurement report to this file
    #[clap(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to the shared TOML config file
    #[clap(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// The command to run and measure, after `--`
    #[clap(last = true, required = true)]
    command: Vec<String>,
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

    let config = MeasureConfig {
        clips_dir: args.clips,
        command: args.command,
        audio_extensions: tool_config.audio_extensions,
    };

    match perf::run(&config) {
        Ok(report) => {
            println!("{}", CliFormatter::format_perf_summary(&report));
            if let Some(output) = &args.output {
                if let Err(e) = report.export_json(output) {
                    error!("Failed to write report to {}: {}", output.display(), e);
                    std::process::exit(1);
                }
                println!("Report written to {}", output.display());
            }
        }
        Err(e) => {
            error!("Measurement failed: {:#}", e);
            std::process::exit(1);
        }
    }
}
