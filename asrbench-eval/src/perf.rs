//! Performance measurement
//!
//! Runs one external ASR command over a clips directory, measuring
//! wall-clock time against total audio duration (real-time factor) and
//! sampling the child's CPU and memory once per second while it runs.
//!
//! The measured command is trusted to process the clips itself; this
//! module only inventories the audio beforehand so the RTF denominator
//! is known. A failing child is recorded in the report, not treated as
//! a measurement error.

use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::{info, warn};
use walkdir::WalkDir;

use asrbench_common::audio;

use crate::report::{PerfReport, PerfSessionInfo, SampleSummary};
use crate::stats::DurationBuckets;

/// Configuration for one measurement run
#[derive(Debug, Clone)]
pub struct MeasureConfig {
    /// Directory containing the audio the measured tool will process
    pub clips_dir: PathBuf,
    /// Command line to run, program first
    pub command: Vec<String>,
    /// Audio file extensions to inventory, lowercase without dots
    pub audio_extensions: Vec<String>,
}

/// One CPU/memory observation of the measured process
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ResourceSample {
    /// Seconds since the child was spawned
    pub elapsed_sec: f64,
    /// CPU usage in percent; can exceed 100 on multi-core machines
    pub cpu_percent: f32,
    /// Resident set size in bytes
    pub rss_bytes: u64,
}

/// Samples a process's CPU and memory on a background thread
struct ResourceMonitor {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Vec<ResourceSample>>,
}

impl ResourceMonitor {
    const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);
    const POLL_STEP: Duration = Duration::from_millis(100);

    fn start(pid: u32) -> ResourceMonitor {
        Self::start_with_interval(pid, Self::SAMPLE_INTERVAL)
    }

    fn start_with_interval(pid: u32, interval: Duration) -> ResourceMonitor {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = std::thread::spawn(move || {
            let mut samples = Vec::new();
            let mut system = System::new();
            let pid = Pid::from_u32(pid);
            let started = Instant::now();
            while !stop_flag.load(Ordering::Relaxed) {
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
                let Some(process) = system.process(pid) else {
                    break;
                };
                samples.push(ResourceSample {
                    elapsed_sec: started.elapsed().as_secs_f64(),
                    cpu_percent: process.cpu_usage(),
                    rss_bytes: process.memory(),
                });
                // sleep in short steps so stop() returns promptly
                let mut waited = Duration::ZERO;
                while waited < interval && !stop_flag.load(Ordering::Relaxed) {
                    std::thread::sleep(Self::POLL_STEP);
                    waited += Self::POLL_STEP;
                }
            }
            samples
        });
        ResourceMonitor { stop, handle }
    }

    /// Stop sampling and collect what was gathered
    fn stop(self) -> Vec<ResourceSample> {
        self.stop.store(true, Ordering::Relaxed);
        self.handle.join().unwrap_or_default()
    }
}

/// Inventory the clips directory: per-file durations plus unreadable count
fn probe_clips(config: &MeasureConfig) -> Result<(Vec<f64>, usize)> {
    let mut durations = Vec::new();
    let mut unreadable = 0usize;

    for entry in WalkDir::new(&config.clips_dir)
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
        let extension = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_ascii_lowercase(),
            None => continue,
        };
        if !config.audio_extensions.iter().any(|e| *e == extension) {
            continue;
        }

        match audio::probe_duration_sec(path) {
            Ok(duration) => durations.push(duration),
            Err(e) => {
                warn!(file = file_name, error = %e, "could not read audio duration");
                unreadable += 1;
            }
        }
    }

    Ok((durations, unreadable))
}

/// Run the measured command once and build the report
pub fn run(config: &MeasureConfig) -> Result<PerfReport> {
    let Some((program, args)) = config.command.split_first() else {
        bail!("no command given to measure");
    };
    if !config.clips_dir.is_dir() {
        bail!("clips directory not found: {}", config.clips_dir.display());
    }

    let (durations, unreadable_clips) = probe_clips(config)?;
    let clips = durations.len();
    let total_audio_sec: f64 = durations.iter().sum();
    let buckets = DurationBuckets::tally(durations.iter().copied());

    info!(
        clips,
        total_audio_sec,
        command = %config.command.join(" "),
        "starting measured run"
    );

    let started = Instant::now();
    let mut child = Command::new(program)
        .args(args)
        .spawn()
        .with_context(|| format!("spawning {}", program))?;
    let monitor = ResourceMonitor::start(child.id());

    let status = child.wait().context("waiting for measured command")?;
    let elapsed_sec = started.elapsed().as_secs_f64();
    let samples = monitor.stop();

    if !status.success() {
        warn!(status = %status, "measured command exited with failure");
    }

    // serde_json rejects non-finite numbers, so guard the no-audio case
    let rtf = if total_audio_sec > 0.0 {
        elapsed_sec / total_audio_sec
    } else {
        0.0
    };

    Ok(PerfReport {
        session: PerfSessionInfo {
            timestamp: chrono::Utc::now().to_rfc3339(),
            tool: config.command.join(" "),
        },
        clips,
        unreadable_clips,
        total_audio_sec,
        elapsed_sec,
        rtf,
        exit_code: status.code(),
        buckets,
        sample_summary: SampleSummary::from_samples(&samples),
        samples,
    })
}
