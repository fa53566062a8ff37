//! Audio Test Fixture Generator
//!
//! Generates WAV files with exactly controlled durations. At 16 kHz every
//! whole-millisecond duration is an integer number of samples, so probed
//! durations come back bit-exact.

use std::path::{Path, PathBuf};

/// Configuration for generated audio
#[derive(Debug, Clone)]
pub struct AudioConfig {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            duration_seconds: 3.0,
            sample_rate: 16000,
            channels: 1,
        }
    }
}

/// Generate a test WAV file with the specified configuration
pub fn generate_test_wav(path: &Path, config: &AudioConfig) -> anyhow::Result<PathBuf> {
    let spec = hound::WavSpec {
        channels: config.channels,
        sample_rate: config.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let total_samples = (config.duration_seconds * config.sample_rate as f64).round() as usize;

    // Simple 440Hz tone at 30% amplitude
    for i in 0..total_samples {
        let t = i as f32 / config.sample_rate as f32;
        let sample =
            (0.3 * (2.0 * std::f32::consts::PI * 440.0 * t).sin() * i16::MAX as f32) as i16;
        for _ in 0..config.channels {
            writer.write_sample(sample)?;
        }
    }

    writer.finalize()?;
    Ok(path.to_path_buf())
}

/// Generate a mono 16 kHz WAV of exactly the given duration
pub fn generate_wav_with_duration(path: &Path, duration_seconds: f64) -> anyhow::Result<PathBuf> {
    generate_test_wav(
        path,
        &AudioConfig {
            duration_seconds,
            ..Default::default()
        },
    )
}

/// Write a file that no audio decoder can open
pub fn write_corrupt_audio(path: &Path) -> anyhow::Result<PathBuf> {
    std::fs::write(path, b"this is not audio data at all")?;
    Ok(path.to_path_buf())
}
