//! Audio duration probing
//!
//! **Purpose:** Duration-in-seconds for corpus and local clips, rounded to
//! millisecond precision.
//!
//! A fast header-only read (lofty) is tried first; files whose containers
//! lack usable duration metadata fall back to a full decode (symphonia)
//! that counts frames. A genuinely empty clip probes to `Ok(0.0)`; an
//! unreadable one is an error, never a zero — nearest-duration search must
//! be able to tell the two apart.

use anyhow::Context;
use lofty::prelude::*;
use lofty::probe::Probe;
use std::path::Path;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;
use tracing::debug;

/// Errors from duration probing
#[derive(Debug, Error)]
pub enum ProbeError {
    /// File does not exist
    #[error("Audio file not found: {0}")]
    NotFound(String),

    /// Neither header read nor decode produced a duration
    #[error("Failed to decode audio: {0}")]
    Decode(String),
}

/// Round a duration in seconds to millisecond precision
pub fn round_ms(seconds: f64) -> f64 {
    (seconds * 1000.0).round() / 1000.0
}

/// Probe the duration of one audio file, in seconds at ms precision
///
/// # Errors
/// * `ProbeError::NotFound` - file missing
/// * `ProbeError::Decode` - header read failed and the decode fallback
///   also failed (corrupt or unsupported audio)
pub fn probe_duration_sec(path: &Path) -> Result<f64, ProbeError> {
    if !path.exists() {
        return Err(ProbeError::NotFound(path.display().to_string()));
    }

    match header_duration_sec(path) {
        Ok(sec) if sec > 0.0 => {
            debug!(path = %path.display(), duration_sec = sec, "header duration read");
            return Ok(round_ms(sec));
        }
        Ok(_) => {
            debug!(path = %path.display(), "header reports zero duration, decoding");
        }
        Err(reason) => {
            debug!(path = %path.display(), %reason, "header read failed, decoding");
        }
    }

    match decode_duration_sec(path) {
        Ok(sec) => {
            debug!(path = %path.display(), duration_sec = sec, "decoded duration");
            Ok(round_ms(sec))
        }
        Err(e) => Err(ProbeError::Decode(format!("{:#}", e))),
    }
}

/// Header-only duration read via lofty
fn header_duration_sec(path: &Path) -> Result<f64, String> {
    let tagged_file = Probe::open(path)
        .map_err(|e| e.to_string())?
        .read()
        .map_err(|e| e.to_string())?;
    Ok(tagged_file.properties().duration().as_secs_f64())
}

/// Full-decode duration via symphonia, counting decoded frames
fn decode_duration_sec(path: &Path) -> anyhow::Result<f64> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("Failed to probe audio file: {}", path.display()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio track found in file")?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .context("Sample rate unknown")?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .with_context(|| format!("Failed to create decoder for: {}", path.display()))?;

    let mut total_frames: u64 = 0;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                // End of stream
                break;
            }
            Err(e) => {
                return Err(anyhow::anyhow!("Error reading packet: {}", e));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .with_context(|| format!("Failed to decode packet in: {}", path.display()))?;
        total_frames += decoded.frames() as u64;
    }

    Ok(total_frames as f64 / sample_rate as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_test_wav(path: &Path, duration_sec: f64, sample_rate: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let total_samples = (duration_sec * sample_rate as f64).round() as usize;
        for i in 0..total_samples {
            let t = i as f32 / sample_rate as f32;
            let sample = (t * 440.0 * 2.0 * std::f32::consts::PI).sin();
            writer
                .write_sample((sample * i16::MAX as f32 * 0.5) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_round_ms() {
        assert_eq!(round_ms(1.23449), 1.234);
        assert_eq!(round_ms(2.0), 2.0);
        assert_eq!(round_ms(0.0), 0.0);
        assert_eq!(round_ms(3.9996), 4.0);
    }

    #[test]
    fn test_probe_wav_duration() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tone.wav");
        write_test_wav(&path, 2.0, 16_000);

        let duration = probe_duration_sec(&path).unwrap();
        assert!(
            (duration - 2.0).abs() < 0.002,
            "expected ~2.0s, got {}",
            duration
        );
    }

    #[test]
    fn test_probe_empty_wav_is_zero_not_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("empty.wav");
        write_test_wav(&path, 0.0, 16_000);

        let duration = probe_duration_sec(&path).unwrap();
        assert_eq!(duration, 0.0);
    }

    #[test]
    fn test_probe_missing_file() {
        let result = probe_duration_sec(Path::new("/nonexistent/clip.mp3"));
        assert!(matches!(result, Err(ProbeError::NotFound(_))));
    }

    #[test]
    fn test_probe_garbage_file_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("garbage.mp3");
        std::fs::write(&path, b"this is not audio data at all").unwrap();

        let result = probe_duration_sec(&path);
        assert!(matches!(result, Err(ProbeError::Decode(_))));
    }

    #[test]
    fn test_probe_rounds_to_millisecond() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("short.wav");
        // 12345 samples at 16 kHz = 0.7715625 s, rounds to 0.772
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..12_345 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let duration = probe_duration_sec(&path).unwrap();
        assert_eq!(duration, 0.772);
    }
}
