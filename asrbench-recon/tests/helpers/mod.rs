//! Test Helper Utilities
//!
//! Shared utilities for testing asrbench-recon

pub mod audio_generator;

// Re-export commonly used items
pub use audio_generator::{
    generate_test_wav, generate_wav_with_duration, write_corrupt_audio, AudioConfig,
};
