//! # asrbench Common Library
//!
//! Shared code for the asrbench tools including:
//! - Error types
//! - Configuration loading
//! - Language registry and clip identifiers
//! - Transcript text normalization
//! - Audio duration probing
//! - ASR hypothesis lookup

pub mod audio;
pub mod config;
pub mod error;
pub mod hypothesis;
pub mod lang;
pub mod textnorm;

pub use error::{Error, Result};
pub use lang::{ClipId, Language};
