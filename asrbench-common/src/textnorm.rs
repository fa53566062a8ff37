//! Transcript text normalization
//!
//! Canonicalizes reference and hypothesis strings before matching or
//! scoring: accent stripping, lowercasing, punctuation removal, whitespace
//! collapse. The chain is idempotent, so already-normalized text passes
//! through unchanged.
//!
//! Accent stripping decomposes to NFD and keeps only the ASCII scalar
//! values. Scripts with no ASCII decomposition (Cyrillic Mongolian in
//! particular) normalize to the empty string, which callers treat as
//! "no usable text signal" for that clip.

use unicode_normalization::UnicodeNormalization;

/// Strip diacritics by NFD decomposition, keeping only ASCII characters
pub fn strip_accents(text: &str) -> String {
    text.nfd().filter(|c| c.is_ascii()).collect()
}

/// Normalize a transcript for matching and scoring
///
/// Applies, in order: accent stripping, lowercasing, removal of everything
/// except alphanumerics/underscore/whitespace, whitespace collapse to
/// single spaces. Empty or all-punctuation input yields the empty string.
pub fn normalize(text: &str) -> String {
    let lowered = strip_accents(text).to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
