//! Word and character error rates
//!
//! WER is the word-level Levenshtein edit distance divided by the
//! reference word count; CER is the character-level distance divided by
//! the reference character count (whitespace counts as characters). Both
//! compare already-normalized text and may exceed 1.0 when the hypothesis
//! inserts more than the reference contains; no clamping is applied.

use strsim::{generic_levenshtein, levenshtein};

/// Edit distance and reference length for one comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCounts {
    pub edits: usize,
    pub ref_len: usize,
}

impl ErrorCounts {
    /// Error rate for this comparison
    ///
    /// An empty reference scores 0.0 against an empty hypothesis and 1.0
    /// against anything else.
    pub fn rate(&self) -> f64 {
        if self.ref_len == 0 {
            if self.edits == 0 {
                0.0
            } else {
                1.0
            }
        } else {
            self.edits as f64 / self.ref_len as f64
        }
    }
}

/// Word-level error counts between reference and hypothesis
pub fn word_counts(reference: &str, hypothesis: &str) -> ErrorCounts {
    let ref_words: Vec<&str> = reference.split_whitespace().collect();
    let hyp_words: Vec<&str> = hypothesis.split_whitespace().collect();
    ErrorCounts {
        edits: generic_levenshtein(&ref_words, &hyp_words),
        ref_len: ref_words.len(),
    }
}

/// Character-level error counts between reference and hypothesis
pub fn char_counts(reference: &str, hypothesis: &str) -> ErrorCounts {
    ErrorCounts {
        edits: levenshtein(reference, hypothesis),
        ref_len: reference.chars().count(),
    }
}
