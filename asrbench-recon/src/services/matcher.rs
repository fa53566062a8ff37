//! Clip-to-corpus matching
//!
//! One parameterized matcher implements both strategies behind the
//! `MatchStrategy` tag, so the two passes cannot drift apart.
//!
//! **Duration:** nearest `abs(clip - candidate)` over the pool, accepted
//! when at or inside the tolerance. Durations are held at millisecond
//! precision, so the comparison runs in whole milliseconds, keeping the
//! tolerance boundary exact instead of at the mercy of float noise.
//! Confidence is the absolute difference in seconds (lower is better).
//!
//! **FuzzyText:** highest normalized Levenshtein similarity between the
//! clip's normalized hypothesis and each candidate's normalized reference,
//! accepted when at or above the threshold. Confidence is the similarity
//! ratio in [0,1] (higher is better). An above-threshold match can still
//! be wrong when the hypothesis itself is badly wrong; that risk is why
//! the confidence lands in the audit table.
//!
//! Ties on either scale break to the first-seen candidate in manifest
//! order. An accepted candidate is removed from the pool; a rejected scan
//! leaves the pool untouched but still reports the nearest candidate so
//! near-misses can be audited.

use tracing::debug;

use crate::services::candidate_pool::CandidatePool;
use crate::types::{LocalClip, MatchResult, MatchStrategy};

/// Tunables for both matching strategies
#[derive(Debug, Clone, Copy)]
pub struct MatcherConfig {
    /// Inclusive duration tolerance in seconds
    pub duration_tolerance_sec: f64,
    /// Inclusive fuzzy similarity threshold in [0,1]
    pub fuzzy_threshold: f64,
}

/// Matches clips against the candidate pool
pub struct Matcher {
    tolerance_ms: i64,
    fuzzy_threshold: f64,
}

impl Matcher {
    pub fn new(config: MatcherConfig) -> Self {
        Matcher {
            tolerance_ms: (config.duration_tolerance_sec * 1000.0).round() as i64,
            fuzzy_threshold: config.fuzzy_threshold,
        }
    }

    /// Match one clip against the pool with the selected strategy
    ///
    /// Returns `None` when the clip has no usable signal for the strategy
    /// (unknown duration, or no normalized hypothesis) or the pool offers
    /// nothing to compare against. Otherwise returns the accepted match or
    /// the rejected nearest candidate.
    pub fn match_clip(
        &self,
        clip: &LocalClip,
        pool: &mut CandidatePool,
        strategy: MatchStrategy,
    ) -> Option<MatchResult> {
        match strategy {
            MatchStrategy::Duration => self.match_by_duration(clip, pool),
            MatchStrategy::FuzzyText => self.match_by_text(clip, pool),
        }
    }

    fn match_by_duration(&self, clip: &LocalClip, pool: &mut CandidatePool) -> Option<MatchResult> {
        let clip_duration = clip.duration_sec?;

        let mut best: Option<(usize, i64)> = None;
        for (index, candidate) in pool.candidates().iter().enumerate() {
            let candidate_duration = match candidate.duration_sec {
                Some(sec) => sec,
                None => continue,
            };
            let diff = diff_ms(clip_duration, candidate_duration);
            // strict < keeps the first-seen candidate on equal differences
            if best.map_or(true, |(_, best_diff)| diff < best_diff) {
                best = Some((index, diff));
            }
        }

        let (index, diff) = best?;
        let confidence = diff as f64 / 1000.0;

        if diff <= self.tolerance_ms {
            let candidate = pool.take(index);
            debug!(
                clip = %clip.id,
                corpus = candidate.source_id(),
                diff_ms = diff,
                "duration match accepted"
            );
            Some(MatchResult {
                clip_id: clip.id,
                corpus_id: candidate.entry.source_id.clone(),
                strategy: MatchStrategy::Duration,
                confidence,
                accepted: true,
                reference_text: Some(candidate.entry.reference_text),
            })
        } else {
            let nearest = pool.candidates()[index].source_id().to_string();
            debug!(
                clip = %clip.id,
                nearest = %nearest,
                diff_ms = diff,
                "no duration candidate within tolerance"
            );
            Some(MatchResult {
                clip_id: clip.id,
                corpus_id: nearest,
                strategy: MatchStrategy::Duration,
                confidence,
                accepted: false,
                reference_text: None,
            })
        }
    }

    fn match_by_text(&self, clip: &LocalClip, pool: &mut CandidatePool) -> Option<MatchResult> {
        let hypothesis = clip.normalized_hypothesis()?;

        let mut best: Option<(usize, f64)> = None;
        for (index, candidate) in pool.candidates().iter().enumerate() {
            if candidate.normalized_reference.is_empty() {
                continue;
            }
            let similarity =
                strsim::normalized_levenshtein(&hypothesis, &candidate.normalized_reference);
            // strict > keeps the first-seen candidate on equal similarity
            if best.map_or(true, |(_, best_sim)| similarity > best_sim) {
                best = Some((index, similarity));
            }
        }

        let (index, similarity) = best?;

        if similarity >= self.fuzzy_threshold {
            let candidate = pool.take(index);
            debug!(
                clip = %clip.id,
                corpus = candidate.source_id(),
                similarity = format!("{:.3}", similarity),
                "fuzzy text match accepted"
            );
            Some(MatchResult {
                clip_id: clip.id,
                corpus_id: candidate.entry.source_id.clone(),
                strategy: MatchStrategy::FuzzyText,
                confidence: similarity,
                accepted: true,
                reference_text: Some(candidate.entry.reference_text),
            })
        } else {
            let nearest = pool.candidates()[index].source_id().to_string();
            debug!(
                clip = %clip.id,
                nearest = %nearest,
                similarity = format!("{:.3}", similarity),
                "best fuzzy candidate below threshold"
            );
            Some(MatchResult {
                clip_id: clip.id,
                corpus_id: nearest,
                strategy: MatchStrategy::FuzzyText,
                confidence: similarity,
                accepted: false,
                reference_text: None,
            })
        }
    }
}

/// Absolute difference between two ms-precision durations, in whole ms
fn diff_ms(a: f64, b: f64) -> i64 {
    ((a - b).abs() * 1000.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Candidate, CorpusEntry};
    use asrbench_common::lang::{ClipId, Language};
    use std::path::PathBuf;

    fn matcher(tolerance_sec: f64, threshold: f64) -> Matcher {
        Matcher::new(MatcherConfig {
            duration_tolerance_sec: tolerance_sec,
            fuzzy_threshold: threshold,
        })
    }

    fn clip(seq: u32, duration: Option<f64>, hypothesis: Option<&str>) -> LocalClip {
        let id = ClipId::new(Language::Spanish, seq);
        let mut clip = LocalClip::new(id, PathBuf::from(format!("/clips/{}.mp3", id.stem())));
        clip.duration_sec = duration;
        clip.hypothesis = hypothesis.map(|h| h.to_string());
        clip
    }

    fn pool(entries: &[(&str, &str, Option<f64>)]) -> CandidatePool {
        let candidates = entries
            .iter()
            .map(|(id, text, duration)| {
                Candidate::new(
                    CorpusEntry {
                        source_id: id.to_string(),
                        reference_text: text.to_string(),
                    },
                    *duration,
                )
            })
            .collect();
        CandidatePool::new(candidates)
    }

    // ------------------------------------------------------------------
    // Duration strategy
    // ------------------------------------------------------------------

    #[test]
    fn test_duration_exact_match_accepted() {
        let mut pool = pool(&[("a.mp3", "hola", Some(2.700))]);
        let result = matcher(0.010, 0.6)
            .match_clip(&clip(1, Some(2.700), None), &mut pool, MatchStrategy::Duration)
            .unwrap();
        assert!(result.accepted);
        assert_eq!(result.corpus_id, "a.mp3");
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.reference_text.as_deref(), Some("hola"));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_duration_at_tolerance_boundary_accepted() {
        let mut pool = pool(&[("a.mp3", "hola", Some(2.710))]);
        let result = matcher(0.010, 0.6)
            .match_clip(&clip(1, Some(2.700), None), &mut pool, MatchStrategy::Duration)
            .unwrap();
        assert!(result.accepted, "10 ms difference equals the tolerance");
        assert!((result.confidence - 0.010).abs() < 1e-12);
    }

    #[test]
    fn test_duration_beyond_tolerance_rejected() {
        let mut pool = pool(&[("a.mp3", "hola", Some(2.711))]);
        let result = matcher(0.010, 0.6)
            .match_clip(&clip(1, Some(2.700), None), &mut pool, MatchStrategy::Duration)
            .unwrap();
        assert!(!result.accepted, "11 ms difference is outside the tolerance");
        assert_eq!(result.corpus_id, "a.mp3");
        assert!((result.confidence - 0.011).abs() < 1e-12);
        assert_eq!(result.reference_text, None);
        assert_eq!(pool.len(), 1, "rejection must not shrink the pool");
    }

    #[test]
    fn test_duration_picks_nearest_candidate() {
        let mut pool = pool(&[
            ("far.mp3", "uno", Some(2.705)),
            ("near.mp3", "dos", Some(2.701)),
        ]);
        let result = matcher(0.010, 0.6)
            .match_clip(&clip(1, Some(2.700), None), &mut pool, MatchStrategy::Duration)
            .unwrap();
        assert!(result.accepted);
        assert_eq!(result.corpus_id, "near.mp3");
    }

    #[test]
    fn test_duration_tie_breaks_to_first_seen() {
        let mut pool = pool(&[
            ("first.mp3", "uno", Some(2.705)),
            ("second.mp3", "dos", Some(2.705)),
        ]);
        let result = matcher(0.010, 0.6)
            .match_clip(&clip(1, Some(2.700), None), &mut pool, MatchStrategy::Duration)
            .unwrap();
        assert!(result.accepted);
        assert_eq!(result.corpus_id, "first.mp3");
    }

    #[test]
    fn test_duration_skips_candidates_without_duration() {
        let mut pool = pool(&[
            ("unreadable.mp3", "uno", None),
            ("readable.mp3", "dos", Some(2.700)),
        ]);
        let result = matcher(0.010, 0.6)
            .match_clip(&clip(1, Some(2.700), None), &mut pool, MatchStrategy::Duration)
            .unwrap();
        assert!(result.accepted);
        assert_eq!(result.corpus_id, "readable.mp3");
    }

    #[test]
    fn test_duration_no_signal_returns_none() {
        let m = matcher(0.010, 0.6);

        // clip duration unknown
        let mut p = pool(&[("a.mp3", "hola", Some(2.0))]);
        assert!(m
            .match_clip(&clip(1, None, None), &mut p, MatchStrategy::Duration)
            .is_none());

        // empty pool
        let mut empty = pool(&[]);
        assert!(m
            .match_clip(&clip(1, Some(2.0), None), &mut empty, MatchStrategy::Duration)
            .is_none());

        // no candidate has a duration
        let mut blind = pool(&[("a.mp3", "hola", None)]);
        assert!(m
            .match_clip(&clip(1, Some(2.0), None), &mut blind, MatchStrategy::Duration)
            .is_none());
    }

    #[test]
    fn test_duration_without_replacement() {
        let mut pool = pool(&[
            ("a.mp3", "uno", Some(3.000)),
            ("b.mp3", "dos", Some(3.000)),
        ]);
        let m = matcher(0.010, 0.6);

        let first = m
            .match_clip(&clip(1, Some(3.000), None), &mut pool, MatchStrategy::Duration)
            .unwrap();
        let second = m
            .match_clip(&clip(2, Some(3.000), None), &mut pool, MatchStrategy::Duration)
            .unwrap();

        assert!(first.accepted && second.accepted);
        assert_eq!(first.corpus_id, "a.mp3");
        assert_eq!(second.corpus_id, "b.mp3", "same entry must not match twice");
        assert!(pool.is_empty());
    }

    // ------------------------------------------------------------------
    // Fuzzy text strategy
    // ------------------------------------------------------------------

    #[test]
    fn test_fuzzy_accepts_best_above_threshold() {
        let mut pool = pool(&[
            ("cat.mp3", "the cat sat", None),
            ("dog.mp3", "the dog ran", None),
        ]);
        let result = matcher(0.010, 0.6)
            .match_clip(
                &clip(1, None, Some("teh kat sat")),
                &mut pool,
                MatchStrategy::FuzzyText,
            )
            .unwrap();
        assert!(result.accepted);
        assert_eq!(result.corpus_id, "cat.mp3");
        assert!(result.confidence > 0.6, "got {}", result.confidence);
        assert_eq!(result.reference_text.as_deref(), Some("the cat sat"));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_fuzzy_at_threshold_boundary_accepted() {
        // normalized_levenshtein("ab", "ax") is exactly 0.5
        let mut pool = pool(&[("x.mp3", "ax", None)]);
        let result = matcher(0.010, 0.5)
            .match_clip(&clip(1, None, Some("ab")), &mut pool, MatchStrategy::FuzzyText)
            .unwrap();
        assert!(result.accepted, "similarity equal to the threshold is accepted");
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_fuzzy_below_threshold_rejected() {
        let mut pool = pool(&[("x.mp3", "ax", None)]);
        let result = matcher(0.010, 0.51)
            .match_clip(&clip(1, None, Some("ab")), &mut pool, MatchStrategy::FuzzyText)
            .unwrap();
        assert!(!result.accepted);
        assert_eq!(result.corpus_id, "x.mp3");
        assert_eq!(result.confidence, 0.5);
        assert_eq!(pool.len(), 1, "rejection must not shrink the pool");
    }

    #[test]
    fn test_fuzzy_tie_breaks_to_first_seen() {
        let mut pool = pool(&[
            ("first.mp3", "the cat sat", None),
            ("second.mp3", "the cat sat", None),
        ]);
        let result = matcher(0.010, 0.6)
            .match_clip(
                &clip(1, None, Some("the cat sat")),
                &mut pool,
                MatchStrategy::FuzzyText,
            )
            .unwrap();
        assert!(result.accepted);
        assert_eq!(result.corpus_id, "first.mp3");
    }

    #[test]
    fn test_fuzzy_skips_empty_normalized_references() {
        // Cyrillic reference normalizes to empty and must be unreachable
        let mut pool = pool(&[
            ("cyrillic.mp3", "сайн байна", None),
            ("latin.mp3", "hello there", None),
        ]);
        let result = matcher(0.010, 0.6)
            .match_clip(
                &clip(1, None, Some("hello there")),
                &mut pool,
                MatchStrategy::FuzzyText,
            )
            .unwrap();
        assert!(result.accepted);
        assert_eq!(result.corpus_id, "latin.mp3");
    }

    #[test]
    fn test_fuzzy_no_signal_returns_none() {
        let m = matcher(0.010, 0.6);

        // no hypothesis at all
        let mut p = pool(&[("a.mp3", "hola", None)]);
        assert!(m
            .match_clip(&clip(1, None, None), &mut p, MatchStrategy::FuzzyText)
            .is_none());

        // hypothesis normalizes to nothing
        assert!(m
            .match_clip(&clip(1, None, Some("?!...")), &mut p, MatchStrategy::FuzzyText)
            .is_none());

        // pool has only empty normalized references
        let mut blind = pool(&[("cyr.mp3", "сайн", None)]);
        assert!(m
            .match_clip(&clip(1, None, Some("hello")), &mut blind, MatchStrategy::FuzzyText)
            .is_none());
    }

    #[test]
    fn test_fuzzy_without_replacement() {
        let mut pool = pool(&[("a.mp3", "good morning", None)]);
        let m = matcher(0.010, 0.6);

        let first = m
            .match_clip(
                &clip(1, None, Some("good morning")),
                &mut pool,
                MatchStrategy::FuzzyText,
            )
            .unwrap();
        assert!(first.accepted);

        // identical second clip finds nothing left
        assert!(m
            .match_clip(
                &clip(2, None, Some("good morning")),
                &mut pool,
                MatchStrategy::FuzzyText,
            )
            .is_none());
    }

    #[test]
    fn test_diff_ms_is_noise_free() {
        // 1.03 - 1.02 in raw f64 lands a hair above 0.010
        assert_eq!(diff_ms(1.03, 1.02), 10);
        assert_eq!(diff_ms(2.700, 2.710), 10);
        assert_eq!(diff_ms(2.700, 2.711), 11);
        assert_eq!(diff_ms(5.0, 5.0), 0);
    }
}
