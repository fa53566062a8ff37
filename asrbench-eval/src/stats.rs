//! Summary statistics and clip-duration bucketing

use serde::{Deserialize, Serialize};

/// Distribution summary over a set of values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryStats {
    /// Compute summary statistics; `None` for an empty set
    pub fn compute(values: &[f64]) -> Option<SummaryStats> {
        if values.is_empty() {
            return None;
        }
        let mean = statistical::mean(values);
        // sample standard deviation needs at least two values
        let std_dev = if values.len() > 1 {
            statistical::standard_deviation(values, Some(mean))
        } else {
            0.0
        };
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some(SummaryStats {
            count: values.len(),
            mean,
            median: statistical::median(values),
            std_dev,
            min,
            max,
        })
    }
}

/// Clip counts per duration range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationBuckets {
    /// Under 5 seconds
    pub short: usize,
    /// 5 to 10 seconds
    pub medium: usize,
    /// 10 to 30 seconds
    pub long: usize,
    /// 30 seconds and up
    pub very_long: usize,
}

impl DurationBuckets {
    pub fn add(&mut self, duration_sec: f64) {
        if duration_sec < 5.0 {
            self.short += 1;
        } else if duration_sec < 10.0 {
            self.medium += 1;
        } else if duration_sec < 30.0 {
            self.long += 1;
        } else {
            self.very_long += 1;
        }
    }

    pub fn tally<I: IntoIterator<Item = f64>>(durations: I) -> Self {
        let mut buckets = DurationBuckets::default();
        for duration in durations {
            buckets.add(duration);
        }
        buckets
    }

    pub fn total(&self) -> usize {
        self.short + self.medium + self.long + self.very_long
    }
}
