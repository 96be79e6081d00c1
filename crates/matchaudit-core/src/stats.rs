//! Summary statistics for numeric sequences.
//!
//! Variance is the sample variance (divisor `n - 1`) and is only reported
//! for two or more values. Quartiles use the exclusive method (R-6: the
//! `p`-quantile sits at 1-based rank `p * (n + 1)`, linearly interpolated)
//! and are only reported for four or more values.

use serde::{Deserialize, Serialize};

/// Minimum sample size for `variance` / `stdev`.
pub const MIN_VARIANCE_SAMPLES: usize = 2;

/// Minimum sample size for `q25` / `q75` / `iqr`.
pub const MIN_QUARTILE_SAMPLES: usize = 4;

/// Descriptive statistics over one sequence.
///
/// A `None` field means the sample was too small for that statistic, never
/// that an error occurred. An empty input yields `count == 0` and every
/// field `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdev: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q25: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q75: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iqr: Option<f64>,
}

impl SummaryStats {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Summarize `values`. Never fails; see [`SummaryStats`] for which fields
/// are present at each sample size.
pub fn summarize(values: &[f64]) -> SummaryStats {
    let n = values.len();
    if n == 0 {
        return SummaryStats::default();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = mean(values);
    let mut stats = SummaryStats {
        count: n,
        mean: Some(mean),
        median: Some(median_sorted(&sorted)),
        min: Some(sorted[0]),
        max: Some(sorted[n - 1]),
        ..SummaryStats::default()
    };

    if n >= MIN_VARIANCE_SAMPLES {
        // A constant sample has exactly zero spread; summing can leave the
        // mean a rounding step away from the values.
        let variance = if sorted[0] == sorted[n - 1] {
            0.0
        } else {
            sample_variance(values, mean)
        };
        stats.variance = Some(variance);
        stats.stdev = Some(variance.sqrt());
    }

    if n >= MIN_QUARTILE_SAMPLES {
        let q25 = exclusive_quartile(&sorted, 1);
        let q75 = exclusive_quartile(&sorted, 3);
        stats.q25 = Some(q25);
        stats.q75 = Some(q75);
        stats.iqr = Some(q75 - q25);
    }

    stats
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn sample_variance(values: &[f64], mean: f64) -> f64 {
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    ss / (values.len() - 1) as f64
}

/// `i`-th quartile cut point (1..=3) of `sorted`, exclusive method.
///
/// Rank arithmetic is done in integers; the result is kept inside the two
/// neighbouring order statistics. Requires `sorted.len() >= 2`.
fn exclusive_quartile(sorted: &[f64], i: usize) -> f64 {
    const PARTS: usize = 4;
    let n = sorted.len();
    let m = n + 1;
    let j = (i * m / PARTS).clamp(1, n - 1);
    let delta = (i * m - j * PARTS) as f64;
    let (lo, hi) = (sorted[j - 1], sorted[j]);
    (lo + (hi - lo) * (delta / PARTS as f64)).clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn test_empty_input_yields_empty_summary() {
        let stats = summarize(&[]);
        assert!(stats.is_empty());
        assert_eq!(stats, SummaryStats::default());
    }

    #[test]
    fn test_single_value_has_no_spread() {
        let stats = summarize(&[0.4]);
        assert_eq!(stats.count, 1);
        assert!(close(stats.mean, 0.4));
        assert!(close(stats.median, 0.4));
        assert!(stats.variance.is_none());
        assert!(stats.stdev.is_none());
        assert!(stats.q25.is_none());
    }

    #[test]
    fn test_three_values_have_variance_but_no_quartiles() {
        let stats = summarize(&[1.0, 2.0, 3.0]);
        assert!(close(stats.variance, 1.0));
        assert!(close(stats.stdev, 1.0));
        assert!(stats.q25.is_none());
        assert!(stats.q75.is_none());
        assert!(stats.iqr.is_none());
    }

    #[test]
    fn test_four_values_have_quartiles() {
        let stats = summarize(&[0.9, 0.1, 0.5, 0.3]);
        assert_eq!(stats.count, 4);
        assert!(close(stats.mean, 0.45));
        assert!(close(stats.median, 0.4));
        assert!(close(stats.min, 0.1));
        assert!(close(stats.max, 0.9));
        assert!(close(stats.q25, 0.15));
        assert!(close(stats.q75, 0.8));
        assert!(close(stats.iqr, 0.65));
    }

    #[test]
    fn test_sample_variance_uses_n_minus_one() {
        let stats = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!(close(stats.variance, 32.0 / 7.0));
        assert!(close(stats.stdev, (32.0f64 / 7.0).sqrt()));
    }

    #[test]
    fn test_constant_sample_has_zero_variance() {
        let stats = summarize(&[0.3; 4]);
        assert_eq!(stats.variance, Some(0.0));
        assert_eq!(stats.stdev, Some(0.0));
    }

    #[test]
    fn test_quartiles_on_ten_values() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let stats = summarize(&values);
        assert!(close(stats.q25, 2.75));
        assert!(close(stats.q75, 8.25));
        assert!(close(stats.median, 5.5));
    }
}
