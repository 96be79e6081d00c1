//! Before/after comparison of two result batches.
//!
//! The batches are assumed to hold the same cases in the same order. When
//! their lengths differ both are cut to the shorter length from the start.

use serde::{Deserialize, Serialize};

use crate::domain::record::scores_of;
use crate::domain::{Record, Tier};
use crate::obs;
use crate::stats::{summarize, SummaryStats};

/// Qualitative size of a standardized mean difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    /// Bucket `|d|`: below 0.2 negligible, below 0.5 small, below 0.8 medium.
    pub fn classify(d: f64) -> Self {
        let d = d.abs();
        if d >= 0.8 {
            Self::Large
        } else if d >= 0.5 {
            Self::Medium
        } else if d >= 0.2 {
            Self::Small
        } else {
            Self::Negligible
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Negligible => "negligible",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

/// Cohen's d with pooled standard deviation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EffectSize {
    /// Pooled variance is zero; the standardized difference has no finite value.
    Undefined,
    Measured { d: f64, magnitude: EffectMagnitude },
}

impl EffectSize {
    /// Effect size between two samples. `None` unless both have a variance
    /// (two or more values).
    pub fn between(before: &SummaryStats, after: &SummaryStats) -> Option<Self> {
        let (mean1, var1) = (before.mean?, before.variance?);
        let (mean2, var2) = (after.mean?, after.variance?);
        let n1 = before.count as f64;
        let n2 = after.count as f64;

        let pooled_var = ((n1 - 1.0) * var1 + (n2 - 1.0) * var2) / (n1 + n2 - 2.0);
        if pooled_var <= 0.0 {
            return Some(Self::Undefined);
        }
        let d = (mean2 - mean1) / pooled_var.sqrt();
        Some(Self::Measured {
            d,
            magnitude: EffectMagnitude::classify(d),
        })
    }

    pub fn d(&self) -> Option<f64> {
        match self {
            Self::Undefined => None,
            Self::Measured { d, .. } => Some(*d),
        }
    }
}

/// Mean paired difference relative to the baseline mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum RelativeChange {
    /// Baseline mean is zero.
    Undefined,
    Ratio(f64),
}

impl RelativeChange {
    fn of(mean_diff: Option<f64>, baseline_mean: Option<f64>) -> Self {
        match (mean_diff, baseline_mean) {
            (Some(diff), Some(base)) if base != 0.0 => Self::Ratio(diff / base),
            _ => Self::Undefined,
        }
    }

    pub fn ratio(&self) -> Option<f64> {
        match self {
            Self::Undefined => None,
            Self::Ratio(r) => Some(*r),
        }
    }
}

/// Movement between the two upper tiers across aligned pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierMigration {
    /// `recommended` before, `tailored` after.
    pub upgrades: usize,
    /// `tailored` before, `recommended` after.
    pub downgrades: usize,
}

impl TierMigration {
    pub fn net(&self) -> i64 {
        self.upgrades as i64 - self.downgrades as i64
    }
}

/// Full comparison between a baseline and a current batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Aligned pair count.
    pub aligned: usize,
    /// Original `(before, after)` lengths when they differed.
    pub truncated_from: Option<(usize, usize)>,
    pub before: SummaryStats,
    pub after: SummaryStats,
    /// Summary of `after[i] - before[i]` over pairs where both carry a score.
    pub diff: SummaryStats,
    pub relative_change: RelativeChange,
    pub median_shift: Option<f64>,
    pub effect_size: Option<EffectSize>,
    /// Absent when any aligned record on either side lacks a tier.
    pub migration: Option<TierMigration>,
}

/// Compare `before` against `after`.
///
/// Returns `None` when either aligned side has no scores at all.
pub fn compare_batches(before: &[Record], after: &[Record]) -> Option<Comparison> {
    let aligned = before.len().min(after.len());
    let truncated_from = if before.len() != after.len() {
        obs::emit_alignment_truncated(before.len(), after.len(), aligned);
        Some((before.len(), after.len()))
    } else {
        None
    };
    let before = &before[..aligned];
    let after = &after[..aligned];

    let before_scores = scores_of(before);
    let after_scores = scores_of(after);
    if before_scores.is_empty() || after_scores.is_empty() {
        tracing::warn!(
            event = "compare.insufficient",
            before_scores = before_scores.len(),
            after_scores = after_scores.len(),
        );
        return None;
    }

    let diffs: Vec<f64> = before
        .iter()
        .zip(after)
        .filter_map(|(b, a)| Some(a.score? - b.score?))
        .collect();

    let before_stats = summarize(&before_scores);
    let after_stats = summarize(&after_scores);
    let diff_stats = summarize(&diffs);

    let relative_change = RelativeChange::of(diff_stats.mean, before_stats.mean);
    let median_shift = after_stats
        .median
        .zip(before_stats.median)
        .map(|(a, b)| a - b);
    let effect_size = EffectSize::between(&before_stats, &after_stats);

    Some(Comparison {
        aligned,
        truncated_from,
        before: before_stats,
        after: after_stats,
        diff: diff_stats,
        relative_change,
        median_shift,
        effect_size,
        migration: tier_migration(before, after),
    })
}

/// Count upgrades and downgrades between the two upper tiers.
///
/// All or nothing: `None` if any record on either side lacks a tier label.
/// An empty label counts as missing.
pub fn tier_migration(before: &[Record], after: &[Record]) -> Option<TierMigration> {
    fn label(r: &Record) -> Option<&str> {
        r.tier.as_deref().filter(|t| !t.is_empty())
    }
    let before_tiers = before.iter().map(label).collect::<Option<Vec<&str>>>()?;
    let after_tiers = after.iter().map(label).collect::<Option<Vec<&str>>>()?;

    let recommended = Tier::Recommended.as_str();
    let tailored = Tier::Tailored.as_str();
    let mut migration = TierMigration {
        upgrades: 0,
        downgrades: 0,
    };
    for (b, a) in before_tiers.iter().zip(&after_tiers) {
        if *b == recommended && *a == tailored {
            migration.upgrades += 1;
        } else if *b == tailored && *a == recommended {
            migration.downgrades += 1;
        }
    }
    Some(migration)
}
