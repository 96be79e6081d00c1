//! Score banding and tier frequency counts.
//!
//! The two percentage bases differ on purpose: band shares are relative to
//! the records that carry a score, tier shares are relative to the records
//! that carry a tier label.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Record, Tier};
use crate::stats::{summarize, SummaryStats};

/// Semantic score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScoreBand {
    Hidden,
    Exploratory,
    Recommended,
    Tailored,
}

/// Ordered `(exclusive upper bound, band)` table. A score lands in the first
/// band whose bound is strictly greater than it.
pub const SCORE_BANDS: [(f64, ScoreBand); 4] = [
    (0.15, ScoreBand::Hidden),
    (0.35, ScoreBand::Exploratory),
    (0.55, ScoreBand::Recommended),
    (1.0, ScoreBand::Tailored),
];

impl ScoreBand {
    pub const ALL: [ScoreBand; 4] = [
        ScoreBand::Hidden,
        ScoreBand::Exploratory,
        ScoreBand::Recommended,
        ScoreBand::Tailored,
    ];

    /// Band for `score`. Scores at or above the last bound fall in the final band.
    pub fn of(score: f64) -> Self {
        for (upper, band) in SCORE_BANDS {
            if score < upper {
                return band;
            }
        }
        SCORE_BANDS[SCORE_BANDS.len() - 1].1
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hidden => "Hidden",
            Self::Exploratory => "Exploratory",
            Self::Recommended => "Recommended",
            Self::Tailored => "Tailored",
        }
    }

    /// Human-readable score range, e.g. `0.15-0.35`.
    pub fn range(self) -> &'static str {
        match self {
            Self::Hidden => "< 0.15",
            Self::Exploratory => "0.15-0.35",
            Self::Recommended => "0.35-0.55",
            Self::Tailored => ">= 0.55",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Band counts over the scored records of a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandDistribution {
    pub counts: BTreeMap<ScoreBand, usize>,
    /// Number of scored records; the percentage base.
    pub total: usize,
}

impl BandDistribution {
    pub fn from_scores(scores: &[f64]) -> Self {
        let mut counts: BTreeMap<ScoreBand, usize> =
            ScoreBand::ALL.iter().map(|b| (*b, 0)).collect();
        for &score in scores {
            *counts.entry(ScoreBand::of(score)).or_insert(0) += 1;
        }
        Self {
            counts,
            total: scores.len(),
        }
    }

    pub fn count(&self, band: ScoreBand) -> usize {
        self.counts.get(&band).copied().unwrap_or(0)
    }

    /// Share of scored records in `band`, in `[0, 1]`. Zero when nothing is scored.
    pub fn share(&self, band: ScoreBand) -> f64 {
        ratio(self.count(band), self.total)
    }
}

/// Score statistics together with their band distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreAnalysis {
    pub stats: SummaryStats,
    pub bands: BandDistribution,
}

/// Analyze the `score` field. `None` when no record carries a score.
pub fn analyze_scores(records: &[Record]) -> Option<ScoreAnalysis> {
    let scores: Vec<f64> = records.iter().filter_map(|r| r.score).collect();
    if scores.is_empty() {
        return None;
    }
    Some(ScoreAnalysis {
        stats: summarize(&scores),
        bands: BandDistribution::from_scores(&scores),
    })
}

/// Frequency of every tier label seen, including labels outside [`Tier::ALL`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierDistribution {
    pub counts: BTreeMap<String, usize>,
    /// Number of records carrying any tier label; the percentage base.
    pub total: usize,
}

impl TierDistribution {
    pub fn count(&self, tier: Tier) -> usize {
        self.counts.get(tier.as_str()).copied().unwrap_or(0)
    }

    /// Share of tiered records labelled `tier`, in `[0, 1]`.
    pub fn proportion(&self, tier: Tier) -> f64 {
        ratio(self.count(tier), self.total)
    }

    /// Records whose label is not one of the reported tiers.
    pub fn unrecognized(&self) -> usize {
        let known: usize = Tier::ALL.iter().map(|t| self.count(*t)).sum();
        self.total - known
    }
}

/// Count tier labels. `None` when no record carries a tier.
pub fn analyze_tiers(records: &[Record]) -> Option<TierDistribution> {
    let mut dist = TierDistribution::default();
    for label in records.iter().filter_map(|r| r.tier.as_deref()) {
        *dist.counts.entry(label.to_string()).or_insert(0) += 1;
        dist.total += 1;
    }
    (dist.total > 0).then_some(dist)
}

pub(crate) fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}
