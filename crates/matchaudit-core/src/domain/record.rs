//! Audit records and batches.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Result tier assigned by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Tailored,
    Recommended,
    Exploratory,
}

impl Tier {
    /// The reported tiers, best first.
    pub const ALL: [Tier; 3] = [Tier::Tailored, Tier::Recommended, Tier::Exploratory];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tailored => "tailored",
            Self::Recommended => "recommended",
            Self::Exploratory => "exploratory",
        }
    }

    /// Parse a current-generation label. Older aliases are not accepted here;
    /// see [`normalize_tier`].
    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "tailored" => Some(Self::Tailored),
            "recommended" => Some(Self::Recommended),
            "exploratory" => Some(Self::Exploratory),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a tier label, including the older `exact`/`likely`/`related` names,
/// onto the current tier set. Unknown labels fall back to `exploratory`.
pub fn normalize_tier(label: &str) -> Tier {
    match label {
        "exact" => Tier::Tailored,
        "likely" => Tier::Recommended,
        "related" => Tier::Exploratory,
        other => Tier::parse(other).unwrap_or(Tier::Exploratory),
    }
}

/// One evaluated case. Every attribute is optional; analyses skip records
/// that lack the field they need.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// Raw label as written by the matcher; may be outside [`Tier::ALL`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,

    /// Per-dimension contributions. Non-numeric values are tolerated and
    /// ignored by the dimension aggregator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<BTreeMap<String, serde_json::Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_analyzed: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knocked_out: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered_by_service_type: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl Record {
    /// Record carrying only a score.
    pub fn scored(score: f64) -> Self {
        Self {
            score: Some(score),
            ..Self::default()
        }
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    pub fn with_dimension(mut self, name: impl Into<String>, value: f64) -> Self {
        self.breakdown
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), serde_json::Value::from(value));
        self
    }

    /// The tier label, if it is one of the reported tiers.
    pub fn known_tier(&self) -> Option<Tier> {
        self.tier.as_deref().and_then(Tier::parse)
    }
}

/// An ordered run of records from one matcher version.
///
/// Order only matters when two batches are aligned for comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Batch {
    records: Vec<Record>,
}

impl Batch {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Scores of the records that carry one, in batch order.
    pub fn scores(&self) -> Vec<f64> {
        scores_of(&self.records)
    }

    /// Rewrite every tier label through [`normalize_tier`].
    pub fn normalize_tiers(self) -> Self {
        let records = self
            .records
            .into_iter()
            .map(|mut r| {
                if let Some(label) = r.tier.take() {
                    r.tier = Some(normalize_tier(&label).as_str().to_string());
                }
                r
            })
            .collect();
        Self { records }
    }
}

impl From<Vec<Record>> for Batch {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

pub(crate) fn scores_of(records: &[Record]) -> Vec<f64> {
    records.iter().filter_map(|r| r.score).collect()
}
