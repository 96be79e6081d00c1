//! Per-dimension score contributions pooled across a batch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::Record;
use crate::stats::{summarize, SummaryStats};

/// Dimensions scored for individual applicants.
pub const PERSONAL_DIMENSIONS: [&str; 5] = [
    "region",
    "age",
    "householdType",
    "incomeLevel",
    "employmentStatus",
];

/// Dimensions scored for business applicants.
pub const BUSINESS_DIMENSIONS: [&str; 6] = [
    "region",
    "businessAge",
    "businessType",
    "employee",
    "founderAge",
    "revenue",
];

/// Reference applicant profile a dimension is documented under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantProfile {
    Personal,
    Business,
}

impl ApplicantProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Business => "business",
        }
    }
}

/// Which reference sets list `dimension`. Empty for dimensions that only
/// appear in the data. Informational; aggregation never filters on it.
pub fn reference_profiles(dimension: &str) -> Vec<ApplicantProfile> {
    let mut out = Vec::new();
    if PERSONAL_DIMENSIONS.contains(&dimension) {
        out.push(ApplicantProfile::Personal);
    }
    if BUSINESS_DIMENSIONS.contains(&dimension) {
        out.push(ApplicantProfile::Business);
    }
    out
}

/// Pooled statistics for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSummary {
    pub name: String,
    pub stats: SummaryStats,
}

/// Pool every numeric breakdown value by dimension name and summarize each
/// pool. Ranked by mean, highest first; equal means keep name order.
pub fn aggregate_dimensions(records: &[Record]) -> Vec<DimensionSummary> {
    let mut pools: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for breakdown in records.iter().filter_map(|r| r.breakdown.as_ref()) {
        for (dim, value) in breakdown {
            if let Some(v) = value.as_f64() {
                pools.entry(dim.as_str()).or_default().push(v);
            }
        }
    }

    let mut ranked: Vec<DimensionSummary> = pools
        .into_iter()
        .map(|(name, values)| DimensionSummary {
            name: name.to_string(),
            stats: summarize(&values),
        })
        .collect();
    ranked.sort_by(|a, b| {
        let a = a.stats.mean.unwrap_or(0.0);
        let b = b.stats.mean.unwrap_or(0.0);
        b.total_cmp(&a)
    });
    ranked
}
