//! Consistency checks on a matcher's output.
//!
//! Findings are reported, never raised: a batch that fails a check is still
//! analyzed in full.

use serde::{Deserialize, Serialize};

use crate::domain::{Record, Tier};

/// Lowest tailored score against highest recommended score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierInversion {
    pub min_tailored: f64,
    pub max_recommended: f64,
}

/// Result of [`check_batch`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SanityReport {
    /// Scores outside `[0, 1]`.
    pub out_of_range: usize,
    /// Set when some tailored record scores below some recommended record.
    pub tier_inversion: Option<TierInversion>,
}

impl SanityReport {
    pub fn is_clean(&self) -> bool {
        self.out_of_range == 0 && self.tier_inversion.is_none()
    }
}

pub fn check_batch(records: &[Record]) -> SanityReport {
    let out_of_range = records
        .iter()
        .filter_map(|r| r.score)
        .filter(|s| !(0.0..=1.0).contains(s))
        .count();

    let tier_scores = |tier: Tier| {
        records
            .iter()
            .filter(move |r| r.known_tier() == Some(tier))
            .filter_map(|r| r.score)
    };
    let min_tailored = tier_scores(Tier::Tailored).min_by(f64::total_cmp);
    let max_recommended = tier_scores(Tier::Recommended).max_by(f64::total_cmp);

    let tier_inversion = match (min_tailored, max_recommended) {
        (Some(min_tailored), Some(max_recommended)) if min_tailored < max_recommended => {
            Some(TierInversion {
                min_tailored,
                max_recommended,
            })
        }
        _ => None,
    };

    SanityReport {
        out_of_range,
        tier_inversion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_batch() {
        let records = vec![
            Record::scored(0.7).with_tier("tailored"),
            Record::scored(0.4).with_tier("recommended"),
            Record::scored(0.2).with_tier("exploratory"),
        ];
        assert!(check_batch(&records).is_clean());
    }

    #[test]
    fn test_out_of_range_scores_are_counted() {
        let records = vec![Record::scored(-0.1), Record::scored(1.0), Record::scored(1.3)];
        assert_eq!(check_batch(&records).out_of_range, 2);
    }

    #[test]
    fn test_tier_inversion_detected() {
        let records = vec![
            Record::scored(0.5).with_tier("tailored"),
            Record::scored(0.8).with_tier("tailored"),
            Record::scored(0.6).with_tier("recommended"),
        ];
        let report = check_batch(&records);
        assert_eq!(
            report.tier_inversion,
            Some(TierInversion {
                min_tailored: 0.5,
                max_recommended: 0.6
            })
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn test_equal_boundary_scores_are_not_inverted() {
        let records = vec![
            Record::scored(0.55).with_tier("tailored"),
            Record::scored(0.55).with_tier("recommended"),
        ];
        assert!(check_batch(&records).tier_inversion.is_none());
    }
}
