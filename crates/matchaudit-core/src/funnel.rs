//! Funnel-stage averages: how many candidates each filter removes.

use serde::{Deserialize, Serialize};

use crate::domain::Record;

/// Average funnel sizes per record and the rates derived from them.
///
/// Every average divides by the full batch size, so a record missing a
/// counter contributes zero rather than being skipped. Rates are `0.0`
/// when the average analyzed count is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunnelSummary {
    pub records: usize,
    pub avg_analyzed: f64,
    pub avg_filtered: f64,
    pub avg_knocked_out: f64,
    pub avg_matched: f64,
    pub filtered_rate: f64,
    pub knockout_rate: f64,
    pub match_rate: f64,
}

/// Summarize the funnel counters. `None` for an empty batch.
pub fn analyze_funnel(records: &[Record]) -> Option<FunnelSummary> {
    if records.is_empty() {
        return None;
    }

    // u128 sums of u64 counters cannot overflow for any addressable batch.
    let sum = |counter: fn(&Record) -> Option<u64>| -> u128 {
        records
            .iter()
            .map(|r| u128::from(counter(r).unwrap_or(0)))
            .sum()
    };
    let analyzed = sum(|r| r.total_analyzed);
    let filtered = sum(|r| r.filtered_by_service_type);
    let knocked_out = sum(|r| r.knocked_out);
    let matched = sum(|r| r.total_count);

    let n = records.len() as f64;
    let avg_analyzed = analyzed as f64 / n;
    let avg_filtered = filtered as f64 / n;
    let avg_knocked_out = knocked_out as f64 / n;
    let avg_matched = matched as f64 / n;

    let rate = |avg: f64| {
        if avg_analyzed > 0.0 {
            avg / avg_analyzed
        } else {
            0.0
        }
    };

    Some(FunnelSummary {
        records: records.len(),
        avg_analyzed,
        avg_filtered,
        avg_knocked_out,
        avg_matched,
        filtered_rate: rate(avg_filtered),
        knockout_rate: rate(avg_knocked_out),
        match_rate: rate(avg_matched),
    })
}
