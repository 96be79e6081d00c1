//! Audit report assembly and rendering.
//!
//! Provides:
//! - `AuditReport`: every analysis section computed over one current batch
//!   and an optional baseline
//! - `render_text`: the sectioned console report
//! - `render_markdown` / `write_markdown`: the quality report document
//! - `write_json`: the machine-readable artifact

use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compare::{compare_batches, Comparison, EffectSize, RelativeChange};
use crate::dimensions::{aggregate_dimensions, reference_profiles, DimensionSummary};
use crate::distribution::{
    analyze_scores, analyze_tiers, ScoreAnalysis, ScoreBand, TierDistribution,
};
use crate::domain::{Batch, Result, Tier};
use crate::funnel::{analyze_funnel, FunnelSummary};
use crate::obs;
use crate::sanity::{check_batch, SanityReport};
use crate::stats::SummaryStats;

const RULE: &str = "============================================================";

const INSUFFICIENT_COMPARISON: &str =
    "insufficient comparison data (baseline or current has no scores)";

/// All analysis sections for one audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
    pub baseline_record_count: Option<usize>,
    pub score: Option<ScoreAnalysis>,
    pub tiers: Option<TierDistribution>,
    pub dimensions: Vec<DimensionSummary>,
    pub funnel: Option<FunnelSummary>,
    pub comparison: Option<Comparison>,
    pub sanity: SanityReport,
}

impl AuditReport {
    /// Run every analysis over `current`, and the comparison when a
    /// `baseline` is given.
    pub fn build(current: &Batch, baseline: Option<&Batch>) -> Self {
        let records = current.records();

        let score = analyze_scores(records);
        obs::emit_analysis_completed("score", score.as_ref().map_or(0, |s| s.stats.count));

        let tiers = analyze_tiers(records);
        obs::emit_analysis_completed("tiers", tiers.as_ref().map_or(0, |t| t.total));

        let dimensions = aggregate_dimensions(records);
        obs::emit_analysis_completed("dimensions", dimensions.len());

        let funnel = analyze_funnel(records);
        obs::emit_analysis_completed("funnel", funnel.as_ref().map_or(0, |f| f.records));

        let comparison = baseline.and_then(|b| compare_batches(b.records(), records));
        if let Some(cmp) = &comparison {
            obs::emit_analysis_completed("comparison", cmp.aligned);
        }

        Self {
            generated_at: Utc::now(),
            record_count: current.len(),
            baseline_record_count: baseline.map(Batch::len),
            score,
            tiers,
            dimensions,
            funnel,
            comparison,
            sanity: check_batch(records),
        }
    }
}

fn fmt4(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"))
}

fn pct(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

fn section(out: &mut String, title: &str) {
    let _ = write!(out, "\n{RULE}\n{title}\n{RULE}\n");
}

/// Render the console report. Section order is fixed: score distribution,
/// tier distribution, dimension contribution, funnel effect, version
/// comparison (when a baseline was compared), summary.
pub fn render_text(report: &AuditReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}\nMatching Audit Report\n{RULE}");
    let _ = writeln!(out, "records: {}", report.record_count);

    section(&mut out, "1. Score distribution");
    match &report.score {
        Some(score) => render_score_text(&mut out, score),
        None => out.push_str("no score data\n"),
    }

    section(&mut out, "2. Tier distribution");
    match &report.tiers {
        Some(tiers) => {
            for tier in Tier::ALL {
                let _ = writeln!(
                    out,
                    "  - {}: {} ({})",
                    tier,
                    tiers.count(tier),
                    pct(tiers.proportion(tier))
                );
            }
            let _ = writeln!(out, "  tiered records: {}", tiers.total);
            if tiers.unrecognized() > 0 {
                let _ = writeln!(out, "  other labels:   {}", tiers.unrecognized());
            }
        }
        None => out.push_str("no tier data\n"),
    }

    section(&mut out, "3. Dimension contribution");
    if report.dimensions.is_empty() {
        out.push_str("no breakdown data\n");
    }
    for dim in &report.dimensions {
        let profiles: Vec<&str> = reference_profiles(&dim.name)
            .into_iter()
            .map(|p| p.as_str())
            .collect();
        let tag = if profiles.is_empty() {
            String::new()
        } else {
            format!(" [{}]", profiles.join(", "))
        };
        let _ = writeln!(
            out,
            "  - {}: {} (n={}){}",
            dim.name,
            fmt4(dim.stats.mean),
            dim.stats.count,
            tag
        );
    }

    section(&mut out, "4. Funnel effect");
    match &report.funnel {
        Some(f) => {
            let _ = writeln!(out, "  analyzed:          {:.1}", f.avg_analyzed);
            let _ = writeln!(
                out,
                "  service filter:    {:.1} ({})",
                f.avg_filtered,
                pct(f.filtered_rate)
            );
            let _ = writeln!(
                out,
                "  knocked out:       {:.1} ({})",
                f.avg_knocked_out,
                pct(f.knockout_rate)
            );
            let _ = writeln!(
                out,
                "  matched:           {:.1} ({})",
                f.avg_matched,
                pct(f.match_rate)
            );
        }
        None => out.push_str("no records\n"),
    }

    match (&report.comparison, report.baseline_record_count) {
        (Some(cmp), _) => {
            section(&mut out, "5. Version comparison");
            render_comparison_text(&mut out, cmp);
        }
        (None, Some(_)) => {
            section(&mut out, "5. Version comparison");
            let _ = writeln!(out, "  warning: {INSUFFICIENT_COMPARISON}");
        }
        (None, None) => {}
    }

    section(&mut out, "Summary");
    render_summary_text(&mut out, report);
    out
}

fn render_score_text(out: &mut String, score: &ScoreAnalysis) {
    render_stats_text(out, &score.stats);
    out.push_str("\n  bands:\n");
    for band in ScoreBand::ALL {
        let _ = writeln!(
            out,
            "  - {} ({}): {} ({})",
            band.label(),
            band.range(),
            score.bands.count(band),
            pct(score.bands.share(band))
        );
    }
}

fn render_stats_text(out: &mut String, stats: &SummaryStats) {
    let _ = writeln!(out, "  count:  {}", stats.count);
    let _ = writeln!(out, "  mean:   {}", fmt4(stats.mean));
    let _ = writeln!(out, "  median: {}", fmt4(stats.median));
    let _ = writeln!(out, "  stdev:  {}", fmt4(stats.stdev));
    let _ = writeln!(out, "  min:    {}", fmt4(stats.min));
    let _ = writeln!(out, "  max:    {}", fmt4(stats.max));
    if stats.q25.is_some() {
        let _ = writeln!(out, "  q25:    {}", fmt4(stats.q25));
        let _ = writeln!(out, "  q75:    {}", fmt4(stats.q75));
        let _ = writeln!(out, "  iqr:    {}", fmt4(stats.iqr));
    }
}

fn effect_size_text(effect: Option<&EffectSize>) -> String {
    match effect {
        None => "not computed (fewer than 2 scores)".to_string(),
        Some(EffectSize::Undefined) => "undefined (zero pooled variance)".to_string(),
        Some(EffectSize::Measured { d, magnitude }) => {
            format!("d = {d:.3} ({})", magnitude.as_str())
        }
    }
}

fn relative_change_text(change: &RelativeChange) -> String {
    match change {
        RelativeChange::Undefined => "undefined (baseline mean is zero)".to_string(),
        RelativeChange::Ratio(r) => pct(*r),
    }
}

fn truncation_text(cmp: &Comparison) -> Option<String> {
    cmp.truncated_from.map(|(before, after)| {
        format!(
            "case counts differ (baseline={before}, current={after}); comparing first {}",
            cmp.aligned
        )
    })
}

fn render_comparison_text(out: &mut String, cmp: &Comparison) {
    if let Some(warning) = truncation_text(cmp) {
        let _ = writeln!(out, "  warning: {warning}");
    }
    let _ = writeln!(out, "  baseline mean:   {}", fmt4(cmp.before.mean));
    let _ = writeln!(out, "  current mean:    {}", fmt4(cmp.after.mean));
    let _ = writeln!(out, "  mean diff:       {}", fmt4(cmp.diff.mean));
    let _ = writeln!(
        out,
        "  relative change: {}",
        relative_change_text(&cmp.relative_change)
    );
    let _ = writeln!(out, "  baseline median: {}", fmt4(cmp.before.median));
    let _ = writeln!(out, "  current median:  {}", fmt4(cmp.after.median));
    let _ = writeln!(out, "  median shift:    {}", fmt4(cmp.median_shift));
    let _ = writeln!(
        out,
        "  effect size:     {}",
        effect_size_text(cmp.effect_size.as_ref())
    );
    match &cmp.migration {
        Some(m) => {
            let _ = writeln!(out, "  upgrades (recommended -> tailored):   {}", m.upgrades);
            let _ = writeln!(out, "  downgrades (tailored -> recommended): {}", m.downgrades);
            let _ = writeln!(out, "  net change: {:+}", m.net());
        }
        None => out.push_str("  tier migration: skipped (records without tier)\n"),
    }
}

/// Headline figures shared by the text and Markdown summaries.
fn summary_figures(report: &AuditReport) -> Vec<(&'static str, String)> {
    let mut figures = Vec::new();
    if let Some(score) = &report.score {
        figures.push(("mean score", fmt4(score.stats.mean)));
        figures.push(("median score", fmt4(score.stats.median)));
    }
    if let Some(tiers) = &report.tiers {
        figures.push(("tailored share", pct(tiers.proportion(Tier::Tailored))));
        figures.push(("recommended share", pct(tiers.proportion(Tier::Recommended))));
    }
    if let Some(f) = &report.funnel {
        figures.push(("knockout rate", pct(f.knockout_rate)));
    }
    figures
}

fn sanity_findings(sanity: &SanityReport) -> Vec<String> {
    let mut findings = Vec::new();
    if sanity.out_of_range > 0 {
        findings.push(format!("{} scores outside [0, 1]", sanity.out_of_range));
    }
    if let Some(inv) = &sanity.tier_inversion {
        findings.push(format!(
            "tier inversion, lowest tailored {:.4} < highest recommended {:.4}",
            inv.min_tailored, inv.max_recommended
        ));
    }
    findings
}

fn render_summary_text(out: &mut String, report: &AuditReport) {
    for (label, value) in summary_figures(report) {
        let _ = writeln!(out, "  {:<19}{value}", format!("{label}:"));
    }
    let findings = sanity_findings(&report.sanity);
    if findings.is_empty() {
        let _ = writeln!(out, "  {:<19}passed", "sanity checks:");
    }
    for finding in findings {
        let _ = writeln!(out, "  sanity: {finding}");
    }
}

/// Render the Markdown quality report.
pub fn render_markdown(report: &AuditReport) -> String {
    let mut out = String::new();
    out.push_str("# Matching Quality Report\n\n");
    let _ = writeln!(
        out,
        "Generated {} over {} records.\n",
        report.generated_at.to_rfc3339(),
        report.record_count
    );

    out.push_str("## Score Distribution\n\n");
    match &report.score {
        Some(score) => {
            out.push_str("| statistic | value |\n|---|---|\n");
            let s = &score.stats;
            for (name, value) in [
                ("mean", s.mean),
                ("median", s.median),
                ("stdev", s.stdev),
                ("min", s.min),
                ("max", s.max),
                ("q25", s.q25),
                ("q75", s.q75),
                ("iqr", s.iqr),
            ] {
                let _ = writeln!(out, "| {name} | {} |", fmt4(value));
            }
            out.push_str("\n| band | range | count | share |\n|---|---|---|---|\n");
            for band in ScoreBand::ALL {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    band.label(),
                    band.range(),
                    score.bands.count(band),
                    pct(score.bands.share(band))
                );
            }
        }
        None => out.push_str("No score data.\n"),
    }

    out.push_str("\n## Tier Distribution\n\n");
    match &report.tiers {
        Some(tiers) => {
            out.push_str("| tier | count | share |\n|---|---|---|\n");
            for tier in Tier::ALL {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} |",
                    tier,
                    tiers.count(tier),
                    pct(tiers.proportion(tier))
                );
            }
        }
        None => out.push_str("No tier data.\n"),
    }

    out.push_str("\n## Dimension Contribution\n\n");
    if report.dimensions.is_empty() {
        out.push_str("No breakdown data.\n");
    } else {
        out.push_str("| dimension | mean | n |\n|---|---|---|\n");
        for dim in &report.dimensions {
            let _ = writeln!(
                out,
                "| `{}` | {} | {} |",
                dim.name,
                fmt4(dim.stats.mean),
                dim.stats.count
            );
        }
    }

    out.push_str("\n## Funnel Effect\n\n");
    match &report.funnel {
        Some(f) => {
            let _ = writeln!(out, "- analyzed: {:.1}", f.avg_analyzed);
            let _ = writeln!(
                out,
                "- service filter: {:.1} ({})",
                f.avg_filtered,
                pct(f.filtered_rate)
            );
            let _ = writeln!(
                out,
                "- knocked out: {:.1} ({})",
                f.avg_knocked_out,
                pct(f.knockout_rate)
            );
            let _ = writeln!(out, "- matched: {:.1} ({})", f.avg_matched, pct(f.match_rate));
        }
        None => out.push_str("No records.\n"),
    }

    match (&report.comparison, report.baseline_record_count) {
        (Some(cmp), _) => {
            out.push_str("\n## Version Comparison\n\n");
            render_comparison_markdown(&mut out, cmp);
        }
        (None, Some(_)) => {
            out.push_str("\n## Version Comparison\n\n");
            let _ = writeln!(out, "> warning: {INSUFFICIENT_COMPARISON}");
        }
        (None, None) => {}
    }

    out.push_str("\n## Summary\n\n");
    for (label, value) in summary_figures(report) {
        let _ = writeln!(out, "- {label}: {value}");
    }
    let findings = sanity_findings(&report.sanity);
    if findings.is_empty() {
        out.push_str("- sanity checks: passed\n");
    }
    for finding in findings {
        let _ = writeln!(out, "- sanity: {finding}");
    }

    out
}

fn render_comparison_markdown(out: &mut String, cmp: &Comparison) {
    if let Some(warning) = truncation_text(cmp) {
        let _ = writeln!(out, "> warning: {warning}\n");
    }
    let _ = writeln!(out, "- aligned cases: {}", cmp.aligned);
    let _ = writeln!(
        out,
        "- mean: {} -> {}",
        fmt4(cmp.before.mean),
        fmt4(cmp.after.mean)
    );
    let _ = writeln!(out, "- mean diff: {}", fmt4(cmp.diff.mean));
    let _ = writeln!(
        out,
        "- relative change: {}",
        relative_change_text(&cmp.relative_change)
    );
    let _ = writeln!(
        out,
        "- median: {} -> {}",
        fmt4(cmp.before.median),
        fmt4(cmp.after.median)
    );
    let _ = writeln!(out, "- median shift: {}", fmt4(cmp.median_shift));
    let _ = writeln!(
        out,
        "- effect size: {}",
        effect_size_text(cmp.effect_size.as_ref())
    );
    match &cmp.migration {
        Some(m) => {
            let _ = writeln!(
                out,
                "- tier migration: +{} / -{} (net {:+})",
                m.upgrades,
                m.downgrades,
                m.net()
            );
        }
        None => out.push_str("- tier migration: skipped (records without tier)\n"),
    }
}

/// Write the Markdown quality report.
pub fn write_markdown(path: &Path, report: &AuditReport) -> Result<()> {
    std::fs::write(path, render_markdown(report))?;
    Ok(())
}

/// Write the report as pretty JSON.
pub fn write_json(path: &Path, report: &AuditReport) -> Result<()> {
    let json = serde_json::to_vec_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
