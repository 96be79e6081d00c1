//! Matching audit statistics.
//!
//! Loads batches of scored matching results and computes score
//! distributions, tier breakdowns, per-dimension contributions, funnel
//! effectiveness, and before/after comparisons between two batches.

pub mod compare;
pub mod dimensions;
pub mod distribution;
pub mod domain;
pub mod funnel;
pub mod loader;
pub mod obs;
pub mod report;
pub mod sanity;
pub mod stats;
pub mod telemetry;

pub use compare::{
    compare_batches, tier_migration, Comparison, EffectMagnitude, EffectSize, RelativeChange,
    TierMigration,
};
pub use dimensions::{
    aggregate_dimensions, reference_profiles, ApplicantProfile, DimensionSummary,
    BUSINESS_DIMENSIONS, PERSONAL_DIMENSIONS,
};
pub use distribution::{
    analyze_scores, analyze_tiers, BandDistribution, ScoreAnalysis, ScoreBand, TierDistribution,
    SCORE_BANDS,
};
pub use domain::{normalize_tier, AuditError, Batch, Record, Result, Tier};
pub use funnel::{analyze_funnel, FunnelSummary};
pub use loader::{load_batch, load_optional_batch};
pub use obs::{
    emit_alignment_truncated, emit_analysis_completed, emit_batch_loaded,
    emit_optional_input_missing, AnalysisSpan,
};
pub use report::{render_markdown, render_text, write_json, write_markdown, AuditReport};
pub use sanity::{check_batch, SanityReport, TierInversion};
pub use stats::{summarize, SummaryStats};
pub use telemetry::init_tracing;

/// matchaudit version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
