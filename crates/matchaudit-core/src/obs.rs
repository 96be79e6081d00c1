//! Structured observability hooks for audit runs.
//!
//! - Run-scoped tracing spans via the `AnalysisSpan` RAII guard
//! - Emission functions for load, analysis, and alignment events
//!
//! Events are emitted at `info!` level unless noted; filter with `RUST_LOG`.

use std::path::Path;

use tracing::info;

/// RAII guard that enters a span tagged with the audited input for the
/// duration of one audit run.
///
/// ```ignore
/// let _span = AnalysisSpan::enter("scripts/audit-1000-final.json");
/// ```
pub struct AnalysisSpan {
    _span: tracing::span::EnteredSpan,
}

impl AnalysisSpan {
    pub fn enter(input: &str) -> Self {
        let span = tracing::info_span!("matchaudit.run", input = %input);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a batch was read and parsed.
pub fn emit_batch_loaded(path: &Path, records: usize) {
    info!(event = "batch.loaded", path = %path.display(), records = records);
}

/// Emit event: the optional baseline was not found (info level; comparison is skipped).
pub fn emit_optional_input_missing(path: &Path) {
    info!(event = "input.missing_optional", path = %path.display());
}

/// Emit event: one analysis section finished over `considered` records.
pub fn emit_analysis_completed(section: &str, considered: usize) {
    tracing::debug!(event = "analysis.completed", section = %section, considered = considered);
}

/// Emit event: comparison inputs had different lengths (warning level).
pub fn emit_alignment_truncated(before: usize, after: usize, aligned: usize) {
    tracing::warn!(
        event = "compare.truncated",
        before = before,
        after = after,
        aligned = aligned,
    );
}
