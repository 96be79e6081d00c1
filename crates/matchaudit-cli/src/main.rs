//! matchaudit - statistics over matching audit results
//!
//! Reads the current audit result set (and, when present, a baseline result
//! set from the previous matcher version) and prints a sectioned report:
//! score distribution, tier distribution, dimension contribution, funnel
//! effect, version comparison, summary.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};

use matchaudit_core::{
    load_batch, load_optional_batch, render_text, write_markdown, AnalysisSpan, AuditReport, Batch,
};

/// Exit code when the mandatory input file is missing.
const EXIT_MISSING_INPUT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "matchaudit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Descriptive statistics over subsidy matching audit results", long_about = None)]
struct Cli {
    /// Current audit results (JSON array of records)
    #[arg(long, env = "MATCHAUDIT_CURRENT", default_value = "scripts/audit-1000-final.json")]
    current: PathBuf,

    /// Baseline audit results to compare against; skipped if the file is absent
    #[arg(long, env = "MATCHAUDIT_BASELINE", default_value = "scripts/audit-1000-results.json")]
    baseline: PathBuf,

    /// Do not compare against a baseline
    #[arg(long)]
    no_baseline: bool,

    /// Map older tier names (exact/likely/related) onto the current tiers
    #[arg(long)]
    legacy_tiers: bool,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Also write a Markdown quality report to this path
    #[arg(long)]
    markdown: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    matchaudit_core::init_tracing(cli.log_json, level);

    let _span = AnalysisSpan::enter(&cli.current.display().to_string());
    match run(&cli)? {
        Outcome::Report(output) => {
            print!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Outcome::MissingInput(diagnostic) => {
            eprint!("{diagnostic}");
            Ok(ExitCode::from(EXIT_MISSING_INPUT))
        }
    }
}

/// What a run produced.
#[derive(Debug)]
enum Outcome {
    /// Rendered report, ready to print.
    Report(String),
    /// The mandatory input was absent; nothing was analyzed.
    MissingInput(String),
}

/// Execute the audit.
fn run(cli: &Cli) -> Result<Outcome> {
    let current = match load_batch(&cli.current) {
        Ok(batch) => batch,
        Err(e) if e.is_not_found() => {
            let msg = format!(
                "error: {e}\nRe-run once {} has been generated.\n",
                cli.current.display()
            );
            return Ok(Outcome::MissingInput(msg));
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to load {:?}", cli.current));
        }
    };

    let mut output = format!(
        "loaded {} ({} cases)\n",
        cli.current.display(),
        current.len()
    );

    let baseline = if cli.no_baseline {
        None
    } else {
        let loaded = load_optional_batch(&cli.baseline)
            .with_context(|| format!("Failed to load {:?}", cli.baseline))?;
        match &loaded {
            Some(batch) => output.push_str(&format!(
                "loaded {} ({} cases)\n",
                cli.baseline.display(),
                batch.len()
            )),
            None => output.push_str(&format!(
                "baseline {} not found, skipping comparison\n",
                cli.baseline.display()
            )),
        }
        loaded
    };

    let (current, baseline) = if cli.legacy_tiers {
        (
            current.normalize_tiers(),
            baseline.map(Batch::normalize_tiers),
        )
    } else {
        (current, baseline)
    };

    let report = AuditReport::build(&current, baseline.as_ref());

    if let Some(path) = &cli.markdown {
        write_report_markdown(path, &report)?;
    }

    if cli.json {
        output = serde_json::to_string_pretty(&report)?;
        output.push('\n');
    } else {
        output.push_str(&render_text(&report));
    }
    Ok(Outcome::Report(output))
}

fn write_report_markdown(path: &Path, report: &AuditReport) -> Result<()> {
    write_markdown(path, report).with_context(|| format!("Failed to write {:?}", path))?;
    info!(event = "report.written", path = %path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(current: PathBuf, baseline: PathBuf) -> Cli {
        Cli {
            current,
            baseline,
            no_baseline: false,
            legacy_tiers: false,
            json: false,
            markdown: None,
            verbose: false,
            log_json: false,
        }
    }

    fn write(path: &Path, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    fn report(args: &Cli) -> String {
        match run(args).unwrap() {
            Outcome::Report(output) => output,
            other => panic!("expected a report, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_missing_current_exits_without_analysis() {
        let temp_dir = tempfile::tempdir().unwrap();
        let args = cli(
            temp_dir.path().join("final.json"),
            temp_dir.path().join("baseline.json"),
        );

        match run(&args).unwrap() {
            Outcome::MissingInput(msg) => {
                assert!(msg.contains("input not found"));
                assert!(!msg.contains("Score distribution"));
            }
            other => panic!("expected missing input, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_baseline_skips_comparison() {
        let temp_dir = tempfile::tempdir().unwrap();
        let current = temp_dir.path().join("final.json");
        write(&current, r#"[{"score": 0.4, "tier": "recommended"}]"#);

        let output = report(&cli(current, temp_dir.path().join("baseline.json")));
        assert!(output.contains("skipping comparison"));
        assert!(output.contains("1. Score distribution"));
        assert!(!output.contains("Version comparison"));
    }

    #[test]
    fn test_baseline_enables_comparison() {
        let temp_dir = tempfile::tempdir().unwrap();
        let current = temp_dir.path().join("final.json");
        let baseline = temp_dir.path().join("baseline.json");
        write(
            &current,
            r#"[{"score": 0.6, "tier": "tailored"}, {"score": 0.5, "tier": "recommended"}]"#,
        );
        write(
            &baseline,
            r#"[{"score": 0.4, "tier": "recommended"}, {"score": 0.6, "tier": "tailored"}]"#,
        );

        let output = report(&cli(current, baseline));
        assert!(output.contains("5. Version comparison"));
        assert!(output.contains("net change: +0"));
    }

    #[test]
    fn test_malformed_current_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let current = temp_dir.path().join("final.json");
        write(&current, r#"{"score": 0.4}"#);

        let err = run(&cli(current, temp_dir.path().join("baseline.json"))).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse"));
    }

    #[test]
    fn test_legacy_tiers_and_markdown_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        let current = temp_dir.path().join("final.json");
        let markdown = temp_dir.path().join("REPORT.md");
        write(&current, r#"[{"score": 0.7, "tier": "exact"}, {"score": 0.4, "tier": "likely"}]"#);

        let mut args = cli(current, temp_dir.path().join("baseline.json"));
        args.legacy_tiers = true;
        args.no_baseline = true;
        args.json = true;
        args.markdown = Some(markdown.clone());

        let output = report(&args);
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["tiers"]["counts"]["tailored"], 1);
        assert_eq!(json["tiers"]["counts"]["recommended"], 1);

        let md = std::fs::read_to_string(markdown).unwrap();
        assert!(md.contains("| tailored | 1 | 50.0% |"));
    }
}
