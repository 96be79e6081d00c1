use matchaudit_core::{
    analyze_funnel, load_batch, load_optional_batch, render_text, write_json, write_markdown,
    AuditError, AuditReport, Batch, Record, ScoreBand, Tier,
};
use serde_json::json;
use tempfile::tempdir;

fn write(dir: &std::path::Path, name: &str, value: serde_json::Value) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec(&value).expect("encode")).expect("write fixture");
    path
}

fn close(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() < 1e-9)
}

#[test]
fn four_record_batch_end_to_end() {
    let dir = tempdir().expect("tempdir");
    let path = write(
        dir.path(),
        "audit.json",
        json!([
            {"score": 0.1, "tier": "exploratory"},
            {"score": 0.3, "tier": "exploratory"},
            {"score": 0.5, "tier": "recommended"},
            {"score": 0.9, "tier": "tailored"}
        ]),
    );

    let batch = load_batch(&path).expect("load");
    assert_eq!(batch.len(), 4);

    let report = AuditReport::build(&batch, None);
    let score = report.score.as_ref().expect("scores present");
    assert!(close(score.stats.mean, 0.45));
    assert!(close(score.stats.median, 0.4));
    for band in ScoreBand::ALL {
        assert_eq!(score.bands.count(band), 1, "band {band}");
    }

    let tiers = report.tiers.as_ref().expect("tiers present");
    assert_eq!(tiers.count(Tier::Exploratory), 2);
    assert_eq!(tiers.count(Tier::Recommended), 1);
    assert_eq!(tiers.count(Tier::Tailored), 1);

    let text = render_text(&report);
    assert!(text.contains("mean score:        0.4500"));
    assert!(text.contains("tailored share:    25.0%"));
}

#[test]
fn tier_percentages_sum_to_one_hundred() {
    let records: Vec<Record> = (0..37)
        .map(|i| {
            let tier = Tier::ALL[i % 3];
            Record::scored(0.5).with_tier(tier.as_str())
        })
        .collect();
    let report = AuditReport::build(&Batch::new(records), None);
    let tiers = report.tiers.expect("tiers present");
    let total: f64 = Tier::ALL.iter().map(|t| tiers.proportion(*t)).sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn partial_records_are_excluded_per_analysis() {
    let batch: Batch = serde_json::from_value(json!([
        {"score": 0.2},
        {"tier": "tailored", "totalAnalyzed": 10, "knockedOut": 5},
        {"breakdown": {"region": 0.5}}
    ]))
    .expect("deserialize batch");

    let report = AuditReport::build(&batch, None);
    assert_eq!(report.score.as_ref().map(|s| s.bands.total), Some(1));
    assert_eq!(report.tiers.as_ref().map(|t| t.total), Some(1));
    assert_eq!(report.dimensions.len(), 1);

    let funnel = analyze_funnel(batch.records()).expect("non-empty");
    assert!((funnel.avg_analyzed - 10.0 / 3.0).abs() < 1e-9);
    assert!((funnel.knockout_rate - 0.5).abs() < 1e-9);
}

#[test]
fn missing_input_is_not_found() {
    let dir = tempdir().expect("tempdir");
    let err = load_batch(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, AuditError::InputNotFound { .. }));

    let optional = load_optional_batch(&dir.path().join("absent.json")).expect("tolerated");
    assert!(optional.is_none());
}

#[test]
fn invalid_json_is_a_parse_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[{\"score\": 0.3},").expect("write");
    assert!(matches!(
        load_batch(&path).unwrap_err(),
        AuditError::Parse { .. }
    ));
}

#[test]
fn wrong_shape_is_a_parse_error() {
    let dir = tempdir().expect("tempdir");
    let object = write(dir.path(), "object.json", json!({"score": 0.3}));
    assert!(matches!(
        load_batch(&object).unwrap_err(),
        AuditError::Parse { .. }
    ));

    let bad_field = write(dir.path(), "bad.json", json!([{"score": "0.3"}]));
    assert!(matches!(
        load_batch(&bad_field).unwrap_err(),
        AuditError::Parse { .. }
    ));

    // A malformed baseline is still an error, not a skipped comparison.
    assert!(load_optional_batch(&bad_field).is_err());
}

#[test]
fn empty_batch_reports_no_sections() {
    let report = AuditReport::build(&Batch::default(), None);
    assert!(report.score.is_none());
    assert!(report.tiers.is_none());
    assert!(report.funnel.is_none());
    assert!(report.dimensions.is_empty());
    assert!(render_text(&report).contains("no score data"));
}

#[test]
fn report_artifacts_are_written() {
    let dir = tempdir().expect("tempdir");
    let batch = Batch::new(vec![
        Record::scored(0.2).with_tier("exploratory"),
        Record::scored(0.6).with_tier("tailored"),
    ]);
    let report = AuditReport::build(&batch, None);

    let json_path = dir.path().join("report.json");
    write_json(&json_path, &report).expect("write json");
    let restored: AuditReport =
        serde_json::from_slice(&std::fs::read(&json_path).expect("read json")).expect("parse");
    assert_eq!(restored.record_count, 2);
    assert_eq!(restored.tiers, report.tiers);

    let md_path = dir.path().join("REPORT.md");
    write_markdown(&md_path, &report).expect("write markdown");
    let md = std::fs::read_to_string(&md_path).expect("read markdown");
    assert!(md.contains("## Funnel Effect"));
}
