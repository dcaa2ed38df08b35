use pretty_assertions::assert_eq;
use scf_cli::commands::{
    automate, configure, overlap_subjects, parse_actions, render_coverage, risk_threat_subject,
};
use scf_cli::{AppConfig, FilterArgs};
use scf_engine::{EngineConfig, ExportRequest};
use scf_test_utils::sample_catalog;
use std::sync::Arc;

fn args() -> FilterArgs {
    FilterArgs {
        coverage: vec!["hipaa".to_string()],
        select: vec!["GOV-01".to_string(), "NOPE-99".to_string()],
        priority: vec!["IAC-01".to_string()],
        ..FilterArgs::default()
    }
}

#[test]
fn configure_filters_then_selects() {
    let state = configure(Arc::new(sample_catalog()), EngineConfig::default(), &args()).unwrap();

    let selected: Vec<&str> = state.selection().ids().iter().map(String::as_str).collect();
    assert_eq!(selected, vec!["DCH-01", "GOV-01", "IAC-01"]);
    assert!(state.priorities().contains("IAC-01"));
    assert_eq!(state.settled_selection().len(), 3);

    let text = render_coverage(state.coverage(), state.selection().len());
    assert!(text.starts_with("Selected controls: 3"));
    assert!(text.contains("US HIPAA"));
}

#[test]
fn overlap_from_cli_subjects() {
    let result = overlap_subjects(&sample_catalog(), "framework:hipaa", "core_level:L1").unwrap();
    assert_eq!(result.intersection_controls, 1);
    assert!(overlap_subjects(&sample_catalog(), "vendor:x", "core_level:L1").is_err());
}

#[test]
fn risk_threat_from_cli_subject() {
    let result = risk_threat_subject(&sample_catalog(), "framework:hipaa").unwrap();
    assert_eq!(result.control_stats.subject_controls, 2);
    assert_eq!(result.control_stats.total_controls, 8);
    assert_eq!(result.risk_coverage.subject_with_summary, 2);
    assert_eq!(result.risk_coverage.total_with_summary, 5);
    assert_eq!(result.threat_coverage.total_with_summary, 4);
    assert_eq!(result.risk_coverage.catalog_items, 7);
    assert_eq!(result.threat_coverage.catalog_items, 5);
    assert!(result.summary_text.starts_with("US HIPAA uses 2 controls (25.0% of all"));

    assert!(risk_threat_subject(&sample_catalog(), "hipaa").is_err());
}

#[tokio::test]
async fn automate_then_export() {
    let state =
        configure(Arc::new(sample_catalog()), EngineConfig::default(), &FilterArgs::default())
            .unwrap();
    let actions = parse_actions(
        r#"{"uiActions": [
            {"scope": "scf", "target": "scf_config", "type": "ui.set_filters",
             "params": {"coverage_frameworks": ["ISO 42001"]}},
            {"scope": "scf", "target": "scf_config", "type": "ui.set_timeline_order",
             "params": {"order": ["iso42001"]}}
        ]}"#,
    )
    .unwrap();

    let (session, report, snapshot) = automate(state, &actions).await;
    assert_eq!(report.applied, 2);
    assert_eq!(snapshot.selected_count, 1);

    let payload = session
        .with_state(|s| s.export(&ExportRequest::new("AI governance"), chrono::Utc::now()))
        .unwrap();
    assert_eq!(payload.controls.len(), 1);
    assert_eq!(payload.controls[0].object_id, "AAT-01");
    assert_eq!(payload.timeline.unwrap().windows[0].goal, "FRAMEWORK_ISO42001");
}

#[test]
fn config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scf.toml");
    std::fs::write(
        &path,
        "log_level = \"debug\"\n[catalog]\nbase_url = \"http://catalog.internal\"\n",
    )
    .unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.catalog.base_url, "http://catalog.internal");
    assert_eq!(config.log_level.as_deref(), Some("debug"));

    assert!(AppConfig::load(&dir.path().join("missing.toml")).is_err());
}
