use std::fs;

use domino_bench::config::ScenarioConfig;
use domino_bench::replay::ScenarioRunner;
use domino_bench::report::ScenarioReport;
use domino_core::model::Party;
use tempfile::tempdir;

fn load_config(output_dir: &std::path::Path) -> ScenarioConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
table:
  max_pip: 6
  parties: 4
  hand_size: 7
  observer: 0
  observer_hand: [[6, 6], [5, 6], [4, 6], [0, 1], [1, 1], [2, 3], [0, 5]]
moves:
  - kind: play
    party: 0
    tile: [6, 6]
    side: left
  - kind: play
    party: 1
    tile: [3, 6]
    side: right
  - kind: pass
    party: 2
  - kind: play
    party: 3
    tile: [6, 1]
    side: left
  - kind: play
    party: 0
    tile: [0, 1]
    side: left
  - kind: reveal
    party: 1
    pips: [2]
outputs:
  report_json: "{report}"
  summary_md: "{summary}"
logging:
  enable_structured: false
"#,
        report = output_dir.join("{run_id}").join("report.json").display(),
        summary = output_dir.join("{run_id}").join("summary.md").display(),
    );

    let mut cfg: ScenarioConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

#[test]
fn scenario_smoke_test_writes_consistent_reports() {
    let dir = tempdir().expect("temp dir");
    let config = load_config(dir.path());
    let outputs = config.resolved_outputs();

    let runner = ScenarioRunner::new(config, outputs).expect("runner created");
    let summary = runner.run().expect("scenario completes");

    assert_eq!(summary.moves_applied, 6);
    assert_eq!(summary.live_items, 19);
    assert!(summary.branch_count > 0);
    assert!(summary.telemetry_path.is_none());
    assert!(summary.report_path.ends_with("test_smoke/report.json"));

    let json = fs::read_to_string(&summary.report_path).expect("report readable");
    let report = ScenarioReport::from_json(&json).expect("report decodes");
    assert_eq!(report.run_id, summary.report.run_id);
    assert_eq!(report.steps, summary.report.steps);
    assert_eq!(report.steps.len(), 6);
    assert_eq!(report.open_ends, Some((0, 3)));
    assert_eq!(report.estimate.parties.len(), 3);

    for party in &report.estimate.parties {
        assert_eq!(party.attributes.len(), 7);
        for row in &party.attributes {
            assert!((0.0..=100.0).contains(&row.percent), "{row:?}");
        }
        assert!(!party.top_compositions.is_empty());
    }

    let percent = |party: u8, pip: &str| {
        report
            .estimate
            .party(Party::new(party))
            .and_then(|summary| summary.attributes.iter().find(|row| row.attribute == pip))
            .map(|row| row.percent)
            .expect("row present")
    };
    // P2 passed on 6 and 3.
    assert_eq!(percent(2, "6"), 0.0);
    assert_eq!(percent(2, "3"), 0.0);
    // [2|6] can only be with P3, and every live tile is in some hand.
    assert_eq!(percent(3, "6"), 100.0);

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("# Scenario `test_smoke`"));
    for party in ["## P1 (6 tiles)", "## P2 (7 tiles)", "## P3 (6 tiles)"] {
        assert!(markdown.contains(party), "missing {party}");
    }
}
