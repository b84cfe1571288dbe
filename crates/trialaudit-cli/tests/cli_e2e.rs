use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::tempdir;

const FILING: &str = "PROSPECTUS SUMMARY
Our product candidate ABC-123 is being evaluated in a Phase 2 trial (NCT01234567)
for the treatment of psoriatic arthritis in approximately 120 patients.
";

const RECORD: &str = r#"{
  "identification": {"nct_id": "NCT01234567", "brief_title": "ABC-123 in Psoriatic Arthritis"},
  "status": {"overall_status": "TERMINATED", "start_date": "2021-04"},
  "design": {"phases": ["PHASE2"], "enrollment_count": 150, "enrollment_type": "ACTUAL"},
  "has_results": false
}"#;

const RAW_STUDY: &str = r#"{
  "protocolSection": {
    "identificationModule": {"nctId": "NCT07654321", "briefTitle": "Raw study"},
    "statusModule": {"overallStatus": "RECRUITING", "startDateStruct": {"date": "2023-02"}},
    "designModule": {"phases": ["PHASE3"], "enrollmentInfo": {"count": 300, "type": "ESTIMATED"}}
  }
}"#;

fn trialaudit_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_trialaudit"))
}

fn run(args: &[&str]) -> Output {
    Command::new(trialaudit_bin())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run trialaudit")
}

fn setup(dir: &Path) -> (PathBuf, PathBuf) {
    let filing = dir.join("s1.txt");
    fs::write(&filing, FILING).unwrap();
    let registry = dir.join("registry");
    fs::create_dir_all(&registry).unwrap();
    fs::write(registry.join("ctgov_NCT01234567_structured.json"), RECORD).unwrap();
    (filing, registry)
}

#[test]
fn compare_writes_report() {
    let dir = tempdir().unwrap();
    let (filing, registry) = setup(dir.path());
    let out = dir.path().join("out/report.json");

    let output = run(&[
        "compare",
        filing.to_str().unwrap(),
        "--candidate",
        "ABC-123",
        "--registry-dir",
        registry.to_str().unwrap(),
        "--filing-date",
        "2023-03-01",
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["candidate"]["name"], "ABC-123");
    assert_eq!(report["records_compared"], 1);
    assert_eq!(report["record_comparisons"][0]["matched_passages"], 1);
    assert_eq!(report["findings"][0]["type"], "undisclosed_negative_status");
}

#[test]
fn unknown_candidate_fails_with_alternatives() {
    let dir = tempdir().unwrap();
    let (filing, registry) = setup(dir.path());

    let output = run(&[
        "compare",
        filing.to_str().unwrap(),
        "--candidate",
        "XYZ-999",
        "--registry-dir",
        registry.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("XYZ-999"));
    assert!(stderr.contains("ABC-123"));
}

#[test]
fn candidates_prints_summary_json() {
    let dir = tempdir().unwrap();
    let (filing, _) = setup(dir.path());

    let output = run(&["candidates", filing.to_str().unwrap()]);
    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["candidates"][0]["name"], "ABC-123");
    assert_eq!(summary["nct_numbers_all"][0], "NCT01234567");
    assert_eq!(summary["pipeline_is_image"], false);
}

#[test]
fn candidates_flags_pipeline_chart_image_in_html_filing() {
    let dir = tempdir().unwrap();
    let filing = dir.path().join("s1.htm");
    fs::write(
        &filing,
        r#"<html><body>
<p>PROSPECTUS SUMMARY</p>
<p>Our product candidate ABC-123 is being evaluated in a Phase 2 trial (NCT01234567).</p>
<div><p>Our Pipeline</p><p><img src="pipeline_chart.jpg"></p></div>
</body></html>"#,
    )
    .unwrap();

    let output = run(&["candidates", filing.to_str().unwrap()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["pipeline_is_image"], true);
    assert_eq!(summary["candidates"][0]["name"], "ABC-123");
    assert!(summary["pipeline_excerpt"].as_str().unwrap().contains("Our Pipeline"));
}

#[test]
fn passages_for_a_trial_identifier() {
    let dir = tempdir().unwrap();
    let (filing, _) = setup(dir.path());

    let output = run(&["passages", filing.to_str().unwrap(), "--term", "NCT01234567"]);
    assert!(output.status.success());
    let passages: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(passages.as_array().unwrap().len(), 1);
    assert_eq!(passages[0]["section"], "PROSPECTUS SUMMARY");
}

#[test]
fn convert_raw_study() {
    let dir = tempdir().unwrap();
    let raw = dir.path().join("ctgov_NCT07654321.json");
    fs::write(&raw, RAW_STUDY).unwrap();
    let out = dir.path().join("structured.json");

    let output = run(&["convert", raw.to_str().unwrap(), "--out", out.to_str().unwrap()]);
    assert!(output.status.success());
    let record: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(record["identification"]["nct_id"], "NCT07654321");
    assert_eq!(record["design"]["enrollment_count"], 300);
    assert_eq!(record["has_results"], false);
}

#[test]
fn bad_filing_date_is_rejected() {
    let dir = tempdir().unwrap();
    let (filing, registry) = setup(dir.path());
    let output = run(&[
        "compare",
        filing.to_str().unwrap(),
        "--candidate",
        "ABC-123",
        "--registry-dir",
        registry.to_str().unwrap(),
        "--filing-date",
        "March 2023",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("filing-date"));
}
