use std::fs;
use tempfile::tempdir;
use trialaudit_registry::{load_directory, OverallStatus, RegistryError};

const RAW: &str = r#"{
  "protocolSection": {
    "identificationModule": {"nctId": "NCT00000002", "briefTitle": "Raw study"},
    "statusModule": {"overallStatus": "COMPLETED"}
  }
}"#;

const STRUCTURED: &str = r#"{
  "identification": {"nct_id": "NCT00000001", "brief_title": "Structured study"},
  "status": {"overall_status": "TERMINATED", "start_date": "2021-05"},
  "design": {"phases": ["PHASE2"], "enrollment_count": 150, "enrollment_type": "ACTUAL"},
  "has_results": false
}"#;

#[test]
fn loads_both_formats_in_file_name_order() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("ctgov_NCT00000001_structured.json"), STRUCTURED).unwrap();
    fs::write(dir.path().join("ctgov_NCT00000002.json"), RAW).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let records = load_directory(dir.path()).unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.nct_id()).collect();
    assert_eq!(ids, vec!["NCT00000001", "NCT00000002"]);
    assert_eq!(records[0].overall_status(), OverallStatus::Terminated);
    assert_eq!(records[0].design.enrollment_count, Some(150));
    assert_eq!(records[1].identification.brief_title, "Raw study");
}

#[test]
fn duplicate_identifiers_keep_the_first_file() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.json"), STRUCTURED).unwrap();
    let renamed = STRUCTURED.replace("Structured study", "Second copy");
    fs::write(dir.path().join("b.json"), renamed).unwrap();

    let records = load_directory(dir.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].identification.brief_title, "Structured study");
}

#[test]
fn non_record_files_are_skipped() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("index.json"), r#"["NCT00000001"]"#).unwrap();
    fs::write(dir.path().join("empty.json"), "{}").unwrap();
    fs::write(dir.path().join("study.json"), STRUCTURED).unwrap();

    let records = load_directory(dir.path()).unwrap();
    assert_eq!(records.len(), 1);
}

#[test]
fn empty_directory_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_directory(dir.path()).unwrap_err();
    assert!(matches!(err, RegistryError::NoRecords { .. }));
}

#[test]
fn malformed_json_is_an_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
    let err = load_directory(dir.path()).unwrap_err();
    assert!(matches!(err, RegistryError::Json { .. }));
}
