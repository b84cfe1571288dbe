use trialaudit_compare::{Auditor, CompareError, FindingType, Severity};
use trialaudit_registry::RegistryRecord;

const FILING: &str = "Our product candidate ABC-123 is being evaluated in a Phase 2 trial (NCT01234567) \
for the treatment of psoriatic arthritis in approximately 120 patients.";

fn terminated_record(start_date: &str) -> RegistryRecord {
    let mut record = RegistryRecord::default();
    record.identification.nct_id = "NCT01234567".to_string();
    record.identification.brief_title = "ABC-123 in Psoriatic Arthritis".to_string();
    record.identification.conditions = vec!["Psoriatic Arthritis".to_string()];
    record.status.overall_status = "TERMINATED".to_string();
    record.status.start_date = start_date.to_string();
    record.design.phases = vec!["PHASE2".to_string()];
    record.design.enrollment_count = Some(150);
    record.design.enrollment_type = "ACTUAL".to_string();
    record
}

fn unrelated_record() -> RegistryRecord {
    let mut record = RegistryRecord::default();
    record.identification.nct_id = "NCT07654321".to_string();
    record.identification.brief_title = "Observational registry".to_string();
    record.status.overall_status = "RECRUITING".to_string();
    record
}

#[test]
fn terminated_trial_without_disclosure() {
    let auditor = Auditor::new().unwrap();
    let document = auditor.parse(FILING).unwrap();
    let records = vec![unrelated_record(), terminated_record("2021-04")];
    let report = auditor
        .audit(&document, "ABC-123", &records, Some("2023-03-01"))
        .unwrap();

    assert_eq!(report.candidate.name, "ABC-123");
    assert_eq!(report.records_compared, 2);
    assert_eq!(report.unmatched_passages, 0);

    let target = &report.record_comparisons[1];
    assert_eq!(target.nct_id, "NCT01234567");
    assert_eq!(target.matched_passages, 1);
    assert_eq!(report.record_comparisons[0].matched_passages, 0);

    assert_eq!(report.findings_of(FindingType::PhaseMismatch).count(), 0);
    assert_eq!(report.findings_of(FindingType::EnrollmentOverstatement).count(), 0);
    let status: Vec<_> = report
        .findings_of(FindingType::UndisclosedNegativeStatus)
        .collect();
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].severity, Severity::High);
    assert_eq!(status[0].nct_id.as_deref(), Some("NCT01234567"));

    assert!(report.has_high_severity());
    assert_eq!(report.severity_counts.total, report.findings.len());
    assert_eq!(report.candidate_flags.terminated_studies[0].nct_id, "NCT01234567");
    assert_eq!(report.candidate_flags.studies_not_mentioned[0].nct_id, "NCT07654321");
}

#[test]
fn post_filing_trial_is_observed_not_flagged() {
    let auditor = Auditor::new().unwrap();
    let document = auditor.parse(FILING).unwrap();
    let report = auditor
        .audit(&document, "abc-123", &[terminated_record("2024-01")], Some("2023-06-30"))
        .unwrap();

    assert_eq!(report.findings_of(FindingType::UndisclosedNegativeStatus).count(), 0);
    let comparison = &report.record_comparisons[0];
    assert!(comparison.post_filing);
    assert!(comparison
        .observations
        .iter()
        .any(|o| o.suppressed == Some(FindingType::UndisclosedNegativeStatus)));
}

#[test]
fn passages_without_a_match_are_counted_and_sampled() {
    let auditor = Auditor::new().unwrap();
    let document = auditor.parse(FILING).unwrap();
    let report = auditor
        .audit(&document, "ABC-123", &[unrelated_record()], None)
        .unwrap();

    assert_eq!(report.unmatched_passages, 1);
    assert_eq!(report.unmatched_passage_samples.len(), 1);
    assert!(report.unmatched_passage_samples[0].chars().count() <= 200);
    assert!(report.unmatched_passage_samples[0].starts_with("Our product candidate"));
}

#[test]
fn filing_without_candidates_reports_none() {
    let auditor = Auditor::new().unwrap();
    let document = auditor
        .parse("The annual meeting will be held in the spring at our headquarters.")
        .unwrap();
    let summary = auditor.extract(&document);
    assert!(summary.candidates.is_empty());

    let err = auditor
        .audit(&document, "ABC-123", &[terminated_record("2021-04")], None)
        .unwrap_err();
    match err {
        CompareError::CandidateNotFound { requested, available } => {
            assert_eq!(requested, "ABC-123");
            assert!(available.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_candidate_lists_the_available_ones() {
    let auditor = Auditor::new().unwrap();
    let document = auditor.parse(FILING).unwrap();
    let err = auditor
        .audit(&document, "XYZ-999", &[terminated_record("2021-04")], None)
        .unwrap_err();
    assert!(err.to_string().contains("ABC-123"));
}

#[test]
fn empty_filing_is_rejected() {
    let auditor = Auditor::new().unwrap();
    assert!(matches!(auditor.parse("   \n "), Err(CompareError::Filing(_))));
}

#[test]
fn report_serializes_with_taxonomy_strings() {
    let auditor = Auditor::new().unwrap();
    let document = auditor.parse(FILING).unwrap();
    let report = auditor
        .audit(&document, "ABC-123", &[terminated_record("2021-04")], Some("2023-03-01"))
        .unwrap();
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["findings"][0]["type"], "undisclosed_negative_status");
    assert_eq!(value["findings"][0]["severity"], "high");
    assert_eq!(value["severity_counts"]["high"], 1);
    assert_eq!(value["record_comparisons"][0]["status"]["registry_status"], "TERMINATED");
}
