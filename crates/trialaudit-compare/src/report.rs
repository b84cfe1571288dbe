//! The comparison report and its aggregate sections.

use serde::{Deserialize, Serialize};
use serde_json::json;

use trialaudit_filing::{CandidateKind, CandidateProfile, PhraseHit};
use trialaudit_registry::{OverallStatus, RegistryRecord};

use crate::finding::{Finding, FindingType, Severity, SeverityCounts};
use crate::rules::RecordComparison;

/// The candidate as the filing describes it, without passages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    pub name: String,
    pub kind: CandidateKind,
    pub ownership_score: f64,
    pub also_known_as: Vec<String>,
    pub passage_count: usize,
    pub indications: Vec<String>,
    pub phase_claims: Vec<String>,
    pub nct_numbers: Vec<String>,
}

impl From<&CandidateProfile> for CandidateSummary {
    fn from(profile: &CandidateProfile) -> Self {
        Self {
            name: profile.name.clone(),
            kind: profile.kind,
            ownership_score: profile.ownership_score,
            also_known_as: profile.also_known_as.clone(),
            passage_count: profile.passage_count,
            indications: profile.indications.clone(),
            phase_claims: profile.phase_claims.clone(),
            nct_numbers: profile.nct_numbers.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub nct_id: String,
    pub title: String,
    pub matched_passages: usize,
}

/// Registry-side overview of the candidate's trials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryOverview {
    pub total_studies: usize,
    pub studies_with_results: usize,
    pub terminated_studies: Vec<RecordRef>,
    pub completed_studies: Vec<RecordRef>,
    pub active_studies: Vec<RecordRef>,
    pub studies_not_mentioned: Vec<RecordRef>,
}

impl RegistryOverview {
    /// `records` and `comparisons` are parallel slices.
    pub fn build(records: &[RegistryRecord], comparisons: &[RecordComparison]) -> Self {
        let mut overview = Self {
            total_studies: records.len(),
            ..Self::default()
        };

        for (record, comparison) in records.iter().zip(comparisons) {
            let entry = RecordRef {
                nct_id: record.nct_id().to_string(),
                title: record.identification.brief_title.clone(),
                matched_passages: comparison.matched_passages,
            };
            if record.has_results {
                overview.studies_with_results += 1;
            }
            match record.overall_status() {
                OverallStatus::Terminated | OverallStatus::Withdrawn => {
                    overview.terminated_studies.push(entry.clone())
                }
                OverallStatus::Completed => overview.completed_studies.push(entry.clone()),
                status if status.is_active() => overview.active_studies.push(entry.clone()),
                _ => {}
            }
            if comparison.matched_passages == 0 {
                overview.studies_not_mentioned.push(entry);
            }
        }

        overview
    }
}

/// Full result of comparing one candidate against its registry records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub candidate: CandidateSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filing_date: Option<String>,
    pub records_compared: usize,
    pub record_comparisons: Vec<RecordComparison>,
    pub findings: Vec<Finding>,
    pub severity_counts: SeverityCounts,
    pub unmatched_passages: usize,
    pub unmatched_passage_samples: Vec<String>,
    pub candidate_flags: RegistryOverview,
}

impl ComparisonReport {
    pub fn findings_of(&self, finding_type: FindingType) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(move |f| f.finding_type == finding_type)
    }

    pub fn has_high_severity(&self) -> bool {
        self.severity_counts.high > 0
    }
}

fn hits_evidence(hits: &[PhraseHit]) -> serde_json::Value {
    json!(hits
        .iter()
        .map(|hit| json!({ "phrase": hit.phrase, "context": hit.context }))
        .collect::<Vec<_>>())
}

/// Findings about the filing's language, independent of any registry record.
pub fn filing_level_findings(profile: &CandidateProfile) -> Vec<Finding> {
    let flags = &profile.flags;
    let mut findings = Vec::new();

    let lists = [
        (
            &flags.red_flag_phrases,
            FindingType::RedFlagLanguage,
            Severity::Medium,
            "red-flag phrase",
        ),
        (
            &flags.comparative_claims,
            FindingType::ComparativeLanguage,
            Severity::Medium,
            "comparative or promotional claim",
        ),
        (
            &flags.fda_language,
            FindingType::FdaCommunicationLanguage,
            Severity::Low,
            "regulatory-interaction phrase",
        ),
    ];
    for (hits, finding_type, severity, what) in lists {
        if hits.is_empty() {
            continue;
        }
        findings.push(
            Finding::new(
                finding_type,
                severity,
                format!("{} {what}(s) in passages about {}", hits.len(), profile.name),
            )
            .with_evidence(hits_evidence(hits), serde_json::Value::Null),
        );
    }

    if !flags.combined_phase_labels.is_empty() {
        findings.push(
            Finding::new(
                FindingType::CombinedPhaseLabelsInFiling,
                Severity::Medium,
                format!(
                    "Filing describes {} with combined phase labels: {}",
                    profile.name,
                    flags.combined_phase_labels.join(", ")
                ),
            )
            .with_evidence(json!(flags.combined_phase_labels), serde_json::Value::Null),
        );
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{DesignCheck, EndpointCheck, EnrollmentCheck, PhaseCheck, StatusCheck};
    use trialaudit_filing::{CandidateFlags, PhaseSet};

    fn comparison(id: &str, matched: usize) -> RecordComparison {
        RecordComparison {
            nct_id: id.to_string(),
            brief_title: String::new(),
            overall_status: String::new(),
            has_results: false,
            matched_passages: matched,
            post_filing: false,
            phase: PhaseCheck::default(),
            status: StatusCheck::default(),
            enrollment: EnrollmentCheck::default(),
            design: DesignCheck::default(),
            endpoints: EndpointCheck::default(),
            results: None,
            observations: Vec::new(),
        }
    }

    fn record(id: &str, status: &str, has_results: bool) -> RegistryRecord {
        let mut record = RegistryRecord::default();
        record.identification.nct_id = id.to_string();
        record.status.overall_status = status.to_string();
        record.has_results = has_results;
        record
    }

    #[test]
    fn overview_buckets_by_status() {
        let records = vec![
            record("NCT1", "TERMINATED", true),
            record("NCT2", "WITHDRAWN", false),
            record("NCT3", "COMPLETED", true),
            record("NCT4", "RECRUITING", false),
        ];
        let comparisons = vec![
            comparison("NCT1", 2),
            comparison("NCT2", 0),
            comparison("NCT3", 1),
            comparison("NCT4", 0),
        ];
        let overview = RegistryOverview::build(&records, &comparisons);
        assert_eq!(overview.total_studies, 4);
        assert_eq!(overview.studies_with_results, 2);
        assert_eq!(overview.terminated_studies.len(), 2);
        assert_eq!(overview.completed_studies[0].nct_id, "NCT3");
        assert_eq!(overview.active_studies[0].nct_id, "NCT4");
        let silent: Vec<_> = overview.studies_not_mentioned.iter().map(|r| r.nct_id.as_str()).collect();
        assert_eq!(silent, vec!["NCT2", "NCT4"]);
    }

    #[test]
    fn filing_flags_become_findings() {
        let profile = CandidateProfile {
            name: "ABC-123".to_string(),
            kind: CandidateKind::StructuredCode,
            ownership_score: 1.0,
            also_known_as: Vec::new(),
            passage_count: 3,
            indications: Vec::new(),
            phase_claims: vec!["Phase 2b/3".to_string()],
            canonical_phases: PhaseSet::default(),
            nct_numbers: Vec::new(),
            fda_mentions: Vec::new(),
            flags: CandidateFlags {
                combined_phase_labels: vec!["Phase 2b/3".to_string()],
                red_flag_phrases: vec![PhraseHit::new("well-tolerated", "was well-tolerated in")],
                comparative_claims: Vec::new(),
                fda_language: vec![PhraseHit::new("Fast Track", "granted Fast Track designation")],
            },
            passages: Vec::new(),
        };
        let findings = filing_level_findings(&profile);
        let kinds: Vec<_> = findings.iter().map(|f| (f.finding_type, f.severity)).collect();
        assert_eq!(
            kinds,
            vec![
                (FindingType::RedFlagLanguage, Severity::Medium),
                (FindingType::FdaCommunicationLanguage, Severity::Low),
                (FindingType::CombinedPhaseLabelsInFiling, Severity::Medium),
            ]
        );
        assert!(findings.iter().all(|f| f.nct_id.is_none()));
        assert_eq!(findings[0].evidence.filing_claims[0]["phrase"], "well-tolerated");
    }
}
