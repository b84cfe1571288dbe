//! Findings, observations and severity tallies.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Every kind of discrepancy or note the comparison can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingType {
    PhaseMismatch,
    CombinedPhaseLabel,
    UndisclosedNegativeStatus,
    NegativeStatusDisclosed,
    StudyWithdrawn,
    EnrollmentOverstatement,
    BlindingMismatch,
    RandomizationMismatch,
    EndpointPromotion,
    UndisclosedMissedEndpoint,
    MissedEndpointDisclosed,
    SignificantEndpoint,
    AdverseEventsUnderreported,
    SafetyNotDiscussed,
    SelectiveEndpointReporting,
    RedFlagLanguage,
    ComparativeLanguage,
    FdaCommunicationLanguage,
    #[serde(rename = "combined_phase_labels_in_s1")]
    CombinedPhaseLabelsInFiling,
}

impl FindingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PhaseMismatch => "phase_mismatch",
            Self::CombinedPhaseLabel => "combined_phase_label",
            Self::UndisclosedNegativeStatus => "undisclosed_negative_status",
            Self::NegativeStatusDisclosed => "negative_status_disclosed",
            Self::StudyWithdrawn => "study_withdrawn",
            Self::EnrollmentOverstatement => "enrollment_overstatement",
            Self::BlindingMismatch => "blinding_mismatch",
            Self::RandomizationMismatch => "randomization_mismatch",
            Self::EndpointPromotion => "endpoint_promotion",
            Self::UndisclosedMissedEndpoint => "undisclosed_missed_endpoint",
            Self::MissedEndpointDisclosed => "missed_endpoint_disclosed",
            Self::SignificantEndpoint => "significant_endpoint",
            Self::AdverseEventsUnderreported => "adverse_events_underreported",
            Self::SafetyNotDiscussed => "safety_not_discussed",
            Self::SelectiveEndpointReporting => "selective_endpoint_reporting",
            Self::RedFlagLanguage => "red_flag_language",
            Self::ComparativeLanguage => "comparative_language",
            Self::FdaCommunicationLanguage => "fda_communication_language",
            Self::CombinedPhaseLabelsInFiling => "combined_phase_labels_in_s1",
        }
    }
}

impl fmt::Display for FindingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What each side said, as free-form JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub filing_claims: Value,
    pub registry_data: Value,
}

/// A discrepancy or noteworthy agreement between the filing and a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub finding_type: FindingType,
    pub severity: Severity,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nct_id: Option<String>,
    pub evidence: Evidence,
}

impl Finding {
    pub fn new(finding_type: FindingType, severity: Severity, detail: impl Into<String>) -> Self {
        Self {
            finding_type,
            severity,
            detail: detail.into(),
            nct_id: None,
            evidence: Evidence::default(),
        }
    }

    pub fn for_record(mut self, nct_id: &str) -> Self {
        self.nct_id = Some(nct_id.to_string());
        self
    }

    pub fn with_evidence(mut self, filing_claims: Value, registry_data: Value) -> Self {
        self.evidence = Evidence {
            filing_claims,
            registry_data,
        };
        self
    }

    pub fn is_discrepancy(&self) -> bool {
        self.severity != Severity::Info
    }
}

/// Informational note attached to a record comparison; never counted as a finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub detail: String,
    /// The finding that would have been raised had the record predated the filing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppressed: Option<FindingType>,
}

impl Observation {
    pub fn note(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            suppressed: None,
        }
    }

    /// Record a finding that temporal suppression turned into a note.
    pub fn suppressed(finding: &Finding) -> Self {
        Self {
            detail: format!(
                "[Suppressed: post-filing] {}: {}",
                finding.finding_type, finding.detail
            ),
            suppressed: Some(finding.finding_type),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub total: usize,
}

impl SeverityCounts {
    pub fn tally<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> Self {
        let mut counts = Self::default();
        for finding in findings {
            match finding.severity {
                Severity::High => counts.high += 1,
                Severity::Medium => counts.medium += 1,
                Severity::Low => counts.low += 1,
                Severity::Info => counts.info += 1,
            }
            counts.total += 1;
        }
        counts
    }
}
