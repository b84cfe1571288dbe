//! Structured registry records.
//!
//! Field names follow the structured JSON written by the registry fetcher, so records
//! round-trip through `*_structured.json` files unchanged. Missing fields deserialize to empty
//! values: a sparse record is normal input, not an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dates::{parse_partial_date, PartialDate};

/// One clinical-trial registration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryRecord {
    pub identification: Identification,
    pub status: Status,
    pub design: Design,
    pub arms_interventions: ArmsInterventions,
    pub primary_outcomes: Vec<ProtocolOutcome>,
    pub secondary_outcomes: Vec<ProtocolOutcome>,
    pub eligibility: Eligibility,
    pub sponsor: Sponsor,
    pub has_results: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Results>,
}

impl RegistryRecord {
    pub fn nct_id(&self) -> &str {
        &self.identification.nct_id
    }

    pub fn overall_status(&self) -> OverallStatus {
        OverallStatus::parse(&self.status.overall_status)
    }

    pub fn start_date(&self) -> Option<PartialDate> {
        parse_partial_date(&self.status.start_date)
    }

    /// Posted results, only when the record says they exist.
    pub fn posted_results(&self) -> Option<&Results> {
        if self.has_results {
            self.results.as_ref()
        } else {
            None
        }
    }

    /// Title, official title and conditions joined for text matching.
    pub fn descriptive_text(&self) -> String {
        let mut parts = vec![
            self.identification.brief_title.as_str(),
            self.identification.official_title.as_str(),
        ];
        parts.extend(self.identification.conditions.iter().map(String::as_str));
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identification {
    pub nct_id: String,
    pub brief_title: String,
    pub official_title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Status {
    pub overall_status: String,
    pub start_date: String,
    pub completion_date: String,
    pub last_update_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Design {
    pub study_type: String,
    pub phases: Vec<String>,
    pub allocation: String,
    pub intervention_model: String,
    pub masking: String,
    pub who_masked: Vec<String>,
    pub enrollment_count: Option<u64>,
    pub enrollment_type: String,
}

impl Design {
    pub fn masking_level(&self) -> Masking {
        Masking::parse(&self.masking)
    }

    pub fn allocation_kind(&self) -> Allocation {
        Allocation::parse(&self.allocation)
    }

    pub fn enrollment_is_actual(&self) -> bool {
        self.enrollment_type.eq_ignore_ascii_case("ACTUAL")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmsInterventions {
    pub arm_groups: Vec<ArmGroup>,
    pub interventions: Vec<Intervention>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmGroup {
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub intervention_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Intervention {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub description: String,
}

/// A protocol-defined endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolOutcome {
    pub measure: String,
    pub description: String,
    pub time_frame: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Eligibility {
    pub criteria: String,
    pub sex: String,
    pub minimum_age: String,
    pub maximum_age: String,
    pub healthy_volunteers: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sponsor {
    pub name: String,
    pub class: String,
}

// ============================================================================
// Results
// ============================================================================

/// Posted results: outcome measures with analyses and adverse-event tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Results {
    pub participant_flow: Value,
    pub baseline: Value,
    pub outcome_measures: Vec<OutcomeMeasure>,
    pub adverse_events: AdverseEvents,
}

impl Results {
    pub fn primary_measures(&self) -> impl Iterator<Item = &OutcomeMeasure> {
        self.outcome_measures.iter().filter(|m| m.is_primary())
    }

    pub fn secondary_measures(&self) -> impl Iterator<Item = &OutcomeMeasure> {
        self.outcome_measures
            .iter()
            .filter(|m| m.kind.eq_ignore_ascii_case("SECONDARY"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeMeasure {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub population_description: String,
    pub reporting_status: String,
    pub analyses: Vec<Analysis>,
}

impl OutcomeMeasure {
    pub fn is_primary(&self) -> bool {
        self.kind.eq_ignore_ascii_case("PRIMARY")
    }
}

/// A statistical analysis as posted (registry camelCase keys).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Analysis {
    pub p_value: String,
    pub statistical_method: String,
    pub param_type: String,
    pub param_value: String,
    pub ci_pct_value: String,
    pub ci_num_sides: String,
    pub ci_lower_limit: String,
    pub ci_upper_limit: String,
    pub group_description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdverseEvents {
    pub frequency_threshold: String,
    pub time_frame: String,
    pub description: String,
    pub serious_events: Vec<AdverseEvent>,
    pub other_events: Vec<AdverseEvent>,
}

/// One adverse-event term with per-group counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdverseEvent {
    pub term: String,
    pub organ_system: String,
    pub stats: Vec<AdverseEventStats>,
}

impl AdverseEvent {
    /// Total affected participants across groups (falls back to event counts).
    pub fn total_count(&self) -> u64 {
        self.stats
            .iter()
            .map(|s| s.num_affected.or(s.num_events).unwrap_or(0))
            .sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdverseEventStats {
    pub group_id: String,
    pub num_events: Option<u64>,
    pub num_affected: Option<u64>,
    pub num_at_risk: Option<u64>,
}

// ============================================================================
// Closed vocabularies
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    NotYetRecruiting,
    Recruiting,
    EnrollingByInvitation,
    ActiveNotRecruiting,
    Completed,
    Suspended,
    Terminated,
    Withdrawn,
    Unknown,
}

impl OverallStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "NOT_YET_RECRUITING" => Self::NotYetRecruiting,
            "RECRUITING" => Self::Recruiting,
            "ENROLLING_BY_INVITATION" => Self::EnrollingByInvitation,
            "ACTIVE_NOT_RECRUITING" => Self::ActiveNotRecruiting,
            "COMPLETED" => Self::Completed,
            "SUSPENDED" => Self::Suspended,
            "TERMINATED" => Self::Terminated,
            "WITHDRAWN" => Self::Withdrawn,
            _ => Self::Unknown,
        }
    }

    /// Terminated, withdrawn or suspended.
    pub fn is_negative(&self) -> bool {
        matches!(self, Self::Terminated | Self::Withdrawn | Self::Suspended)
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::NotYetRecruiting
                | Self::Recruiting
                | Self::EnrollingByInvitation
                | Self::ActiveNotRecruiting
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotYetRecruiting => "NOT_YET_RECRUITING",
            Self::Recruiting => "RECRUITING",
            Self::EnrollingByInvitation => "ENROLLING_BY_INVITATION",
            Self::ActiveNotRecruiting => "ACTIVE_NOT_RECRUITING",
            Self::Completed => "COMPLETED",
            Self::Suspended => "SUSPENDED",
            Self::Terminated => "TERMINATED",
            Self::Withdrawn => "WITHDRAWN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Registered masking level; an empty value reads as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Masking {
    None,
    Single,
    Double,
    Triple,
    Quadruple,
    Unrecognized,
}

impl Masking {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" => Self::None,
            "SINGLE" => Self::Single,
            "DOUBLE" => Self::Double,
            "TRIPLE" => Self::Triple,
            "QUADRUPLE" => Self::Quadruple,
            _ => Self::Unrecognized,
        }
    }

    /// Double masking or stronger.
    pub fn is_blinded(&self) -> bool {
        matches!(self, Self::Double | Self::Triple | Self::Quadruple)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Allocation {
    Randomized,
    NonRandomized,
    NotApplicable,
    Unspecified,
}

impl Allocation {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "RANDOMIZED" => Self::Randomized,
            "NON_RANDOMIZED" => Self::NonRandomized,
            "NA" => Self::NotApplicable,
            _ => Self::Unspecified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_record_deserializes() {
        let record: RegistryRecord = serde_json::from_str(
            r#"{"identification": {"nct_id": "NCT01234567"}, "design": {"phases": ["PHASE2"]}}"#,
        )
        .unwrap();
        assert_eq!(record.nct_id(), "NCT01234567");
        assert_eq!(record.design.enrollment_count, None);
        assert_eq!(record.overall_status(), OverallStatus::Unknown);
        assert!(record.posted_results().is_none());
        assert_eq!(record.design.masking_level(), Masking::None);
    }

    #[test]
    fn adverse_event_counts_prefer_affected() {
        let event: AdverseEvent = serde_json::from_str(
            r#"{"term": "Pneumonia", "stats": [{"groupId": "EG000", "numAffected": 2, "numEvents": 3}, {"groupId": "EG001", "numEvents": 1}]}"#,
        )
        .unwrap();
        assert_eq!(event.total_count(), 3);
    }

    #[test]
    fn status_vocabulary() {
        assert!(OverallStatus::parse("terminated").is_negative());
        assert!(OverallStatus::parse("RECRUITING").is_active());
        assert!(!OverallStatus::parse("COMPLETED").is_negative());
        assert_eq!(
            serde_json::to_string(&OverallStatus::ActiveNotRecruiting).unwrap(),
            "\"ACTIVE_NOT_RECRUITING\""
        );
    }
}
