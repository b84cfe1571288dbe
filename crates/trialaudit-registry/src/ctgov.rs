//! Conversion from raw ClinicalTrials.gov API v2 study JSON.
//!
//! The raw document nests everything under `protocolSection` and, once results are posted,
//! `resultsSection`. Conversion is total: absent modules become empty fields.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::model::{
    AdverseEvent, AdverseEvents, Analysis, ArmGroup, ArmsInterventions, Design, Eligibility,
    Identification, Intervention, OutcomeMeasure, ProtocolOutcome, RegistryRecord, Results,
    Sponsor, Status,
};

/// True when `value` looks like a raw API study rather than a structured record.
pub fn is_raw_study(value: &Value) -> bool {
    value.get("protocolSection").is_some()
}

fn at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(key))
}

fn text_at(value: &Value, path: &[&str]) -> String {
    at(value, path)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn strings_at(value: &Value, path: &[&str]) -> Vec<String> {
    at(value, path)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn array_at<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    at(value, path)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Deserialize each element leniently, skipping elements that do not fit.
fn typed_at<T: DeserializeOwned>(value: &Value, path: &[&str]) -> Vec<T> {
    array_at(value, path)
        .iter()
        .filter_map(|item| match serde_json::from_value(item.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::debug!(path = ?path, error = %err, "skipping malformed registry entry");
                None
            }
        })
        .collect()
}

fn outcomes_at(proto: &Value, key: &str) -> Vec<ProtocolOutcome> {
    array_at(proto, &["outcomesModule", key])
        .iter()
        .map(|o| ProtocolOutcome {
            measure: text_at(o, &["measure"]),
            description: text_at(o, &["description"]),
            time_frame: text_at(o, &["timeFrame"]),
        })
        .collect()
}

/// Convert one raw API v2 study into a [`RegistryRecord`].
pub fn from_ctgov_v2(raw: &Value) -> RegistryRecord {
    let empty = Value::Null;
    let proto = raw.get("protocolSection").unwrap_or(&empty);

    let identification = Identification {
        nct_id: text_at(proto, &["identificationModule", "nctId"]),
        brief_title: text_at(proto, &["identificationModule", "briefTitle"]),
        official_title: text_at(proto, &["identificationModule", "officialTitle"]),
        conditions: strings_at(proto, &["conditionsModule", "conditions"]),
    };

    let status = Status {
        overall_status: text_at(proto, &["statusModule", "overallStatus"]),
        start_date: text_at(proto, &["statusModule", "startDateStruct", "date"]),
        completion_date: text_at(proto, &["statusModule", "completionDateStruct", "date"]),
        last_update_date: text_at(proto, &["statusModule", "lastUpdatePostDateStruct", "date"]),
    };

    let design = Design {
        study_type: text_at(proto, &["designModule", "studyType"]),
        phases: strings_at(proto, &["designModule", "phases"]),
        allocation: text_at(proto, &["designModule", "designInfo", "allocation"]),
        intervention_model: text_at(proto, &["designModule", "designInfo", "interventionModel"]),
        masking: text_at(
            proto,
            &["designModule", "designInfo", "maskingInfo", "masking"],
        ),
        who_masked: strings_at(
            proto,
            &["designModule", "designInfo", "maskingInfo", "whoMasked"],
        ),
        enrollment_count: at(proto, &["designModule", "enrollmentInfo", "count"])
            .and_then(Value::as_u64),
        enrollment_type: text_at(proto, &["designModule", "enrollmentInfo", "type"]),
    };

    let arms_interventions = ArmsInterventions {
        arm_groups: array_at(proto, &["armsInterventionsModule", "armGroups"])
            .iter()
            .map(|ag| ArmGroup {
                label: text_at(ag, &["label"]),
                kind: text_at(ag, &["type"]),
                description: text_at(ag, &["description"]),
                intervention_names: strings_at(ag, &["interventionNames"]),
            })
            .collect(),
        interventions: array_at(proto, &["armsInterventionsModule", "interventions"])
            .iter()
            .map(|iv| Intervention {
                kind: text_at(iv, &["type"]),
                name: text_at(iv, &["name"]),
                description: text_at(iv, &["description"]),
            })
            .collect(),
    };

    let eligibility = Eligibility {
        criteria: text_at(proto, &["eligibilityModule", "eligibilityCriteria"]),
        sex: text_at(proto, &["eligibilityModule", "sex"]),
        minimum_age: text_at(proto, &["eligibilityModule", "minimumAge"]),
        maximum_age: text_at(proto, &["eligibilityModule", "maximumAge"]),
        healthy_volunteers: at(proto, &["eligibilityModule", "healthyVolunteers"])
            .cloned()
            .unwrap_or_default(),
    };

    let sponsor = Sponsor {
        name: text_at(
            proto,
            &["sponsorCollaboratorsModule", "leadSponsor", "name"],
        ),
        class: text_at(
            proto,
            &["sponsorCollaboratorsModule", "leadSponsor", "class"],
        ),
    };

    let results = raw
        .get("resultsSection")
        .filter(|section| section.as_object().is_some_and(|m| !m.is_empty()))
        .map(results_from_v2);

    RegistryRecord {
        identification,
        status,
        design,
        arms_interventions,
        primary_outcomes: outcomes_at(proto, "primaryOutcomes"),
        secondary_outcomes: outcomes_at(proto, "secondaryOutcomes"),
        eligibility,
        sponsor,
        has_results: results.is_some(),
        results,
    }
}

fn results_from_v2(section: &Value) -> Results {
    let outcome_measures = array_at(section, &["outcomeMeasuresModule", "outcomeMeasures"])
        .iter()
        .map(|om| OutcomeMeasure {
            kind: text_at(om, &["type"]),
            title: text_at(om, &["title"]),
            description: text_at(om, &["description"]),
            population_description: text_at(om, &["populationDescription"]),
            reporting_status: text_at(om, &["reportingStatus"]),
            analyses: typed_at::<Analysis>(om, &["analyses"]),
        })
        .collect();

    let adverse_events = AdverseEvents {
        frequency_threshold: text_at(section, &["adverseEventsModule", "frequencyThreshold"]),
        time_frame: text_at(section, &["adverseEventsModule", "timeFrame"]),
        description: text_at(section, &["adverseEventsModule", "description"]),
        serious_events: typed_at::<AdverseEvent>(section, &["adverseEventsModule", "seriousEvents"]),
        other_events: typed_at::<AdverseEvent>(section, &["adverseEventsModule", "otherEvents"]),
    };

    Results {
        participant_flow: at(section, &["participantFlowModule"])
            .cloned()
            .unwrap_or_default(),
        baseline: at(section, &["baselineCharacteristicsModule"])
            .cloned()
            .unwrap_or_default(),
        outcome_measures,
        adverse_events,
    }
}
