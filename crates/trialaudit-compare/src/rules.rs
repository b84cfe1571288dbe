//! Discrepancy rules for one registry record.
//!
//! Every rule reads the record, the passages matched to it and the candidate profile, and
//! contributes issues to its own section of a [`RecordComparison`]. A field the record lacks
//! means the rule has nothing to say; it never means an error.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeSet, HashSet};

use trialaudit_filing::text::{context_window, truncate_chars};
use trialaudit_filing::{CandidateProfile, PhaseSet};
use trialaudit_registry::{
    starts_after, Allocation, Masking, OverallStatus, RegistryRecord, Results,
};

use crate::finding::{Finding, FindingType, Observation, Severity};
use crate::lexicon::{mentions_safety, word_tokens, RuleLexicon, ENDPOINT_STOP_TERMS};
use crate::matcher::MatchBucket;
use crate::options::CompareOptions;
use crate::pvalue::PValue;

/// Inputs shared by every rule for one record.
pub struct RuleContext<'a> {
    pub record: &'a RegistryRecord,
    pub bucket: &'a MatchBucket,
    pub profile: &'a CandidateProfile,
    pub rules: &'a RuleLexicon,
    pub options: &'a CompareOptions,
    /// Matched passage text, joined.
    pub text: String,
    pub lowered: String,
    /// The trial started after the filing date.
    pub post_filing: bool,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        record: &'a RegistryRecord,
        bucket: &'a MatchBucket,
        profile: &'a CandidateProfile,
        filing_date: Option<&str>,
        rules: &'a RuleLexicon,
        options: &'a CompareOptions,
    ) -> Self {
        let text = bucket.text();
        let lowered = text.to_lowercase();
        let post_filing =
            filing_date.is_some_and(|date| starts_after(&record.status.start_date, date));
        Self {
            record,
            bucket,
            profile,
            rules,
            options,
            text,
            lowered,
            post_filing,
        }
    }

    fn nct_id(&self) -> &str {
        self.record.nct_id()
    }

    fn finding(&self, finding_type: FindingType, severity: Severity, detail: String) -> Finding {
        Finding::new(finding_type, severity, detail).for_record(self.nct_id())
    }
}

// ============================================================================
// Comparison sections
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseCheck {
    pub registry_phases: Vec<String>,
    pub filing_phases: Vec<String>,
    pub issues: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusCheck {
    pub registry_status: String,
    pub start_date: String,
    /// Whether matched text discloses an early stop; only judged for negative statuses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclosure_found: Option<bool>,
    pub issues: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentCheck {
    pub registry_count: Option<u64>,
    pub registry_type: String,
    pub filing_mentions: Vec<u64>,
    pub issues: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignCheck {
    pub masking: String,
    pub allocation: String,
    pub filing_double_blind: bool,
    pub filing_open_label: bool,
    pub filing_randomized: bool,
    pub issues: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointCheck {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
    pub issues: Vec<Finding>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub outcome: String,
    pub outcome_type: String,
    pub statistical_method: String,
    pub p_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exceeds_threshold: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsCheck {
    pub primary_outcomes: Vec<String>,
    pub secondary_outcomes: Vec<String>,
    pub serious_ae_terms: Vec<String>,
    pub other_ae_terms: usize,
    pub analyses: Vec<AnalysisSummary>,
    pub issues: Vec<Finding>,
}

/// Everything the comparison found for one registry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordComparison {
    pub nct_id: String,
    pub brief_title: String,
    pub overall_status: String,
    pub has_results: bool,
    pub matched_passages: usize,
    pub post_filing: bool,
    pub phase: PhaseCheck,
    pub status: StatusCheck,
    pub enrollment: EnrollmentCheck,
    pub design: DesignCheck,
    pub endpoints: EndpointCheck,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<ResultsCheck>,
    pub observations: Vec<Observation>,
}

impl RecordComparison {
    /// Every issue across sections, in section order.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.phase
            .issues
            .iter()
            .chain(&self.status.issues)
            .chain(&self.enrollment.issues)
            .chain(&self.design.issues)
            .chain(&self.endpoints.issues)
            .chain(self.results.iter().flat_map(|r| r.issues.iter()))
    }
}

/// Run every rule against one record.
pub fn compare_record(ctx: &RuleContext<'_>) -> RecordComparison {
    let mut observations = Vec::new();

    if ctx.post_filing {
        observations.push(Observation::note(format!(
            "Trial started {} after the filing date; registry facts could not have been disclosed",
            ctx.record.status.start_date
        )));
    }

    let phase = check_phase(ctx);
    let status = check_status(ctx, &mut observations);
    let enrollment = check_enrollment(ctx);
    let design = check_design(ctx);
    let endpoints = check_endpoints(ctx);
    let results = check_results(ctx, &mut observations);

    RecordComparison {
        nct_id: ctx.nct_id().to_string(),
        brief_title: ctx.record.identification.brief_title.clone(),
        overall_status: ctx.record.status.overall_status.clone(),
        has_results: ctx.record.has_results,
        matched_passages: ctx.bucket.len(),
        post_filing: ctx.post_filing,
        phase,
        status,
        enrollment,
        design,
        endpoints,
        results,
        observations,
    }
}

// ============================================================================
// Phase
// ============================================================================

/// Registered phase numbers against the candidate's phase claims across the whole filing.
pub fn check_phase(ctx: &RuleContext<'_>) -> PhaseCheck {
    let registry = PhaseSet::from_registry(&ctx.record.design.phases);
    let filing = &ctx.profile.canonical_phases;
    let mut check = PhaseCheck {
        registry_phases: ctx.record.design.phases.clone(),
        filing_phases: ctx.profile.phase_claims.clone(),
        issues: Vec::new(),
    };

    if !registry.is_empty() && !filing.is_empty() && registry.numbers().is_disjoint(&filing.numbers())
    {
        check.issues.push(
            ctx.finding(
                FindingType::PhaseMismatch,
                Severity::High,
                format!(
                    "Filing describes {} as {} but the registry lists {}",
                    ctx.profile.name,
                    ctx.profile.phase_claims.join(", "),
                    ctx.record.design.phases.join(", ")
                ),
            )
            .with_evidence(
                json!({ "phase_claims": ctx.profile.phase_claims, "canonical": filing }),
                json!({ "phases": ctx.record.design.phases }),
            ),
        );
    }

    let combined = ctx.rules.combined_labels_in(&ctx.text);
    if !combined.is_empty() && registry.numbers().len() == 1 {
        check.issues.push(
            ctx.finding(
                FindingType::CombinedPhaseLabel,
                Severity::Medium,
                format!(
                    "Filing uses {} for a trial registered only as {}",
                    combined.join(", "),
                    registry.to_registry().join(", ")
                ),
            )
            .with_evidence(
                json!({ "labels": combined }),
                json!({ "phases": ctx.record.design.phases }),
            ),
        );
    }

    check
}

// ============================================================================
// Status
// ============================================================================

pub fn check_status(ctx: &RuleContext<'_>, observations: &mut Vec<Observation>) -> StatusCheck {
    let status = ctx.record.overall_status();
    let mut check = StatusCheck {
        registry_status: ctx.record.status.overall_status.clone(),
        start_date: ctx.record.status.start_date.clone(),
        disclosure_found: None,
        issues: Vec::new(),
    };
    if !status.is_negative() {
        return check;
    }

    let disclosed = ctx.rules.discloses_status(&ctx.text);
    check.disclosure_found = Some(disclosed);

    if ctx.post_filing {
        let mut note = Observation::note(format!(
            "Registry status {} for a trial that started after the filing; not an omission",
            status.as_str()
        ));
        if !disclosed {
            note.suppressed = Some(FindingType::UndisclosedNegativeStatus);
        }
        tracing::info!(nct_id = ctx.nct_id(), status = status.as_str(), "negative status suppressed: post-filing");
        observations.push(note);
        return check;
    }

    let evidence_filing = json!({
        "matched_passages": ctx.bucket.len(),
        "disclosure_language": disclosed,
    });
    let evidence_registry = json!({
        "overall_status": status.as_str(),
        "start_date": ctx.record.status.start_date,
        "completion_date": ctx.record.status.completion_date,
    });

    let finding = if disclosed {
        ctx.finding(
            FindingType::NegativeStatusDisclosed,
            Severity::Info,
            format!("Trial is {} and the filing discloses it", status.as_str()),
        )
    } else {
        ctx.finding(
            FindingType::UndisclosedNegativeStatus,
            Severity::High,
            format!(
                "Trial is {} but matched filing text has no termination or withdrawal language",
                status.as_str()
            ),
        )
    };
    check
        .issues
        .push(finding.with_evidence(evidence_filing.clone(), evidence_registry.clone()));

    if status == OverallStatus::Withdrawn && !ctx.bucket.is_empty() {
        check.issues.push(
            ctx.finding(
                FindingType::StudyWithdrawn,
                Severity::Medium,
                "Filing discusses a trial that was withdrawn before enrolling".to_string(),
            )
            .with_evidence(evidence_filing, evidence_registry),
        );
    }

    check
}

// ============================================================================
// Enrollment
// ============================================================================

pub fn check_enrollment(ctx: &RuleContext<'_>) -> EnrollmentCheck {
    let design = &ctx.record.design;
    let mut check = EnrollmentCheck {
        registry_count: design.enrollment_count,
        registry_type: design.enrollment_type.clone(),
        filing_mentions: ctx.rules.enrollments_in(&ctx.text),
        issues: Vec::new(),
    };

    let actual = match design.enrollment_count {
        Some(n) if n > 0 && design.enrollment_is_actual() => n,
        _ => return check,
    };

    let ceiling = actual as f64 * (1.0 + ctx.options.overstatement_ratio);
    let overstated: Vec<u64> = check
        .filing_mentions
        .iter()
        .copied()
        .filter(|&stated| stated as f64 > ceiling)
        .collect();

    if let Some(&largest) = overstated.iter().max() {
        check.issues.push(
            ctx.finding(
                FindingType::EnrollmentOverstatement,
                Severity::Medium,
                format!("Filing states {largest} participants; the registry reports {actual} actually enrolled"),
            )
            .with_evidence(
                json!({ "stated": overstated }),
                json!({ "enrollment_count": actual, "enrollment_type": design.enrollment_type }),
            ),
        );
    }

    check
}

// ============================================================================
// Design
// ============================================================================

pub fn check_design(ctx: &RuleContext<'_>) -> DesignCheck {
    let design = &ctx.record.design;
    let masking = design.masking_level();
    let mut check = DesignCheck {
        masking: design.masking.clone(),
        allocation: design.allocation.clone(),
        filing_double_blind: ctx.rules.double_blind.is_match(&ctx.text),
        filing_open_label: ctx.rules.open_label.is_match(&ctx.text),
        filing_randomized: ctx.rules.claims_randomized(&ctx.text),
        issues: Vec::new(),
    };

    let registry = json!({ "masking": design.masking, "allocation": design.allocation });

    if check.filing_double_blind && masking == Masking::None {
        check.issues.push(
            ctx.finding(
                FindingType::BlindingMismatch,
                Severity::Medium,
                "Filing calls the trial double-blind but the registry lists no masking".to_string(),
            )
            .with_evidence(json!({ "claim": "double-blind" }), registry.clone()),
        );
    }
    if check.filing_open_label && masking.is_blinded() {
        check.issues.push(
            ctx.finding(
                FindingType::BlindingMismatch,
                Severity::Medium,
                format!(
                    "Filing calls the trial open-label but the registry lists {} masking",
                    design.masking
                ),
            )
            .with_evidence(json!({ "claim": "open-label" }), registry.clone()),
        );
    }
    if check.filing_randomized && design.allocation_kind() == Allocation::NonRandomized {
        check.issues.push(
            ctx.finding(
                FindingType::RandomizationMismatch,
                Severity::Medium,
                "Filing calls the trial randomized but the registry lists non-randomized allocation"
                    .to_string(),
            )
            .with_evidence(json!({ "claim": "randomized" }), registry),
        );
    }

    check
}

// ============================================================================
// Endpoints
// ============================================================================

/// Distinctive words of an endpoint title.
pub fn endpoint_terms(title: &str) -> BTreeSet<String> {
    word_tokens(title, 5)
        .into_iter()
        .filter(|t| !ENDPOINT_STOP_TERMS.contains(&t.as_str()))
        .collect()
}

fn measures(outcomes: &[trialaudit_registry::ProtocolOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .map(|o| o.measure.clone())
        .filter(|m| !m.trim().is_empty())
        .collect()
}

/// Registered secondary endpoints framed as primary in a matched passage.
pub fn check_endpoints(ctx: &RuleContext<'_>) -> EndpointCheck {
    let mut check = EndpointCheck {
        primary: measures(&ctx.record.primary_outcomes),
        secondary: measures(&ctx.record.secondary_outcomes),
        issues: Vec::new(),
    };

    if check.secondary.is_empty() {
        if let Some(results) = ctx.record.posted_results() {
            check.secondary = results.secondary_measures().map(|m| m.title.clone()).collect();
        }
    }

    let primary_terms: HashSet<String> = check
        .primary
        .iter()
        .flat_map(|m| endpoint_terms(m))
        .collect();

    for secondary in &check.secondary {
        let terms: Vec<String> = endpoint_terms(secondary)
            .into_iter()
            .filter(|t| !primary_terms.contains(t))
            .collect();
        if terms.is_empty() {
            continue;
        }
        let needed = ctx.options.min_endpoint_terms.min(terms.len()).max(1);

        let hit = ctx.bucket.passages.iter().find_map(|scored| {
            let text = &scored.passage.text;
            ctx.rules.primary.find_iter(text).find_map(|m| {
                let (_, window) =
                    context_window(text, m.start(), m.end(), ctx.options.endpoint_window);
                let window = window.to_lowercase();
                let found: Vec<&String> = terms.iter().filter(|t| window.contains(t.as_str())).collect();
                (found.len() >= needed).then(|| (window.clone(), found.len()))
            })
        });

        if let Some((window, found)) = hit {
            check.issues.push(
                ctx.finding(
                    FindingType::EndpointPromotion,
                    Severity::High,
                    format!("Registered secondary endpoint \"{secondary}\" is described near \"primary\""),
                )
                .with_evidence(
                    json!({ "context": window.trim(), "terms_found": found }),
                    json!({ "secondary_endpoint": secondary, "primary_endpoints": check.primary }),
                ),
            );
        }
    }

    check
}

// ============================================================================
// Results
// ============================================================================

/// Rules over posted results; `None` when the record has none.
pub fn check_results(ctx: &RuleContext<'_>, observations: &mut Vec<Observation>) -> Option<ResultsCheck> {
    let results = ctx.record.posted_results()?;

    let mut check = ResultsCheck {
        primary_outcomes: results.primary_measures().map(|m| m.title.clone()).collect(),
        secondary_outcomes: results.secondary_measures().map(|m| m.title.clone()).collect(),
        serious_ae_terms: serious_terms(results),
        other_ae_terms: results.adverse_events.other_events.len(),
        analyses: Vec::new(),
        issues: Vec::new(),
    };

    observations.push(Observation::note(format!(
        "Study has {} primary and {} secondary outcome measures posted",
        check.primary_outcomes.len(),
        check.secondary_outcomes.len()
    )));
    if !check.serious_ae_terms.is_empty() {
        observations.push(Observation::note(format!(
            "{} serious adverse event terms and {} other adverse event terms reported",
            check.serious_ae_terms.len(),
            check.other_ae_terms
        )));
    }

    check_p_values(ctx, results, &mut check);
    check_adverse_events(ctx, &mut check);
    check_selective_reporting(ctx, &mut check);

    let analysed = results.outcome_measures.iter().map(|m| m.analyses.len()).sum::<usize>();
    if analysed > 0 {
        observations.push(Observation::note(format!("{analysed} statistical analyses posted")));
    }

    if ctx.post_filing && !check.issues.is_empty() {
        tracing::info!(
            nct_id = ctx.nct_id(),
            suppressed = check.issues.len(),
            "results findings demoted: post-filing"
        );
        observations.extend(check.issues.drain(..).map(|f| Observation::suppressed(&f)));
    }

    Some(check)
}

/// Distinct serious adverse-event terms with a nonzero count, first-seen order.
fn serious_terms(results: &Results) -> Vec<String> {
    let mut seen = HashSet::new();
    results
        .adverse_events
        .serious_events
        .iter()
        .filter(|event| event.total_count() > 0 && !event.term.trim().is_empty())
        .filter(|event| seen.insert(event.term.to_lowercase()))
        .map(|event| event.term.clone())
        .collect()
}

fn check_p_values(ctx: &RuleContext<'_>, results: &Results, check: &mut ResultsCheck) {
    let threshold = ctx.options.significance_threshold;
    let disclosed = ctx.rules.missed_endpoint_disclosure.is_match(&ctx.text);

    for measure in &results.outcome_measures {
        for analysis in &measure.analyses {
            let parsed = PValue::parse(&analysis.p_value);
            let exceeds = parsed.and_then(|p| p.exceeds(threshold));

            if check.analyses.len() < ctx.options.max_analyses {
                check.analyses.push(AnalysisSummary {
                    outcome: measure.title.clone(),
                    outcome_type: measure.kind.clone(),
                    statistical_method: analysis.statistical_method.clone(),
                    p_value: analysis.p_value.clone(),
                    exceeds_threshold: exceeds,
                });
            }

            if !measure.is_primary() {
                continue;
            }
            let Some(exceeds) = exceeds else {
                if !analysis.p_value.trim().is_empty() {
                    tracing::debug!(nct_id = ctx.nct_id(), p_value = %analysis.p_value, "p-value not judged");
                }
                continue;
            };

            let registry = json!({
                "outcome": measure.title,
                "p_value": analysis.p_value,
                "statistical_method": analysis.statistical_method,
            });
            let finding = match (exceeds, disclosed) {
                (true, false) => ctx.finding(
                    FindingType::UndisclosedMissedEndpoint,
                    Severity::High,
                    format!(
                        "Primary endpoint \"{}\" missed significance (p = {}) with no disclosure in the filing",
                        measure.title, analysis.p_value
                    ),
                ),
                (true, true) => ctx.finding(
                    FindingType::MissedEndpointDisclosed,
                    Severity::Info,
                    format!(
                        "Primary endpoint \"{}\" missed significance (p = {}) and the filing says so",
                        measure.title, analysis.p_value
                    ),
                ),
                (false, _) => ctx.finding(
                    FindingType::SignificantEndpoint,
                    Severity::Info,
                    format!(
                        "Primary endpoint \"{}\" reached significance (p = {})",
                        measure.title, analysis.p_value
                    ),
                ),
            };
            check.issues.push(
                finding.with_evidence(json!({ "disclosure_language": disclosed }), registry),
            );
        }
    }
}

fn check_adverse_events(ctx: &RuleContext<'_>, check: &mut ResultsCheck) {
    let terms = &check.serious_ae_terms;
    if terms.is_empty() {
        return;
    }

    if terms.len() >= ctx.options.ae_min_terms {
        let mentioned: Vec<&String> = terms
            .iter()
            .filter(|term| ctx.lowered.contains(&term.to_lowercase()))
            .collect();
        let ratio = mentioned.len() as f64 / terms.len() as f64;
        if ratio < ctx.options.ae_disclosure_ratio {
            check.issues.push(
                ctx.finding(
                    FindingType::AdverseEventsUnderreported,
                    Severity::Medium,
                    format!(
                        "Only {} of {} serious adverse event terms appear in the filing",
                        mentioned.len(),
                        terms.len()
                    ),
                )
                .with_evidence(
                    json!({ "terms_mentioned": mentioned }),
                    json!({ "serious_ae_terms": terms }),
                ),
            );
        }
    }

    if !mentions_safety(&ctx.text) {
        check.issues.push(
            ctx.finding(
                FindingType::SafetyNotDiscussed,
                Severity::Medium,
                "Serious adverse events are posted but matched filing text has no safety language"
                    .to_string(),
            )
            .with_evidence(
                json!({ "matched_passages": ctx.bucket.len() }),
                json!({ "serious_ae_terms": terms }),
            ),
        );
    }
}

fn check_selective_reporting(ctx: &RuleContext<'_>, check: &mut ResultsCheck) {
    if check.primary_outcomes.is_empty() {
        return;
    }
    let found = |title: &String| {
        endpoint_terms(title)
            .iter()
            .any(|term| ctx.lowered.contains(term.as_str()))
    };
    let primary_found = check.primary_outcomes.iter().filter(|t| found(t)).count();
    let secondary_found: Vec<&String> =
        check.secondary_outcomes.iter().filter(|t| found(t)).collect();

    if primary_found == 0 && !secondary_found.is_empty() {
        check.issues.push(
            ctx.finding(
                FindingType::SelectiveEndpointReporting,
                Severity::High,
                format!(
                    "Filing discusses {} secondary outcome(s) but none of the {} primary outcome(s)",
                    secondary_found.len(),
                    check.primary_outcomes.len()
                ),
            )
            .with_evidence(
                json!({ "secondary_mentioned": secondary_found }),
                json!({ "primary_outcomes": check.primary_outcomes }),
            ),
        );
    }
}

/// Short excerpt of an unmatched passage for the report.
pub fn sample(text: &str, max_chars: usize) -> String {
    truncate_chars(text.trim(), max_chars).to_string()
}
