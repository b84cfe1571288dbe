//! Filing-to-registry comparison for trialaudit
//!
//! - [`matcher`]: assigns each candidate passage to its best-scoring registry record
//! - [`rules`]: discrepancy rules run per record over the matched passages
//! - [`report`]: aggregation into a [`ComparisonReport`]
//! - [`Auditor`]: the entry point tying extraction, matching and rules together
//!
//! The comparison is a pure function of its inputs: the same filing, records and filing date
//! always produce the same report.

use rayon::prelude::*;
use std::collections::HashSet;

use trialaudit_filing::{
    extract_filing, locate_passages, CandidateProfile, Document, FilingError, FilingSummary,
    Lexicon, Passage,
};
use trialaudit_registry::RegistryRecord;

pub mod finding;
pub mod lexicon;
pub mod matcher;
pub mod options;
pub mod pvalue;
pub mod report;
pub mod rules;

pub use finding::*;
pub use lexicon::RuleLexicon;
pub use matcher::{assign_passages, MatchAssignment, MatchBucket, ScoreBreakdown, ScoredPassage};
pub use options::{AuditorOptions, CompareOptions, MatchWeights};
pub use pvalue::PValue;
pub use report::*;
pub use rules::{compare_record, RecordComparison, RuleContext};

#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    #[error(
        "candidate '{requested}' not found in filing; available candidates: {}",
        available_list(.available)
    )]
    CandidateNotFound {
        requested: String,
        available: Vec<String>,
    },
    #[error(transparent)]
    Filing(#[from] FilingError),
    #[error("invalid rule pattern: {0}")]
    Pattern(#[from] regex::Error),
}

fn available_list(available: &[String]) -> String {
    if available.is_empty() {
        "(none)".to_string()
    } else {
        available.join(", ")
    }
}

/// Find a candidate by name or alias, ignoring case.
pub fn select_candidate<'a>(
    candidates: &'a [CandidateProfile],
    requested: &str,
) -> Result<&'a CandidateProfile, CompareError> {
    candidates
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(requested.trim()))
        .or_else(|| candidates.iter().find(|c| c.answers_to(requested.trim())))
        .ok_or_else(|| CompareError::CandidateNotFound {
            requested: requested.to_string(),
            available: candidates.iter().map(|c| c.name.clone()).collect(),
        })
}

/// Records with duplicate identifiers collapsed to the first occurrence.
pub fn unique_records(records: &[RegistryRecord]) -> Vec<RegistryRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(r.nct_id().to_string()))
        .cloned()
        .collect()
}

// ============================================================================
// Auditor
// ============================================================================

/// Compiled lexicons plus options; build once and reuse across filings.
#[derive(Debug, Clone)]
pub struct Auditor {
    lexicon: Lexicon,
    rules: RuleLexicon,
    options: AuditorOptions,
}

impl Auditor {
    pub fn new() -> Result<Self, CompareError> {
        Self::with_options(AuditorOptions::default())
    }

    pub fn with_options(options: AuditorOptions) -> Result<Self, CompareError> {
        Ok(Self {
            lexicon: Lexicon::new().map_err(FilingError::from)?,
            rules: RuleLexicon::new()?,
            options,
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn options(&self) -> &AuditorOptions {
        &self.options
    }

    /// Normalize and segment raw filing text.
    pub fn parse(&self, raw: &str) -> Result<Document, CompareError> {
        Ok(Document::parse(raw, &self.lexicon)?)
    }

    pub fn extract(&self, document: &Document) -> FilingSummary {
        extract_filing(document, &self.lexicon, &self.options.extraction)
    }

    /// Extract the filing, select `candidate` and compare it against `records`.
    ///
    /// Fails only when the filing has no candidate by that name or alias.
    pub fn audit(
        &self,
        document: &Document,
        candidate: &str,
        records: &[RegistryRecord],
        filing_date: Option<&str>,
    ) -> Result<ComparisonReport, CompareError> {
        let summary = self.extract(document);
        let profile = select_candidate(&summary.candidates, candidate)?;
        let passages = locate_passages(document, &profile.name, &self.options.extraction);
        Ok(self.compare(profile, &passages, records, filing_date))
    }

    /// Compare one candidate's passages against its registry records.
    pub fn compare(
        &self,
        profile: &CandidateProfile,
        passages: &[Passage],
        records: &[RegistryRecord],
        filing_date: Option<&str>,
    ) -> ComparisonReport {
        let records = unique_records(records);
        let assignment = assign_passages(passages, &records, &self.rules, &self.options.weights);

        let record_comparisons: Vec<RecordComparison> = records
            .par_iter()
            .zip(&assignment.buckets)
            .map(|(record, bucket)| {
                let ctx = RuleContext::new(
                    record,
                    bucket,
                    profile,
                    filing_date,
                    &self.rules,
                    &self.options.compare,
                );
                compare_record(&ctx)
            })
            .collect();

        let findings: Vec<Finding> = record_comparisons
            .iter()
            .flat_map(|c| c.findings().cloned())
            .chain(filing_level_findings(profile))
            .collect();
        let severity_counts = SeverityCounts::tally(&findings);

        let compare = &self.options.compare;
        let unmatched_passage_samples = assignment
            .unmatched
            .iter()
            .take(compare.unmatched_samples)
            .map(|p| rules::sample(&p.text, compare.unmatched_sample_chars))
            .collect();

        tracing::info!(
            candidate = %profile.name,
            records = records.len(),
            findings = findings.len(),
            high = severity_counts.high,
            unmatched = assignment.unmatched.len(),
            "compared candidate against registry"
        );

        ComparisonReport {
            candidate: CandidateSummary::from(profile),
            filing_date: filing_date.map(str::to_string),
            records_compared: records.len(),
            candidate_flags: RegistryOverview::build(&records, &record_comparisons),
            record_comparisons,
            findings,
            severity_counts,
            unmatched_passages: assignment.unmatched.len(),
            unmatched_passage_samples,
        }
    }
}
