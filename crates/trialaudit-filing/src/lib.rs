//! Disclosure extraction for trialaudit
//!
//! Turns the text of a prospectus-style filing into structured claims about drug candidates:
//! - section segmentation with approximate page numbers
//! - candidate name discovery (designators and INN-style names) with ownership scoring
//! - passages around every mention, de-duplicated
//! - per-candidate attributes: phases, indications, aliases, trial identifiers and language flags
//!
//! All extraction is pattern and lexicon driven. The compiled [`Lexicon`] is built once and
//! shared by reference; nothing here holds mutable global state.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::text::{asymmetric_window, truncate_chars};

pub mod attributes;
pub mod candidates;
pub mod document;
pub mod evidence;
pub mod lexicon;
pub mod options;
pub mod passages;
pub mod phase;
pub mod text;

pub use attributes::*;
pub use candidates::*;
pub use document::{Document, Section, SectionClass};
pub use evidence::*;
pub use lexicon::Lexicon;
pub use options::ExtractionOptions;
pub use passages::*;
pub use phase::*;

#[derive(Debug, thiserror::Error)]
pub enum FilingError {
    #[error("filing contains no extractable text")]
    EmptyDocument,
    #[error("invalid lexicon pattern: {0}")]
    Pattern(#[from] regex::Error),
}

const PIPELINE_SCAN_CHARS: usize = 5000;
const PIPELINE_EXCERPT_CHARS: usize = 2000;
const GENERAL_STATEMENT_LEAD: usize = 100;

// ============================================================================
// Filing summary
// ============================================================================

/// Everything extracted from one filing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilingSummary {
    /// Company candidates, most-mentioned first.
    pub candidates: Vec<CandidateProfile>,
    pub comparator_drugs_mentioned: Vec<String>,
    pub nct_numbers_all: Vec<String>,
    pub general_statements: Vec<String>,
    pub pipeline_excerpt: String,
    /// The pipeline chart is an image next to pipeline text, so `pipeline_excerpt` may miss it.
    /// Only HTML readers can tell; plain text leaves this false.
    #[serde(default)]
    pub pipeline_is_image: bool,
    pub sections_found: Vec<String>,
}

/// Run the whole extraction pipeline over a parsed filing.
pub fn extract_filing(
    document: &Document,
    lexicon: &Lexicon,
    opts: &ExtractionOptions,
) -> FilingSummary {
    let text = document.text();
    let detected = discover_names(text, lexicon, opts);
    let known_names: Vec<String> = detected.iter().map(|(name, _)| name.clone()).collect();
    let set = classify_candidates(text, detected, lexicon, opts);

    let mut profiles: Vec<CandidateProfile> = set
        .company
        .par_iter()
        .map(|mention| profile_candidate(document, mention, &known_names, lexicon, opts))
        .collect();
    profiles.sort_by(|a, b| b.passage_count.cmp(&a.passage_count));

    let mut nct_numbers_all: Vec<String> = Vec::new();
    for m in lexicon.trial_identifier.find_iter(text) {
        if !nct_numbers_all.iter().any(|n| n == m.as_str()) {
            nct_numbers_all.push(m.as_str().to_string());
        }
    }

    tracing::info!(
        candidates = profiles.len(),
        comparators = set.comparators.len(),
        trials = nct_numbers_all.len(),
        "extracted filing"
    );

    FilingSummary {
        candidates: profiles,
        comparator_drugs_mentioned: set.comparators,
        nct_numbers_all,
        general_statements: general_statements(text, lexicon, opts),
        pipeline_excerpt: pipeline_excerpt(document),
        pipeline_is_image: false,
        sections_found: document.section_names(),
    }
}

/// Locate passages for one candidate and mine its attributes.
pub fn profile_candidate(
    document: &Document,
    mention: &CandidateMention,
    known_names: &[String],
    lexicon: &Lexicon,
    opts: &ExtractionOptions,
) -> CandidateProfile {
    let passages = locate_passages(document, &mention.name, opts);
    CandidateProfile::from_passages(
        mention,
        &passages,
        document.text(),
        known_names,
        lexicon,
        opts,
    )
}

/// Passages mentioning any term, e.g. a trial identifier.
pub fn passages_for_term(document: &Document, term: &str, opts: &ExtractionOptions) -> Vec<Passage> {
    locate_passages(document, term, opts)
}

fn general_statements(text: &str, lexicon: &Lexicon, opts: &ExtractionOptions) -> Vec<String> {
    lexicon
        .general_statements
        .iter()
        .flat_map(|pattern| pattern.find_iter(text))
        .map(|m| {
            asymmetric_window(
                text,
                m.start(),
                m.end(),
                GENERAL_STATEMENT_LEAD,
                opts.phrase_context,
            )
            .trim()
            .to_string()
        })
        .take(opts.max_general_statements)
        .collect()
}

fn pipeline_excerpt(document: &Document) -> String {
    document
        .sections()
        .iter()
        .map(|section| document.section_text(section))
        .find(|body| {
            let head = truncate_chars(body, PIPELINE_SCAN_CHARS).to_lowercase();
            head.contains("pipeline") || head.contains("our programs")
        })
        .map(|body| truncate_chars(body, PIPELINE_EXCERPT_CHARS).to_string())
        .unwrap_or_default()
}
