//! Drug-candidate name discovery and ownership scoring.
//!
//! Two independent passes find names: structured designators (`ABC-123`) and lowercase words
//! carrying an INN naming stem. Stem matches are gated three ways (suffix, English-word blocklist,
//! and a nearby candidate cue) before they are accepted. Every accepted name is then scored for
//! ownership over the whole document.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::lexicon::{has_inn_suffix, is_blocked_designator, Lexicon};
use crate::options::ExtractionOptions;
use crate::text::{context_window, find_word_occurrences};

/// How a name was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    /// Internal designator such as `SLRN-801`.
    StructuredCode,
    /// INN-style lowercase name such as `izokibep`.
    LexiconName,
}

/// A detected name with its document-wide ownership score in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMention {
    pub name: String,
    pub kind: CandidateKind,
    pub ownership_score: f64,
}

impl CandidateMention {
    pub fn is_company_owned(&self) -> bool {
        self.ownership_score > 0.0
    }
}

/// Detected names split into the filer's own candidates and comparator drugs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateSet {
    pub company: Vec<CandidateMention>,
    pub comparators: Vec<String>,
    /// True when no name scored positive and `company` holds the top names by score instead.
    pub fallback: bool,
}

impl CandidateSet {
    pub fn is_empty(&self) -> bool {
        self.company.is_empty() && self.comparators.is_empty()
    }
}

/// Discover candidate names in `text`, designators first, each family in first-appearance order.
pub fn discover_names(
    text: &str,
    lexicon: &Lexicon,
    opts: &ExtractionOptions,
) -> Vec<(String, CandidateKind)> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::new();

    for m in lexicon.designator.find_iter(text) {
        let token = m.as_str();
        if is_blocked_designator(token) || seen.contains(token) {
            continue;
        }
        seen.insert(token.to_string());
        names.push((token.to_string(), CandidateKind::StructuredCode));
    }

    let lowered = text.to_lowercase();
    let mut rejected: HashSet<&str> = HashSet::new();
    for m in lexicon.lowercase_word.find_iter(&lowered) {
        let word = m.as_str();
        if seen.contains(word) || rejected.contains(word) {
            continue;
        }
        if !has_inn_suffix(word) {
            rejected.insert(word);
            continue;
        }
        let near_cue = find_word_occurrences(text, word).into_iter().any(|(start, end)| {
            let (_, window) = context_window(text, start, end, opts.candidate_context_radius);
            lexicon.candidate_context.is_match(window)
        });
        if near_cue {
            seen.insert(word.to_string());
            names.push((word.to_string(), CandidateKind::LexiconName));
        } else {
            rejected.insert(word);
        }
    }

    names
}

/// `(ownership hits - competitor hits) / mentions` over windows around every mention of `name`.
///
/// A single window may count toward both sides. Returns 0 when the name never occurs.
pub fn ownership_score(text: &str, name: &str, lexicon: &Lexicon, radius: usize) -> f64 {
    let mut own = 0i64;
    let mut competing = 0i64;
    let mut total = 0i64;

    for (start, end) in find_word_occurrences(text, name) {
        total += 1;
        let (_, window) = context_window(text, start, end, radius);
        if lexicon.ownership.is_match(window) {
            own += 1;
        }
        if lexicon.competitor.is_match(window) {
            competing += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }
    (own - competing) as f64 / total as f64
}

/// Discover, score and classify every candidate name in `text`.
pub fn detect_candidates(text: &str, lexicon: &Lexicon, opts: &ExtractionOptions) -> CandidateSet {
    classify_candidates(text, discover_names(text, lexicon, opts), lexicon, opts)
}

/// Score already-discovered names and split them into company candidates and comparators.
pub fn classify_candidates(
    text: &str,
    names: Vec<(String, CandidateKind)>,
    lexicon: &Lexicon,
    opts: &ExtractionOptions,
) -> CandidateSet {
    let scored: Vec<CandidateMention> = names
        .into_par_iter()
        .map(|(name, kind)| {
            let ownership_score = ownership_score(text, &name, lexicon, opts.ownership_radius);
            CandidateMention {
                name,
                kind,
                ownership_score,
            }
        })
        .collect();

    let comparators: Vec<String> = scored
        .iter()
        .filter(|c| !c.is_company_owned())
        .map(|c| c.name.clone())
        .collect();
    let mut company: Vec<CandidateMention> = scored
        .iter()
        .filter(|c| c.is_company_owned())
        .cloned()
        .collect();

    let fallback = company.is_empty() && !scored.is_empty();
    if fallback {
        let mut ranked = scored;
        ranked.sort_by(|a, b| b.ownership_score.total_cmp(&a.ownership_score));
        ranked.truncate(opts.fallback_top_n);
        company = ranked;
    }

    tracing::info!(
        company = company.len(),
        comparators = comparators.len(),
        fallback,
        "classified candidate names"
    );

    CandidateSet {
        company,
        comparators,
        fallback,
    }
}
