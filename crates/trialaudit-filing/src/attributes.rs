//! Attribute mining over a candidate's passages.
//!
//! Every attribute is extracted from the concatenated passage text of one candidate, never the
//! whole filing, so attributes do not leak between candidates. Aliases are the exception: they
//! come only from explicit co-reference patterns, searched in the full text.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::candidates::{CandidateKind, CandidateMention};
use crate::evidence::{scan_combined_phases, scan_pattern, scan_phrases, PhraseHit};
use crate::lexicon::{Lexicon, INDICATION_STOP_STARTS};
use crate::options::ExtractionOptions;
use crate::passages::Passage;
use crate::phase::{phases_in_text, PhaseLabel, PhaseSet};
use crate::text::{collapse_whitespace, contains_word};

/// Language flags raised on a candidate's passages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateFlags {
    pub combined_phase_labels: Vec<String>,
    pub red_flag_phrases: Vec<PhraseHit>,
    pub comparative_claims: Vec<PhraseHit>,
    pub fda_language: Vec<PhraseHit>,
}

/// Everything the filing says about one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub kind: CandidateKind,
    pub ownership_score: f64,
    pub also_known_as: Vec<String>,
    /// Passages located before the output bound is applied.
    pub passage_count: usize,
    pub indications: Vec<String>,
    pub phase_claims: Vec<String>,
    pub canonical_phases: PhaseSet,
    pub nct_numbers: Vec<String>,
    pub fda_mentions: Vec<String>,
    pub flags: CandidateFlags,
    pub passages: Vec<Passage>,
}

impl CandidateProfile {
    /// Build a profile from the candidate's located passages.
    ///
    /// `full_text` is only consulted for aliases; `known_names` are all detected names, owned or
    /// not.
    pub fn from_passages(
        mention: &CandidateMention,
        passages: &[Passage],
        full_text: &str,
        known_names: &[String],
        lexicon: &Lexicon,
        opts: &ExtractionOptions,
    ) -> Self {
        let aggregated = lexicon.normalize(
            &passages
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        );

        let labels = phases_in_text(&aggregated, &lexicon.phase_any);
        let phase_claims = unique(labels.iter().map(PhaseLabel::to_string));
        let canonical_phases = PhaseSet::from_labels(&labels);

        let fda_hits = scan_pattern(&aggregated, &lexicon.fda, opts.phrase_context);
        let fda_mentions = unique(fda_hits.iter().map(|h| h.phrase.clone()));

        let combined_phase_labels = unique(
            scan_combined_phases(&aggregated, &lexicon.phase_combined, opts.phrase_context)
                .into_iter()
                .filter_map(|hit| PhaseLabel::parse(&hit.label))
                .map(|label| label.to_string()),
        );

        let flags = CandidateFlags {
            combined_phase_labels,
            red_flag_phrases: capped(
                scan_phrases(&aggregated, &lexicon.red_flags, opts.red_flag_context),
                opts.max_red_flags,
            ),
            comparative_claims: capped(
                scan_pattern(&aggregated, &lexicon.comparative, opts.phrase_context),
                opts.max_comparatives,
            ),
            fda_language: capped(fda_hits, opts.max_fda_hits),
        };

        Self {
            name: mention.name.clone(),
            kind: mention.kind,
            ownership_score: mention.ownership_score,
            also_known_as: find_aliases(&mention.name, full_text, known_names),
            passage_count: passages.len(),
            indications: find_indications(&aggregated, lexicon, opts.max_indications),
            phase_claims,
            canonical_phases,
            nct_numbers: unique(
                lexicon
                    .trial_identifier
                    .find_iter(&aggregated)
                    .map(|m| m.as_str().to_string()),
            ),
            fda_mentions,
            flags,
            passages: passages
                .iter()
                .take(opts.max_profile_passages)
                .map(|p| p.truncated(opts.profile_passage_chars))
                .collect(),
        }
    }

    /// True when `query` names this candidate or one of its aliases, ignoring case.
    pub fn answers_to(&self, query: &str) -> bool {
        let query = query.trim();
        self.name.eq_ignore_ascii_case(query)
            || self
                .also_known_as
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(query))
    }
}

fn unique(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn capped<T>(mut items: Vec<T>, max: usize) -> Vec<T> {
    items.truncate(max);
    items
}

/// Indications from the syntactic templates, de-duplicated ignoring case.
pub fn find_indications(text: &str, lexicon: &Lexicon, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    for template in &lexicon.indication_templates {
        for caps in template.captures_iter(text) {
            let Some(capture) = caps.get(1) else { continue };
            let indication = collapse_whitespace(capture.as_str().trim().trim_end_matches('.'));
            let len = indication.chars().count();
            if len <= 3 || len >= 55 {
                continue;
            }
            let lowered = indication.to_lowercase();
            if INDICATION_STOP_STARTS.iter().any(|s| lowered.starts_with(s)) {
                continue;
            }
            if seen.insert(lowered) {
                found.push(indication);
            }
        }
    }

    found.truncate(max);
    found
}

fn alias_pattern(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => Some(regex),
        Err(err) => {
            tracing::warn!(pattern, error = %err, "skipping alias pattern");
            None
        }
    }
}

/// Aliases stated explicitly in `text`.
///
/// Three forms count: `Name (X)` where `X` mentions another detected name, `Other (Name)` where
/// `Other` is another detected name, and `Name, also/formerly/previously known as X`. Proximity
/// alone never makes an alias.
pub fn find_aliases(name: &str, text: &str, known_names: &[String]) -> Vec<String> {
    let escaped = regex::escape(name);
    let others: Vec<&String> = known_names
        .iter()
        .filter(|other| !other.eq_ignore_ascii_case(name))
        .collect();
    let mut aliases: Vec<String> = Vec::new();
    let mut push = |alias: &str| {
        if !alias.eq_ignore_ascii_case(name) && !aliases.iter().any(|a| a.eq_ignore_ascii_case(alias))
        {
            aliases.push(alias.to_string());
        }
    };

    if let Some(re) = alias_pattern(&format!(r"\b{escaped}\b\s*\(([^)]+)\)")) {
        for caps in re.captures_iter(text) {
            let inner = &caps[1];
            for other in &others {
                if contains_word(inner, other) {
                    push(other.as_str());
                }
            }
        }
    }

    if let Some(re) = alias_pattern(&format!(r"([\w-]+)\s*\(\s*{escaped}\s*\)")) {
        for caps in re.captures_iter(text) {
            let preceding = &caps[1];
            if let Some(other) = others.iter().find(|o| o.eq_ignore_ascii_case(preceding)) {
                push(other.as_str());
            }
        }
    }

    if let Some(re) = alias_pattern(&format!(
        r"\b{escaped}\b[,\s]+(?:also|formerly|previously)\s+known\s+as\s+(\S+)"
    )) {
        for caps in re.captures_iter(text) {
            let alias = caps[1].trim_matches(|c: char| !(c.is_alphanumeric() || c == '-'));
            if !alias.is_empty() {
                push(alias);
            }
        }
    }

    aliases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SectionClass;

    fn passage(text: &str) -> Passage {
        Passage {
            section: "BUSINESS".into(),
            section_class: SectionClass::Business,
            page_approx: 1,
            char_offset: 0,
            text: text.into(),
        }
    }

    fn mention(name: &str) -> CandidateMention {
        CandidateMention {
            name: name.into(),
            kind: CandidateKind::StructuredCode,
            ownership_score: 1.0,
        }
    }

    #[test]
    fn aliases_require_explicit_coreference() {
        let names = vec!["izokibep".to_string(), "SLRN-801".to_string(), "ABC-999".to_string()];
        let text = "We are developing izokibep (SLRN-801). ABC-999 is mentioned near izokibep.";
        assert_eq!(find_aliases("izokibep", text, &names), vec!["SLRN-801"]);
        assert_eq!(find_aliases("SLRN-801", text, &names), vec!["izokibep"]);
        assert!(find_aliases("ABC-999", text, &names).is_empty());
    }

    #[test]
    fn also_known_as_is_taken_verbatim() {
        let names = vec!["ABC-123".to_string()];
        let text = "ABC-123, formerly known as XR-7, is our lead.";
        assert_eq!(find_aliases("ABC-123", text, &names), vec!["XR-7"]);
    }

    #[test]
    fn indications_trim_and_reject_broad_captures() {
        let lexicon = Lexicon::new().unwrap();
        let text = "ABC-123 for the treatment of Psoriatic Arthritis, and in patients with the disease. \
                    We study it in psoriatic arthritis and for uveitis.";
        let found = find_indications(text, &lexicon, 10);
        assert_eq!(found, vec!["Psoriatic Arthritis", "uveitis"]);
    }

    #[test]
    fn profile_mines_passage_text_only() {
        let lexicon = Lexicon::new().unwrap();
        let opts = ExtractionOptions::default();
        let passages = vec![
            passage("Our product candidate ABC-123 is in a Phase 2b/3 trial (NCT01234567) and was well-tolerated."),
            passage("The FDA granted ABC-123 Fast Track designation; it may be superior to placebo."),
        ];
        let full_text = "ABC-123 text";
        let profile = CandidateProfile::from_passages(
            &mention("ABC-123"),
            &passages,
            full_text,
            &["ABC-123".to_string()],
            &lexicon,
            &opts,
        );
        assert_eq!(profile.passage_count, 2);
        assert_eq!(profile.phase_claims, vec!["Phase 2b/3"]);
        assert_eq!(profile.canonical_phases.numbers().len(), 2);
        assert_eq!(profile.nct_numbers, vec!["NCT01234567"]);
        assert_eq!(profile.flags.combined_phase_labels, vec!["Phase 2b/3"]);
        assert_eq!(profile.fda_mentions, vec!["Fast Track"]);
        assert_eq!(profile.flags.red_flag_phrases[0].phrase, "well-tolerated");
        assert_eq!(profile.flags.comparative_claims[0].phrase, "superior to");
        assert!(profile.answers_to("abc-123"));
    }

    #[test]
    fn profile_passages_are_bounded() {
        let lexicon = Lexicon::new().unwrap();
        let opts = ExtractionOptions::default();
        let long = "x".repeat(900);
        let passages: Vec<_> = (0..40).map(|_| passage(&long)).collect();
        let profile = CandidateProfile::from_passages(
            &mention("ABC-123"),
            &passages,
            "",
            &[],
            &lexicon,
            &opts,
        );
        assert_eq!(profile.passage_count, 40);
        assert_eq!(profile.passages.len(), 30);
        assert!(profile.passages.iter().all(|p| p.text.len() == 500));
    }
}
