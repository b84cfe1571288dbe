//! Phrase hits and the scanners that produce them.
//!
//! Every lexicon match is returned as a structured record (phrase, position, surrounding
//! context) rather than by marking up the text, so each scanner can be tested against literal
//! strings.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::lexicon::PhrasePattern;
use crate::text::context_window;

/// One lexicon match with the text around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseHit {
    pub phrase: String,
    pub context: String,
    /// Byte offset of the match in the scanned text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl PhraseHit {
    pub fn new(phrase: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            context: context.into(),
            position: None,
        }
    }

    pub fn at(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

/// A combined phase label such as `Phase 2b/3`, with both halves as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedPhaseHit {
    pub label: String,
    pub phases: [String; 2],
    pub context: String,
    pub position: usize,
}

/// Every match of `pattern`, reported as the matched text.
pub fn scan_pattern(text: &str, pattern: &Regex, radius: usize) -> Vec<PhraseHit> {
    pattern
        .find_iter(text)
        .map(|m| {
            let (_, window) = context_window(text, m.start(), m.end(), radius);
            PhraseHit::new(m.as_str(), window.trim()).at(m.start())
        })
        .collect()
}

/// Every match of every phrase, grouped by phrase in list order and reported as the listed phrase.
pub fn scan_phrases(text: &str, phrases: &[PhrasePattern], radius: usize) -> Vec<PhraseHit> {
    phrases
        .iter()
        .flat_map(|p| {
            p.regex.find_iter(text).map(move |m| {
                let (_, window) = context_window(text, m.start(), m.end(), radius);
                PhraseHit::new(p.phrase.as_str(), window.trim()).at(m.start())
            })
        })
        .collect()
}

/// Every combined phase label matched by `pattern` (two capture groups).
pub fn scan_combined_phases(text: &str, pattern: &Regex, radius: usize) -> Vec<CombinedPhaseHit> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let first = caps.get(1)?.as_str().to_string();
            let second = caps.get(2)?.as_str().to_string();
            let (_, window) = context_window(text, whole.start(), whole.end(), radius);
            Some(CombinedPhaseHit {
                label: whole.as_str().to_string(),
                phases: [first, second],
                context: window.trim().to_string(),
                position: whole.start(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;

    #[test]
    fn red_flags_report_the_listed_phrase() {
        let lexicon = Lexicon::new().unwrap();
        let hits = scan_phrases(
            "The drug was Well-Tolerated and appeared safe.",
            &lexicon.red_flags,
            150,
        );
        let phrases: Vec<_> = hits.iter().map(|h| h.phrase.as_str()).collect();
        assert_eq!(phrases, vec!["safe", "well-tolerated"]);
        assert!(hits.iter().all(|h| h.context.contains("drug")));
    }

    #[test]
    fn combined_phase_hits_split_components() {
        let lexicon = Lexicon::new().unwrap();
        let hits = scan_combined_phases("our Phase 2b/3 trial", &lexicon.phase_combined, 200);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].label, "Phase 2b/3");
        assert_eq!(hits[0].phases, ["2b".to_string(), "3".to_string()]);
        assert_eq!(hits[0].position, 4);
    }

    #[test]
    fn comparative_hits_keep_matched_text() {
        let lexicon = Lexicon::new().unwrap();
        let hits = scan_pattern("potentially Superior to placebo", &lexicon.comparative, 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].phrase, "Superior to");
        assert_eq!(hits[0].position, Some(12));
    }
}
