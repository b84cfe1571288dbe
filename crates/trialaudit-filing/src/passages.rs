//! Passage location: context windows around every mention of a term.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::document::{Document, SectionClass};
use crate::options::ExtractionOptions;
use crate::text::{ceil_boundary, find_word_occurrences, floor_boundary, truncate_chars};

/// A bounded window of filing text around one mention of a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub section: String,
    pub section_class: SectionClass,
    pub page_approx: usize,
    /// Byte offset of the mention in the normalized document text.
    pub char_offset: usize,
    pub text: String,
}

impl Passage {
    /// A copy with its text cut to `max_chars` characters.
    pub fn truncated(&self, max_chars: usize) -> Self {
        Self {
            text: truncate_chars(&self.text, max_chars).to_string(),
            ..self.clone()
        }
    }
}

/// Rough page number for a document offset.
pub fn approx_page(offset: usize, page_size: usize) -> usize {
    offset / page_size.max(1) + 1
}

/// Every passage mentioning `term`, in document order, with overlaps merged.
///
/// Windows never cross the boundary of the section the mention falls in.
pub fn locate_passages(document: &Document, term: &str, opts: &ExtractionOptions) -> Vec<Passage> {
    let radius = opts.passage_radius();
    let mut passages = Vec::new();

    for section in document.sections() {
        let body = document.section_text(section);
        for (start, end) in find_word_occurrences(body, term) {
            let lo = floor_boundary(body, start.saturating_sub(radius));
            let hi = ceil_boundary(body, end.saturating_add(radius));
            let offset = section.start + start;
            passages.push(Passage {
                section: section.name.clone(),
                section_class: section.class,
                page_approx: approx_page(offset, opts.page_size),
                char_offset: offset,
                text: body[lo..hi].trim().to_string(),
            });
        }
    }

    let passages = dedup_passages(passages, opts.dedup_tolerance);
    tracing::debug!(term, passages = passages.len(), "located passages");
    passages
}

/// Sort by offset and collapse passages that start inside the previous one's span.
///
/// When two passages overlap by more than `tolerance` bytes, the longer text is kept. A window
/// whose text repeats an earlier kept window is dropped; this happens when several mentions sit
/// in a section shorter than the window. The output is a fixed point: deduplicating it again
/// changes nothing.
pub fn dedup_passages(mut passages: Vec<Passage>, tolerance: usize) -> Vec<Passage> {
    passages.sort_by_key(|p| p.char_offset);

    let mut kept: Vec<Passage> = Vec::with_capacity(passages.len());
    for passage in passages {
        match kept.last_mut() {
            Some(prev)
                if passage.char_offset
                    < (prev.char_offset + prev.text.len()).saturating_sub(tolerance) =>
            {
                if passage.text.len() > prev.text.len() {
                    *prev = passage;
                }
            }
            _ => kept.push(passage),
        }
    }

    let mut seen = HashSet::new();
    kept.retain(|p| seen.insert(p.text.clone()));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;

    fn passage(offset: usize, len: usize) -> Passage {
        Passage {
            section: "BUSINESS".into(),
            section_class: SectionClass::Business,
            page_approx: 1,
            char_offset: offset,
            text: "x".repeat(len),
        }
    }

    #[test]
    fn pages_are_one_based() {
        assert_eq!(approx_page(0, 3000), 1);
        assert_eq!(approx_page(2999, 3000), 1);
        assert_eq!(approx_page(3000, 3000), 2);
    }

    #[test]
    fn overlapping_passages_keep_the_longer() {
        let out = dedup_passages(vec![passage(0, 500), passage(50, 700), passage(2000, 100)], 100);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].char_offset, 50);
        assert_eq!(out[1].char_offset, 2000);
    }

    #[test]
    fn tolerance_allows_small_overlaps() {
        let out = dedup_passages(vec![passage(0, 500), passage(450, 300)], 100);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn identical_windows_collapse_to_the_first() {
        let same = |offset| Passage {
            text: "BUSINESS\nABC-123 did well. ABC-123 was safe. ABC-123 again.".into(),
            ..passage(offset, 0)
        };
        let out = dedup_passages(vec![same(312), same(10), same(207)], 30);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].char_offset, 10);
        assert_eq!(dedup_passages(out.clone(), 30), out);
    }

    #[test]
    fn short_section_with_repeated_mentions_yields_one_passage() {
        let lexicon = Lexicon::new().unwrap();
        let filler = "word ".repeat(200);
        let raw = format!(
            "RISK FACTORS\n{filler}\nBUSINESS\nIn our trial of ABC-123, ABC-123 did not meet its endpoint. \
             ABC-123 showed an acceptable safety profile in a study that enrolled many patients \
             across several sites over a long period of time, and ABC-123 remains our focus.\n"
        );
        let document = Document::parse(&raw, &lexicon).unwrap();
        let found = locate_passages(&document, "ABC-123", &ExtractionOptions::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].section, "BUSINESS");
    }

    #[test]
    fn passages_carry_section_and_page() {
        let lexicon = Lexicon::new().unwrap();
        let filler = "word ".repeat(1000);
        let raw = format!("RISK FACTORS\n{filler}\nBUSINESS\nOur candidate ABC-123 works.\n");
        let document = Document::parse(&raw, &lexicon).unwrap();
        let found = locate_passages(&document, "abc-123", &ExtractionOptions::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].section, "BUSINESS");
        assert_eq!(found[0].section_class, SectionClass::Business);
        assert_eq!(found[0].page_approx, 2);
        assert!(found[0].text.starts_with("BUSINESS"));
        assert_eq!(&document.text()[found[0].char_offset..found[0].char_offset + 7], "ABC-123");
    }
}
