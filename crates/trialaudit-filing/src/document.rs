//! Filing documents and section segmentation.
//!
//! A [`Document`] owns the normalized filing text and the ordered list of [`Section`]s derived
//! from it. Sections are contiguous, non-overlapping and together cover the whole text.

use serde::{Deserialize, Serialize};

use crate::lexicon::{Lexicon, FRONT_MATTER, FULL_DOCUMENT, KNOWN_SECTIONS};
use crate::FilingError;

/// Longest line still considered a heading.
const MAX_HEADING_LEN: usize = 100;
/// Shortest line allowed to match a known title by containment in that title.
const MIN_PARTIAL_HEADING_LEN: usize = 8;

/// Coarse grouping of sections used when weighing where a passage appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionClass {
    Summary,
    RiskFactors,
    Business,
    Mda,
    Financial,
    Other,
    Unknown,
}

impl SectionClass {
    pub fn for_section(name: &str) -> Self {
        match name {
            "PROSPECTUS SUMMARY" => Self::Summary,
            "RISK FACTORS" => Self::RiskFactors,
            "BUSINESS" => Self::Business,
            "MANAGEMENT'S DISCUSSION AND ANALYSIS" => Self::Mda,
            "INDEX TO FINANCIAL STATEMENTS" => Self::Financial,
            FULL_DOCUMENT => Self::Unknown,
            FRONT_MATTER => Self::Other,
            other if KNOWN_SECTIONS.contains(&other) => Self::Other,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::RiskFactors => "risk_factors",
            Self::Business => "business",
            Self::Mda => "mda",
            Self::Financial => "financial",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }
}

/// A named span `start..end` of the document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub class: SectionClass,
    pub start: usize,
    pub end: usize,
}

impl Section {
    fn new(name: &str, start: usize, end: usize) -> Self {
        Self {
            name: name.to_string(),
            class: SectionClass::for_section(name),
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Normalized filing text plus its sections.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    sections: Vec<Section>,
}

impl Document {
    /// Normalize `raw` and segment it.
    ///
    /// Fails only when the text has no content at all.
    pub fn parse(raw: &str, lexicon: &Lexicon) -> Result<Self, FilingError> {
        let text = lexicon.normalize(raw);
        if text.trim().is_empty() {
            return Err(FilingError::EmptyDocument);
        }
        let sections = segment(&text);
        tracing::debug!(
            bytes = text.len(),
            sections = sections.len(),
            "segmented filing"
        );
        Ok(Self { text, sections })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_text(&self, section: &Section) -> &str {
        &self.text[section.start..section.end]
    }

    pub fn section_names(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.name.clone()).collect()
    }
}

/// Match a heading line against the known section titles.
///
/// Exact matches win, then a title contained in the line, then (for longer lines) a line that
/// is a fragment of a title.
pub fn match_known_section(line: &str) -> Option<&'static str> {
    let heading = line.trim().replace('\u{2019}', "'").to_uppercase();
    if heading.is_empty() {
        return None;
    }

    if let Some(exact) = KNOWN_SECTIONS.iter().find(|known| **known == heading) {
        return Some(exact);
    }
    if let Some(contained) = KNOWN_SECTIONS
        .iter()
        .find(|known| heading.contains(*known))
    {
        return Some(contained);
    }
    if heading.len() >= MIN_PARTIAL_HEADING_LEN {
        return KNOWN_SECTIONS
            .iter()
            .find(|known| known.contains(heading.as_str()))
            .copied();
    }
    None
}

/// Lines that look like a heading: short, upper-case, wordy, and not a table-of-contents
/// entry ending in a page number.
fn is_heading_line(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.len() > MAX_HEADING_LEN {
        return false;
    }
    if line.chars().filter(|c| c.is_alphabetic()).count() < 4 {
        return false;
    }
    if line.chars().last().is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }
    line == line.to_uppercase()
}

/// Split `text` into sections at recognised headings.
///
/// Always returns at least one section; spans are contiguous and cover `0..text.len()`.
pub fn segment(text: &str) -> Vec<Section> {
    let mut markers: Vec<(usize, &'static str)> = Vec::new();
    let mut offset = 0usize;

    for line in text.split_inclusive('\n') {
        if is_heading_line(line) {
            if let Some(name) = match_known_section(line) {
                let lead = line.len() - line.trim_start().len();
                markers.push((offset + lead, name));
            }
        }
        offset += line.len();
    }

    // First occurrence of each title wins.
    markers.sort_by_key(|(pos, _)| *pos);
    let mut seen = std::collections::HashSet::new();
    markers.retain(|(_, name)| seen.insert(*name));

    if markers.is_empty() {
        return vec![Section::new(FULL_DOCUMENT, 0, text.len())];
    }

    let mut sections = Vec::with_capacity(markers.len() + 1);
    if markers[0].0 > 0 {
        sections.push(Section::new(FRONT_MATTER, 0, markers[0].0));
    }
    for (i, (pos, name)) in markers.iter().enumerate() {
        let end = markers
            .get(i + 1)
            .map(|(next, _)| *next)
            .unwrap_or(text.len());
        sections.push(Section::new(name, *pos, end));
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILING: &str = "Prospectus cover\n\nPROSPECTUS SUMMARY\nWe are a clinical-stage company.\n\nRISK FACTORS\nRisks abound.\n\nBUSINESS\nOur pipeline.\n";

    #[test]
    fn segments_at_known_headings() {
        let sections = segment(FILING);
        let names: Vec<_> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![FRONT_MATTER, "PROSPECTUS SUMMARY", "RISK FACTORS", "BUSINESS"]
        );
        assert_eq!(sections[1].class, SectionClass::Summary);
        assert_eq!(sections[2].class, SectionClass::RiskFactors);
        assert!(FILING[sections[2].start..].starts_with("RISK FACTORS"));
    }

    #[test]
    fn no_headings_yields_full_document() {
        let sections = segment("just some prose without headings");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].name, FULL_DOCUMENT);
        assert_eq!(sections[0].class, SectionClass::Unknown);
        assert_eq!(sections[0].end, 32);
    }

    #[test]
    fn repeated_headings_keep_first_occurrence() {
        let text = "RISK FACTORS\nfirst\nRISK FACTORS\nsecond\n";
        let sections = segment(text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].start, 0);
        assert_eq!(sections[0].end, text.len());
    }

    #[test]
    fn toc_entries_with_page_numbers_are_not_headings() {
        assert!(!is_heading_line("RISK FACTORS 12"));
        assert!(is_heading_line("  RISK FACTORS  "));
        assert!(!is_heading_line("Risk Factors"));
    }

    #[test]
    fn management_prefers_exact_title() {
        assert_eq!(match_known_section("MANAGEMENT"), Some("MANAGEMENT"));
        assert_eq!(
            match_known_section("MANAGEMENT’S DISCUSSION AND ANALYSIS OF FINANCIAL CONDITION"),
            Some("MANAGEMENT'S DISCUSSION AND ANALYSIS")
        );
    }

    #[test]
    fn empty_document_is_rejected() {
        let lexicon = Lexicon::new().unwrap();
        assert!(matches!(
            Document::parse(" \n\u{a0}\n", &lexicon),
            Err(FilingError::EmptyDocument)
        ));
    }
}
