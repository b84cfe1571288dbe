//! Patterns and tables used by the matcher and the discrepancy rules.

use regex::Regex;
use std::collections::{BTreeSet, HashSet};

use trialaudit_filing::text::contains_word;
use trialaudit_filing::{PhaseLabel, PhaseSet};

/// Filing shorthand mapped to the condition names registries use.
pub const CONDITION_ALIASES: &[(&str, &[&str])] = &[
    ("hs", &["hidradenitis suppurativa"]),
    ("hidradenitis", &["hidradenitis suppurativa"]),
    ("ted", &["thyroid eye disease", "graves' ophthalmopathy", "graves ophthalmopathy"]),
    ("thyroid eye", &["thyroid eye disease"]),
    ("graves", &["thyroid eye disease", "graves' ophthalmopathy"]),
    ("psa", &["psoriatic arthritis"]),
    ("psoriatic", &["psoriatic arthritis"]),
    ("axspa", &["ankylosing spondylitis", "axial spondyloarthritis"]),
    ("ankylosing", &["ankylosing spondylitis"]),
    ("uveitis", &["uveitis", "non-infectious uveitis", "non-anterior uveitis"]),
    ("ra", &["rheumatoid arthritis"]),
    ("rheumatoid", &["rheumatoid arthritis"]),
    ("pso", &["psoriasis", "plaque psoriasis"]),
    ("psoriasis", &["psoriasis", "plaque psoriasis"]),
    ("chronic urticaria", &["chronic urticaria", "chronic spontaneous urticaria"]),
    ("csu", &["chronic spontaneous urticaria", "chronic urticaria"]),
    ("atopic dermatitis", &["atopic dermatitis", "eczema"]),
    ("crohn", &["crohn disease", "crohn's disease"]),
    ("uc", &["ulcerative colitis"]),
    ("lupus", &["systemic lupus erythematosus", "lupus"]),
    ("sle", &["systemic lupus erythematosus"]),
];

/// Substrings that count as discussing safety.
pub const SAFETY_TERMS: &[&str] = &[
    "adverse",
    "safety",
    "tolerab",
    "side effect",
    "serious",
    "discontinu",
    "death",
    "hospitali",
];

/// Words too generic to identify an endpoint on their own.
pub const ENDPOINT_STOP_TERMS: &[&str] = &[
    "baseline", "change", "percentage", "participants", "patients", "subjects", "number",
    "proportion", "weeks", "month", "months", "score", "total", "achieving", "during",
    "through", "treatment", "measured", "assessed", "period", "after", "using", "least",
];

/// Plausible bounds for a participant count quoted in prose.
pub const ENROLLMENT_RANGE: std::ops::RangeInclusive<u64> = 5..=100_000;

/// Compiled rule patterns, built once and shared by reference.
#[derive(Debug, Clone)]
pub struct RuleLexicon {
    pub phase: Regex,
    pub combined_phase: Regex,
    pub enrollment_count: Regex,
    pub enrollment_phrase: Regex,
    pub status_disclosure: Regex,
    pub missed_endpoint_disclosure: Regex,
    pub double_blind: Regex,
    pub open_label: Regex,
    pub randomized: Regex,
    pub primary: Regex,
}

impl RuleLexicon {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            phase: Regex::new(r"(?i)\bphase\s*(\d[ab]?(?:\s*/\s*\d[ab]?)?)\b")?,
            combined_phase: Regex::new(r"(?i)\bPhase\s+(\d[ab]?)\s*/\s*(\d[ab]?)\b")?,
            enrollment_count: Regex::new(
                r"(?i)\b(\d[\d,]*)\s*(?:patients?|participants?|subjects?|individuals?)\b",
            )?,
            enrollment_phrase: Regex::new(
                r"(?i)\benroll(?:ed|ing|ment)?\s+(?:of\s+)?(?:approximately\s+|about\s+|up\s+to\s+|over\s+)?(\d[\d,]*)\b",
            )?,
            status_disclosure: Regex::new(r"(?i)\b(?:terminat|withdr[ae]w|suspend|discontinu|halt)\w*")?,
            missed_endpoint_disclosure: Regex::new(
                r"(?i)not\s+statistically\s+significant|did\s+not\s+(?:meet|achieve|reach)|failed\s+to\s+(?:meet|achieve|reach)|missed\s+(?:its|the)\s+primary",
            )?,
            double_blind: Regex::new(r"(?i)\bdouble[\s-]+blind(?:ed)?\b")?,
            open_label: Regex::new(r"(?i)\bopen[\s-]+label\b")?,
            randomized: Regex::new(r"(?i)\b(non-?)?randomi[sz]ed\b")?,
            primary: Regex::new(r"(?i)\bprimary\b")?,
        })
    }

    /// Registry condition names implied by aliases found in `text`.
    pub fn conditions_in(&self, text: &str) -> BTreeSet<String> {
        CONDITION_ALIASES
            .iter()
            .filter(|(alias, _)| contains_word(text, alias))
            .flat_map(|(_, conditions)| conditions.iter().map(|c| c.to_string()))
            .collect()
    }

    /// Canonical phases of every label in `text`.
    pub fn phases_in(&self, text: &str) -> PhaseSet {
        let labels: Vec<PhaseLabel> = self
            .phase
            .find_iter(text)
            .filter_map(|m| PhaseLabel::parse(m.as_str()))
            .collect();
        PhaseSet::from_labels(&labels)
    }

    /// Combined labels such as `Phase 2b/3`, normalized and de-duplicated.
    pub fn combined_labels_in(&self, text: &str) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for m in self.combined_phase.find_iter(text) {
            if let Some(label) = PhaseLabel::parse(m.as_str()) {
                let label = label.to_string();
                if !labels.contains(&label) {
                    labels.push(label);
                }
            }
        }
        labels
    }

    /// Participant counts stated in `text`, within [`ENROLLMENT_RANGE`].
    pub fn enrollments_in(&self, text: &str) -> Vec<u64> {
        let mut found = Vec::new();
        for pattern in [&self.enrollment_count, &self.enrollment_phrase] {
            for caps in pattern.captures_iter(text) {
                let digits = caps[1].replace(',', "");
                if let Ok(n) = digits.parse::<u64>() {
                    if ENROLLMENT_RANGE.contains(&n) && !found.contains(&n) {
                        found.push(n);
                    }
                }
            }
        }
        found
    }

    /// True when `text` says a trial stopped early.
    pub fn discloses_status(&self, text: &str) -> bool {
        self.status_disclosure.is_match(text)
    }

    pub fn claims_randomized(&self, text: &str) -> bool {
        self.randomized
            .captures_iter(text)
            .any(|caps| caps.get(1).is_none())
    }
}

/// Lowercased word tokens of at least `min_len` characters.
pub fn word_tokens(text: &str, min_len: usize) -> HashSet<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= min_len)
        .map(str::to_lowercase)
        .collect()
}

/// Safety language anywhere in `text`.
pub fn mentions_safety(text: &str) -> bool {
    let lowered = text.to_lowercase();
    SAFETY_TERMS.iter().any(|term| lowered.contains(term))
}
