//! Fixed lexicons used by the extractors.
//!
//! Everything here is static data: section titles, naming stems, blocklists and the phrase
//! patterns that drive candidate detection and attribute mining. The tables are compiled once
//! into a [`Lexicon`] and handed to each component by shared reference, so no extractor owns
//! global mutable state.

use regex::{Regex, RegexBuilder};

// ============================================================================
// Sections
// ============================================================================

/// Section titles recognised as headings, in priority order.
pub const KNOWN_SECTIONS: &[&str] = &[
    "TABLE OF CONTENTS",
    "PROSPECTUS SUMMARY",
    "RISK FACTORS",
    "USE OF PROCEEDS",
    "DILUTION",
    "CAPITALIZATION",
    "BUSINESS",
    "MANAGEMENT'S DISCUSSION AND ANALYSIS",
    "MANAGEMENT",
    "EXECUTIVE COMPENSATION",
    "CERTAIN RELATIONSHIPS",
    "PRINCIPAL STOCKHOLDERS",
    "DESCRIPTION OF CAPITAL STOCK",
    "SHARES ELIGIBLE FOR FUTURE SALE",
    "MATERIAL U.S. FEDERAL INCOME TAX",
    "UNDERWRITING",
    "LEGAL MATTERS",
    "EXPERTS",
    "WHERE YOU CAN FIND MORE INFORMATION",
    "INDEX TO FINANCIAL STATEMENTS",
];

/// Sentinel section used when no heading is found.
pub const FULL_DOCUMENT: &str = "FULL DOCUMENT";

/// Section covering text before the first detected heading.
pub const FRONT_MATTER: &str = "FRONT MATTER";

// ============================================================================
// Candidate names
// ============================================================================

/// INN stems that mark a lowercase token as a probable drug name.
pub const INN_SUFFIXES: &[&str] = &[
    "mab", "nib", "tinib", "ciclib", "lisib", "rafenib", "ertinib", "zomib", "parib", "bep",
    "tide", "gliptin", "parin", "lukast", "sartan", "pril", "olol", "afil", "glumide", "platin",
    "vudine", "navir", "tegravir", "previr", "cillin", "micin", "mycin",
];

/// Ordinary English words that happen to carry an INN-like suffix.
pub const INN_BLOCKLIST: &[&str] = &[
    "increase", "decrease", "release", "disease", "purchase", "phase", "base", "case", "erase",
    "lease", "cease", "please", "grease", "crease", "concept", "accept", "receipt", "precept",
    "except", "intercept", "april", "gene", "cell", "prime", "combine", "determine", "examine",
    "undermine", "discipline", "medicine", "decline", "baseline", "outline", "define", "online",
    "vaccine", "routine", "doctrine", "pristine", "genuine", "famine", "sometime", "lifetime",
    "maritime", "overtime", "halftime", "peptide", "provide", "outside", "inside", "beside",
    "decide", "divide", "guide", "pride", "ride", "side", "slide", "stride", "tide", "wide",
    "worldwide", "nucleotide", "alongside", "override", "countryside", "suicide", "homicide",
    "coincide", "preside", "reside", "subside", "bromide", "chloride", "cyanide", "fluoride",
    "oxide", "sulfide", "member", "timber", "fiber", "chamber", "number", "remember", "october",
    "november", "december", "september",
];

/// Administrative and financial prefixes that share the designator shape (`SEC-1234`).
pub const DESIGNATOR_PREFIX_BLOCKLIST: &[&str] = &["SEC-", "ASC-", "IRS-", "EX-", "FY-", "DTC-"];

// ============================================================================
// Flag phrases
// ============================================================================

/// Promotional phrases that warrant a reviewer's attention in a clinical-stage filing.
pub const RED_FLAG_PHRASES: &[&str] = &[
    "safe",
    "effective",
    "clinically validated",
    "clinically proven",
    "proven efficacy",
    "proven safety",
    "favorable clinical activity",
    "promising tolerability",
    "favorable safety profile",
    "acceptable safety profile",
    "well-tolerated",
    "safer than",
    "more effective than",
    "superior to",
    "best-in-class",
    "first-in-class",
    "fast-to-market",
    "accelerated commercialization",
    "positive FDA feedback",
    "clinically meaningful",
];

const COMPARATIVE_PATTERNS: &[&str] = &[
    r"\bsafer\b",
    r"\bmore effective\b",
    r"\bsuperior\s+to\b",
    r"\bbetter\s+than\b",
    r"\bdifferentiated\b",
    r"\bbest-in-class\b",
    r"\bfirst-in-class\b",
    r"\bimproved\s+over\b",
    r"\badvantage\s+over\b",
    r"\bcompared\s+favorably\b",
];

const FDA_PATTERNS: &[&str] = &[
    r"\bpositive\s+feedback\b",
    r"\bconstructive\s+feedback\b",
    r"\balignment\b",
    r"\bFDA\s+agreed\b",
    r"\bFDA\s+indicated\b",
    r"\bFDA\s+acknowledged\b",
    r"\bBreakthrough\s+Therapy\b",
    r"\bFast\s+Track\b",
    r"\bOrphan\s+Drug\b",
    r"\bPriority\s+Review\b",
    r"\bAccelerated\s+Approval\b",
    r"\bpre-IND\b",
    r"\bEnd-of-Phase\s+2\b",
    r"\bSPA\b",
    r"\bCRL\b",
    r"\bIND\s+clear\w*\b",
    r"\bIND\s+approv\w*\b",
    r"\bIND\s+accept\w*\b",
    r"\bIND\s+fil\w*\b",
];

/// Named conditions recognised regardless of capitalisation.
pub const NAMED_CONDITIONS: &[&str] = &[
    "hidradenitis suppurativa",
    "psoriatic arthritis",
    "rheumatoid arthritis",
    "ankylosing spondylitis",
    "thyroid eye disease",
    "chronic urticaria",
    "non-infectious uveitis",
    "axial spondyloarthritis",
    "uveitis",
];

/// Leading words that mark an indication capture as too broad.
pub const INDICATION_STOP_STARTS: &[&str] = &[
    "our ", "the ", "this ", "a ", "an ", "such ", "certain ", "other ", "all ", "each ",
    "these ", "its ",
];

const GENERAL_STATEMENT_PATTERNS: &[&str] = &[
    r"(?i)we have no approved products",
    r"(?i)we have not generated any revenue from product sales",
    r"(?i)clinical.stage",
    r"(?i)we are a .*? biopharmaceutical",
];

// ============================================================================
// Compiled lexicon
// ============================================================================

/// A phrase from a fixed list together with its compiled whole-word pattern.
#[derive(Debug, Clone)]
pub struct PhrasePattern {
    pub phrase: String,
    pub regex: Regex,
}

/// The compiled, read-only pattern set shared by every extractor.
#[derive(Debug, Clone)]
pub struct Lexicon {
    /// `ABC-123` style internal designators.
    pub designator: Regex,
    /// Lowercase word tokens eligible for the INN suffix test.
    pub lowercase_word: Regex,
    /// Cue phrases that must appear near an INN-style name at least once.
    pub candidate_context: Regex,
    /// Cues that a mention refers to the filer's own asset.
    pub ownership: Regex,
    /// Cues that a mention refers to a marketed or competing product.
    pub competitor: Regex,
    pub trial_identifier: Regex,
    pub phase_any: Regex,
    pub phase_combined: Regex,
    phase_line_break: Regex,
    pub comparative: Regex,
    pub fda: Regex,
    pub red_flags: Vec<PhrasePattern>,
    pub indication_templates: Vec<Regex>,
    pub general_statements: Vec<Regex>,
}

impl Lexicon {
    /// Compile the built-in tables.
    pub fn new() -> Result<Self, regex::Error> {
        let red_flags = RED_FLAG_PHRASES
            .iter()
            .map(|phrase| {
                Ok(PhrasePattern {
                    phrase: phrase.to_string(),
                    regex: RegexBuilder::new(&format!(r"\b{}\b", regex::escape(phrase)))
                        .case_insensitive(true)
                        .build()?,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        let named_conditions = NAMED_CONDITIONS.join("|");
        let indication_templates = vec![
            Regex::new(
                r"for\s+(?:the\s+)?treatment\s+of\s+([A-Z][A-Za-z\s\-'()]{3,55}?)(?:\.|,|\band\b|\bor\b|\bwith\b|\bin\b|\(|\bby\b)",
            )?,
            Regex::new(
                r"in\s+patients?\s+with\s+([A-Z][A-Za-z\s\-'()]{3,55}?)(?:\.|,|\bwho\b|\band\b|\bor\b|\bthat\b)",
            )?,
            Regex::new(&format!(
                r"(?i)\b(?:in|for|of|with)\s+((?:{named_conditions}))\b"
            ))?,
        ];

        let general_statements = GENERAL_STATEMENT_PATTERNS
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            designator: Regex::new(r"\b[A-Z]{2,5}-\d{3,5}\b")?,
            lowercase_word: Regex::new(r"\b[a-z]{5,}\b")?,
            candidate_context: Regex::new(
                r"(?i)(?:candidate|product\s+candidate|investigational|our\s+lead|our\s+pipeline|clinical\s+trial|development\s+candidate|drug\s+candidate|therapeutic|antibody|inhibitor|treatment\s+of|patients?\s+with)",
            )?,
            ownership: Regex::new(
                r"(?i)(?:our\s+(?:lead|pipeline|product|candidate|program|drug)|we\s+are\s+(?:developing|advancing|evaluating|conducting)|we\s+initiated|we\s+plan\s+to|we\s+have\s+(?:developed|designed|initiated)|our\s+proprietary|our\s+(?:first|second|third)\s+|product\s+candidate)",
            )?,
            competitor: Regex::new(
                r"(?i)(?:approved\s+by\s+(?:the\s+)?FDA|FDA[\s-]+approved|approved\s+for|commercially\s+available|currently\s+marketed|marketed\s+by|sold\s+under|competing\s+product|competitor|is\s+(?:an?\s+)?(?:approved|marketed)|only\s+(?:approved|FDA))",
            )?,
            trial_identifier: Regex::new(r"\bNCT\d{8}\b")?,
            phase_any: Regex::new(r"(?i)\bPhase\s+(\d[ab]?(?:\s*/\s*\d[ab]?)?)\b")?,
            phase_combined: Regex::new(r"(?i)\bPhase\s+(\d[ab]?)\s*/\s*(\d[ab]?)\b")?,
            phase_line_break: Regex::new(r"(Phase)\s*\n\s*(\d)")?,
            comparative: Regex::new(&format!("(?i){}", COMPARATIVE_PATTERNS.join("|")))?,
            fda: Regex::new(&format!("(?i){}", FDA_PATTERNS.join("|")))?,
            red_flags,
            indication_templates,
            general_statements,
        })
    }

    /// Normalize raw filing text: non-breaking spaces become spaces and a `Phase` token split
    /// from its number by a line break is re-joined.
    pub fn normalize(&self, text: &str) -> String {
        let spaced = text.replace('\u{a0}', " ");
        self.phase_line_break
            .replace_all(&spaced, "${1} ${2}")
            .into_owned()
    }
}

/// True when `word` ends in a pharmaceutical naming stem and is not a blocklisted English word.
pub fn has_inn_suffix(word: &str) -> bool {
    !INN_BLOCKLIST.contains(&word) && INN_SUFFIXES.iter().any(|suffix| word.ends_with(suffix))
}

/// True when a designator-shaped token is an administrative code rather than a drug name.
pub fn is_blocked_designator(token: &str) -> bool {
    DESIGNATOR_PREFIX_BLOCKLIST
        .iter()
        .any(|prefix| token.starts_with(prefix))
}
