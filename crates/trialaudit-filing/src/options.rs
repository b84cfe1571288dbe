//! Tunable window sizes and caps for filing extraction.

use serde::{Deserialize, Serialize};

/// Numeric knobs for the extraction pipeline.
///
/// Defaults reproduce the fixed behaviour; a partial JSON object overrides only the fields it
/// names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOptions {
    /// Total width of a passage window around a mention.
    pub passage_window: usize,
    /// Bytes per approximate page.
    pub page_size: usize,
    /// Overlap allowed between consecutive passages before they are merged.
    pub dedup_tolerance: usize,
    /// Radius scanned for ownership and competitor cues around each mention.
    pub ownership_radius: usize,
    /// Radius in which an INN-style name must meet a candidate cue.
    pub candidate_context_radius: usize,
    /// Names kept by score when no name scores as company-owned.
    pub fallback_top_n: usize,
    pub max_profile_passages: usize,
    pub profile_passage_chars: usize,
    pub max_indications: usize,
    pub max_red_flags: usize,
    pub max_comparatives: usize,
    pub max_fda_hits: usize,
    pub red_flag_context: usize,
    pub phrase_context: usize,
    pub max_general_statements: usize,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            passage_window: 800,
            page_size: 3000,
            dedup_tolerance: 100,
            ownership_radius: 200,
            candidate_context_radius: 300,
            fallback_top_n: 5,
            max_profile_passages: 30,
            profile_passage_chars: 500,
            max_indications: 10,
            max_red_flags: 20,
            max_comparatives: 10,
            max_fda_hits: 10,
            red_flag_context: 150,
            phrase_context: 200,
            max_general_statements: 10,
        }
    }
}

impl ExtractionOptions {
    pub fn with_passage_window(mut self, window: usize) -> Self {
        self.passage_window = window;
        self
    }

    pub fn with_fallback_top_n(mut self, n: usize) -> Self {
        self.fallback_top_n = n;
        self
    }

    /// Half the passage window, the radius used on each side of a mention.
    pub fn passage_radius(&self) -> usize {
        self.passage_window / 2
    }
}
