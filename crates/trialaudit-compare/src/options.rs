//! Tunable weights and thresholds for matching and comparison.

use serde::{Deserialize, Serialize};
use trialaudit_filing::ExtractionOptions;

/// Points each matching signal contributes to a passage/record score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchWeights {
    pub identifier: f64,
    pub condition: f64,
    pub phase: f64,
    pub enrollment: f64,
    pub title: f64,
    /// Relative difference below which a stated enrollment counts as matching.
    pub enrollment_tolerance: f64,
    pub title_min_shared: usize,
    pub title_min_token_len: usize,
}

impl Default for MatchWeights {
    fn default() -> Self {
        Self {
            identifier: 10.0,
            condition: 3.0,
            phase: 2.0,
            enrollment: 2.0,
            title: 1.0,
            enrollment_tolerance: 0.20,
            title_min_shared: 2,
            title_min_token_len: 4,
        }
    }
}

/// Thresholds used by the discrepancy rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// A stated enrollment above `actual * (1 + ratio)` is an overstatement.
    pub overstatement_ratio: f64,
    pub significance_threshold: f64,
    /// Fewest serious adverse-event terms before under-reporting is judged.
    pub ae_min_terms: usize,
    pub ae_disclosure_ratio: f64,
    pub unmatched_samples: usize,
    pub unmatched_sample_chars: usize,
    /// Characters either side of "primary" searched for a secondary endpoint.
    pub endpoint_window: usize,
    pub min_endpoint_terms: usize,
    pub max_analyses: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            overstatement_ratio: 0.5,
            significance_threshold: 0.05,
            ae_min_terms: 3,
            ae_disclosure_ratio: 0.30,
            unmatched_samples: 5,
            unmatched_sample_chars: 200,
            endpoint_window: 150,
            min_endpoint_terms: 2,
            max_analyses: 20,
        }
    }
}

/// Everything an audit run can be tuned with, loadable from one JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditorOptions {
    pub extraction: ExtractionOptions,
    pub weights: MatchWeights,
    pub compare: CompareOptions,
}
