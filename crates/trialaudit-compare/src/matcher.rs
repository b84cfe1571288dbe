//! Passage-to-record matching.
//!
//! Each passage is scored against every registry record from a handful of independent signals
//! and assigned to the single best-scoring record. A passage whose best score is zero goes to the
//! unmatched pool, so every passage lands in exactly one place.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use trialaudit_filing::{Passage, PhaseSet};
use trialaudit_registry::RegistryRecord;

use crate::lexicon::{word_tokens, RuleLexicon};
use crate::options::MatchWeights;

/// Facts pulled out of one passage once, before it is scored against any record.
#[derive(Debug, Clone, Default)]
pub struct PassageClues {
    pub lowered: String,
    pub conditions: BTreeSet<String>,
    pub phases: PhaseSet,
    pub enrollments: Vec<u64>,
    pub tokens: HashSet<String>,
}

impl PassageClues {
    pub fn from_text(text: &str, rules: &RuleLexicon, weights: &MatchWeights) -> Self {
        let lowered = text.to_lowercase();
        Self {
            conditions: rules.conditions_in(&lowered),
            phases: rules.phases_in(text),
            enrollments: rules.enrollments_in(text),
            tokens: word_tokens(&lowered, weights.title_min_token_len),
            lowered,
        }
    }
}

/// Record-side facts the scorer compares against.
#[derive(Debug, Clone, Default)]
pub struct RecordClues {
    pub nct_id: String,
    pub descriptive: String,
    pub phases: PhaseSet,
    pub enrollment: Option<u64>,
    pub title_tokens: HashSet<String>,
}

impl RecordClues {
    pub fn from_record(record: &RegistryRecord, weights: &MatchWeights) -> Self {
        Self {
            nct_id: record.nct_id().to_string(),
            descriptive: record.descriptive_text().to_lowercase(),
            phases: PhaseSet::from_registry(&record.design.phases),
            enrollment: record.design.enrollment_count.filter(|n| *n > 0),
            title_tokens: word_tokens(
                &record.identification.brief_title,
                weights.title_min_token_len,
            ),
        }
    }
}

/// Per-signal contributions to a match score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub identifier: f64,
    pub condition: f64,
    pub phase: f64,
    pub enrollment: f64,
    pub title: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.identifier + self.condition + self.phase + self.enrollment + self.title
    }
}

/// Score one passage against one record.
pub fn score(passage: &PassageClues, record: &RecordClues, weights: &MatchWeights) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown::default();

    if !record.nct_id.is_empty() && passage.lowered.contains(&record.nct_id.to_lowercase()) {
        breakdown.identifier = weights.identifier;
    }

    let shared_conditions = passage
        .conditions
        .iter()
        .filter(|condition| record.descriptive.contains(condition.as_str()))
        .count();
    breakdown.condition = weights.condition * shared_conditions as f64;

    if passage.phases.intersects(&record.phases) {
        breakdown.phase = weights.phase;
    }

    if let Some(count) = record.enrollment {
        let close = passage.enrollments.iter().any(|&stated| {
            (stated as f64 - count as f64).abs() / (count.max(1) as f64)
                < weights.enrollment_tolerance
        });
        if close {
            breakdown.enrollment = weights.enrollment;
        }
    }

    let shared_tokens = record.title_tokens.intersection(&passage.tokens).count();
    if shared_tokens >= weights.title_min_shared {
        breakdown.title = weights.title;
    }

    breakdown
}

/// A passage with the score that placed it in its record's bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPassage {
    pub passage: Passage,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

/// The passages assigned to one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchBucket {
    pub nct_id: String,
    pub passages: Vec<ScoredPassage>,
}

impl MatchBucket {
    /// Concatenated passage text.
    pub fn text(&self) -> String {
        self.passages
            .iter()
            .map(|p| p.passage.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}

/// Result of matching: one bucket per record in input order, plus the unmatched pool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchAssignment {
    pub buckets: Vec<MatchBucket>,
    pub unmatched: Vec<Passage>,
}

impl MatchAssignment {
    pub fn assigned(&self) -> usize {
        self.buckets.iter().map(MatchBucket::len).sum()
    }
}

/// Assign each passage to its best-scoring record.
///
/// Ties go to the earliest record; a best score of zero leaves the passage unmatched.
pub fn assign_passages(
    passages: &[Passage],
    records: &[RegistryRecord],
    rules: &RuleLexicon,
    weights: &MatchWeights,
) -> MatchAssignment {
    let record_clues: Vec<RecordClues> = records
        .iter()
        .map(|record| RecordClues::from_record(record, weights))
        .collect();

    let mut assignment = MatchAssignment {
        buckets: record_clues
            .iter()
            .map(|clues| MatchBucket {
                nct_id: clues.nct_id.clone(),
                passages: Vec::new(),
            })
            .collect(),
        unmatched: Vec::new(),
    };

    for passage in passages {
        let clues = PassageClues::from_text(&passage.text, rules, weights);

        let mut best: Option<(usize, ScoreBreakdown)> = None;
        for (idx, record) in record_clues.iter().enumerate() {
            let breakdown = score(&clues, record, weights);
            let better = match &best {
                Some((_, current)) => breakdown.total() > current.total(),
                None => true,
            };
            if better {
                best = Some((idx, breakdown));
            }
        }

        match best {
            Some((idx, breakdown)) if breakdown.total() > 0.0 => {
                assignment.buckets[idx].passages.push(ScoredPassage {
                    passage: passage.clone(),
                    score: breakdown.total(),
                    breakdown,
                });
            }
            _ => assignment.unmatched.push(passage.clone()),
        }
    }

    tracing::debug!(
        passages = passages.len(),
        records = records.len(),
        assigned = assignment.assigned(),
        unmatched = assignment.unmatched.len(),
        "matched passages to registry records"
    );
    assignment
}
