//! Clinical phase labels and their canonical registry form.
//!
//! Filings write phases loosely ("Phase 1b", "Phase 2b/3"); registries use a closed enum
//! (`EARLY_PHASE1`, `PHASE1` … `PHASE4`). A [`PhaseLabel`] is the parsed filing form and a
//! [`PhaseSet`] the canonical set both sides are compared in.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Registry phase values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "EARLY_PHASE1")]
    EarlyPhase1,
    #[serde(rename = "PHASE1")]
    Phase1,
    #[serde(rename = "PHASE2")]
    Phase2,
    #[serde(rename = "PHASE3")]
    Phase3,
    #[serde(rename = "PHASE4")]
    Phase4,
}

impl Phase {
    pub fn number(&self) -> u8 {
        match self {
            Phase::EarlyPhase1 | Phase::Phase1 => 1,
            Phase::Phase2 => 2,
            Phase::Phase3 => 3,
            Phase::Phase4 => 4,
        }
    }

    pub fn as_registry(&self) -> &'static str {
        match self {
            Phase::EarlyPhase1 => "EARLY_PHASE1",
            Phase::Phase1 => "PHASE1",
            Phase::Phase2 => "PHASE2",
            Phase::Phase3 => "PHASE3",
            Phase::Phase4 => "PHASE4",
        }
    }

    /// Parse a registry value; `NA` and unknown values yield `None`.
    pub fn from_registry(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EARLY_PHASE1" => Some(Phase::EarlyPhase1),
            "PHASE1" => Some(Phase::Phase1),
            "PHASE2" => Some(Phase::Phase2),
            "PHASE3" => Some(Phase::Phase3),
            "PHASE4" => Some(Phase::Phase4),
            _ => None,
        }
    }

    /// Registry phases a single filing component ("1", "1b", "2a", …) may correspond to.
    fn for_component(component: &str) -> &'static [Phase] {
        match component {
            "1" | "1a" => &[Phase::Phase1, Phase::EarlyPhase1],
            "1b" => &[Phase::Phase1],
            "2" | "2a" | "2b" => &[Phase::Phase2],
            "3" | "3a" | "3b" => &[Phase::Phase3],
            "4" => &[Phase::Phase4],
            _ => &[],
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_registry())
    }
}

/// A phase label as written in a filing, e.g. `Phase 2b/3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhaseLabel {
    components: Vec<String>,
}

impl PhaseLabel {
    /// Parse `Phase <n>[a|b][/<n>[a|b]]`, tolerating case and spacing differences.
    pub fn parse(label: &str) -> Option<Self> {
        let lowered = label.trim().to_ascii_lowercase();
        let rest = lowered.strip_prefix("phase")?.trim_start();
        let components: Vec<String> = rest
            .split('/')
            .map(|part| part.trim().to_string())
            .collect();
        let valid = !components.is_empty()
            && components.len() <= 2
            && components.iter().all(|c| {
                let mut chars = c.chars();
                matches!(chars.next(), Some(d) if d.is_ascii_digit())
                    && matches!(chars.next(), None | Some('a') | Some('b'))
                    && chars.next().is_none()
            });
        valid.then_some(Self { components })
    }

    pub fn is_combined(&self) -> bool {
        self.components.len() == 2
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Canonical registry phases this label claims.
    pub fn phases(&self) -> PhaseSet {
        PhaseSet(
            self.components
                .iter()
                .flat_map(|c| Phase::for_component(c).iter().copied())
                .collect(),
        )
    }
}

impl fmt::Display for PhaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Phase {}", self.components.join("/"))
    }
}

/// A canonical set of registry phases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseSet(pub BTreeSet<Phase>);

impl PhaseSet {
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a PhaseLabel>) -> Self {
        let mut set = BTreeSet::new();
        for label in labels {
            set.extend(label.phases().0);
        }
        Self(set)
    }

    /// Registry strings; unknown values such as `NA` are dropped.
    pub fn from_registry<S: AsRef<str>>(values: &[S]) -> Self {
        Self(
            values
                .iter()
                .filter_map(|v| Phase::from_registry(v.as_ref()))
                .collect(),
        )
    }

    pub fn to_registry(&self) -> Vec<String> {
        self.0.iter().map(|p| p.as_registry().to_string()).collect()
    }

    pub fn numbers(&self) -> BTreeSet<u8> {
        self.0.iter().map(Phase::number).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, phase: Phase) -> bool {
        self.0.contains(&phase)
    }

    pub fn intersects(&self, other: &PhaseSet) -> bool {
        !self.0.is_disjoint(&other.0)
    }

    pub fn extend(&mut self, other: &PhaseSet) {
        self.0.extend(other.0.iter().copied());
    }
}

/// Every phase label in `text`, in order of appearance (duplicates kept).
pub fn phases_in_text(text: &str, pattern: &Regex) -> Vec<PhaseLabel> {
    pattern
        .find_iter(text)
        .filter_map(|m| PhaseLabel::parse(m.as_str()))
        .collect()
}
