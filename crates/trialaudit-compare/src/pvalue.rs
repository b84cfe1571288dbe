//! Reported p-values.
//!
//! Registries post p-values as text: `0.21`, `<0.001`, `≤ 0.05`, `>0.05`, sometimes `NS` or a
//! footnote. Only values with a parseable number are judged.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Equal,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PValue {
    pub relation: Relation,
    pub value: f64,
}

impl PValue {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw
            .trim()
            .trim_start_matches(|c: char| c.eq_ignore_ascii_case(&'p'))
            .trim_start();
        let (relation, rest) = if let Some(rest) = trimmed
            .strip_prefix("<=")
            .or_else(|| trimmed.strip_prefix('≤'))
        {
            (Relation::LessOrEqual, rest)
        } else if let Some(rest) = trimmed
            .strip_prefix(">=")
            .or_else(|| trimmed.strip_prefix('≥'))
        {
            (Relation::GreaterOrEqual, rest)
        } else if let Some(rest) = trimmed.strip_prefix('<') {
            (Relation::Less, rest)
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            (Relation::Greater, rest)
        } else if let Some(rest) = trimmed.strip_prefix('=') {
            (Relation::Equal, rest)
        } else {
            (Relation::Equal, trimmed)
        };

        let number: String = rest
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let value: f64 = number.parse().ok()?;
        (0.0..=1.0).contains(&value).then_some(Self { relation, value })
    }

    /// Whether the true p-value is above `threshold`; `None` when the bound cannot tell.
    pub fn exceeds(&self, threshold: f64) -> Option<bool> {
        match self.relation {
            Relation::Equal => Some(self.value > threshold),
            Relation::Less | Relation::LessOrEqual => (self.value <= threshold).then_some(false),
            Relation::Greater | Relation::GreaterOrEqual => (self.value >= threshold).then_some(true),
        }
    }
}
