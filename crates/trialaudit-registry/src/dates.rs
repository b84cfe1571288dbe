//! Registry dates.
//!
//! Registries publish dates at year, month or day precision (`2022`, `2022-06`, `2022-06-15`).
//! Missing parts are read as the first month or day so partial dates still order correctly.

use chrono::NaiveDate;

pub type PartialDate = NaiveDate;

/// Parse a registry or filing date; `None` for empty or malformed input.
pub fn parse_partial_date(value: &str) -> Option<PartialDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let mut parts = value.splitn(3, '-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 1,
    };
    let day: u32 = match parts.next() {
        Some(d) => d.parse().ok()?,
        None => 1,
    };

    let parsed = NaiveDate::from_ymd_opt(year, month, day);
    if parsed.is_none() {
        tracing::debug!(value, "unparseable date");
    }
    parsed
}

/// True when `start` parses and falls strictly after `filing`.
///
/// Either date failing to parse means there is no temporal signal.
pub fn starts_after(start: &str, filing: &str) -> bool {
    match (parse_partial_date(start), parse_partial_date(filing)) {
        (Some(start), Some(filing)) => start > filing,
        _ => false,
    }
}
