//! Small text utilities shared by the extractors.
//!
//! Offsets are byte offsets into normalized UTF-8 text. Every window is clamped to char
//! boundaries so slicing never panics on multi-byte input.

/// Largest char boundary `<= idx`.
pub fn floor_boundary(text: &str, idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    let mut idx = idx;
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Smallest char boundary `>= idx`.
pub fn ceil_boundary(text: &str, idx: usize) -> usize {
    if idx >= text.len() {
        return text.len();
    }
    let mut idx = idx;
    while !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// The span `start..end` widened by `radius` bytes on each side, clamped to `text`.
///
/// Returns the window's start offset and the window itself.
pub fn context_window(text: &str, start: usize, end: usize, radius: usize) -> (usize, &str) {
    let lo = floor_boundary(text, start.saturating_sub(radius));
    let hi = ceil_boundary(text, end.saturating_add(radius)).max(lo);
    (lo, &text[lo..hi])
}

/// The span `start..end` widened by `before` bytes on the left and `after` bytes on the right.
pub fn asymmetric_window(text: &str, start: usize, end: usize, before: usize, after: usize) -> &str {
    let lo = floor_boundary(text, start.saturating_sub(before));
    let hi = ceil_boundary(text, end.saturating_add(after)).max(lo);
    &text[lo..hi]
}

/// At most `max_chars` characters from the front of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Every whole-word occurrence of `needle` in `haystack`, ignoring ASCII case.
///
/// Returns `(start, end)` byte spans. Detected names are ASCII, so ASCII case folding keeps
/// offsets aligned with the original text.
pub fn find_word_occurrences(haystack: &str, needle: &str) -> Vec<(usize, usize)> {
    if needle.is_empty() {
        return Vec::new();
    }
    let hay = haystack.to_ascii_lowercase();
    let needle = needle.to_ascii_lowercase();

    hay.match_indices(&needle)
        .map(|(start, m)| (start, start + m.len()))
        .filter(|&(start, end)| {
            let before = hay[..start].chars().next_back();
            let after = hay[end..].chars().next();
            !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
        })
        .collect()
}

/// True when `needle` occurs in `haystack` as a whole word, ignoring ASCII case.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    !find_word_occurrences(haystack, needle).is_empty()
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
