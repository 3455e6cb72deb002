//! Utility functions and helpers.

pub mod http;

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a displayed count such as `1,234` into a number.
///
/// Returns `None` for anything that is not a plain non-negative integer
/// once thousands separators and whitespace are removed.
pub fn parse_count(text: &str) -> Option<u64> {
    let digits: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Whether the text is a bare number (thousands separators allowed).
pub fn is_numeric(text: &str) -> bool {
    parse_count(text).is_some()
}
