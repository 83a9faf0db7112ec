//! Utility functions for string processing.

use unicode_normalization::UnicodeNormalization;

/// Maximum display-label length before truncation.
pub const LABEL_DISPLAY_LIMIT: usize = 40;

/// Normalize a string for matching: lowercase, strip diacritics, and collapse whitespace.
///
/// This enables fuzzy matching between ASCII and accented versions:
/// - "café" → "cafe"
/// - "naïve" → "naive"
///
/// # Algorithm
///
/// 1. NFD normalize (decompose characters into base + combining marks)
/// 2. Filter out combining marks (category Mn = Mark, Nonspacing)
/// 3. Lowercase
/// 4. Collapse whitespace
pub fn normalize(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check if a character is a combining mark (diacritic).
///
/// Combining marks have Unicode category "Mn" (Mark, Nonspacing).
/// Examples: ́ (acute), ̄ (macron), ̣ (dot below)
fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
        '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
        '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
        '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
    )
}

/// Truncate a display label to [`LABEL_DISPLAY_LIMIT`] characters, appending an
/// ellipsis when anything was cut.
///
/// Character-based, not byte-based, so multi-byte labels never get split
/// mid-codepoint.
pub fn truncate_label(label: &str) -> String {
    let count = label.chars().count();
    if count <= LABEL_DISPLAY_LIMIT {
        return label.to_string();
    }
    let mut out: String = label.chars().take(LABEL_DISPLAY_LIMIT).collect();
    out.push('…');
    out
}

/// Does `haystack` contain `needle` after normalization?
///
/// The containment test used by the label filter axis and literal queries.
pub fn contains_normalized(haystack: &str, needle: &str) -> bool {
    normalize(haystack).contains(&normalize(needle))
}
