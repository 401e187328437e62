//! Entity Normalizer
//!
//! Derives a stable identifier fragment from an entity's surface text.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize surface text into an identifier fragment.
///
/// Decomposes (NFD), drops combining marks, lowercases, trims, turns each
/// whitespace run into a single `_` and removes every character that is
/// neither alphanumeric nor `_`. Total and idempotent; the empty string
/// maps to the empty fragment.
pub fn normalize_fragment(text: &str) -> String {
    let stripped: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let lowered = stripped.to_lowercase();
    let underscored = lowered.split_whitespace().collect::<Vec<_>>().join("_");
    underscored
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Lowercase and strip diacritics without touching whitespace or punctuation
pub fn fold_accents(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}
