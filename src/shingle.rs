// Text normalization and character shingling.

use regex::Regex;
use std::collections::HashSet;

/// Normalize text the way the shingler expects: lowercase, strip every
/// non-word/non-whitespace character, collapse whitespace runs to a single
/// space, trim.
pub fn normalize_text(text: &str) -> String {
    let text = text.to_lowercase();

    let strip_re = Regex::new(r"[^\w\s]").unwrap();
    let text = strip_re.replace_all(&text, "");

    let ws_re = Regex::new(r"\s+").unwrap();
    let text = ws_re.replace_all(&text, " ");

    text.trim().to_string()
}

/// The set (not multiset) of all contiguous `k`-character substrings of the
/// normalized text. Shorter-than-`k` documents yield an empty set; callers
/// map that to a sentinel signature rather than an error.
pub fn shingle_set(text: &str, k: usize) -> HashSet<String> {
    let normalized = normalize_text(text);
    let chars: Vec<char> = normalized.chars().collect();

    if chars.len() < k {
        return HashSet::new();
    }

    let mut shingles = HashSet::with_capacity(chars.len() - k + 1);
    for window in chars.windows(k) {
        shingles.insert(window.iter().collect::<String>());
    }
    shingles
}
