//! Text normalization and fuzzy hotel-name matching.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalizes free text for token comparison.
///
/// Applies compatibility decomposition, drops combining marks, lowercases,
/// trims and collapses whitespace runs to a single space. Dotless `ı` has no
/// decomposition, so it is folded to `i` explicitly.
pub fn normalize(s: &str) -> String {
    let stripped: String = s
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == 'ı' { 'i' } else { c })
        .collect();

    stripped.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Counts how many tokens of `target` occur as substrings of `candidate`.
///
/// Both sides are normalized first. A target without tokens scores 0.
pub fn name_match_score(candidate: &str, target: &str) -> usize {
    let candidate = normalize(candidate);
    let target = normalize(target);

    target.split(' ').filter(|tok| !tok.is_empty() && candidate.contains(tok)).count()
}
