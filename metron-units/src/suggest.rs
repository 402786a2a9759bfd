//! "Did you mean" suggestions for unresolved unit tokens

use metron_core::{ErrorDetails, UnitRole};
use crate::alias::{normalize_unit_text, AliasIndex};
use crate::definition::UnitRef;

/// Scores at or below this are not worth suggesting
pub const MIN_SIMILARITY: f64 = 0.3;
pub const MAX_SUGGESTIONS: usize = 5;

/// Shown when nothing in the index is close enough
pub const GENERIC_GUIDANCE: &str =
    "Check the spelling, or use a full unit name such as 'meter', 'pound' or 'gallon'";

/// A candidate alias with its similarity score
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub alias: String,
    pub unit: UnitRef,
    pub score: f64,
}

/// Character-level edit distance
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// `1 - distance / max(len)`, in `[0, 1]`
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Rank every alias in the index against `token`
pub fn suggest_aliases(token: &str, index: &AliasIndex) -> Vec<Suggestion> {
    let needle = normalize_unit_text(token);

    let mut scored: Vec<Suggestion> = index
        .entries()
        .filter_map(|(alias, unit)| {
            let score = similarity(&needle, alias);
            (score > MIN_SIMILARITY).then(|| Suggestion {
                alias: alias.to_string(),
                unit: unit.clone(),
                score,
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.alias.cmp(&b.alias))
    });
    scored.truncate(MAX_SUGGESTIONS);
    scored
}

/// UNKNOWN_UNIT error with ranked suggestions, or the generic guidance line
pub fn unknown_unit_error(token: &str, role: UnitRole, index: &AliasIndex) -> ErrorDetails {
    let suggestions = suggest_aliases(token, index);
    let err = ErrorDetails::unknown_unit(token.trim(), role);
    if suggestions.is_empty() {
        err.with_suggestion(GENERIC_GUIDANCE)
    } else {
        err.with_suggestions(suggestions.into_iter().map(|s| s.alias))
    }
}
