//! Keyword classifiers for intake answers.
//!
//! Pure, deterministic, case-insensitive substring matching. The keyword
//! lists and their check order are load-bearing: an answer containing
//! keywords from both sets resolves to whichever set is checked first.

use super::model::{Experience, Flexibility};

const NEW_KEYWORDS: [&str; 4] = ["new", "starting", "first time", "venture"];
const BRANCH_KEYWORDS: [&str; 4] = ["branch", "existing", "expand", "already"];

const FLEXIBLE_KEYWORDS: [&str; 4] = ["open", "flexible", "consider", "yes"];
const NOT_FLEXIBLE_KEYWORDS: [&str; 4] = ["stick", "no", "only", "specific"];

/// Classify an experience answer as New or Branch, or pass it through
/// verbatim when no keyword matches.
pub fn interpret_experience(answer: &str) -> Experience {
    let lower = answer.to_lowercase();
    if NEW_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Experience::New
    } else if BRANCH_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Experience::Branch
    } else {
        Experience::Unclassified(answer.to_string())
    }
}

/// Classify a flexibility answer, with the same fallback behavior.
pub fn interpret_flexibility(answer: &str) -> Flexibility {
    let lower = answer.to_lowercase();
    if FLEXIBLE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Flexibility::Flexible
    } else if NOT_FLEXIBLE_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Flexibility::NotFlexible
    } else {
        Flexibility::Unclassified(answer.to_string())
    }
}

/// Bound an answer to `max_words` words, marking truncation with an
/// ellipsis. Answers at or under the limit come back unchanged.
pub fn concise_summary(answer: &str, max_words: usize) -> String {
    let words: Vec<&str> = answer.split_whitespace().collect();
    if words.len() <= max_words {
        answer.to_string()
    } else {
        format!("{}...", words[..max_words].join(" "))
    }
}
