//! Word tokenization for overlap scoring

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// A word is a maximal run of alphanumeric or underscore characters (Unicode-aware).
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Split `text` into its set of lowercase word tokens.
///
/// Case folding happens before set construction, so `Book` and `book` collapse to one
/// token. Repeated words count once: overlap scoring measures presence, not frequency.
pub fn tokenize(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}
