//! Keyword Heuristic
//!
//! Deterministic classification without a generative service: page tokens
//! are matched against a [`KeywordTopicDictionary`] and topic scores are
//! aggregated to pick one product.

mod classifier;
mod dictionary;

pub use classifier::KeywordTopicClassifier;
pub use dictionary::KeywordTopicDictionary;

use regex::Regex;
use std::sync::LazyLock;

/// Words: letters and digits, allowing inner apostrophes and hyphens
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['’-][\p{L}\p{N}]+)*").expect("token pattern is valid")
});

/// Lowercase `text` and split it into word tokens, in order
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("No-fee Checking, 2.5% APY! Don't wait."),
            vec!["no-fee", "checking", "2", "5", "apy", "don't", "wait"]
        );
    }

    #[test]
    fn test_tokenize_unicode() {
        assert_eq!(tokenize("Épargne ÉCO"), vec!["épargne", "éco"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("  ... !!").is_empty());
    }
}
