use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use super::{KeywordTopicDictionary, tokenize};
use crate::constants::heuristic::{SECTOR, UNKNOWN};
use crate::types::ClassificationRecord;

/// Scores dictionary topics by keyword frequency.
///
/// Each matched keyword adds its occurrence count to every topic it lists.
/// The highest score wins; ties go to the topic scored first. `details` are
/// the distinct matched keywords supporting the winner, in the order they
/// first appear in the text.
#[derive(Debug, Clone)]
pub struct KeywordTopicClassifier {
    dictionary: Arc<KeywordTopicDictionary>,
}

impl KeywordTopicClassifier {
    pub fn new(dictionary: Arc<KeywordTopicDictionary>) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> &KeywordTopicDictionary {
        &self.dictionary
    }

    /// Dictionary keywords found in `text`, in order, duplicates kept
    pub fn extract_keywords(&self, text: &str) -> Vec<String> {
        tokenize(text)
            .into_iter()
            .filter(|token| self.dictionary.contains(token))
            .collect()
    }

    /// Accumulated topic scores in the order topics were first touched
    pub fn topic_scores(&self, keywords: &[String]) -> Vec<(String, usize)> {
        let mut scores: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for (keyword, count) in keyword_counts(keywords) {
            let Some(topics) = self.dictionary.topics(keyword) else {
                continue;
            };
            for topic in topics {
                match index.get(topic.as_str()) {
                    Some(&i) => scores[i].1 += count,
                    None => {
                        index.insert(topic.as_str(), scores.len());
                        scores.push((topic.clone(), count));
                    }
                }
            }
        }

        scores
    }

    pub fn classify(&self, text: &str) -> ClassificationRecord {
        let keywords = self.extract_keywords(text);
        let scores = self.topic_scores(&keywords);

        let Some(winner) = best_topic(&scores) else {
            debug!("Heuristic: no dictionary keywords found");
            return ClassificationRecord::new(SECTOR, UNKNOWN, vec![UNKNOWN.to_string()]);
        };

        let details: Vec<String> = keyword_counts(&keywords)
            .into_iter()
            .map(|(keyword, _)| keyword)
            .filter(|keyword| {
                self.dictionary
                    .topics(keyword)
                    .is_some_and(|topics| topics.iter().any(|t| t == winner))
            })
            .map(String::from)
            .collect();

        debug!(
            "Heuristic: '{}' won with {} matched keywords",
            winner,
            keywords.len()
        );
        ClassificationRecord::new(SECTOR, winner, details)
    }
}

/// Distinct keywords with their frequency, in first-occurrence order
fn keyword_counts(keywords: &[String]) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for keyword in keywords {
        match index.get(keyword.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(keyword.as_str(), counts.len());
                counts.push((keyword.as_str(), 1));
            }
        }
    }

    counts
}

/// First topic reaching the maximum score
fn best_topic(scores: &[(String, usize)]) -> Option<&str> {
    let mut best: Option<(&str, usize)> = None;
    for (topic, score) in scores {
        if best.is_none_or(|(_, top)| *score > top) {
            best = Some((topic.as_str(), *score));
        }
    }
    best.map(|(topic, _)| topic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn classifier() -> KeywordTopicClassifier {
        let dictionary = KeywordTopicDictionary::from_entries([
            ("checking", vec!["Checking Accounts"]),
            ("account", vec!["Checking Accounts", "Savings Accounts"]),
            ("fees", vec!["Checking Accounts"]),
        ])
        .unwrap();
        KeywordTopicClassifier::new(Arc::new(dictionary))
    }

    #[test]
    fn test_checking_example() {
        let classifier = classifier();
        let keywords = classifier.extract_keywords("checking account fees checking");
        assert_eq!(
            classifier.topic_scores(&keywords),
            vec![
                ("Checking Accounts".to_string(), 4),
                ("Savings Accounts".to_string(), 1)
            ]
        );

        let record = classifier.classify("checking account fees checking");
        assert_eq!(record.sector, "Private");
        assert_eq!(record.product, "Checking Accounts");
        assert_eq!(record.details, vec!["checking", "account", "fees"]);
    }

    #[test]
    fn test_no_match_returns_unknown() {
        let record = classifier().classify("Welcome to our homepage");
        assert_eq!(
            record,
            ClassificationRecord::new("Private", "Unknown", vec!["Unknown".to_string()])
        );
        assert_eq!(
            classifier().classify(""),
            ClassificationRecord::new("Private", "Unknown", vec!["Unknown".to_string()])
        );
    }

    #[test]
    fn test_tie_goes_to_first_scored_topic() {
        let dictionary = KeywordTopicDictionary::from_entries([
            ("loan", vec!["Personal Loans", "Mortgage Loans"]),
            ("home", vec!["Mortgage Loans"]),
            ("cash", vec!["Personal Loans"]),
        ])
        .unwrap();
        let classifier = KeywordTopicClassifier::new(Arc::new(dictionary));

        // Personal 2, Mortgage 2: Personal Loans was touched first
        assert_eq!(classifier.classify("loan home cash").product, "Personal Loans");
        // Mortgage Loans first touched via "home"
        assert_eq!(classifier.classify("home loan cash").product, "Mortgage Loans");
    }

    #[test]
    fn test_details_only_support_winner() {
        let dictionary = KeywordTopicDictionary::from_entries([
            ("card", vec!["Credit Cards"]),
            ("cashback", vec!["Credit Cards"]),
            ("savings", vec!["Savings Accounts"]),
        ])
        .unwrap();
        let classifier = KeywordTopicClassifier::new(Arc::new(dictionary));

        let record = classifier.classify("Card with cashback. Card, savings.");
        assert_eq!(record.product, "Credit Cards");
        assert_eq!(record.details, vec!["card", "cashback"]);
    }

    #[test]
    fn test_case_insensitive_matching() {
        let record = classifier().classify("CHECKING Account");
        assert_eq!(record.product, "Checking Accounts");
        assert_eq!(record.details, vec!["checking", "account"]);
    }

    #[test]
    fn test_builtin_dictionary_classifies_mortgage_page() {
        let classifier =
            KeywordTopicClassifier::new(Arc::new(KeywordTopicDictionary::builtin().unwrap()));
        let record = classifier.classify(
            "Buy your new home with a fixed-rate mortgage. Low down payment, refinance options.",
        );
        assert_eq!(record.product, "Mortgage Loans");
        assert!(record.details.contains(&"mortgage".to_string()));
    }

    proptest! {
        #[test]
        fn prop_classification_is_deterministic(
            words in proptest::collection::vec(
                prop_oneof![
                    Just("checking"), Just("account"), Just("fees"),
                    Just("the"), Just("bank"), Just("CHECKING"),
                ],
                0..30,
            )
        ) {
            let text = words.join(" ");
            let classifier = classifier();
            let first = classifier.classify(&text);
            let second = classifier.classify(&text);

            prop_assert_eq!(&first.product, &second.product);
            let a: HashSet<_> = first.details.iter().collect();
            let b: HashSet<_> = second.details.iter().collect();
            prop_assert_eq!(a, b);
            prop_assert_eq!(first.sector.as_str(), "Private");
        }
    }
}
