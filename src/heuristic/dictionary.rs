//! Keyword/Topic Dictionary
//!
//! Static evidence table mapping a lowercase keyword to the topics it
//! supports, in listed order. Loaded once at startup; any malformed entry is
//! a configuration error.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use super::tokenize;
use crate::types::{BankscopeError, Result, ResultExt};

const BUILTIN_KEYWORDS: &str = include_str!("../../data/keywords.json");

static GLOBAL: OnceLock<Arc<KeywordTopicDictionary>> = OnceLock::new();

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct RawDictionary(HashMap<String, Vec<String>>);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordTopicDictionary {
    entries: HashMap<String, Vec<String>>,
}

impl KeywordTopicDictionary {
    /// Build from `(keyword, topics)` pairs, validating every entry
    pub fn from_entries<I, K, T>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Vec<T>)>,
        K: Into<String>,
        T: Into<String>,
    {
        let mut dictionary = HashMap::new();

        for (keyword, topics) in entries {
            let keyword = keyword.into().trim().to_lowercase();
            if keyword.is_empty() {
                return Err(BankscopeError::Config(
                    "Keyword dictionary contains an empty keyword".to_string(),
                ));
            }

            let topics: Vec<String> = topics.into_iter().map(Into::into).collect();
            if topics.is_empty() {
                return Err(BankscopeError::Config(format!(
                    "Keyword '{}' has no topics",
                    keyword
                )));
            }
            if topics.iter().any(|t| t.trim().is_empty()) {
                return Err(BankscopeError::Config(format!(
                    "Keyword '{}' has an empty topic name",
                    keyword
                )));
            }

            if tokenize(&keyword).len() != 1 {
                warn!(
                    "Keyword '{}' is not a single word token and will never match",
                    keyword
                );
            }

            if dictionary.insert(keyword.clone(), topics).is_some() {
                return Err(BankscopeError::Config(format!(
                    "Keyword '{}' is defined more than once",
                    keyword
                )));
            }
        }

        Ok(Self {
            entries: dictionary,
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: RawDictionary =
            serde_json::from_str(content).config_context("Invalid keyword dictionary (JSON)")?;
        Self::from_entries(raw.0)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let raw: RawDictionary =
            serde_yaml::from_str(content).config_context("Invalid keyword dictionary (YAML)")?;
        Self::from_entries(raw.0)
    }

    /// Load a `.json`, `.yaml` or `.yml` dictionary file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).config_context(format!(
            "Failed to read keyword dictionary {}",
            path.display()
        ))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let dictionary = match extension.as_deref() {
            Some("json") => Self::from_json_str(&content),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            _ => Err(BankscopeError::Config(format!(
                "Unsupported keyword dictionary format: {} (expected .json, .yaml or .yml)",
                path.display()
            ))),
        }?;

        debug!(
            "Loaded {} keywords from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    /// Dictionary shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_KEYWORDS)
    }

    /// Install the process-wide dictionary. Fails if one is already set.
    pub fn install_global(dictionary: KeywordTopicDictionary) -> Result<Arc<Self>> {
        let dictionary = Arc::new(dictionary);
        GLOBAL.set(dictionary.clone()).map_err(|_| {
            BankscopeError::Config("Keyword dictionary is already installed".to_string())
        })?;
        Ok(dictionary)
    }

    /// The installed process-wide dictionary, if any
    pub fn global() -> Option<Arc<Self>> {
        GLOBAL.get().cloned()
    }

    /// Topics for `keyword`, in listed order
    pub fn topics(&self, keyword: &str) -> Option<&[String]> {
        self.entries.get(keyword).map(Vec::as_slice)
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.entries.contains_key(keyword)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
