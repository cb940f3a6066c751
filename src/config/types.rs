//! Configuration Types
//!
//! All configuration structures with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ai::provider::ProviderConfig;
use crate::constants::content::{MAX_SITE_CONTENT_CHARS, MAX_WORDS_PER_FIELD};
use crate::constants::network::DEFAULT_TIMEOUT_SECS;
use crate::pipeline::Topology;
use crate::types::{BankscopeError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Generative service settings
    pub llm: LlmConfig,

    /// Extraction pipeline settings
    pub pipeline: PipelineSettings,

    /// Keyword heuristic settings
    pub heuristic: HeuristicConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            pipeline: PipelineSettings::default(),
            heuristic: HeuristicConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `BankscopeError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(BankscopeError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(BankscopeError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.max_tokens == 0 {
            return Err(BankscopeError::Config(
                "LLM max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.pipeline.max_content_chars == 0 {
            return Err(BankscopeError::Config(
                "Pipeline max_content_chars must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name: "openai" or "ollama"
    pub provider: String,

    /// Model name; provider default when unset
    pub model: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Temperature for generation (0.0 = deterministic)
    pub temperature: f32,

    /// Custom API base URL
    pub api_base: Option<String>,

    /// Maximum tokens to generate
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: 0.0,
            api_base: None,
            max_tokens: 512,
        }
    }
}

impl LlmConfig {
    /// Provider settings; the API key comes from the environment
    pub fn to_provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
            temperature: self.temperature,
            api_key: None,
            api_base: self.api_base.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

// =============================================================================
// Pipeline Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// `single-stage` or `two-stage`
    pub topology: Topology,

    /// Page text beyond this many characters is dropped before prompting
    pub max_content_chars: usize,

    /// Advisory word limit per field
    pub max_words_per_field: usize,

    /// Closed product catalog; free-text products when empty
    pub product_catalog: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            topology: Topology::SingleStage,
            max_content_chars: MAX_SITE_CONTENT_CHARS,
            max_words_per_field: MAX_WORDS_PER_FIELD,
            product_catalog: Vec::new(),
        }
    }
}

// =============================================================================
// Heuristic Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Keyword dictionary file (.json/.yaml); built-in dictionary when unset
    pub keywords_path: Option<PathBuf>,
}
