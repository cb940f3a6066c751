//! Ollama Local LLM Provider
//!
//! Text completion through a locally running Ollama server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::{
    ErrorClassifier, LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming,
    TokenUsage,
};
use crate::types::{BankscopeError, Result};

const DEFAULT_API_BASE: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3:latest";
const PROVIDER_NAME: &str = "ollama";

/// Ollama Local LLM Provider
pub struct OllamaProvider {
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl OllamaProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let api_base = Self::validate_endpoint(&api_base)?;

        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BankscopeError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_base,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    /// Only http/https endpoints are accepted; non-local hosts are logged.
    fn validate_endpoint(endpoint: &str) -> Result<String> {
        let url = url::Url::parse(endpoint).map_err(|e| {
            BankscopeError::Config(format!("Invalid Ollama endpoint URL '{}': {}", endpoint, e))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(BankscopeError::Config(format!(
                "Ollama endpoint must use http or https scheme, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str()
            && !matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]")
        {
            warn!(
                "Ollama endpoint is not localhost: {}. Ensure this is intentional.",
                host
            );
        }

        let mut result = url.to_string();
        if result.ends_with('/') {
            result.pop();
        }
        Ok(result)
    }

    fn build_request(&self, prompt: &str) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        info!(
            "Generating with Ollama (model: {}, temperature: {})",
            self.model, self.temperature
        );

        let start_time = Instant::now();
        let request = self.build_request(prompt);
        let url = format!("{}/api/generate", self.api_base);

        debug!("Sending request to Ollama API");

        let response = self.client.post(&url).json(&request).send().await.map_err(|e| {
            if e.is_connect() {
                ErrorClassifier::classify(
                    &format!(
                        "Failed to connect to Ollama at {}. Is Ollama running? Start with: ollama serve",
                        self.api_base
                    ),
                    PROVIDER_NAME,
                )
            } else {
                ErrorClassifier::classify(&format!("Ollama request failed: {}", e), PROVIDER_NAME)
            }
        })?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("Ollama API error ({}): {}", status, body),
                PROVIDER_NAME,
            )
            .into());
        }

        let response_body: OllamaResponse = response.json().await.map_err(|e| {
            BankscopeError::LlmApi(format!("Failed to decode Ollama response: {}", e))
        })?;

        let usage = match (response_body.prompt_eval_count, response_body.eval_count) {
            (Some(prompt_count), Some(eval_count)) => {
                TokenUsage::from_ollama(prompt_count, eval_count)
            }
            _ => TokenUsage::estimated(prompt, &response_body.response),
        };

        // Local model, no API cost
        Ok(LlmResponse::with_metrics(
            response_body.response,
            usage,
            0.0,
            ResponseTiming::from_duration(elapsed),
            ResponseMetadata {
                model: self.model.clone(),
                provider: PROVIDER_NAME.to_string(),
            },
        ))
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ollama_config() -> ProviderConfig {
        ProviderConfig {
            provider: "ollama".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let provider = OllamaProvider::new(ollama_config()).unwrap();
        assert_eq!(provider.api_base, DEFAULT_API_BASE);
        assert_eq!(provider.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let config = ProviderConfig {
            api_base: Some("file:///etc/passwd".to_string()),
            ..ollama_config()
        };
        let err = OllamaProvider::new(config).err().unwrap();
        assert!(matches!(err, BankscopeError::Config(_)));
    }

    #[test]
    fn test_trailing_slash_removed() {
        let config = ProviderConfig {
            api_base: Some("http://127.0.0.1:11434/".to_string()),
            ..ollama_config()
        };
        let provider = OllamaProvider::new(config).unwrap();
        assert_eq!(provider.api_base, "http://127.0.0.1:11434");
    }

    #[test]
    fn test_request_is_plain_text_generation() {
        let provider = OllamaProvider::new(ollama_config()).unwrap();
        let json = serde_json::to_value(provider.build_request("hello")).unwrap();
        assert_eq!(json["prompt"], "hello");
        assert_eq!(json["stream"], false);
        assert!(json.get("format").is_none());
    }
}
