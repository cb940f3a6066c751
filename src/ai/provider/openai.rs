//! OpenAI API Provider
//!
//! Text completion through OpenAI's Chat Completions API.
//! The prompt is sent as a single user message and the first choice's text
//! is returned verbatim.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use super::{
    ErrorClassifier, LlmProvider, LlmResponse, ProviderConfig, ResponseMetadata, ResponseTiming,
    TokenUsage,
};
use crate::constants::network::CONNECTION_TIMEOUT_SECS;
use crate::constants::pricing::OPENAI_MODEL_PRICES;
use crate::types::{BankscopeError, Result};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const PROVIDER_NAME: &str = "openai";

/// OpenAI API Provider with secure API key handling
pub struct OpenAiProvider {
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let api_key_str = config
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                BankscopeError::Config(
                    "OpenAI API key not found. Set OPENAI_API_KEY env var or provide in config"
                        .to_string(),
                )
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let model = config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| BankscopeError::LlmApi(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key_str),
            api_base,
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, prompt: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        info!(
            "Generating with OpenAI (model: {}, temperature: {})",
            self.model, self.temperature
        );

        let start_time = Instant::now();
        let request = self.build_request(prompt);
        let url = format!("{}/chat/completions", self.api_base);

        debug!("Sending request to OpenAI API");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ErrorClassifier::classify(&format!("OpenAI request failed: {}", e), PROVIDER_NAME)
            })?;

        let elapsed = start_time.elapsed();

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!("OpenAI API error ({}): {}", status, body),
                PROVIDER_NAME,
            )
            .into());
        }

        let response_body: ChatCompletionResponse = response.json().await.map_err(|e| {
            BankscopeError::LlmApi(format!("Failed to decode OpenAI response: {}", e))
        })?;

        self.build_response(response_body, prompt, elapsed)
    }

    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }
}

impl OpenAiProvider {
    fn build_response(
        &self,
        response_body: ChatCompletionResponse,
        prompt: &str,
        elapsed: Duration,
    ) -> Result<LlmResponse> {
        let content = response_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| BankscopeError::LlmApi("No content in OpenAI response".to_string()))?;

        let usage = response_body
            .usage
            .map(|u| TokenUsage::from_openai(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_else(|| TokenUsage::estimated(prompt, &content));

        debug!(
            "Received {} chars from OpenAI in {}ms",
            content.len(),
            elapsed.as_millis()
        );

        let cost_usd = estimate_cost(&self.model, &usage);

        Ok(LlmResponse::with_metrics(
            content,
            usage,
            cost_usd,
            ResponseTiming::from_duration(elapsed),
            ResponseMetadata {
                model: self.model.clone(),
                provider: PROVIDER_NAME.to_string(),
            },
        ))
    }
}

/// USD cost of `usage` at the list price of `model`; 0 for unpriced models
fn estimate_cost(model: &str, usage: &TokenUsage) -> f64 {
    let price = OPENAI_MODEL_PRICES
        .iter()
        .filter(|(prefix, _, _)| model.starts_with(*prefix))
        .max_by_key(|(prefix, _, _)| prefix.len());

    match price {
        Some((_, input, output)) => {
            (usage.input_tokens as f64 * input + usage.output_tokens as f64 * output) / 1_000_000.0
        }
        None => {
            debug!("No price known for model {}, recording zero cost", model);
            0.0
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<UsageInfo>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new(ProviderConfig {
            api_key: Some("sk-test".to_string()),
            model: Some("gpt-test".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_build_request_single_user_message() {
        let request = provider().build_request("Classify this");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-test");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "Classify this");
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn test_debug_redacts_key() {
        let debug = format!("{:?}", provider());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-test"));
    }

    #[test]
    fn test_decode_response() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "{\"sector\": \"x\"}"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;
        let decoded: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            decoded.choices[0].message.content.as_deref(),
            Some("{\"sector\": \"x\"}")
        );
        assert_eq!(decoded.usage.unwrap().prompt_tokens, 12);
    }

    fn assert_cost(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_response_cost_from_reported_usage() {
        let provider = OpenAiProvider::new(ProviderConfig {
            api_key: Some("sk-test".to_string()),
            model: Some("gpt-4o-mini".to_string()),
            ..Default::default()
        })
        .unwrap();
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "{}"}}],
            "usage": {"prompt_tokens": 1000, "completion_tokens": 500, "total_tokens": 1500}
        }"#;
        let decoded: ChatCompletionResponse = serde_json::from_str(body).unwrap();

        let response = provider
            .build_response(decoded, "prompt", Duration::from_millis(5))
            .unwrap();
        assert_eq!(response.usage.total(), 1500);
        assert_cost(response.cost_usd, 0.00045);
    }

    #[test]
    fn test_estimate_cost_prefers_longest_prefix() {
        let usage = TokenUsage::from_openai(1_000_000, 1_000_000);
        assert_cost(estimate_cost("gpt-4o-mini-2024-07-18", &usage), 0.75);
        assert_cost(estimate_cost("gpt-4o-2024-08-06", &usage), 12.5);
        assert_cost(estimate_cost("gpt-4", &usage), 90.0);
    }

    #[test]
    fn test_estimate_cost_unknown_model_is_zero() {
        let usage = TokenUsage::from_openai(1000, 1000);
        assert_eq!(estimate_cost("my-finetune", &usage), 0.0);
    }
}
