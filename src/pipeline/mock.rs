//! Scripted provider shared by pipeline tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::ai::provider::{LlmProvider, LlmResponse, TokenUsage};
use crate::types::{BankscopeError, Result};

/// Replays scripted completions in order and records every prompt it sees.
///
/// `Err(msg)` entries fail the call with `LlmApi(msg)`. Running out of
/// script is also an error, so an unexpected extra call fails the test.
pub(crate) struct ScriptedProvider {
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub(crate) fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = std::result::Result<&'static str, &'static str>>,
    {
        Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|r| r.map(String::from).map_err(String::from))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(content)) => {
                let mut response = LlmResponse::content_only(content);
                response.usage = TokenUsage {
                    input_tokens: 10,
                    output_tokens: 5,
                };
                response.cost_usd = 0.001;
                Ok(response)
            }
            Some(Err(message)) => Err(BankscopeError::LlmApi(message)),
            None => Err(BankscopeError::LlmApi("script exhausted".to_string())),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
