//! Deadline decorator for any [`LlmProvider`].

use async_trait::async_trait;
use std::time::Duration;

use super::{LlmProvider, LlmResponse};
use crate::ai::timeout::with_timeout;
use crate::types::Result;

/// Wraps a provider so every `generate` call is bounded by `timeout`.
///
/// An expired deadline surfaces as a `Timeout` error, which the pipeline
/// treats like any other service failure.
pub struct TimedProvider<P> {
    inner: P,
    timeout: Duration,
}

impl<P: LlmProvider> TimedProvider<P> {
    pub fn new(inner: P, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<P: LlmProvider> LlmProvider for TimedProvider<P> {
    async fn generate(&self, prompt: &str) -> Result<LlmResponse> {
        let operation = format!("{} generate", self.inner.name());
        with_timeout(self.timeout, self.inner.generate(prompt), &operation).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BankscopeError;

    struct SlowProvider {
        delay: Duration,
    }

    #[async_trait]
    impl LlmProvider for SlowProvider {
        async fn generate(&self, _prompt: &str) -> Result<LlmResponse> {
            tokio::time::sleep(self.delay).await;
            Ok(LlmResponse::content_only("done"))
        }

        fn name(&self) -> &str {
            "slow"
        }

        fn model(&self) -> &str {
            "slow-model"
        }
    }

    #[tokio::test]
    async fn test_fast_call_passes_through() {
        let provider = TimedProvider::new(
            SlowProvider {
                delay: Duration::from_millis(1),
            },
            Duration::from_secs(1),
        );
        let response = provider.generate("hi").await.unwrap();
        assert_eq!(response.content, "done");
        assert_eq!(provider.name(), "slow");
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let provider = TimedProvider::new(
            SlowProvider {
                delay: Duration::from_secs(2),
            },
            Duration::from_millis(20),
        );
        let err = provider.generate("hi").await.unwrap_err();
        assert!(matches!(err, BankscopeError::Timeout { .. }));
        assert!(err.to_string().contains("slow generate"));
    }
}
