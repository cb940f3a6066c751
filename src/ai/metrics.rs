//! Usage Accounting
//!
//! The pipeline reports every generative service call through the
//! [`UsageRecorder`] interface right after the call returns.
//!
//! ## Usage
//!
//! ```ignore
//! let metrics = create_shared_metrics("session-123");
//! let config = PipelineConfig::new(provider).with_recorder(metrics.clone());
//! // ... classify ...
//! println!("{}", metrics.summary().display());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

use crate::ai::provider::TokenUsage;

// =============================================================================
// Recorder Interface
// =============================================================================

/// Receives token and cost figures after each generative service call
pub trait UsageRecorder: Send + Sync {
    fn record_usage(&self, usage: &TokenUsage, cost_usd: f64);
}

/// Shared recorder handle held by pipelines
pub type SharedRecorder = Arc<dyn UsageRecorder>;

/// Recorder that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRecorder;

impl UsageRecorder for NoopRecorder {
    fn record_usage(&self, _usage: &TokenUsage, _cost_usd: f64) {}
}

// =============================================================================
// Metrics Collector
// =============================================================================

/// Thread-safe metrics collector backed by atomic counters
pub struct MetricsCollector {
    /// Session identifier
    session_id: String,
    /// Collector start time
    start_time: Instant,
    /// Total generative service calls
    api_calls: AtomicU32,
    /// Total input tokens
    input_tokens: AtomicU64,
    /// Total output tokens
    output_tokens: AtomicU64,
    /// Total cost (stored as microdollars for atomic ops)
    total_cost_micros: AtomicU64,
}

/// Summary statistics for a session
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub session_id: String,
    pub total_duration_ms: u64,
    pub api_calls: u32,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub total_cost_usd: f64,
}

impl MetricsCollector {
    /// Create new metrics collector for session
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            start_time: Instant::now(),
            api_calls: AtomicU32::new(0),
            input_tokens: AtomicU64::new(0),
            output_tokens: AtomicU64::new(0),
            total_cost_micros: AtomicU64::new(0),
        }
    }

    /// Number of calls recorded so far
    pub fn api_calls(&self) -> u32 {
        self.api_calls.load(Ordering::Relaxed)
    }

    /// Get current metrics snapshot
    pub fn summary(&self) -> MetricsSummary {
        let input_tokens = self.input_tokens.load(Ordering::Relaxed);
        let output_tokens = self.output_tokens.load(Ordering::Relaxed);

        MetricsSummary {
            session_id: self.session_id.clone(),
            total_duration_ms: self.start_time.elapsed().as_millis() as u64,
            api_calls: self.api_calls(),
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
            total_cost_usd: self.total_cost_micros.load(Ordering::Relaxed) as f64 / 1_000_000.0,
        }
    }
}

impl UsageRecorder for MetricsCollector {
    fn record_usage(&self, usage: &TokenUsage, cost_usd: f64) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
        self.input_tokens
            .fetch_add(usage.input_tokens as u64, Ordering::Relaxed);
        self.output_tokens
            .fetch_add(usage.output_tokens as u64, Ordering::Relaxed);

        let cost_micros = (cost_usd * 1_000_000.0) as u64;
        self.total_cost_micros
            .fetch_add(cost_micros, Ordering::Relaxed);
    }
}

impl MetricsSummary {
    /// Format summary for display
    pub fn display(&self) -> String {
        format!(
            "Session: {}\n\
             Duration: {:.1}s\n\
             API Calls: {}\n\
             Tokens: {} (input: {}, output: {})\n\
             Cost: ${:.4}",
            self.session_id,
            self.total_duration_ms as f64 / 1000.0,
            self.api_calls,
            self.total_tokens,
            self.input_tokens,
            self.output_tokens,
            self.total_cost_usd
        )
    }
}

/// Shared metrics collector
pub type SharedMetrics = Arc<MetricsCollector>;

/// Create shared metrics collector
pub fn create_shared_metrics(session_id: impl Into<String>) -> SharedMetrics {
    Arc::new(MetricsCollector::new(session_id))
}

// =============================================================================
// Tests
// =============================================================================
