//! Generative Service Integration
//!
//! Everything the classification pipeline needs from a text model: the
//! provider boundary, prompt templates, the record schema and parser, and
//! usage accounting.

pub mod metrics;
pub mod prompt;
pub mod provider;
pub mod timeout;
pub mod validation;

pub use metrics::{
    MetricsCollector, MetricsSummary, NoopRecorder, SharedMetrics, SharedRecorder, UsageRecorder,
    create_shared_metrics,
};
pub use prompt::{PromptTemplate, PromptTemplates};
pub use provider::{
    LlmProvider, LlmResponse, OllamaProvider, OpenAiProvider, ProviderConfig, ResponseMetadata,
    ResponseTiming, SharedProvider, TimedProvider, TokenUsage, create_provider,
};
pub use timeout::with_timeout;
pub use validation::{FieldKind, FieldSpec, ProductCatalog, SchemaDefinition, SchemaParser};
