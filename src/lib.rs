//! Bankscope - Bank Page Classification
//!
//! Classifies bank product pages into a small structured record (sector,
//! product, supporting details) with one of two strategies:
//!
//! - **Generative pipeline**: prompts a text model with embedded schema
//!   instructions, parses the answer strictly, and sends at most one repair
//!   request when the answer is malformed. Single-stage or two-stage
//!   (analysis, then classification of the analysis).
//! - **Keyword heuristic**: scores dictionary topics by keyword frequency.
//!   Needs no external service and never fails.
//!
//! ## Quick Start
//!
//! ```ignore
//! use bankscope::{ExtractionPipeline, PipelineConfig, ProviderConfig, Topology};
//!
//! let provider = bankscope::create_provider(&ProviderConfig::default())?;
//! let pipeline = ExtractionPipeline::new(
//!     PipelineConfig::new(provider)?.with_topology(Topology::TwoStage),
//! );
//! let page = bankscope::truncate_site_content(&text, 10_000);
//! match bankscope::classify_with_generative_pipeline(&pipeline, page).await {
//!     Ok(record) => println!("{record}"),
//!     Err(info) => eprintln!("{info}"),
//! }
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: provider boundary, prompts, schema parsing, usage accounting
//! - [`pipeline`]: extraction pipeline and repair loop
//! - [`heuristic`]: keyword/topic dictionary and classifier
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod heuristic;
pub mod pipeline;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use config::{Config, ConfigLoader};

pub use types::{
    BankscopeError, ClassificationRecord, ErrorCategory, ErrorInfo, ParseError, Result, ResultExt,
};

pub use ai::{
    LlmProvider, LlmResponse, MetricsCollector, ProviderConfig, SchemaDefinition, SchemaParser,
    SharedMetrics, UsageRecorder, create_provider, create_shared_metrics,
};
pub use heuristic::{KeywordTopicClassifier, KeywordTopicDictionary};
pub use pipeline::{ClassificationTrace, ExtractionPipeline, PipelineConfig, RepairLoop, Topology};

// =============================================================================
// Entry Points
// =============================================================================

/// Classify page text with the generative pipeline.
///
/// Never propagates an error: every failure becomes an [`ErrorInfo`].
pub async fn classify_with_generative_pipeline(
    pipeline: &ExtractionPipeline,
    site_content: &str,
) -> std::result::Result<ClassificationRecord, ErrorInfo> {
    pipeline.classify(site_content).await.map_err(|err| {
        tracing::warn!("Classification failed: {}", err);
        ErrorInfo::from(err)
    })
}

/// Classify page text with the keyword heuristic. Never fails.
pub fn classify_with_heuristic(
    classifier: &KeywordTopicClassifier,
    site_content: &str,
) -> ClassificationRecord {
    classifier.classify(site_content)
}

/// Cap page text at `max_chars` characters before classification
pub fn truncate_site_content(site_content: &str, max_chars: usize) -> &str {
    types::truncate_chars(site_content, max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::mock::ScriptedProvider;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_generative_entry_point_returns_error_info() {
        let provider = Arc::new(ScriptedProvider::new([Err("401 Unauthorized: invalid api key")]));
        let pipeline = ExtractionPipeline::new(PipelineConfig::new(provider).unwrap());

        let info = classify_with_generative_pipeline(&pipeline, "page")
            .await
            .unwrap_err();
        assert_eq!(info.category, ErrorCategory::Auth);
        assert!(info.message.contains("invalid api key"));
    }

    #[tokio::test]
    async fn test_generative_entry_point_parse_failure() {
        let provider = Arc::new(ScriptedProvider::new([Ok("nope"), Ok("still nope")]));
        let pipeline = ExtractionPipeline::new(PipelineConfig::new(provider).unwrap());

        let info = classify_with_generative_pipeline(&pipeline, "page")
            .await
            .unwrap_err();
        assert_eq!(info.category, ErrorCategory::ParseError);
        assert!(info.message.contains("still nope"));
    }

    #[tokio::test]
    async fn test_generative_entry_point_success() {
        let provider = Arc::new(ScriptedProvider::new([Ok(
            r#"{"entity": "Individuals", "product": "Credit Cards", "details": "No annual fee"}"#,
        )]));
        let pipeline = ExtractionPipeline::new(PipelineConfig::new(provider).unwrap());

        let record = classify_with_generative_pipeline(&pipeline, "page")
            .await
            .unwrap();
        assert_eq!(
            record,
            ClassificationRecord::new("Individuals", "Credit Cards", vec!["No annual fee".to_string()])
        );
    }

    #[test]
    fn test_heuristic_entry_point_never_fails() {
        let classifier =
            KeywordTopicClassifier::new(Arc::new(KeywordTopicDictionary::builtin().unwrap()));
        let record = classify_with_heuristic(&classifier, "");
        assert_eq!(record.product, "Unknown");
        assert_eq!(record.details, vec!["Unknown"]);
    }

    #[test]
    fn test_truncate_site_content() {
        let text = "ä".repeat(20_000);
        assert_eq!(truncate_site_content(&text, 10_000).chars().count(), 10_000);
        assert_eq!(truncate_site_content("short", 10_000), "short");
    }
}
