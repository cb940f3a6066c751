//! Extraction Pipeline
//!
//! Prompt -> generative service -> strict parse -> at most one repair.
//!
//! ## Topologies
//!
//! - **Single-stage**: the page text is classified directly under the
//!   schema's format instructions.
//! - **Two-stage**: stage A writes a free-text analysis of the page (no
//!   schema); stage B classifies that analysis under the format
//!   instructions. Stage B receives stage A's output verbatim.
//!
//! Every service call is reported to the configured [`UsageRecorder`]
//! as soon as it returns. Service failures are never retried.
//!
//! [`UsageRecorder`]: crate::ai::metrics::UsageRecorder

mod repair;

#[cfg(test)]
pub(crate) mod mock;

pub use repair::RepairLoop;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::ai::metrics::{NoopRecorder, SharedRecorder};
use crate::ai::prompt::PromptTemplates;
use crate::ai::provider::SharedProvider;
use crate::ai::validation::{SchemaDefinition, SchemaParser};
use crate::constants::content::MAX_WORDS_PER_FIELD;
use crate::types::{ClassificationRecord, Result};

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    #[default]
    SingleStage,
    TwoStage,
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleStage => write!(f, "single-stage"),
            Self::TwoStage => write!(f, "two-stage"),
        }
    }
}

/// Everything one pipeline instance needs. Independent instances may use
/// different schemas, prompts and providers side by side.
pub struct PipelineConfig {
    pub topology: Topology,
    pub parser: SchemaParser,
    pub prompts: PromptTemplates,
    pub provider: SharedProvider,
    pub recorder: SharedRecorder,
    /// Advisory word limit checked after parsing
    pub max_words_per_field: usize,
}

impl PipelineConfig {
    /// Single-stage bank page classification with usage discarded
    pub fn new(provider: SharedProvider) -> Result<Self> {
        Ok(Self {
            topology: Topology::default(),
            parser: SchemaParser::new(SchemaDefinition::bank_site()),
            prompts: PromptTemplates::bank_site()?,
            provider,
            recorder: Arc::new(NoopRecorder),
            max_words_per_field: MAX_WORDS_PER_FIELD,
        })
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_schema(mut self, schema: SchemaDefinition) -> Self {
        self.parser = SchemaParser::new(schema);
        self
    }

    pub fn with_prompts(mut self, prompts: PromptTemplates) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_recorder(mut self, recorder: SharedRecorder) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn with_max_words_per_field(mut self, max_words: usize) -> Self {
        self.max_words_per_field = max_words;
        self
    }

    pub fn schema(&self) -> &SchemaDefinition {
        self.parser.schema()
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// What happened during one classification
#[derive(Debug, Clone, Default)]
pub struct ClassificationTrace {
    /// Stage A analysis (two-stage only)
    pub analysis: Option<String>,
    /// Raw output of the final stage, before any repair
    pub raw_output: String,
    /// Whether the repair request was sent
    pub repaired: bool,
    /// Generative service calls made, repair included
    pub service_calls: u32,
}

pub struct ExtractionPipeline {
    config: PipelineConfig,
    format_instructions: String,
    repair: RepairLoop,
}

impl ExtractionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let format_instructions = config.parser.format_instructions();
        let repair = RepairLoop::new(
            config.provider.clone(),
            config.recorder.clone(),
            config.prompts.repair.clone(),
        );

        Self {
            config,
            format_instructions,
            repair,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Format instructions embedded in every classifying prompt
    pub fn format_instructions(&self) -> &str {
        &self.format_instructions
    }

    /// Classify page text into a record.
    ///
    /// Callers are expected to cap `site_content` first (see
    /// [`crate::truncate_site_content`]).
    pub async fn classify(&self, site_content: &str) -> Result<ClassificationRecord> {
        self.classify_detailed(site_content)
            .await
            .map(|(record, _)| record)
    }

    /// Like [`classify`](Self::classify), also returning the trace
    pub async fn classify_detailed(
        &self,
        site_content: &str,
    ) -> Result<(ClassificationRecord, ClassificationTrace)> {
        debug!(
            "Pipeline: classifying {} chars ({})",
            site_content.chars().count(),
            self.config.topology
        );

        let mut trace = ClassificationTrace::default();

        let raw_output = match self.config.topology {
            Topology::SingleStage => {
                let prompt = self.config.prompts.single_stage.format(&[
                    ("format_instructions", self.format_instructions.as_str()),
                    ("site_content", site_content),
                ])?;
                trace.service_calls += 1;
                self.call(&prompt, "classification").await?
            }
            Topology::TwoStage => {
                let prompt = self
                    .config
                    .prompts
                    .analysis
                    .format(&[("site_content", site_content)])?;
                trace.service_calls += 1;
                let analysis = self.call(&prompt, "analysis").await?;
                debug!("Pipeline: stage A produced {} chars", analysis.len());

                let prompt = self.config.prompts.classification.format(&[
                    ("format_instructions", self.format_instructions.as_str()),
                    ("content_analysis", analysis.as_str()),
                ])?;
                trace.analysis = Some(analysis);
                trace.service_calls += 1;
                self.call(&prompt, "classification").await?
            }
        };

        let record = match self.config.parser.parse(&raw_output) {
            Ok(record) => record,
            Err(err) => {
                warn!(
                    "Pipeline: output did not match the schema ({}), requesting one repair",
                    err.reason
                );
                trace.repaired = true;
                trace.service_calls += 1;
                self.repair
                    .repair(&self.config.parser, &err.raw, &self.format_instructions)
                    .await?
            }
        };
        trace.raw_output = raw_output;

        let over_limit = record.word_limit_violations(self.config.max_words_per_field);
        if !over_limit.is_empty() {
            warn!(
                "Pipeline: fields over the {}-word guideline: {}",
                self.config.max_words_per_field,
                over_limit.join(", ")
            );
        }

        Ok((record, trace))
    }

    async fn call(&self, prompt: &str, stage: &str) -> Result<String> {
        call_service(&self.config.provider, &self.config.recorder, prompt, stage).await
    }
}

/// One generative service call, reported to `recorder` on success.
pub(crate) async fn call_service(
    provider: &SharedProvider,
    recorder: &SharedRecorder,
    prompt: &str,
    stage: &str,
) -> Result<String> {
    let response = provider.generate(prompt).await?;
    recorder.record_usage(&response.usage, response.cost_usd);

    debug!(
        "{} ({}): {} call, {} tokens in {}ms",
        provider.name(),
        provider.model(),
        stage,
        response.usage.total(),
        response.timing.total_ms
    );

    Ok(response.content)
}

// =============================================================================
// Tests
// =============================================================================
