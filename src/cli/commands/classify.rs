//! Classify Command
//!
//! Classify bank pages with the generative pipeline or the keyword heuristic.
//!
//! Usage:
//!   bankscope classify [FILES..] [--strategy llm|heuristic] [--two-stage]
//!                      [--provider NAME] [--model NAME] [--keywords PATH]
//!                      [--format text|json]
//!
//! Without files the page text is read from stdin.

use clap::ValueEnum;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::ai::metrics::create_shared_metrics;
use crate::ai::provider::{SharedProvider, create_provider};
use crate::ai::validation::{ProductCatalog, SchemaDefinition};
use crate::cli::ui::Output;
use crate::config::{Config, ConfigLoader};
use crate::heuristic::{KeywordTopicClassifier, KeywordTopicDictionary};
use crate::pipeline::{ExtractionPipeline, PipelineConfig, Topology};
use crate::types::{BankscopeError, ClassificationRecord, ErrorInfo, Result};
use crate::{classify_with_generative_pipeline, classify_with_heuristic, truncate_site_content};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Generative service with schema parsing and one repair
    Llm,
    /// Keyword/topic dictionary, no external service
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    pub inputs: Vec<PathBuf>,
    pub strategy: Strategy,
    pub two_stage: bool,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub keywords: Option<PathBuf>,
    pub format: OutputFormat,
    pub config_path: Option<PathBuf>,
}

/// One input's outcome as printed
#[derive(Debug, Serialize)]
pub struct ClassificationReport {
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<ClassificationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl ClassificationReport {
    fn new(input: String, outcome: std::result::Result<ClassificationRecord, ErrorInfo>) -> Self {
        match outcome {
            Ok(record) => Self {
                input,
                record: Some(record),
                error: None,
            },
            Err(error) => Self {
                input,
                record: None,
                error: Some(error),
            },
        }
    }
}

/// Run the command; returns the number of inputs that failed
pub async fn run(options: ClassifyOptions) -> Result<usize> {
    let config = match &options.config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    let inputs = read_inputs(&options.inputs, config.pipeline.max_content_chars)?;
    debug!("Classifying {} input(s) with {:?}", inputs.len(), options.strategy);

    let (reports, usage) = match options.strategy {
        Strategy::Heuristic => (run_heuristic(&options, &config, &inputs)?, None),
        Strategy::Llm => {
            let (reports, usage) = run_generative(&options, &config, &inputs).await?;
            (reports, Some(usage))
        }
    };

    print_reports(&reports, options.format)?;

    if let Some(usage) = usage {
        if options.format == OutputFormat::Text {
            Output::new().section("Usage");
            println!("{}", usage);
        } else {
            info!("{}", usage.replace('\n', ", "));
        }
    }

    Ok(reports.iter().filter(|r| r.error.is_some()).count())
}

fn run_heuristic(
    options: &ClassifyOptions,
    config: &Config,
    inputs: &[(String, String)],
) -> Result<Vec<ClassificationReport>> {
    let keywords = options
        .keywords
        .as_deref()
        .or(config.heuristic.keywords_path.as_deref());
    let dictionary = KeywordTopicDictionary::install_global(load_dictionary(keywords)?)?;
    let classifier = KeywordTopicClassifier::new(dictionary);

    Ok(inputs
        .iter()
        .map(|(label, content)| {
            ClassificationReport::new(label.clone(), Ok(classify_with_heuristic(&classifier, content)))
        })
        .collect())
}

async fn run_generative(
    options: &ClassifyOptions,
    config: &Config,
    inputs: &[(String, String)],
) -> Result<(Vec<ClassificationReport>, String)> {
    let mut provider_config = config.llm.to_provider_config();
    if let Some(provider) = &options.provider {
        provider_config.provider = provider.clone();
    }
    if let Some(model) = &options.model {
        provider_config.model = Some(model.clone());
    }
    let provider = create_provider(&provider_config)?;

    let metrics = create_shared_metrics(uuid::Uuid::new_v4().to_string());
    let pipeline = ExtractionPipeline::new(
        build_pipeline_config(config, options.two_stage, provider)?.with_recorder(metrics.clone()),
    );

    info!(
        "Classifying {} input(s) with {} ({})",
        inputs.len(),
        provider_config.provider,
        pipeline.config().topology
    );

    let outcomes = futures::future::join_all(
        inputs
            .iter()
            .map(|(_, content)| classify_with_generative_pipeline(&pipeline, content)),
    )
    .await;

    let reports = inputs
        .iter()
        .zip(outcomes)
        .map(|((label, _), outcome)| ClassificationReport::new(label.clone(), outcome))
        .collect();

    Ok((reports, metrics.summary().display()))
}

fn build_pipeline_config(
    config: &Config,
    two_stage: bool,
    provider: SharedProvider,
) -> Result<PipelineConfig> {
    let topology = if two_stage {
        Topology::TwoStage
    } else {
        config.pipeline.topology
    };

    let mut schema = SchemaDefinition::bank_site();
    if !config.pipeline.product_catalog.is_empty() {
        schema = schema.with_product_catalog(ProductCatalog::new(
            config.pipeline.product_catalog.iter().cloned(),
        ));
    }

    Ok(PipelineConfig::new(provider)?
        .with_topology(topology)
        .with_schema(schema)
        .with_max_words_per_field(config.pipeline.max_words_per_field))
}

/// Dictionary from `path`, or the built-in one
fn load_dictionary(path: Option<&Path>) -> Result<KeywordTopicDictionary> {
    match path {
        Some(path) => KeywordTopicDictionary::from_path(path),
        None => KeywordTopicDictionary::builtin(),
    }
}

/// `(label, truncated content)` per input file, or stdin when none given
fn read_inputs(paths: &[PathBuf], max_chars: usize) -> Result<Vec<(String, String)>> {
    if paths.is_empty() {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(vec![(
            "<stdin>".to_string(),
            truncate_site_content(&content, max_chars).to_string(),
        )]);
    }

    paths
        .iter()
        .map(|path| {
            let content = std::fs::read_to_string(path).map_err(|e| {
                BankscopeError::Io(std::io::Error::new(
                    e.kind(),
                    format!("{}: {}", path.display(), e),
                ))
            })?;
            Ok((
                path.display().to_string(),
                truncate_site_content(&content, max_chars).to_string(),
            ))
        })
        .collect()
}

fn print_reports(reports: &[ClassificationReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(reports)?);
        }
        OutputFormat::Text => {
            let output = Output::new();
            for report in reports {
                output.section(&report.input);
                if let Some(record) = &report.record {
                    output.record(record);
                }
                if let Some(error) = &report.error {
                    output.failure(error);
                }
            }

            let failed = reports.iter().filter(|r| r.error.is_some()).count();
            if failed == 0 {
                output.success(&format!("Classified {} input(s)", reports.len()));
            } else {
                output.error(&format!("{} of {} input(s) failed", failed, reports.len()));
            }
        }
    }
    Ok(())
}
