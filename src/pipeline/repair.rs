//! Repair Loop
//!
//! One corrective request after the primary answer failed to parse. The
//! invalid text is quoted back to the model together with the original
//! format instructions; the reply is parsed with the same parser. A second
//! failure is returned to the caller as is.

use tracing::{info, warn};

use super::call_service;
use crate::ai::metrics::SharedRecorder;
use crate::ai::prompt::PromptTemplate;
use crate::ai::provider::SharedProvider;
use crate::ai::validation::SchemaParser;
use crate::types::{ClassificationRecord, Result};

pub struct RepairLoop {
    provider: SharedProvider,
    recorder: SharedRecorder,
    template: PromptTemplate,
}

impl RepairLoop {
    /// `template` must take `json` and `format_instructions`.
    pub fn new(provider: SharedProvider, recorder: SharedRecorder, template: PromptTemplate) -> Self {
        Self {
            provider,
            recorder,
            template,
        }
    }

    /// Ask the model to fix `invalid_text`, then parse the answer once.
    pub async fn repair(
        &self,
        parser: &SchemaParser,
        invalid_text: &str,
        format_instructions: &str,
    ) -> Result<ClassificationRecord> {
        let prompt = self.template.format(&[
            ("json", invalid_text),
            ("format_instructions", format_instructions),
        ])?;

        let repaired = call_service(&self.provider, &self.recorder, &prompt, "repair").await?;

        match parser.parse(&repaired) {
            Ok(record) => {
                info!("Repair: corrected output parsed");
                Ok(record)
            }
            Err(err) => {
                warn!("Repair: corrected output still invalid: {}", err.reason);
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::metrics::MetricsCollector;
    use crate::ai::prompt::PromptTemplates;
    use crate::ai::validation::SchemaDefinition;
    use crate::pipeline::mock::ScriptedProvider;
    use crate::types::BankscopeError;
    use std::sync::Arc;

    const VALID: &str = r#"{"sector": "Personal Banking", "product": "Credit Cards", "details": ["Cashback"]}"#;

    fn repair_loop(provider: Arc<ScriptedProvider>, metrics: Arc<MetricsCollector>) -> RepairLoop {
        RepairLoop::new(
            provider,
            metrics,
            PromptTemplates::bank_site().unwrap().repair,
        )
    }

    #[tokio::test]
    async fn test_repair_success() {
        let provider = Arc::new(ScriptedProvider::new([Ok(VALID)]));
        let metrics = Arc::new(MetricsCollector::new("repair"));
        let parser = SchemaParser::new(SchemaDefinition::bank_site());

        let record = repair_loop(provider.clone(), metrics.clone())
            .repair(&parser, "{sector: broken", "FORMAT INSTRUCTIONS")
            .await
            .unwrap();

        assert_eq!(record.product, "Credit Cards");
        assert_eq!(metrics.api_calls(), 1);

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("{sector: broken"));
        assert!(prompts[0].contains("FORMAT INSTRUCTIONS"));
        assert!(prompts[0].contains("the Json is not valid"));
    }

    #[tokio::test]
    async fn test_repair_failure_surfaces_parse_error() {
        let provider = Arc::new(ScriptedProvider::new([Ok("still not json")]));
        let metrics = Arc::new(MetricsCollector::new("repair"));
        let parser = SchemaParser::new(SchemaDefinition::bank_site());

        let err = repair_loop(provider.clone(), metrics)
            .repair(&parser, "not json", "FORMAT")
            .await
            .unwrap_err();

        match err {
            BankscopeError::Parse(parse) => assert_eq!(parse.raw, "still not json"),
            other => panic!("expected parse error, got {other:?}"),
        }
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_repair_service_failure() {
        let provider = Arc::new(ScriptedProvider::new([Err("quota exceeded")]));
        let metrics = Arc::new(MetricsCollector::new("repair"));
        let parser = SchemaParser::new(SchemaDefinition::bank_site());

        let err = repair_loop(provider, metrics.clone())
            .repair(&parser, "not json", "FORMAT")
            .await
            .unwrap_err();

        assert!(matches!(err, BankscopeError::LlmApi(_)));
        assert_eq!(metrics.api_calls(), 0);
    }
}
