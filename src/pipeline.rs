// src/pipeline.rs
// Per-upload orchestration: extract -> generate -> translate -> assemble.
// Any stage failure short-circuits the rest and becomes the failure variant.

use crate::config::{ApiConfig, GeneratorMode};
use crate::error::{ConfigError, PipelineError, PipelineResult, TranslationError};
use crate::generator::{LlmPlanGenerator, PlanGenerator};
use crate::heuristics::HeuristicPlanGenerator;
use crate::languages::LanguageRegistry;
use crate::llm::create_llm_provider;
use crate::models::{
    ActionItem, GeneratedPlan, ProcessingError, ProcessingOutcome, ProcessingResult,
};
use crate::monitoring::metrics;
use crate::pdf::{PdfTextExtractor, TextExtractor};
use crate::translation::{GoogleTranslateClient, TranslationAdapter};
use futures_util::future::{try_join, try_join_all};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Extracting,
    Generating,
    Translating,
    Done,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Extracting => "extracting",
            PipelineStage::Generating => "generating",
            PipelineStage::Translating => "translating",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

pub struct DocumentPipeline {
    registry: LanguageRegistry,
    extractor: Arc<dyn TextExtractor>,
    generator: Arc<dyn PlanGenerator>,
    translator: TranslationAdapter,
}

impl DocumentPipeline {
    pub fn new(
        registry: LanguageRegistry,
        extractor: Arc<dyn TextExtractor>,
        generator: Arc<dyn PlanGenerator>,
        translator: TranslationAdapter,
    ) -> Self {
        Self {
            registry,
            extractor,
            generator,
            translator,
        }
    }

    pub fn languages(&self) -> LanguageRegistry {
        self.registry
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    pub fn translator_name(&self) -> &str {
        self.translator.service_name()
    }

    /// Run the pipeline and fold any error into the failure variant.
    pub async fn process(&self, path: &Path, language_key: &str) -> ProcessingOutcome {
        let started = Instant::now();
        let result = self.run(path, language_key).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(result) => {
                metrics::observe_pipeline_run(None, elapsed_ms);
                ProcessingOutcome::Success(result)
            }
            Err(e) => {
                error!(
                    stage = %PipelineStage::Failed,
                    failed_at = e.stage(),
                    language = %language_key,
                    error = %e,
                    "Pipeline failed"
                );
                metrics::observe_pipeline_run(Some(e.stage()), elapsed_ms);
                ProcessingOutcome::Failure(ProcessingError::at_stage(e.stage(), e.to_string()))
            }
        }
    }

    /// Run every stage in order, stopping at the first error.
    pub async fn run(&self, path: &Path, language_key: &str) -> PipelineResult<ProcessingResult> {
        let language = self
            .registry
            .lookup(language_key)
            .ok_or_else(|| PipelineError::UnsupportedLanguage(language_key.trim().to_string()))?;

        info!(stage = %PipelineStage::Extracting, path = %path.display(), language = language.key);
        let text = self.extract(path).await?;
        let original_length = text.chars().count();

        info!(stage = %PipelineStage::Generating, generator = self.generator.name(), original_length);
        let plan = self.generator.generate(&text).await?;

        info!(
            stage = %PipelineStage::Translating,
            target = language.code,
            action_items = plan.action_plan.len()
        );
        let (translated_summary, action_plan) = self.translate_plan(plan, language.code).await?;

        info!(stage = %PipelineStage::Done, language = language.key);
        Ok(ProcessingResult::new(
            translated_summary,
            action_plan,
            language.key,
            original_length,
        ))
    }

    async fn extract(&self, path: &Path) -> PipelineResult<String> {
        let extractor = Arc::clone(&self.extractor);
        let path = path.to_path_buf();
        // pdf-extract is CPU bound and may panic on malformed input
        let text = tokio::task::spawn_blocking(move || extractor.extract(&path))
            .await
            .map_err(|e| PipelineError::Extraction(format!("extraction task failed: {}", e)))??;

        if text.trim().is_empty() {
            return Err(PipelineError::Extraction(
                "the document contains no text".to_string(),
            ));
        }
        Ok(text)
    }

    /// Translate the summary and both text fields of every item concurrently.
    async fn translate_plan(
        &self,
        plan: GeneratedPlan,
        target_lang: &str,
    ) -> Result<(String, Vec<ActionItem>), TranslationError> {
        let GeneratedPlan {
            summary,
            action_plan,
        } = plan;

        let summary_call = self.translator.translate(&summary, target_lang);
        let item_calls = try_join_all(action_plan.into_iter().map(|item| async move {
            let (step, description) = try_join(
                self.translator.translate(&item.step, target_lang),
                self.translator.translate(&item.description, target_lang),
            )
            .await?;
            Ok::<_, TranslationError>(ActionItem {
                step,
                description,
                ..item
            })
        }));

        try_join(summary_call, item_calls).await
    }
}

/// Wire the production clients from configuration.
pub async fn build_pipeline(config: &ApiConfig) -> Result<DocumentPipeline, ConfigError> {
    config.validate_remote()?;

    let t = &config.translation;
    let client = GoogleTranslateClient::new(&t.endpoint, &t.project, &t.location, t.access_token.clone());
    let translator = TranslationAdapter::new(Arc::new(client))
        .with_max_chars(t.max_chars)
        .with_source_lang(t.source_lang.clone());

    let generator: Arc<dyn PlanGenerator> = match config.generator_mode {
        GeneratorMode::Llm => {
            let provider = create_llm_provider(config.llm.clone()).await?;
            Arc::new(LlmPlanGenerator::new(provider))
        }
        GeneratorMode::Heuristic => Arc::new(HeuristicPlanGenerator),
    };

    info!(
        translator = translator.service_name(),
        generator = generator.name(),
        max_chars = translator.max_chars(),
        "Pipeline ready"
    );

    Ok(DocumentPipeline::new(
        LanguageRegistry::builtin(),
        Arc::new(PdfTextExtractor),
        generator,
        translator,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(PipelineStage::Extracting.to_string(), "extracting");
        assert_eq!(PipelineStage::Failed.to_string(), "failed");
    }
}
