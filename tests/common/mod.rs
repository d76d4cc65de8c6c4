// Shared in-process fakes for the extraction, generation and translation seams.
#![allow(dead_code)]

use async_trait::async_trait;
use docaid::error::{GenerationError, PipelineError, TranslationError};
use docaid::generator::PlanGenerator;
use docaid::languages::LanguageRegistry;
use docaid::models::{ActionItem, GeneratedPlan, Priority, ProfessionalType};
use docaid::pdf::TextExtractor;
use docaid::pipeline::DocumentPipeline;
use docaid::translation::{TranslationAdapter, TranslationService};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const APPOINTMENT_TEXT: &str =
    "Patient has an appointment on March 5th at the Riverside clinic. Bring your ID card.";

pub struct FakeExtractor {
    text: String,
    pub calls: AtomicUsize,
}

impl FakeExtractor {
    pub fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextExtractor for FakeExtractor {
    fn extract(&self, _path: &Path) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

pub struct FakeGenerator {
    plan: Option<GeneratedPlan>,
    pub calls: AtomicUsize,
}

impl FakeGenerator {
    pub fn returning(plan: GeneratedPlan) -> Arc<Self> {
        Arc::new(Self {
            plan: Some(plan),
            calls: AtomicUsize::new(0),
        })
    }

    /// A generator whose model answer never validates
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            plan: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanGenerator for FakeGenerator {
    async fn generate(&self, _document_text: &str) -> Result<GeneratedPlan, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.plan
            .clone()
            .ok_or_else(|| GenerationError::Schema("\"summary\" must be a non-empty string".into()))
    }

    fn name(&self) -> &str {
        "fake-generator"
    }
}

/// Prefixes every text with the target code; fails on texts containing `fail_on`.
pub struct FakeTranslator {
    fail_on: Option<String>,
    pub requests: Mutex<Vec<(String, String, String)>>,
}

impl FakeTranslator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            fail_on: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_on(marker: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_on: Some(marker.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn texts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _, _)| text.clone())
            .collect()
    }
}

#[async_trait]
impl TranslationService for FakeTranslator {
    async fn translate_text(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        self.requests.lock().unwrap().push((
            text.to_string(),
            source_lang.to_string(),
            target_lang.to_string(),
        ));
        if let Some(marker) = &self.fail_on {
            if text.contains(marker.as_str()) {
                return Err(TranslationError::Api {
                    status: 503,
                    body: "backend unavailable".to_string(),
                });
            }
        }
        Ok(format!("[{}] {}", target_lang, text))
    }

    fn name(&self) -> &str {
        "fake-translator"
    }
}

pub fn appointment_plan() -> GeneratedPlan {
    GeneratedPlan {
        summary: "You have a medical appointment on March 5th. Bring your ID card.".to_string(),
        action_plan: vec![
            ActionItem::new(
                "Attend appointment",
                "Go to the Riverside clinic on March 5th.",
                Priority::High,
                Some(ProfessionalType::MedicalInterpreter),
            ),
            ActionItem::new("Prepare documents", "Find your ID card.", Priority::Medium, None),
            ActionItem::new(
                "Follow up",
                "Call the clinic if you need to reschedule.",
                Priority::Low,
                None,
            ),
        ],
    }
}

pub struct Harness {
    pub extractor: Arc<FakeExtractor>,
    pub generator: Arc<FakeGenerator>,
    pub translator: Arc<FakeTranslator>,
    pub pipeline: Arc<DocumentPipeline>,
}

impl Harness {
    pub fn new(
        extractor: Arc<FakeExtractor>,
        generator: Arc<FakeGenerator>,
        translator: Arc<FakeTranslator>,
        max_chars: usize,
    ) -> Self {
        let adapter = TranslationAdapter::new(translator.clone()).with_max_chars(max_chars);
        let pipeline = Arc::new(DocumentPipeline::new(
            LanguageRegistry::builtin(),
            extractor.clone(),
            generator.clone(),
            adapter,
        ));
        Self {
            extractor,
            generator,
            translator,
            pipeline,
        }
    }

    pub fn appointment() -> Self {
        Self::new(
            FakeExtractor::new(APPOINTMENT_TEXT),
            FakeGenerator::returning(appointment_plan()),
            FakeTranslator::new(),
            docaid::translation::DEFAULT_MAX_CHARS,
        )
    }
}
