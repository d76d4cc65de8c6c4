// src/translation/mod.rs
// Translation adapter: one remote call for short text, concurrent per-chunk
// calls joined in order for text above the service's per-call limit.

pub mod google;

pub use google::GoogleTranslateClient;

use crate::chunker::{char_len, chunk_text};
use crate::error::TranslationError;
use crate::monitoring::metrics;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};

/// Per-call content limit of the Cloud Translation API
pub const DEFAULT_MAX_CHARS: usize = 25_000;
pub const DEFAULT_SOURCE_LANG: &str = "en";

/// A remote translation service. One call translates one piece of text.
#[async_trait]
pub trait TranslationService: Send + Sync {
    async fn translate_text(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError>;

    fn name(&self) -> &str;
}

#[derive(Clone)]
pub struct TranslationAdapter {
    service: Arc<dyn TranslationService>,
    max_chars: usize,
    source_lang: String,
}

impl TranslationAdapter {
    pub fn new(service: Arc<dyn TranslationService>) -> Self {
        Self {
            service,
            max_chars: DEFAULT_MAX_CHARS,
            source_lang: DEFAULT_SOURCE_LANG.to_string(),
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }

    pub fn with_source_lang(mut self, source_lang: impl Into<String>) -> Self {
        self.source_lang = source_lang.into();
        self
    }

    pub fn service_name(&self) -> &str {
        self.service.name()
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Translate from the adapter's source language (English by default).
    pub async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslationError> {
        self.translate_from(text, &self.source_lang, target_lang).await
    }

    /// Translate with an explicit source language.
    ///
    /// Any failing chunk fails the whole call; the other in-flight chunk
    /// requests are dropped and no partial translation is returned.
    pub async fn translate_from(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Err(TranslationError::EmptyInput);
        }
        if char_len(text) <= self.max_chars {
            return self.call(text, source_lang, target_lang).await;
        }

        let chunks = chunk_text(text, self.max_chars);
        let total = chunks.len();
        info!(
            service = %self.service.name(),
            text_len = char_len(text),
            chunks = total,
            target = %target_lang,
            "Translating long text in chunks"
        );

        let calls = chunks.iter().enumerate().map(|(i, chunk)| async move {
            self.call(chunk, source_lang, target_lang)
                .await
                .map_err(|e| TranslationError::Chunk {
                    index: i + 1,
                    total,
                    source: Box::new(e),
                })
        });
        let translated = try_join_all(calls).await?;

        Ok(translated.join(" "))
    }

    async fn call(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        metrics::TRANSLATION_REQUESTS_TOTAL.inc();
        debug!(
            service = %self.service.name(),
            text_len = text.len(),
            source = %source_lang,
            target = %target_lang,
            "Translation request"
        );
        let translated = self
            .service
            .translate_text(text, source_lang, target_lang)
            .await?;
        if translated.trim().is_empty() {
            return Err(TranslationError::EmptyPayload);
        }
        Ok(translated)
    }
}
