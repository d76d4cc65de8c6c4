// src/error.rs
// Error taxonomy for the document pipeline and its collaborators

use crate::llm::LLMError;
use thiserror::Error;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failures of the remote translation step
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Translation request failed: {0}")]
    Request(String),

    #[error("Translation service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Translation service returned an empty payload")]
    EmptyPayload,

    #[error("Nothing to translate: the input text is blank")]
    EmptyInput,

    #[error("Translation of chunk {index} of {total} failed: {source}")]
    Chunk {
        index: usize,
        total: usize,
        #[source]
        source: Box<TranslationError>,
    },
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        TranslationError::Request(err.to_string())
    }
}

/// Failures of the summary / action-plan generation step
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Model call failed: {0}")]
    Provider(#[from] LLMError),

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Model response is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),

    #[error("Model response does not match the expected shape: {0}")]
    Schema(String),
}

/// Stage-level failures, converted once at the pipeline boundary
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("No text could be extracted from the document: {0}")]
    Extraction(String),

    #[error("Summary generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Translation failed: {0}")]
    Translation(#[from] TranslationError),
}

impl PipelineError {
    /// Short stage label used for metrics and HTTP status mapping
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::UnsupportedLanguage(_) => "language",
            PipelineError::Extraction(_) => "extraction",
            PipelineError::Generation(_) => "generation",
            PipelineError::Translation(_) => "translation",
        }
    }

    /// Whether the failure was caused by the caller's input rather than a remote service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::UnsupportedLanguage(_) | PipelineError::Extraction(_)
        )
    }
}

/// Invalid or missing configuration values
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(String),

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Model provider setup failed: {0}")]
    Provider(#[from] LLMError),
}

/// Rejections at the upload boundary, before the pipeline runs
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No file was uploaded")]
    MissingFile,

    #[error("No target language was provided")]
    MissingLanguage,

    #[error("Only PDF files are accepted")]
    NotPdf,

    #[error("The uploaded file is empty")]
    EmptyFile,

    #[error("The uploaded file exceeds the {limit} byte limit")]
    TooLarge { limit: usize },

    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
