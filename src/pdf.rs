// src/pdf.rs
// Local PDF text extraction

use crate::error::PipelineError;
use std::path::Path;
use tracing::{info, warn};

/// Turns a document on disk into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, PipelineError>;
}

/// Extractor backed by the `pdf-extract` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, PipelineError> {
        info!(path = %path.display(), "Extracting text from PDF");

        let raw = pdf_extract::extract_text(path).map_err(|e| {
            warn!(path = %path.display(), error = %e, "PDF extraction failed");
            PipelineError::Extraction(e.to_string())
        })?;

        let text = clean_text(&raw);
        if text.is_empty() {
            warn!(path = %path.display(), "PDF contains no extractable text");
            return Err(PipelineError::Extraction(
                "the PDF has no text layer (it may be a scanned image)".to_string(),
            ));
        }

        info!(chars = text.chars().count(), "Extracted text from PDF");
        Ok(text)
    }
}

/// Normalise line endings and whitespace, dropping blank lines.
pub fn clean_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\t', " ")
        .split('\n')
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
