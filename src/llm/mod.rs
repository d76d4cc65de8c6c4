// src/llm/mod.rs
// LLM provider abstraction - pluggable remote models that answer in JSON.
// Default: Gemini on Vertex AI, Ollama for self-hosted setups.

pub mod gemini;

pub use gemini::GeminiProvider;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// LLM Provider trait - implement this to support new models
#[async_trait::async_trait]
pub trait LLMProvider: Send + Sync {
    /// Send a user-role prompt and ask for a JSON-only answer.
    /// Returns the raw text of the answer, which callers must validate.
    async fn generate_json(&self, prompt: &str) -> Result<String, LLMError>;

    fn model_name(&self) -> &str;
}

/// Configuration for the supported providers
#[derive(Debug, Clone, Deserialize, Serialize)]
pub enum LLMConfig {
    /// Gemini through the Vertex AI generateContent endpoint
    Gemini {
        project: String,
        location: String,
        model: String,
        access_token: String,
        /// Overrides the regional Vertex AI base URL
        endpoint: Option<String>,
    },
    /// Any JSON-capable model served by Ollama
    Ollama { ollama_url: String, model: String },
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self::Ollama {
            ollama_url: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
        }
    }
}

/// Error types for LLM operations
#[derive(Debug, Clone, Error)]
pub enum LLMError {
    #[error("LLM connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    #[error("Config error: {0}")]
    ConfigError(String),
}

/// Ollama-based LLM provider
pub struct OllamaProvider {
    url: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'static str,
    options: OllamaOptions,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaProvider {
    pub fn new(url: String, model: String) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            model,
            client: reqwest::Client::new(),
        }
    }

    async fn health_check(&self) -> Result<(), LLMError> {
        let health_url = format!("{}/api/tags", self.url);
        self.client.get(&health_url).send().await.map_err(|e| {
            LLMError::ConnectionFailed(format!("Cannot reach Ollama at {}: {}", self.url, e))
        })?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl LLMProvider for OllamaProvider {
    async fn generate_json(&self, prompt: &str) -> Result<String, LLMError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Generating with Ollama");

        let url = format!("{}/api/generate", self.url);
        let req = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
            options: OllamaOptions { temperature: 0.2 },
        };

        let response = self
            .client
            .post(&url)
            .json(&req)
            .send()
            .await
            .map_err(|e| LLMError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::GenerationFailed(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let ollama_resp: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LLMError::InvalidResponse(e.to_string()))?;

        info!(
            model = %self.model,
            response_len = ollama_resp.response.len(),
            "Generation complete"
        );
        Ok(ollama_resp.response.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Factory function to create LLM provider from config
pub async fn create_llm_provider(config: LLMConfig) -> Result<Arc<dyn LLMProvider>, LLMError> {
    match config {
        LLMConfig::Gemini {
            project,
            location,
            model,
            access_token,
            endpoint,
        } => {
            if project.trim().is_empty() {
                return Err(LLMError::ConfigError(
                    "GOOGLE_CLOUD_PROJECT is required for Gemini".to_string(),
                ));
            }
            info!(model = %model, location = %location, "Initializing Gemini via Vertex AI");
            let provider = match endpoint {
                Some(base) => {
                    GeminiProvider::with_base_url(&base, &project, &location, model, access_token)
                }
                None => GeminiProvider::new(&project, &location, model, access_token),
            };
            Ok(Arc::new(provider))
        }
        LLMConfig::Ollama { ollama_url, model } => {
            info!("Initializing {} via Ollama at {}", model, ollama_url);
            let provider = OllamaProvider::new(ollama_url, model);
            provider.health_check().await.map_err(|e| {
                warn!("Failed to connect to Ollama. Make sure it's running: ollama serve");
                e
            })?;
            Ok(Arc::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        match LLMConfig::default() {
            LLMConfig::Ollama { ollama_url, .. } => {
                assert_eq!(ollama_url, "http://localhost:11434");
            }
            _ => panic!("Default should be Ollama"),
        }
    }

    #[test]
    fn test_ollama_provider_creation() {
        let provider = OllamaProvider::new(
            "http://localhost:11434/".to_string(),
            "llama3.1:8b".to_string(),
        );
        assert_eq!(provider.model_name(), "llama3.1:8b");
        assert_eq!(provider.url, "http://localhost:11434");
    }

    #[test]
    fn test_ollama_request_asks_for_json() {
        let req = OllamaRequest {
            model: "m",
            prompt: "p",
            stream: false,
            format: "json",
            options: OllamaOptions { temperature: 0.2 },
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["format"], "json");
        assert_eq!(value["stream"], false);
    }

    #[test]
    fn test_llm_error_display() {
        let err = LLMError::ConnectionFailed("test".to_string());
        assert!(err.to_string().contains("connection failed"));
    }

    #[tokio::test]
    async fn test_gemini_requires_project() {
        let config = LLMConfig::Gemini {
            project: "  ".to_string(),
            location: "us-central1".to_string(),
            model: "gemini-1.5-flash".to_string(),
            access_token: "token".to_string(),
            endpoint: None,
        };
        assert!(matches!(
            create_llm_provider(config).await,
            Err(LLMError::ConfigError(_))
        ));
    }
}
