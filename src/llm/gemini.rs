// src/llm/gemini.rs
// Gemini on Vertex AI, constrained to JSON output via responseMimeType

use super::{LLMError, LLMProvider};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub struct GeminiProvider {
    url: String,
    model: String,
    access_token: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiProvider {
    pub fn new(project: &str, location: &str, model: String, access_token: String) -> Self {
        let base = format!("https://{}-aiplatform.googleapis.com", location);
        Self::with_base_url(&base, project, location, model, access_token)
    }

    pub fn with_base_url(
        base_url: &str,
        project: &str,
        location: &str,
        model: String,
        access_token: String,
    ) -> Self {
        let url = format!(
            "{}/v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            base_url.trim_end_matches('/'),
            project,
            location,
            model
        );
        Self {
            url,
            model,
            access_token,
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.url
    }
}

fn build_request(prompt: &str) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![RequestPart { text: prompt }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            temperature: 0.2,
        },
    }
}

/// Concatenates the text parts of the first candidate.
fn first_candidate_text(resp: GenerateContentResponse) -> Option<String> {
    let content = resp.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait::async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate_json(&self, prompt: &str) -> Result<String, LLMError> {
        debug!(model = %self.model, prompt_len = prompt.len(), "Generating with Gemini");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.access_token)
            .json(&build_request(prompt))
            .send()
            .await
            .map_err(|e| LLMError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LLMError::GenerationFailed(format!(
                "Vertex AI returned {}: {}",
                status, body
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LLMError::InvalidResponse(e.to_string()))?;

        let text = first_candidate_text(parsed)
            .ok_or_else(|| LLMError::InvalidResponse("No text in first candidate".to_string()))?;

        info!(model = %self.model, response_len = text.len(), "Generation complete");
        Ok(text.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
