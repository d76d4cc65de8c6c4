// src/translation/google.rs
// Cloud Translation API v3 client (projects.locations.translateText)

use super::TranslationService;
use crate::error::TranslationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com";

pub struct GoogleTranslateClient {
    url: String,
    access_token: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateTextRequest<'a> {
    contents: Vec<&'a str>,
    mime_type: &'static str,
    source_language_code: &'a str,
    target_language_code: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateTextResponse {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    #[serde(default)]
    translated_text: String,
}

impl GoogleTranslateClient {
    pub fn new(endpoint: &str, project: &str, location: &str, access_token: String) -> Self {
        let url = format!(
            "{}/v3/projects/{}/locations/{}:translateText",
            endpoint.trim_end_matches('/'),
            project,
            location
        );
        Self {
            url,
            access_token,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn first_translation(resp: TranslateTextResponse) -> Result<String, TranslationError> {
    resp.translations
        .into_iter()
        .next()
        .map(|t| t.translated_text)
        .filter(|text| !text.trim().is_empty())
        .ok_or(TranslationError::EmptyPayload)
}

#[async_trait]
impl TranslationService for GoogleTranslateClient {
    async fn translate_text(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let request = TranslateTextRequest {
            contents: vec![text],
            mime_type: "text/plain",
            source_language_code: source_lang,
            target_language_code: target_lang,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, target = %target_lang, "Translation API error");
            return Err(TranslationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranslateTextResponse = response.json().await?;
        first_translation(parsed)
    }

    fn name(&self) -> &str {
        "google-translate-v3"
    }
}
