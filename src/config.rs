// src/config.rs
use crate::error::ConfigError;
use crate::llm::LLMConfig;
use crate::translation::{google, DEFAULT_MAX_CHARS, DEFAULT_SOURCE_LANG};
use std::env;
use std::str::FromStr;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Where summaries and action plans come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorMode {
    /// Remote model (see `LLMConfig`)
    Llm,
    /// Keyword templates, no remote call
    Heuristic,
}

impl FromStr for GeneratorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "llm" => Ok(GeneratorMode::Llm),
            "heuristic" => Ok(GeneratorMode::Heuristic),
            other => Err(format!("Unknown generator mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslationConfig {
    pub endpoint: String,
    pub project: String,
    pub location: String,
    pub access_token: String,
    pub max_chars: usize,
    pub source_lang: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub translation: TranslationConfig,
    pub generator_mode: GeneratorMode,
    pub llm: LLMConfig,
}

impl ApiConfig {
    /// Load from the process environment (and `.env` unless NO_DOTENV is set).
    pub fn from_env() -> Result<Self, ConfigError> {
        if !flag("NO_DOTENV") {
            dotenvy::dotenv().ok();
        }

        let host = var_or("BACKEND_HOST", "127.0.0.1");
        let port = parse_var("BACKEND_PORT", 3010u16)?;
        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        let project = var_or("GOOGLE_CLOUD_PROJECT", "");
        let access_token = var_or("GOOGLE_ACCESS_TOKEN", "");

        let translation = TranslationConfig {
            endpoint: var_or("TRANSLATION_ENDPOINT", google::DEFAULT_ENDPOINT),
            project: project.clone(),
            location: var_or("GOOGLE_CLOUD_LOCATION", "global"),
            access_token: access_token.clone(),
            max_chars: parse_var("TRANSLATION_MAX_CHARS", DEFAULT_MAX_CHARS)?,
            source_lang: var_or("TRANSLATION_SOURCE_LANG", DEFAULT_SOURCE_LANG),
        };
        if translation.max_chars == 0 {
            return Err(ConfigError::InvalidValue {
                key: "TRANSLATION_MAX_CHARS".to_string(),
                value: "0".to_string(),
            });
        }

        let generator_mode = parse_var("GENERATOR_MODE", GeneratorMode::Llm)?;

        let provider = var_or("LLM_PROVIDER", "gemini").to_lowercase();
        let llm = match provider.as_str() {
            "gemini" => LLMConfig::Gemini {
                project,
                location: var_or("VERTEX_LOCATION", "us-central1"),
                model: var_or("LLM_MODEL", "gemini-1.5-flash"),
                access_token,
                endpoint: env::var("VERTEX_ENDPOINT").ok(),
            },
            "ollama" => LLMConfig::Ollama {
                ollama_url: var_or("OLLAMA_URL", "http://localhost:11434"),
                model: var_or("LLM_MODEL", "llama3.1:8b"),
            },
            other => {
                return Err(ConfigError::InvalidValue {
                    key: "LLM_PROVIDER".to_string(),
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            host,
            port,
            max_upload_bytes,
            translation,
            generator_mode,
            llm,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Settings that must be present before remote clients can be built
    pub fn validate_remote(&self) -> Result<(), ConfigError> {
        if self.translation.project.trim().is_empty() {
            return Err(ConfigError::Missing("GOOGLE_CLOUD_PROJECT".to_string()));
        }
        if self.translation.access_token.trim().is_empty() {
            return Err(ConfigError::Missing("GOOGLE_ACCESS_TOKEN".to_string()));
        }
        Ok(())
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn flag(key: &str) -> bool {
    env::var(key)
        .map(|v| v.to_lowercase() == "true" || v == "1")
        .unwrap_or(false)
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
            })
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_mode_parsing() {
        assert_eq!("LLM".parse::<GeneratorMode>().unwrap(), GeneratorMode::Llm);
        assert_eq!(
            "heuristic".parse::<GeneratorMode>().unwrap(),
            GeneratorMode::Heuristic
        );
        assert!("magic".parse::<GeneratorMode>().is_err());
    }

    #[test]
    fn test_parse_var_default_and_invalid() {
        assert_eq!(parse_var("DOCAID_TEST_UNSET_VAR", 7usize).unwrap(), 7);

        env::set_var("DOCAID_TEST_BAD_PORT", "not-a-port");
        let err = parse_var("DOCAID_TEST_BAD_PORT", 3010u16).unwrap_err();
        assert!(err.to_string().contains("DOCAID_TEST_BAD_PORT"));
        env::remove_var("DOCAID_TEST_BAD_PORT");
    }

    #[test]
    fn test_var_or_ignores_blank_values() {
        env::set_var("DOCAID_TEST_BLANK", "   ");
        assert_eq!(var_or("DOCAID_TEST_BLANK", "fallback"), "fallback");
        env::remove_var("DOCAID_TEST_BLANK");
    }

    #[test]
    fn test_validate_remote_requires_project_and_token() {
        let config = ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 3010,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            translation: TranslationConfig {
                endpoint: google::DEFAULT_ENDPOINT.to_string(),
                project: String::new(),
                location: "global".to_string(),
                access_token: "token".to_string(),
                max_chars: DEFAULT_MAX_CHARS,
                source_lang: "en".to_string(),
            },
            generator_mode: GeneratorMode::Heuristic,
            llm: LLMConfig::default(),
        };
        assert!(matches!(
            config.validate_remote(),
            Err(ConfigError::Missing(key)) if key == "GOOGLE_CLOUD_PROJECT"
        ));
        assert_eq!(config.bind_addr(), "127.0.0.1:3010");
    }
}
