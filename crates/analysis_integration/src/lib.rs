use std::sync::Arc;

use async_trait::async_trait;
use registry::CityRegistry;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{domain::CityRecord, error::AnalysisError, protocol::RequestContext};
use tracing::debug;
use url::Url;

pub mod prompt;

pub use prompt::{build_user_prompt, response_schema, SYSTEM_INSTRUCTION};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// External generative service. Returns the raw JSON text the model produced;
/// validation happens on the caller's side.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn analyze(
        &self,
        context: &RequestContext,
        baseline: &CityRecord,
    ) -> Result<String, AnalysisError>;
}

/// Stand-in used when no API key is configured; every call fails so the
/// orchestrator shows its fallback.
pub struct MissingAnalysisService;

#[async_trait]
impl AnalysisService for MissingAnalysisService {
    async fn analyze(
        &self,
        _context: &RequestContext,
        _baseline: &CityRecord,
    ) -> Result<String, AnalysisError> {
        Err(AnalysisError::Unavailable(
            "no analysis API key configured".to_string(),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: String,
    pub temperature: f32,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

pub struct GeminiAnalysisService {
    http: Client,
    config: GeminiConfig,
    registry: Arc<CityRegistry>,
}

impl GeminiAnalysisService {
    pub fn new(config: GeminiConfig, registry: Arc<CityRegistry>) -> Self {
        Self {
            http: Client::new(),
            config,
            registry,
        }
    }

    fn generate_url(&self) -> Result<Url, AnalysisError> {
        let mut base = Url::parse(&self.config.endpoint).map_err(|err| {
            AnalysisError::Unavailable(format!(
                "invalid analysis endpoint '{}': {err}",
                self.config.endpoint
            ))
        })?;
        // `join` replaces the last segment unless the base path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(&format!(
            "v1beta/models/{}:generateContent",
            self.config.model
        ))
        .map_err(|err| AnalysisError::Unavailable(format!("invalid model path: {err}")))
    }
}

#[async_trait]
impl AnalysisService for GeminiAnalysisService {
    async fn analyze(
        &self,
        context: &RequestContext,
        baseline: &CityRecord,
    ) -> Result<String, AnalysisError> {
        let user_prompt = build_user_prompt(context, baseline, &self.registry)?;
        let body = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_INSTRUCTION,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &user_prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
                temperature: self.config.temperature,
            },
        };

        let url = self.generate_url()?;
        debug!(mode = %context.mode, %url, "sending analysis request");
        let res = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| AnalysisError::Transport(err.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateContentResponse = res
            .json()
            .await
            .map_err(|err| AnalysisError::Malformed(err.to_string()))?;
        reply.into_text().ok_or(AnalysisError::EmptyBody)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
