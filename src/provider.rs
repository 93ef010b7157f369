//! Inference provider capability: one stateless text-generation call per
//! translation.
//!
//! The trait is the seam that keeps the translator testable; tests inject
//! canned responses instead of a network client.

#[cfg(feature = "http")]
use std::time::Duration;

#[cfg(feature = "http")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "http")]
use crate::error::AgentError;
use crate::error::Result;

/// Default generation model, matching the reference deployment.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-001";

#[cfg(feature = "http")]
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// External text-generation capability. Each call is independent; no
/// conversation history is kept between calls.
pub trait InferenceProvider: Send + Sync {
    /// Submit one prompt and return the raw response text.
    fn generate(&self, prompt: &str) -> Result<String>;
}

impl<P: InferenceProvider + ?Sized> InferenceProvider for Box<P> {
    fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }
}

/// Google Gemini `generateContent` client over the REST API.
#[cfg(feature = "http")]
pub struct GeminiProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[cfg(feature = "http")]
impl GeminiProvider {
    /// Build a provider with a bounded per-request timeout.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Override the API base URL (proxies, test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[cfg(feature = "http")]
#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[cfg(feature = "http")]
#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[cfg(feature = "http")]
#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[cfg(feature = "http")]
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[cfg(feature = "http")]
#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[cfg(feature = "http")]
#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[cfg(feature = "http")]
#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[cfg(feature = "http")]
impl InferenceProvider for GeminiProvider {
    fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        tracing::debug!(model = self.model.as_str(), "submitting generation request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest {
                contents: vec![RequestContent {
                    parts: vec![RequestPart { text: prompt }],
                }],
            })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AgentError::ExternalService {
                service: "gemini",
                reason: format!("status {status}: {body}"),
            });
        }

        let payload: GenerateResponse = response.json()?;
        payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .map(|part| part.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AgentError::ExternalService {
                service: "gemini",
                reason: "response contained no candidate text".to_string(),
            })
    }
}
