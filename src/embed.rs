//! Embedding collaborator: opaque text → vector capability.

#[cfg(feature = "http")]
use std::time::Duration;

#[cfg(feature = "http")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "http")]
use crate::error::AgentError;
use crate::error::Result;

/// Default embedding model served by the reference Ollama endpoint.
pub const DEFAULT_EMBED_MODEL: &str = "nomic-embed-text";

/// Default local Ollama embeddings endpoint.
pub const DEFAULT_OLLAMA_EMBED_URL: &str = "http://localhost:11434/api/embeddings";

/// Text-to-vector capability. Implementations must already validate their
/// own transport; callers additionally validate the returned shape.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }
}

/// Ollama embeddings API client.
#[cfg(feature = "http")]
pub struct OllamaEmbedder {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
}

#[cfg(feature = "http")]
#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[cfg(feature = "http")]
#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embedding: Option<Vec<f32>>,
}

#[cfg(feature = "http")]
impl OllamaEmbedder {
    pub fn new(url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
            model: model.into(),
        })
    }
}

#[cfg(feature = "http")]
impl Embedder for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(&self.url)
            .json(&EmbedRequest {
                model: &self.model,
                prompt: text,
            })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AgentError::ExternalService {
                service: "ollama",
                reason: format!("status {status}: {body}"),
            });
        }

        let payload: EmbedResponse = response.json()?;
        // The collaborator is not trusted to return a well-formed vector.
        let vector = payload
            .embedding
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AgentError::embedding("response contained no embedding vector"))?;
        tracing::debug!(dimension = vector.len(), "generated embedding");
        Ok(vector)
    }
}
