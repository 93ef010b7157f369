//! Process-wide configuration.
//!
//! Built once at startup and threaded through constructors; deep call paths
//! never read the environment themselves, which keeps the translation core
//! testable without environment mutation.

use std::env;
use std::time::Duration;

use crate::embed::{DEFAULT_EMBED_MODEL, DEFAULT_OLLAMA_EMBED_URL};
use crate::error::{AgentError, Result};
use crate::provider::DEFAULT_GEMINI_MODEL;
use crate::types::BatchOptions;

/// Bounded wait applied to every outbound provider call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default delay between consecutive batch items. Conservative against the
/// observed ~15 requests/minute limit on the generation provider.
pub const DEFAULT_BATCH_PACING: Duration = Duration::from_secs(4);

/// Configuration for the agent and its collaborators.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// API key for the generation provider. Required.
    pub gemini_api_key: String,
    /// Generation model identifier.
    pub gemini_model: String,
    /// API key for the search index; search stays unavailable without it.
    pub pinecone_api_key: Option<String>,
    /// Data-plane host of the search index.
    pub pinecone_host: Option<String>,
    /// Embeddings endpoint.
    pub ollama_embed_url: String,
    /// Embedding model identifier.
    pub embed_model: String,
    /// Per-request timeout for all outbound calls.
    pub request_timeout: Duration,
    /// Default pacing interval for batch runs.
    pub batch_pacing: Duration,
}

impl AgentConfig {
    /// Configuration with defaults for everything except the required
    /// generation key.
    #[must_use]
    pub fn new(gemini_api_key: impl Into<String>) -> Self {
        Self {
            gemini_api_key: gemini_api_key.into(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            pinecone_api_key: None,
            pinecone_host: None,
            ollama_embed_url: DEFAULT_OLLAMA_EMBED_URL.to_string(),
            embed_model: DEFAULT_EMBED_MODEL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            batch_pacing: DEFAULT_BATCH_PACING,
        }
    }

    /// Read configuration from the process environment, once, at startup.
    pub fn from_env() -> Result<Self> {
        let gemini_api_key = env::var("GEMINI_API_KEY").map_err(|_| AgentError::Config {
            reason: "GEMINI_API_KEY must be set".to_string(),
        })?;
        let mut config = Self::new(gemini_api_key);
        if let Ok(model) = env::var("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        config.pinecone_api_key = env::var("PINECONE_API_KEY").ok();
        config.pinecone_host = env::var("PINECONE_HOST").ok();
        if let Ok(url) = env::var("OLLAMA_EMBED_URL") {
            config.ollama_embed_url = url;
        }
        Ok(config)
    }

    /// Whether the search collaborator can be constructed at all.
    #[must_use]
    pub fn search_configured(&self) -> bool {
        self.pinecone_api_key.is_some() && self.pinecone_host.is_some()
    }

    /// Batch options paced per this configuration.
    #[must_use]
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::new().pacing(self.batch_pacing)
    }
}
