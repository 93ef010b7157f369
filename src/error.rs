//! Error types shared across the crate.

use thiserror::Error;

/// Convenience alias used by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors surfaced by the translation core and its collaborators.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The caller passed an empty or all-whitespace query. Rejected at the
    /// boundary, before any inference call is made.
    #[error("query must not be empty")]
    EmptyQuery,

    /// The inference output contained no parseable JSON object, or the
    /// parsed object violates the filter grammar. Never retried and never
    /// replaced with a default filter.
    #[error("translation failed: {reason}")]
    Translation { reason: String },

    /// The embedding collaborator returned a missing or malformed vector.
    #[error("embedding failed: {reason}")]
    Embedding { reason: String },

    /// The search collaborator is not configured. Service-level
    /// precondition, reported once rather than per item.
    #[error("search backend is not configured")]
    SearchUnavailable,

    /// A remote service answered with an error. The underlying message is
    /// preserved for diagnostics.
    #[error("{service} request failed: {reason}")]
    ExternalService { service: &'static str, reason: String },

    /// Invalid or incomplete process configuration.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// Transport-level failure (connect, timeout, TLS) from an HTTP provider.
    #[cfg(feature = "http")]
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AgentError {
    pub(crate) fn translation(reason: impl Into<String>) -> Self {
        Self::Translation {
            reason: reason.into(),
        }
    }

    pub(crate) fn embedding(reason: impl Into<String>) -> Self {
        Self::Embedding {
            reason: reason.into(),
        }
    }
}
