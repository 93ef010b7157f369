//! Search collaborator: similarity search constrained by a metadata filter.

#[cfg(feature = "http")]
use std::time::Duration;

#[cfg(feature = "http")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "http")]
use crate::error::AgentError;
use crate::error::Result;
use crate::types::{FilterExpression, QueryMatch};

/// Vector similarity search capability.
///
/// `filter` is `None` for an unconstrained (match-all) search; callers must
/// omit the filter rather than pass an empty expression, since backends may
/// treat empty and absent filters differently.
pub trait VectorSearcher: Send + Sync {
    fn search(
        &self,
        vector: &[f32],
        filter: Option<&FilterExpression>,
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>>;
}

impl<S: VectorSearcher + ?Sized> VectorSearcher for Box<S> {
    fn search(
        &self,
        vector: &[f32],
        filter: Option<&FilterExpression>,
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>> {
        (**self).search(vector, filter, top_k, include_metadata)
    }
}

/// Pinecone index client over the data-plane REST API.
#[cfg(feature = "http")]
pub struct PineconeIndex {
    client: reqwest::blocking::Client,
    host: String,
    api_key: String,
}

#[cfg(feature = "http")]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PineconeQueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<serde_json::Value>,
}

#[cfg(feature = "http")]
#[derive(Deserialize)]
struct PineconeQueryResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[cfg(feature = "http")]
#[derive(Deserialize)]
struct PineconeMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[cfg(feature = "http")]
impl PineconeIndex {
    /// `host` is the index data-plane host, e.g. `https://my-index-xxxx.svc.pinecone.io`.
    pub fn new(host: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        let host = host.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            host,
            api_key: api_key.into(),
        })
    }
}

#[cfg(feature = "http")]
impl VectorSearcher for PineconeIndex {
    fn search(
        &self,
        vector: &[f32],
        filter: Option<&FilterExpression>,
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<QueryMatch>> {
        // Empty filters are dropped here as a second line of defense; the
        // wire request must not carry an empty filter object.
        let filter = filter
            .filter(|f| !f.is_empty())
            .map(FilterExpression::to_value);
        tracing::debug!(top_k, filtered = filter.is_some(), "querying index");

        let response = self
            .client
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .json(&PineconeQueryRequest {
                vector,
                top_k,
                include_metadata,
                filter,
            })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AgentError::ExternalService {
                service: "pinecone",
                reason: format!("status {status}: {body}"),
            });
        }

        let payload: PineconeQueryResponse = response.json()?;
        Ok(payload
            .matches
            .into_iter()
            .map(|m| QueryMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }
}
