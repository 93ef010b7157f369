//! The query agent: translation, optional similarity search, and the batch
//! surface.
//!
//! Single-query operations fail fast. Batch operations isolate per-item
//! failures: one item's error is recorded as a marker and never aborts its
//! siblings. Translations share no state, so items are independent; the
//! reference behavior processes them sequentially with optional pacing.

use std::sync::atomic::Ordering;
use std::thread;

use chrono::Local;

#[cfg(feature = "http")]
use crate::config::AgentConfig;
use crate::embed::Embedder;
#[cfg(feature = "http")]
use crate::embed::OllamaEmbedder;
use crate::error::{AgentError, Result};
use crate::provider::InferenceProvider;
#[cfg(feature = "http")]
use crate::provider::GeminiProvider;
use crate::search::VectorSearcher;
#[cfg(feature = "http")]
use crate::search::PineconeIndex;
use crate::translator::QueryTranslator;
use crate::types::{
    BatchItem, BatchOptions, BatchOutcome, BatchReport, QueryContext, SearchOutcome,
    TranslationRecord,
};

/// Orchestrates the translator and its optional collaborators.
pub struct QueryAgent {
    translator: QueryTranslator<Box<dyn InferenceProvider>>,
    embedder: Option<Box<dyn Embedder>>,
    searcher: Option<Box<dyn VectorSearcher>>,
}

impl QueryAgent {
    /// Start building an agent around an inference provider.
    #[must_use]
    pub fn builder(provider: impl InferenceProvider + 'static) -> AgentBuilder {
        AgentBuilder {
            provider: Box::new(provider),
            embedder: None,
            searcher: None,
        }
    }

    /// Wire up the network-backed collaborators described by `config`.
    /// The search collaborator is attached only when fully configured.
    #[cfg(feature = "http")]
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let provider = GeminiProvider::new(
            &config.gemini_api_key,
            &config.gemini_model,
            config.request_timeout,
        )?;
        let mut builder = Self::builder(provider).embedder(OllamaEmbedder::new(
            &config.ollama_embed_url,
            &config.embed_model,
            config.request_timeout,
        )?);
        if let (Some(host), Some(api_key)) = (&config.pinecone_host, &config.pinecone_api_key) {
            builder = builder.searcher(PineconeIndex::new(host, api_key, config.request_timeout)?);
        }
        Ok(builder.build())
    }

    /// Translate one query anchored at the current local date.
    pub fn translate(&self, query: &str) -> Result<TranslationRecord> {
        self.translate_with_context(query, &QueryContext::now())
    }

    /// Translate one query against an explicit date anchor.
    pub fn translate_with_context(
        &self,
        query: &str,
        context: &QueryContext,
    ) -> Result<TranslationRecord> {
        let query = query.trim();
        let filter = self.translator.translate(query, context)?;
        Ok(TranslationRecord {
            original_query: query.to_string(),
            filter,
            timestamp: Local::now().to_rfc3339(),
        })
    }

    /// Translate, embed, and run a similarity search for one query.
    pub fn search(&self, query: &str, top_k: usize) -> Result<SearchOutcome> {
        self.search_with_context(query, top_k, &QueryContext::now())
    }

    /// As [`QueryAgent::search`], with an explicit date anchor.
    pub fn search_with_context(
        &self,
        query: &str,
        top_k: usize,
        context: &QueryContext,
    ) -> Result<SearchOutcome> {
        // Service-level preconditions are checked before spending an
        // inference call.
        let searcher = self.searcher.as_ref().ok_or(AgentError::SearchUnavailable)?;
        let embedder = self.embedder.as_ref().ok_or(AgentError::SearchUnavailable)?;

        let record = self.translate_with_context(query, context)?;
        let vector = embedder.embed(&record.original_query)?;
        if vector.is_empty() {
            return Err(AgentError::embedding(
                "embedding collaborator returned an empty vector",
            ));
        }

        // An empty filter means match-all; the collaborator call omits the
        // filter argument entirely in that case.
        let filter = (!record.filter.is_empty()).then_some(&record.filter);
        let matches = searcher.search(&vector, filter, top_k, true)?;
        Ok(SearchOutcome { record, matches })
    }

    /// Translate each query in order, isolating per-item failures.
    pub fn translate_batch(&self, queries: &[String], options: &BatchOptions) -> BatchReport {
        self.run_batch(queries, options, |query, context| {
            self.translate_with_context(query, context)
                .map(BatchOutcome::Translated)
        })
    }

    /// Translate and search each query in order.
    ///
    /// An unconfigured search backend fails the whole batch up front (a
    /// precondition, not a per-item condition).
    pub fn search_batch(&self, queries: &[String], options: &BatchOptions) -> Result<BatchReport> {
        if self.searcher.is_none() || self.embedder.is_none() {
            return Err(AgentError::SearchUnavailable);
        }
        let top_k = options.top_k;
        Ok(self.run_batch(queries, options, |query, context| {
            self.search_with_context(query, top_k, context)
                .map(BatchOutcome::Searched)
        }))
    }

    fn run_batch<F>(&self, queries: &[String], options: &BatchOptions, per_item: F) -> BatchReport
    where
        F: Fn(&str, &QueryContext) -> Result<BatchOutcome>,
    {
        let context = QueryContext::now();
        let mut report = BatchReport::default();
        let mut issued_any = false;

        for raw in queries {
            let query = raw.trim();
            // Empty entries are skipped, not error-reported.
            if query.is_empty() {
                continue;
            }
            // Cancellation stops issuing new calls; results already
            // produced stay in the report.
            if let Some(flag) = &options.cancel {
                if flag.load(Ordering::SeqCst) {
                    tracing::debug!(
                        processed = report.total_processed,
                        "batch cancelled before completion"
                    );
                    report.cancelled = true;
                    break;
                }
            }
            if issued_any {
                if let Some(interval) = options.pacing {
                    thread::sleep(interval);
                }
            }
            issued_any = true;

            report.total_processed += 1;
            let outcome = match per_item(query, &context) {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::debug!(query, error = %err, "batch item failed");
                    report.failed += 1;
                    BatchOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            };
            report.items.push(BatchItem {
                query: query.to_string(),
                outcome,
            });
        }
        report
    }
}

/// Builder for [`QueryAgent`]; only the inference provider is mandatory.
pub struct AgentBuilder {
    provider: Box<dyn InferenceProvider>,
    embedder: Option<Box<dyn Embedder>>,
    searcher: Option<Box<dyn VectorSearcher>>,
}

impl AgentBuilder {
    #[must_use]
    pub fn embedder(mut self, embedder: impl Embedder + 'static) -> Self {
        self.embedder = Some(Box::new(embedder));
        self
    }

    #[must_use]
    pub fn searcher(mut self, searcher: impl VectorSearcher + 'static) -> Self {
        self.searcher = Some(Box::new(searcher));
        self
    }

    #[must_use]
    pub fn build(self) -> QueryAgent {
        QueryAgent {
            translator: QueryTranslator::new(self.provider),
            embedder: self.embedder,
            searcher: self.searcher,
        }
    }
}
