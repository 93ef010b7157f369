#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::non_std_lazy_statics)] // once_cell Lazy for compiled regex statics
//
// Strategic lint exceptions - these are allowed project-wide for pragmatic reasons:
//
// Documentation lints: Many internal/self-documenting functions don't need extensive docs.
// Public APIs should still have proper documentation.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Performance/ergonomics trade-offs that are acceptable for this codebase:
#![allow(clippy::needless_pass_by_value)] // Many builders take owned values intentionally
#![allow(clippy::return_self_not_must_use)] // Builder patterns don't need must_use on every method
//
// Return value wrapping: Constructor signatures use Result for consistency even when a
// configuration currently can't fail, allowing future error conditions without breaking API.
#![allow(clippy::unnecessary_wraps)]

//! Natural-language to metadata-filter translation for vector search.
//!
//! The crate turns free-form queries like "posts by Alice Zhang about
//! machine learning from last year" into structured metadata filters
//! (`{"author": "Alice Zhang", "tags": {"$in": ["machine learning"]},
//! "published_year": {"$eq": 2024}}`), using an injected inference provider
//! for the linguistic step and validating everything that comes back.
//! Optional collaborators embed the query text and run filtered similarity
//! search against a vector index.
//!
//! All linguistic interpretation lives in the prompt; the Rust side owns
//! validation, normalization, date arithmetic, and orchestration, so a
//! misbehaving model can degrade quality but never the filter grammar.

/// The nl2query-core crate version (matches `Cargo.toml`).
pub const NL2QUERY_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod agent;
pub mod config;
pub mod embed;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod search;
pub mod tags;
pub mod temporal;
pub mod translator;
pub mod types;

pub use agent::{AgentBuilder, QueryAgent};
pub use config::{AgentConfig, DEFAULT_BATCH_PACING, DEFAULT_REQUEST_TIMEOUT};
pub use embed::{DEFAULT_EMBED_MODEL, DEFAULT_OLLAMA_EMBED_URL, Embedder};
#[cfg(feature = "http")]
pub use embed::OllamaEmbedder;
pub use error::{AgentError, Result};
pub use prompt::build_translation_prompt;
pub use provider::{DEFAULT_GEMINI_MODEL, InferenceProvider};
#[cfg(feature = "http")]
pub use provider::GeminiProvider;
pub use search::VectorSearcher;
#[cfg(feature = "http")]
pub use search::PineconeIndex;
pub use tags::TagRules;
pub use temporal::{DateParts, resolve_date_phrase};
pub use translator::{QueryTranslator, extract_json_block};
pub use types::{
    BatchItem, BatchOptions, BatchOutcome, BatchReport, FieldCondition, FilterExpression,
    FilterField, FilterOperator, QueryContext, QueryMatch, SearchOutcome, TranslationRecord,
};
