//! Public request/response types for translation, search, and batch runs.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};

use super::filter::FilterExpression;

/// Current-date anchor used to resolve relative temporal language.
///
/// Constructed fresh per call; it carries no persistent identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryContext {
    pub year: i32,
    /// 1-12.
    pub month: u32,
    /// 1-31.
    pub day: u32,
}

impl QueryContext {
    #[must_use]
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// Anchor at the local wall-clock date.
    #[must_use]
    pub fn now() -> Self {
        let today = Local::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
            day: today.day(),
        }
    }

    /// ISO `YYYY-MM-DD` rendering used for prompt grounding.
    #[must_use]
    pub fn iso_date(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Result of translating one query: the validated filter plus echo metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRecord {
    /// Trimmed query text that was translated.
    pub original_query: String,
    /// Validated metadata filter.
    pub filter: FilterExpression,
    /// RFC 3339 timestamp of when the translation completed.
    pub timestamp: String,
}

/// One ranked match returned by the search collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMatch {
    pub id: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Translation plus the similarity-search hits it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub record: TranslationRecord,
    pub matches: Vec<QueryMatch>,
}

/// Per-item batch result. Failures are recorded here instead of aborting
/// sibling items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchOutcome {
    Translated(TranslationRecord),
    Searched(SearchOutcome),
    Failed { error: String },
}

/// One processed batch entry, in input order. Empty input strings are
/// skipped entirely and never appear in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub query: String,
    #[serde(flatten)]
    pub outcome: BatchOutcome,
}

/// Outcome of a whole batch run. The batch itself succeeds even when
/// individual items failed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
    /// Items attempted (skipped empties excluded).
    pub total_processed: usize,
    /// Items whose outcome is `Failed`.
    pub failed: usize,
    /// True when cancellation stopped the run before all items were issued.
    pub cancelled: bool,
}

/// Knobs for batch runs.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Minimum delay between consecutive provider calls. Conservative pacing
    /// for providers with per-minute rate limits.
    pub pacing: Option<Duration>,
    /// Cooperative cancellation: when set to `true`, no further per-item
    /// calls are issued. In-flight work completes and its result is kept.
    pub cancel: Option<Arc<AtomicBool>>,
    /// Result-count bound for search batches.
    pub top_k: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pacing: None,
            cancel: None,
            top_k: 10,
        }
    }

    #[must_use]
    pub fn pacing(mut self, interval: Duration) -> Self {
        self.pacing = Some(interval);
        self
    }

    #[must_use]
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    #[must_use]
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}
