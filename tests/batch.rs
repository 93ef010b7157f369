//! Batch processing semantics: per-item isolation, ordering, skip rules,
//! cancellation, and the search path through stub collaborators.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde_json::json;

use nl2query_core::{
    AgentError, BatchOptions, BatchOutcome, Embedder, FilterExpression, InferenceProvider,
    QueryAgent, QueryMatch, Result, VectorSearcher,
};

/// Replies with a fixed response per call, in order; later calls reuse the
/// last entry.
struct ScriptedProvider {
    responses: Vec<String>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(responses: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(|s| (*s).to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl InferenceProvider for ScriptedProvider {
    fn generate(&self, _prompt: &str) -> Result<String> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = index.min(self.responses.len() - 1);
        Ok(self.responses[index].clone())
    }
}

struct StubEmbedder;

impl Embedder for StubEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Ok(vec![0.1, 0.2, 0.3])
    }
}

struct StubSearcher;

impl VectorSearcher for StubSearcher {
    fn search(
        &self,
        _vector: &[f32],
        _filter: Option<&FilterExpression>,
        top_k: usize,
        _include_metadata: bool,
    ) -> Result<Vec<QueryMatch>> {
        Ok((0..top_k.min(2))
            .map(|i| QueryMatch {
                id: format!("doc-{i}"),
                score: 0.9,
                metadata: Some(json!({"author": "Alice"})),
            })
            .collect())
    }
}

fn options() -> BatchOptions {
    // Unpaced; pacing intervals exist for live rate-limited providers.
    BatchOptions::new()
}

#[test]
fn one_bad_item_does_not_abort_its_siblings() {
    let provider = ScriptedProvider::new(&[
        r#"{"author": "Alice"}"#,
        "no json in this reply",
        r#"{"tags": ["cricket"]}"#,
    ]);
    let agent = QueryAgent::builder(provider).build();

    let queries = vec![
        "by Alice".to_string(),
        "gibberish".to_string(),
        "cricket posts".to_string(),
    ];
    let report = agent.translate_batch(&queries, &options());

    assert_eq!(report.total_processed, 3);
    assert_eq!(report.failed, 1);
    assert!(!report.cancelled);
    assert_eq!(report.items.len(), 3);
    assert!(matches!(report.items[0].outcome, BatchOutcome::Translated(_)));
    assert!(matches!(report.items[1].outcome, BatchOutcome::Failed { .. }));
    assert!(matches!(report.items[2].outcome, BatchOutcome::Translated(_)));
}

#[test]
fn report_preserves_input_order() {
    let provider = ScriptedProvider::new(&[r#"{"author": "A"}"#]);
    let agent = QueryAgent::builder(provider).build();

    let queries = vec!["first".to_string(), "second".to_string(), "third".to_string()];
    let report = agent.translate_batch(&queries, &options());

    let order: Vec<&str> = report.items.iter().map(|item| item.query.as_str()).collect();
    assert_eq!(order, vec!["first", "second", "third"]);
}

#[test]
fn empty_and_whitespace_queries_are_skipped_entirely() {
    let provider = ScriptedProvider::new(&[r#"{"author": "A"}"#]);
    let agent = QueryAgent::builder(provider).build();

    let queries = vec![
        String::new(),
        "   ".to_string(),
        "real query".to_string(),
    ];
    let report = agent.translate_batch(&queries, &options());

    // Skipped entries appear nowhere in the report, not even as failures.
    assert_eq!(report.total_processed, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.items.len(), 1);
    assert_eq!(report.items[0].query, "real query");
}

#[test]
fn cancellation_stops_issuing_new_calls_and_keeps_prior_results() {
    struct CancellingProvider {
        flag: Arc<AtomicBool>,
        calls: AtomicUsize,
    }

    impl InferenceProvider for CancellingProvider {
        fn generate(&self, _prompt: &str) -> Result<String> {
            // Trip the flag after the first item completes.
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.flag.store(true, Ordering::SeqCst);
            }
            Ok(r#"{"author": "A"}"#.to_string())
        }
    }

    let flag = Arc::new(AtomicBool::new(false));
    let agent = QueryAgent::builder(CancellingProvider {
        flag: Arc::clone(&flag),
        calls: AtomicUsize::new(0),
    })
    .build();

    let queries = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    let report = agent.translate_batch(&queries, &options().cancel_flag(flag));

    assert!(report.cancelled);
    assert_eq!(report.total_processed, 1);
    assert_eq!(report.items.len(), 1);
    assert!(matches!(report.items[0].outcome, BatchOutcome::Translated(_)));
}

#[test]
fn search_batch_without_backend_fails_once_not_per_item() {
    let provider = ScriptedProvider::new(&[r#"{"author": "A"}"#]);
    let agent = QueryAgent::builder(provider).build();

    let queries = vec!["one".to_string(), "two".to_string()];
    let err = agent
        .search_batch(&queries, &options())
        .expect_err("no backend");
    assert!(matches!(err, AgentError::SearchUnavailable));
}

#[test]
fn search_batch_returns_matches_per_item() {
    let provider = ScriptedProvider::new(&[r#"{"author": "Alice"}"#]);
    let agent = QueryAgent::builder(provider)
        .embedder(StubEmbedder)
        .searcher(StubSearcher)
        .build();

    let queries = vec!["by Alice".to_string(), "more by Alice".to_string()];
    let report = agent
        .search_batch(&queries, &options().top_k(2))
        .expect("batch");

    assert_eq!(report.total_processed, 2);
    assert_eq!(report.failed, 0);
    for item in &report.items {
        match &item.outcome {
            BatchOutcome::Searched(outcome) => {
                assert_eq!(outcome.matches.len(), 2);
                assert_eq!(outcome.record.filter.to_value(), json!({"author": "Alice"}));
            }
            other => panic!("expected search outcome, got {other:?}"),
        }
    }
}

#[test]
fn batch_report_serializes_with_status_tags() {
    let provider = ScriptedProvider::new(&[r#"{"author": "Alice"}"#, "not json"]);
    let agent = QueryAgent::builder(provider).build();

    let queries = vec!["by Alice".to_string(), "junk".to_string()];
    let report = agent.translate_batch(&queries, &options());
    let value = serde_json::to_value(&report).expect("serialize");

    assert_eq!(value["total_processed"], 2);
    assert_eq!(value["failed"], 1);
    assert_eq!(value["items"][0]["status"], "translated");
    assert_eq!(value["items"][0]["query"], "by Alice");
    assert_eq!(value["items"][1]["status"], "failed");
    assert!(value["items"][1]["error"].as_str().is_some());
}
