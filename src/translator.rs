//! Query translation: one natural-language query in, one validated
//! [`FilterExpression`] out.
//!
//! The translator performs no linguistic branching itself. It builds the
//! instruction prompt, makes a single stateless inference call, extracts the
//! first balanced JSON object from the response, and validates it against
//! the filter grammar. There is no retry and no fallback filter; failures
//! must stay visible to the caller.

use crate::error::{AgentError, Result};
use crate::prompt::build_translation_prompt;
use crate::provider::InferenceProvider;
use crate::types::{FilterExpression, QueryContext};

/// Translates natural-language queries into metadata filters via an
/// injected inference provider.
pub struct QueryTranslator<P> {
    provider: P,
}

impl<P: InferenceProvider> QueryTranslator<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Translate one query against the supplied current-date anchor.
    ///
    /// Empty or all-whitespace input is rejected here, before any inference
    /// call is issued.
    pub fn translate(&self, query: &str, context: &QueryContext) -> Result<FilterExpression> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AgentError::EmptyQuery);
        }

        let prompt = build_translation_prompt(context, query);
        let raw = self.provider.generate(&prompt)?;
        tracing::debug!(chars = raw.len(), "received inference response");

        let block = extract_json_block(&raw).ok_or_else(|| {
            AgentError::translation("inference output contained no JSON object")
        })?;
        let value: serde_json::Value = serde_json::from_str(block)
            .map_err(|e| AgentError::translation(format!("invalid JSON in inference output: {e}")))?;
        FilterExpression::from_value(&value)
    }
}

/// Extract the first balanced `{...}` span from `text`.
///
/// A depth-tracking scan, aware of string literals and escapes, stopping at
/// the close brace matching the first open brace. A greedy first-`{` to
/// last-`}` match would swallow trailing commentary whenever the model wraps
/// its output in prose containing further braces.
#[must_use]
pub fn extract_json_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
