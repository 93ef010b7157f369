//! Instruction block for the translation inference call.
//!
//! The inference step has no source of truth other than this prompt: the
//! schema, the disambiguation rules, and the worked examples below are the
//! entire specification the model sees. Relative-date examples are computed
//! from the supplied anchor so the grounding stays consistent with the
//! stated current date.

use crate::types::QueryContext;

/// Full prompt for one translation: instruction block plus the query line.
#[must_use]
pub fn build_translation_prompt(context: &QueryContext, query: &str) -> String {
    let mut prompt = instruction_block(context);
    prompt.push_str("\n\nQuery: ");
    prompt.push_str(query);
    prompt
}

/// The fixed instruction block: current date, closed schema, ordered
/// disambiguation rules, and worked input/output pairs.
#[must_use]
pub fn instruction_block(context: &QueryContext) -> String {
    let mut block = format!(
        "You are an expert at converting natural language queries into vector \
         database metadata filters.\n\n\
         Today's date: {date}\n\n\
         METADATA SCHEMA:\n\
         \x20 - author: string (e.g., \"John Doe\"); operators $eq, $ne\n\
         \x20 - tags: list of strings (e.g., [\"AI\", \"NLP\"]); operators $in, $nin\n\
         \x20 - published_year: integer (e.g., 2024); operators $eq, $ne, $gt, $gte, $lt, $lte\n\
         \x20 - published_month: integer 1-12; same operators as published_year\n\
         \x20 - published_day: integer 1-31; same operators as published_year\n\n\
         RULES:\n\
         \x20 1. Treat a name as author only when it carries an authorship marker \
         (\"by X\", \"written by X\", \"posts by X\").\n\
         \x20 2. Treat a phrase as a tag when it follows a topical marker \
         (\"about X\", \"tagged with X\", \"on X\") or stands alone as the subject of the query.\n\
         \x20 3. Use published_year, published_month, published_day for all date filters. \
         Resolve relative dates against today's date: \"last year\" is the previous calendar \
         year, \"this month\" is the current month of the current year, and \"past N years\" \
         is every year from the current year minus N onward, expressed as published_year \
         with $gte. \"Month Year\" phrases parse to that explicit year and month.\n\
         \x20 4. A 4-digit year attached directly to an event or topic name \
         (\"World Cup 2022\", \"Olympics 2024\") stays inside the tag text. Only a year \
         following an explicit date marker (\"from 2023\", \"in 2024\", \"last year\") \
         becomes published_year.\n\
         \x20 5. Topics joined by \"and\" or \"or\" become separate tag entries. General \
         compound topics split into their components (\"celebrity news\" becomes \
         \"celebrity\" and \"news\"), but recognized technical terms and proper nouns stay \
         intact (\"machine learning\", \"vector search\").\n\
         \x20 6. Always wrap tags values in $in or $nin and date values in a comparison \
         operator.\n\
         \x20 7. Omit any field the query does not mention. Never emit null, empty lists, \
         or placeholder values.\n\
         \x20 8. Return valid minified JSON only: no comments, no markdown, no extra text.\n\n\
         EXAMPLES:\n",
        date = context.iso_date()
    );

    for (query, output) in worked_examples(context) {
        block.push_str("  Query: ");
        block.push_str(&query);
        block.push_str("\n  Output: ");
        block.push_str(&output);
        block.push_str("\n\n");
    }

    block.push_str(
        "Convert the following natural language query to a metadata filter. \
         Return ONLY the JSON object.",
    );
    block
}

fn worked_examples(context: &QueryContext) -> Vec<(String, String)> {
    let last_year = context.year - 1;
    let this_year = context.year;
    let this_month = context.month;
    vec![
        (
            "articles by John Doe last year about AI".to_string(),
            format!(
                r#"{{"author":"John Doe","tags":{{"$in":["AI"]}},"published_year":{{"$eq":{last_year}}}}}"#
            ),
        ),
        (
            "posts tagged with 'NLP' in March 2023".to_string(),
            r#"{"tags":{"$in":["NLP"]},"published_year":{"$eq":2023},"published_month":{"$eq":3}}"#
                .to_string(),
        ),
        (
            "anything by Alice".to_string(),
            r#"{"author":"Alice"}"#.to_string(),
        ),
        (
            "find posts about World Cup 2022".to_string(),
            r#"{"tags":{"$in":["World Cup 2022"]}}"#.to_string(),
        ),
        (
            "posts about celebrity news from this month".to_string(),
            format!(
                r#"{{"tags":{{"$in":["celebrity","news"]}},"published_year":{{"$eq":{this_year}}},"published_month":{{"$eq":{this_month}}}}}"#
            ),
        ),
        (
            "Any retrieval or NLP articles by David Kim from December 2023?".to_string(),
            r#"{"author":"David Kim","tags":{"$in":["retrieval","NLP"]},"published_year":{"$eq":2023},"published_month":{"$eq":12}}"#
                .to_string(),
        ),
        (
            "Show me posts by Emma Johnson published on 2024-07-15".to_string(),
            r#"{"author":"Emma Johnson","published_year":{"$eq":2024},"published_month":{"$eq":7},"published_day":{"$eq":15}}"#
                .to_string(),
        ),
        (
            "research on neural networks from 2020".to_string(),
            r#"{"tags":{"$in":["neural networks"]},"published_year":{"$eq":2020}}"#.to_string(),
        ),
        (
            "cricket articles from the past 3 years".to_string(),
            format!(
                r#"{{"tags":{{"$in":["cricket"]}},"published_year":{{"$gte":{}}}}}"#,
                this_year - 3
            ),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_grounded_on_the_anchor_date() {
        let context = QueryContext::new(2025, 3, 9);
        let prompt = build_translation_prompt(&context, "posts about AI");
        assert!(prompt.contains("Today's date: 2025-03-09"));
        // Relative-date example reflects the anchor, not the wall clock.
        assert!(prompt.contains(r#""published_year":{"$eq":2024}"#));
    }

    #[test]
    fn prompt_ends_with_the_query_line() {
        let context = QueryContext::new(2025, 3, 9);
        let prompt = build_translation_prompt(&context, "posts about AI");
        assert!(prompt.ends_with("Query: posts about AI"));
    }

    #[test]
    fn instruction_block_names_every_schema_field() {
        let block = instruction_block(&QueryContext::new(2025, 1, 1));
        for field in [
            "author",
            "tags",
            "published_year",
            "published_month",
            "published_day",
        ] {
            assert!(block.contains(field), "missing schema field {field}");
        }
    }

    #[test]
    fn worked_examples_cover_the_rule_set() {
        let examples = worked_examples(&QueryContext::new(2025, 1, 1));
        assert!(examples.len() >= 6 && examples.len() <= 9);
        // Year-fusion example must keep the year inside the tag.
        assert!(
            examples
                .iter()
                .any(|(_, output)| output.contains("World Cup 2022"))
        );
    }

    #[test]
    fn past_n_years_is_grounded_with_a_range_example() {
        let context = QueryContext::new(2025, 1, 1);
        let block = instruction_block(&context);
        assert!(block.contains("past N years"));
        // The trailing-window example resolves against the anchor year.
        assert!(block.contains(r#""published_year":{"$gte":2022}"#));
    }
}
