//! Prompt construction and generated-query cleanup

use crate::memory::EnhancementContext;
use crate::search::SearchResults;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt::Write;

const MAX_ERROR_PATTERNS_IN_PROMPT: usize = 2;
const MAX_SUMMARY_LINES: usize = 10;

fn context_lines(context: &EnhancementContext) -> String {
    let mut info = String::new();

    if context.is_follow_up && !context.previous_filters.is_empty() {
        info.push_str("\nContext from previous query:");
        if let Some(service) = &context.previous_filters.service {
            let _ = write!(info, "\n- Previous service filter: {}", service);
        }
        if let Some(level) = &context.previous_filters.level {
            let _ = write!(info, "\n- Previous log level: {}", level);
        }
        if let Some(range) = &context.previous_time_range {
            if let Ok(json) = serde_json::to_string(range) {
                let _ = write!(info, "\n- Previous time range: {}", json);
            }
        }
    }

    if !context.suggested_services.is_empty() {
        let _ = write!(
            info,
            "\nFrequently queried services: {}",
            context.suggested_services.join(", ")
        );
    }

    if !context.recent_query_types.is_empty() {
        let types: Vec<&str> = context.recent_query_types.iter().map(|t| t.as_str()).collect();
        let _ = write!(info, "\nRecent query types: {}", types.join(", "));
    }

    if !context.common_error_patterns.is_empty() {
        let patterns: Vec<&str> = context
            .common_error_patterns
            .iter()
            .take(MAX_ERROR_PATTERNS_IN_PROMPT)
            .map(String::as_str)
            .collect();
        let _ = write!(info, "\nCommon error patterns seen: {}", patterns.join(", "));
    }

    info
}

/// Prompt asking a model to translate a log question into search DSL
pub fn build_query_prompt(query: &str, context: &EnhancementContext) -> String {
    format!(
        r#"You are an expert in Elasticsearch for application log analysis.
Convert the following log query into Elasticsearch DSL JSON.

Requirements:
- Use "bool" and "filter" for conditions.
- Use "term" with .keyword for exact string matches.
- Use "range" for time filters on @timestamp.
- Only use fields: @timestamp, service, level, message.
- Output ONLY valid JSON with no markdown, code blocks or explanations.
- Consider the contextual information below when interpreting the query.
{context}

Query: "{query}"

Additional guidance:
- If this appears to be a follow-up query, consider reusing previous filters where appropriate.
- For error-related queries, focus on level: "ERROR" or "WARN".
- For performance queries, consider including recent time ranges.
- If no specific time is mentioned but context suggests continuation, use previous time range.
- For "yesterday" queries, use range filter with "gte": "now-1d/d", "lt": "now/d".

IMPORTANT: Return only the raw JSON object, starting with {{ and ending with }}.
"#,
        context = context_lines(context),
        query = query,
    )
}

/// Free-form request text enriched with conversation context.
///
/// Returns the text unchanged when there is nothing to add.
pub fn contextual_prompt(query: &str, context: &EnhancementContext) -> String {
    let info = context_lines(context);
    if info.is_empty() {
        return query.to_string();
    }
    format!("Conversation context:{}\n\nRequest: {}", info, query)
}

/// Strip markdown fences and validate the generated query as JSON.
///
/// Returns `None` when the output is not a JSON object.
pub fn clean_generated_query(raw: &str) -> Option<String> {
    let mut cleaned = raw.trim();

    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    cleaned = cleaned.trim();
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest.trim();
    }

    match serde_json::from_str::<Value>(cleaned) {
        Ok(value) if value.is_object() => Some(cleaned.to_string()),
        Ok(_) => {
            tracing::warn!("Generated query is not a JSON object");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Generated query is not valid JSON");
            None
        }
    }
}

/// Broad query covering the last `days` days
pub fn fallback_query(days: u32) -> Value {
    json!({
        "query": {
            "bool": {
                "filter": [
                    {
                        "range": {
                            "@timestamp": {
                                "gte": format!("now-{}d", days.max(1)),
                                "lte": "now"
                            }
                        }
                    }
                ]
            }
        }
    })
}

/// Plain-text digest of a result page
pub fn summarize_results(results: &SearchResults) -> String {
    if results.items.is_empty() {
        return "No logs found.".to_string();
    }

    let mut levels: BTreeMap<&str, usize> = BTreeMap::new();
    for item in &results.items {
        *levels.entry(item.level.as_str()).or_default() += 1;
    }
    let breakdown: Vec<String> = levels
        .iter()
        .map(|(level, count)| format!("{} {}", count, level))
        .collect();

    let mut out = format!(
        "Found {} matching logs (showing {}; {}) in {}ms.",
        results.total,
        results.items.len(),
        breakdown.join(", "),
        results.took_ms
    );

    for item in results.items.iter().take(MAX_SUMMARY_LINES) {
        let _ = write!(
            out,
            "\n[{}] {} {}: {}",
            item.timestamp, item.level, item.service, item.message
        );
    }
    if results.items.len() > MAX_SUMMARY_LINES {
        let _ = write!(out, "\n... {} more", results.items.len() - MAX_SUMMARY_LINES);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ActiveFilters, QueryType};
    use crate::search::LogEntry;

    fn empty_context() -> EnhancementContext {
        EnhancementContext {
            is_follow_up: false,
            previous_filters: ActiveFilters::default(),
            previous_time_range: None,
            recent_query_types: vec![],
            suggested_services: vec![],
            common_error_patterns: vec![],
        }
    }

    #[test]
    fn test_clean_strips_fences() {
        let raw = "```json\n{\"query\":{\"match_all\":{}}}\n```";
        assert_eq!(
            clean_generated_query(raw).as_deref(),
            Some("{\"query\":{\"match_all\":{}}}")
        );
        assert!(clean_generated_query("```\n{}\n```").is_some());
    }

    #[test]
    fn test_clean_rejects_invalid_output() {
        assert!(clean_generated_query("Here is your query: {").is_none());
        assert!(clean_generated_query("[1,2]").is_none());
    }

    #[test]
    fn test_fallback_query_days() {
        let query = fallback_query(3);
        assert_eq!(
            query.pointer("/query/bool/filter/0/range/@timestamp/gte"),
            Some(&json!("now-3d"))
        );
    }

    #[test]
    fn test_prompt_includes_follow_up_context() {
        let mut context = empty_context();
        context.is_follow_up = true;
        context.previous_filters.service = Some("auth-service".to_string());
        context.suggested_services = vec!["auth-service".to_string(), "billing".to_string()];
        context.recent_query_types = vec![QueryType::ErrorInvestigation];

        let prompt = build_query_prompt("what about warnings", &context);
        assert!(prompt.contains("Previous service filter: auth-service"));
        assert!(prompt.contains("Frequently queried services: auth-service, billing"));
        assert!(prompt.contains("Recent query types: error_investigation"));
        assert!(prompt.contains("Query: \"what about warnings\""));
    }

    #[test]
    fn test_contextual_prompt_passthrough() {
        assert_eq!(contextual_prompt("hello", &empty_context()), "hello");
    }

    #[test]
    fn test_summarize_results() {
        assert_eq!(summarize_results(&SearchResults::default()), "No logs found.");

        let results = SearchResults {
            total: 40,
            items: vec![
                LogEntry::new("t1", "api", "ERROR", "boom"),
                LogEntry::new("t2", "api", "INFO", "ok"),
            ],
            took_ms: 5,
        };
        let summary = summarize_results(&results);
        assert!(summary.starts_with("Found 40 matching logs (showing 2; 1 ERROR, 1 INFO) in 5ms."));
        assert!(summary.contains("[t1] ERROR api: boom"));
    }
}
