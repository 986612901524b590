//! Filter extraction from generated log queries

use super::types::TimeRange;
use crate::error::{Result, RouterError};
use serde_json::Value;

const TIMESTAMP_FIELD: &str = "@timestamp";
const SERVICE_FIELDS: &[&str] = &["service.keyword", "service"];
const LEVEL_FIELDS: &[&str] = &["level.keyword", "level"];

/// Constraints found in one generated query; absent fields were not present
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ExtractedFilters {
    pub service: Option<String>,
    pub level: Option<String>,
    pub time_range: Option<TimeRange>,
}

/// Parse a generated query and pull out service, level and time range.
///
/// `query.bool.filter` may be a single clause object or an array of clauses.
pub(crate) fn extract_filters(generated_query: &str) -> Result<ExtractedFilters> {
    let parsed: Value = serde_json::from_str(generated_query.trim())
        .map_err(|e| RouterError::ContextParse(e.to_string()))?;

    if !parsed.is_object() {
        return Err(RouterError::ContextParse(
            "generated query is not a JSON object".to_string(),
        ));
    }

    let mut extracted = ExtractedFilters::default();

    let clauses: Vec<&Value> = match parsed.pointer("/query/bool/filter") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(clause @ Value::Object(_)) => vec![clause],
        _ => Vec::new(),
    };

    for clause in clauses {
        if let Some(range) = clause.get("range").and_then(|r| r.get(TIMESTAMP_FIELD)) {
            let time_range = parse_time_range(range);
            if !time_range.is_empty() {
                extracted.time_range = Some(time_range);
            }
        }

        if let Some(term) = clause.get("term") {
            if let Some(service) = term_value(term, SERVICE_FIELDS) {
                extracted.service = Some(service);
            }
            if let Some(level) = term_value(term, LEVEL_FIELDS) {
                extracted.level = Some(level);
            }
        }
    }

    Ok(extracted)
}

fn parse_time_range(range: &Value) -> TimeRange {
    let bound = |name: &str| range.get(name).and_then(scalar_to_string);
    TimeRange {
        gte: bound("gte"),
        gt: bound("gt"),
        lt: bound("lt"),
        lte: bound("lte"),
    }
}

/// Term values may be bare or wrapped as `{"value": ..}`
fn term_value(term: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| {
        let raw = term.get(*field)?;
        match raw {
            Value::Object(_) => raw.get("value").and_then(scalar_to_string),
            other => scalar_to_string(other),
        }
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_clause_object() {
        let extracted = extract_filters(
            r#"{"query":{"bool":{"filter":{"term":{"service.keyword":"auth-service"}}}}}"#,
        )
        .unwrap();
        assert_eq!(extracted.service.as_deref(), Some("auth-service"));
        assert!(extracted.level.is_none());
        assert!(extracted.time_range.is_none());
    }

    #[test]
    fn test_clause_array_with_range_and_wrapped_term() {
        let extracted = extract_filters(
            r#"{"query":{"bool":{"filter":[
                {"range":{"@timestamp":{"gte":"now-1h","lt":"now"}}},
                {"term":{"level.keyword":{"value":"ERROR"}}}
            ]}}}"#,
        )
        .unwrap();
        assert_eq!(extracted.level.as_deref(), Some("ERROR"));
        let range = extracted.time_range.unwrap();
        assert_eq!(range.gte.as_deref(), Some("now-1h"));
        assert_eq!(range.lt.as_deref(), Some("now"));
        assert!(range.lte.is_none());
    }

    #[test]
    fn test_query_without_filters_yields_nothing() {
        let extracted = extract_filters(r#"{"query":{"match_all":{}}}"#).unwrap();
        assert_eq!(extracted, ExtractedFilters::default());
    }

    #[test]
    fn test_malformed_payload_is_context_parse_error() {
        assert!(matches!(
            extract_filters("not json {"),
            Err(RouterError::ContextParse(_))
        ));
        assert!(matches!(
            extract_filters("[1, 2]"),
            Err(RouterError::ContextParse(_))
        ));
    }
}
