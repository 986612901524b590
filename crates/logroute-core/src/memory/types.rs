//! Value types stored and returned by conversation memory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coarse intent of a user query, used for insights and follow-up context
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    ErrorInvestigation,
    PerformanceAnalysis,
    MetricQuery,
    TemporalQuery,
    ServiceQuery,
    GeneralSearch,
}

impl QueryType {
    /// First matching rule wins, in declaration order
    pub fn classify(query: &str) -> Self {
        const RULES: &[(QueryType, &[&str])] = &[
            (QueryType::ErrorInvestigation, &["error", "exception", "fail"]),
            (QueryType::PerformanceAnalysis, &["performance", "slow", "latency"]),
            (QueryType::MetricQuery, &["count", "how many"]),
            (QueryType::TemporalQuery, &["when", "time", "between"]),
            (QueryType::ServiceQuery, &["service", "application"]),
        ];

        let lower = query.to_lowercase();
        RULES
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
            .map(|(kind, _)| *kind)
            .unwrap_or(QueryType::GeneralSearch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::ErrorInvestigation => "error_investigation",
            QueryType::PerformanceAnalysis => "performance_analysis",
            QueryType::MetricQuery => "metric_query",
            QueryType::TemporalQuery => "temporal_query",
            QueryType::ServiceQuery => "service_query",
            QueryType::GeneralSearch => "general_search",
        }
    }
}

impl std::fmt::Display for QueryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional details attached to a conversation turn
#[derive(Debug, Clone, Default)]
pub struct TurnMetadata {
    pub response_time_ms: Option<u64>,
    pub error: Option<String>,
}

impl TurnMetadata {
    pub fn success(response_time_ms: u64) -> Self {
        Self {
            response_time_ms: Some(response_time_ms),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            response_time_ms: None,
            error: Some(error.into()),
        }
    }
}

/// One request/response exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub timestamp: DateTime<Utc>,
    pub user_query: String,
    pub response: String,
    pub query_type: QueryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContextMetadata {
    pub execution_time_ms: Option<u64>,
}

/// A query that was translated and executed against the log backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryContextEntry {
    pub timestamp: DateTime<Utc>,
    pub original_query: String,
    /// Raw generated query, kept as produced
    pub generated_query: String,
    pub result_count: usize,
    pub total_found: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

/// `@timestamp` range bounds as they appeared in the generated query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<String>,
}

impl TimeRange {
    pub fn is_empty(&self) -> bool {
        self.gte.is_none() && self.gt.is_none() && self.lt.is_none() && self.lte.is_none()
    }
}

/// Most recently observed query constraints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFilters {
    pub service: Option<String>,
    pub level: Option<String>,
    pub time_range: Option<TimeRange>,
}

impl ActiveFilters {
    pub fn is_empty(&self) -> bool {
        self.service.is_none() && self.level.is_none() && self.time_range.is_none()
    }
}

/// Context used to enrich the next request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancementContext {
    pub is_follow_up: bool,
    pub previous_filters: ActiveFilters,
    pub previous_time_range: Option<TimeRange>,
    pub recent_query_types: Vec<QueryType>,
    pub suggested_services: Vec<String>,
    pub common_error_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternCount {
    pub pattern: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCount {
    pub service: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub top_errors: Vec<PatternCount>,
    pub top_services: Vec<ServiceCount>,
    pub query_patterns: BTreeMap<QueryType, usize>,
    pub session_duration_minutes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryStats {
    pub conversation_turns: usize,
    pub query_context_items: usize,
    pub learned_error_patterns: usize,
    pub tracked_services: usize,
    pub session_duration_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationSummaryItem {
    pub query: String,
    pub query_type: QueryType,
    pub timestamp: DateTime<Utc>,
}

/// Per-session display and query defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub default_time_range: String,
    pub preferred_log_level: Option<String>,
    pub favorite_services: Vec<String>,
    pub output_format: String,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_time_range: "1h".to_string(),
            preferred_log_level: None,
            favorite_services: Vec::new(),
            output_format: "summary".to_string(),
            last_updated: None,
        }
    }
}

/// Partial update; `None` fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub default_time_range: Option<String>,
    pub preferred_log_level: Option<String>,
    pub favorite_services: Option<Vec<String>>,
    pub output_format: Option<String>,
}

impl UserPreferences {
    pub(crate) fn apply(&mut self, update: PreferencesUpdate) {
        if let Some(range) = update.default_time_range {
            self.default_time_range = range;
        }
        if let Some(level) = update.preferred_log_level {
            self.preferred_log_level = Some(level);
        }
        if let Some(services) = update.favorite_services {
            self.favorite_services = services;
        }
        if let Some(format) = update.output_format {
            self.output_format = format;
        }
        self.last_updated = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_type_rules() {
        assert_eq!(QueryType::classify("Show ERRORS in auth"), QueryType::ErrorInvestigation);
        assert_eq!(QueryType::classify("why is checkout slow"), QueryType::PerformanceAnalysis);
        assert_eq!(QueryType::classify("how many requests"), QueryType::MetricQuery);
        assert_eq!(QueryType::classify("logs between 2 and 3"), QueryType::TemporalQuery);
        assert_eq!(QueryType::classify("payment service logs"), QueryType::ServiceQuery);
        assert_eq!(QueryType::classify("hello"), QueryType::GeneralSearch);
    }

    #[test]
    fn test_query_type_first_rule_wins() {
        // matches both error and temporal rules
        assert_eq!(
            QueryType::classify("when did the failure start"),
            QueryType::ErrorInvestigation
        );
    }

    #[test]
    fn test_query_type_serializes_snake_case() {
        let json = serde_json::to_string(&QueryType::MetricQuery).unwrap();
        assert_eq!(json, "\"metric_query\"");
    }

    #[test]
    fn test_preferences_update_is_partial() {
        let mut prefs = UserPreferences::default();
        prefs.apply(PreferencesUpdate {
            preferred_log_level: Some("ERROR".to_string()),
            ..Default::default()
        });
        assert_eq!(prefs.default_time_range, "1h");
        assert_eq!(prefs.output_format, "summary");
        assert_eq!(prefs.preferred_log_level.as_deref(), Some("ERROR"));
        assert!(prefs.last_updated.is_some());
    }
}
