//! Conversation memory
//!
//! Bounded history of turns and executed queries, the filters they carried,
//! and longer-lived error/service patterns learned from results. Session
//! state and pattern tables sit behind separate locks so a session reset
//! never touches learned patterns.

mod extract;
mod patterns;
mod types;

pub use patterns::{normalize_error_signature, FrequencyTable, PatternStats};
pub use types::{
    ActiveFilters, ContextMetadata, ConversationSummaryItem, ConversationTurn,
    EnhancementContext, Insights, MemoryStats, PatternCount, PreferencesUpdate, QueryContextEntry,
    QueryType, ServiceCount, TimeRange, TurnMetadata, UserPreferences,
};

use crate::config::MemoryConfig;
use crate::search::SearchResults;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

const FOLLOW_UP_INDICATORS: &[&str] = &[
    "also",
    "and",
    "what about",
    "how about",
    "same time",
    "same service",
    "related",
    "similar",
    "more",
    "other",
    "different",
    "compare",
];

const RECENT_TURN_WINDOW: usize = 5;
const SUGGESTION_LIMIT: usize = 5;
const INSIGHT_LIMIT: usize = 3;

struct SessionState {
    turns: VecDeque<ConversationTurn>,
    contexts: VecDeque<QueryContextEntry>,
    filters: ActiveFilters,
    started_at: DateTime<Utc>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            turns: VecDeque::new(),
            contexts: VecDeque::new(),
            filters: ActiveFilters::default(),
            started_at: Utc::now(),
        }
    }

    fn duration_minutes(&self) -> i64 {
        let elapsed = Utc::now() - self.started_at;
        (elapsed.num_seconds() as f64 / 60.0).round() as i64
    }
}

/// Shared, thread-safe conversation store
pub struct ConversationMemory {
    config: MemoryConfig,
    session: Mutex<SessionState>,
    patterns: Mutex<PatternStats>,
    preferences: Mutex<UserPreferences>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl ConversationMemory {
    pub fn new(config: MemoryConfig) -> Self {
        let patterns = PatternStats::new(config.max_tracked_patterns);
        Self {
            config,
            session: Mutex::new(SessionState::new()),
            patterns: Mutex::new(patterns),
            preferences: Mutex::new(UserPreferences::default()),
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Append a turn, evicting the oldest beyond capacity
    pub fn add_conversation_turn(&self, query: &str, response: &str, meta: TurnMetadata) {
        let turn = ConversationTurn {
            timestamp: Utc::now(),
            user_query: query.to_string(),
            response: response.to_string(),
            query_type: QueryType::classify(query),
            response_time_ms: meta.response_time_ms,
            error: meta.error,
        };

        let mut session = lock(&self.session);
        session.turns.push_back(turn);
        while session.turns.len() > self.config.max_turns {
            session.turns.pop_front();
        }
    }

    /// Record an executed query, carry its filters forward, and learn from
    /// its results. An unparseable query still gets recorded.
    pub fn add_query_context(
        &self,
        query: &str,
        generated_query: &str,
        results: &SearchResults,
        meta: ContextMetadata,
    ) {
        let entry = QueryContextEntry {
            timestamp: Utc::now(),
            original_query: query.to_string(),
            generated_query: generated_query.to_string(),
            result_count: results.items.len(),
            total_found: if results.total > 0 {
                results.total
            } else {
                results.items.len() as u64
            },
            execution_time_ms: meta.execution_time_ms,
        };

        let extracted = extract::extract_filters(generated_query);

        {
            let mut session = lock(&self.session);
            session.contexts.push_back(entry);
            while session.contexts.len() > self.config.max_contexts {
                session.contexts.pop_front();
            }

            match extracted {
                Ok(found) => {
                    tracing::debug!(?found, "Extracted filters from generated query");
                    let filters = &mut session.filters;
                    if found.service.is_some() {
                        filters.service = found.service;
                    }
                    if found.level.is_some() {
                        filters.level = found.level;
                    }
                    if found.time_range.is_some() {
                        filters.time_range = found.time_range;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping context extraction");
                }
            }
        }

        self.learn_from_results(query, results);
    }

    fn learn_from_results(&self, query: &str, results: &SearchResults) {
        let track_errors = query.to_lowercase().contains("error");
        let mut patterns = lock(&self.patterns);

        for item in &results.items {
            if track_errors && (item.level == "ERROR" || item.level == "WARN") {
                let signature = normalize_error_signature(&item.message);
                patterns.error_patterns.increment(&signature);
            }
            if !item.service.is_empty() && item.service != "unknown" {
                patterns.service_frequency.increment(&item.service);
            }
        }
    }

    pub fn is_follow_up(query: &str) -> bool {
        let lower = query.to_lowercase();
        FOLLOW_UP_INDICATORS.iter().any(|i| lower.contains(i))
    }

    /// Read-only snapshot used to enrich the next request
    pub fn query_enhancement_context(&self, query: &str) -> EnhancementContext {
        let (previous_filters, recent_query_types) = {
            let session = lock(&self.session);
            let skip = session.turns.len().saturating_sub(RECENT_TURN_WINDOW);
            let recent: Vec<QueryType> =
                session.turns.iter().skip(skip).map(|t| t.query_type).collect();
            (session.filters.clone(), recent)
        };

        let (suggested_services, common_error_patterns) = {
            let patterns = lock(&self.patterns);
            let services: Vec<String> = patterns
                .service_frequency
                .top_by_count(SUGGESTION_LIMIT)
                .into_iter()
                .map(|(service, _)| service)
                .collect();
            (services, patterns.error_patterns.first_keys(SUGGESTION_LIMIT))
        };

        EnhancementContext {
            is_follow_up: Self::is_follow_up(query),
            previous_time_range: previous_filters.time_range.clone(),
            previous_filters,
            recent_query_types,
            suggested_services,
            common_error_patterns,
        }
    }

    /// Clear turns, query contexts and filters; learned patterns are kept
    pub fn clear_memory(&self) {
        *lock(&self.session) = SessionState::new();
        tracing::info!("Conversation memory cleared");
    }

    pub fn insights(&self) -> Insights {
        let (query_patterns, session_duration_minutes) = {
            let session = lock(&self.session);
            let mut distribution: BTreeMap<QueryType, usize> = BTreeMap::new();
            for turn in &session.turns {
                *distribution.entry(turn.query_type).or_default() += 1;
            }
            (distribution, session.duration_minutes())
        };

        let patterns = lock(&self.patterns);
        Insights {
            top_errors: patterns
                .error_patterns
                .top_by_count(INSIGHT_LIMIT)
                .into_iter()
                .map(|(pattern, count)| PatternCount { pattern, count })
                .collect(),
            top_services: patterns
                .service_frequency
                .top_by_count(INSIGHT_LIMIT)
                .into_iter()
                .map(|(service, count)| ServiceCount { service, count })
                .collect(),
            query_patterns,
            session_duration_minutes,
        }
    }

    /// The last `last_n` turns, oldest first
    pub fn conversation_summary(&self, last_n: usize) -> Vec<ConversationSummaryItem> {
        let session = lock(&self.session);
        let skip = session.turns.len().saturating_sub(last_n);
        session
            .turns
            .iter()
            .skip(skip)
            .map(|t| ConversationSummaryItem {
                query: t.user_query.clone(),
                query_type: t.query_type,
                timestamp: t.timestamp,
            })
            .collect()
    }

    pub fn memory_stats(&self) -> MemoryStats {
        let (turns, contexts, minutes) = {
            let session = lock(&self.session);
            (
                session.turns.len(),
                session.contexts.len(),
                session.duration_minutes(),
            )
        };
        let patterns = lock(&self.patterns);
        MemoryStats {
            conversation_turns: turns,
            query_context_items: contexts,
            learned_error_patterns: patterns.error_patterns.len(),
            tracked_services: patterns.service_frequency.len(),
            session_duration_minutes: minutes,
        }
    }

    pub fn user_preferences(&self) -> UserPreferences {
        lock(&self.preferences).clone()
    }

    pub fn update_user_preferences(&self, update: PreferencesUpdate) -> UserPreferences {
        let mut prefs = lock(&self.preferences);
        prefs.apply(update);
        prefs.clone()
    }

    pub fn turns(&self) -> Vec<ConversationTurn> {
        lock(&self.session).turns.iter().cloned().collect()
    }

    pub fn query_contexts(&self) -> Vec<QueryContextEntry> {
        lock(&self.session).contexts.iter().cloned().collect()
    }

    pub fn active_filters(&self) -> ActiveFilters {
        lock(&self.session).filters.clone()
    }

    pub fn error_pattern_count(&self, signature: &str) -> u64 {
        lock(&self.patterns).error_patterns.get(signature)
    }

    pub fn service_count(&self, service: &str) -> u64 {
        lock(&self.patterns).service_frequency.get(service)
    }

    /// Error signatures with counts, in first-seen order
    pub fn error_patterns(&self) -> Vec<(String, u64)> {
        lock(&self.patterns).error_patterns.entries().to_vec()
    }

    pub fn service_frequency(&self) -> Vec<(String, u64)> {
        lock(&self.patterns).service_frequency.entries().to_vec()
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}
