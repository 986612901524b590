//! Logroute Core Library
//!
//! Routes natural-language requests across interchangeable LLM providers.
//!
//! # Features
//! - Keyword-based complexity classification
//! - Per-category provider preference with session overrides
//! - Ordered fallback with per-attempt timeouts
//! - Per-provider latency and error statistics
//! - Bounded conversation memory with learned error and service patterns

pub mod config;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod planner;
pub mod provider;
pub mod routing;
pub mod search;
pub mod service;

pub use config::{Config, ProviderSettings, ProvidersConfig};
pub use error::{exit_codes, Error, FailureKind, RequestFailure, Result, RouterError};
pub use memory::{ConversationMemory, EnhancementContext, Insights, QueryType};
pub use pipeline::{AskResponse, LogAssistant};
pub use provider::{
    Completion, CompletionOptions, CompletionRequest, ProviderClient, ProviderKind,
    ProviderRegistry, TokenUsage,
};
pub use routing::{
    classify, ComplexityAnalysis, FallbackOrchestrator, RoutedCompletion, RoutingCategory,
    RoutingPolicy, StatsTracker,
};
pub use search::{ElasticsearchBackend, LogEntry, SearchBackend, SearchResults};
pub use service::{
    ComparisonResult, HealthStatus, ProviderHealth, ResetConfirmation, RouteResponse,
    RouterService, StatsReport,
};

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "logroute";
