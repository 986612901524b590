//! Request routing
//!
//! Provides:
//! - Keyword-based complexity classification
//! - Category to provider selection policy
//! - Fallback execution across providers
//! - Per-provider latency and error statistics

mod classifier;
mod orchestrator;
mod policy;
mod stats;

pub use classifier::{classify, ComplexityAnalysis, RoutingCategory};
pub use orchestrator::{FallbackOrchestrator, RoutedCompletion};
pub use policy::{RoutingPolicy, SelectionReason};
pub use stats::{ProviderStat, StatsTracker};
