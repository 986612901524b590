//! Log search backend
//!
//! The backend is an opaque query-execution service: it takes a structured
//! query and returns matching log entries.

mod elasticsearch;

pub use elasticsearch::ElasticsearchBackend;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Executes structured log queries
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn execute(&self, query: &Value) -> Result<SearchResults>;
}

/// A single log line returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub service: String,
    pub level: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(
        timestamp: impl Into<String>,
        service: impl Into<String>,
        level: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            service: service.into(),
            level: level.into(),
            message: message.into(),
        }
    }
}

/// Result page of a query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Total matches, which may exceed `items.len()`
    pub total: u64,
    pub items: Vec<LogEntry>,
    pub took_ms: u64,
}

impl SearchResults {
    pub fn from_items(items: Vec<LogEntry>) -> Self {
        Self {
            total: items.len() as u64,
            items,
            took_ms: 0,
        }
    }
}
