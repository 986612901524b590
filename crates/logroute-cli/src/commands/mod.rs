//! CLI command handlers

pub mod ask;
pub mod chat;
pub mod compare;
pub mod config;
pub mod health;
pub mod insights;
pub mod route;
pub mod stats;
pub mod test_provider;

use anyhow::Result;
use logroute_core::{Config, RouterService};
use std::sync::Arc;

/// Build the router service for one CLI invocation
pub(crate) fn build_service(config: &Config) -> Result<Arc<RouterService>> {
    let service = RouterService::from_config(config)?;
    let available = service.registry().available();
    if available.is_empty() {
        tracing::warn!("No provider credentials configured");
    } else {
        tracing::info!(providers = ?available, "Providers ready");
    }
    Ok(Arc::new(service))
}

/// Join positional words into a single request string
pub(crate) fn join_words(words: &[String]) -> String {
    words.join(" ")
}
