//! Provider execution with ordered fallback

use super::StatsTracker;
use crate::error::{Result, RouterError};
use crate::provider::{
    Completion, CompletionRequest, ProviderClient, ProviderKind, ProviderRegistry, TokenUsage,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A completion plus the identity of the provider that produced it
#[derive(Debug, Clone, Serialize)]
pub struct RoutedCompletion {
    pub content: String,
    pub provider: ProviderKind,
    pub model: String,
    pub usage: TokenUsage,
    pub latency_ms: u64,
    /// Every provider tried, in order, ending with `provider`
    pub attempted: Vec<ProviderKind>,
}

impl RoutedCompletion {
    pub fn used_fallback(&self) -> bool {
        self.attempted.len() > 1
    }
}

/// Runs a request against the selected provider and walks the fallback chain
#[derive(Debug, Clone)]
pub struct FallbackOrchestrator {
    attempt_timeout: Duration,
    log_performance: bool,
}

impl FallbackOrchestrator {
    pub fn new(attempt_timeout: Duration) -> Self {
        Self {
            attempt_timeout,
            log_performance: true,
        }
    }

    pub fn with_performance_logging(mut self, enabled: bool) -> Self {
        self.log_performance = enabled;
        self
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Execute with one attempt per provider.
    ///
    /// The selected provider goes first; with fallback enabled every other
    /// available provider follows in registry order.
    pub async fn execute(
        &self,
        request: &CompletionRequest,
        selected: ProviderKind,
        enable_fallback: bool,
        registry: &ProviderRegistry,
        stats: &StatsTracker,
    ) -> Result<RoutedCompletion> {
        let mut attempted = vec![selected];

        let original_error = match self.attempt(request, selected, registry, stats).await {
            Ok((completion, latency_ms)) => {
                return Ok(routed(completion, selected, latency_ms, attempted));
            }
            Err(err) => err,
        };

        tracing::warn!(provider = %selected, error = %original_error, "Provider failed");

        if !enable_fallback {
            return Err(original_error);
        }

        let fallbacks: Vec<ProviderKind> = registry
            .available()
            .into_iter()
            .filter(|p| *p != selected)
            .collect();

        for provider in fallbacks {
            tracing::info!(provider = %provider, "Falling back");
            attempted.push(provider);

            match self.attempt(request, provider, registry, stats).await {
                Ok((completion, latency_ms)) => {
                    return Ok(routed(completion, provider, latency_ms, attempted));
                }
                Err(err) => {
                    tracing::warn!(provider = %provider, error = %err, "Fallback provider failed");
                }
            }
        }

        Err(RouterError::AllProvidersFailed {
            original: failure_reason(&original_error),
            attempted,
        })
    }

    /// One bounded attempt against a single provider, always recorded in stats
    async fn attempt(
        &self,
        request: &CompletionRequest,
        provider: ProviderKind,
        registry: &ProviderRegistry,
        stats: &StatsTracker,
    ) -> Result<(Completion, u64)> {
        let client = registry
            .get(provider)
            .ok_or_else(|| RouterError::ProviderCallFailed {
                provider,
                reason: "provider is not configured".to_string(),
            })?;

        let start = Instant::now();
        let outcome = self.call(&client, request).await;
        let elapsed = start.elapsed();

        stats.record(provider, elapsed, outcome.is_err());

        let latency_ms = elapsed.as_millis() as u64;
        if self.log_performance {
            tracing::info!(
                provider = %provider,
                latency_ms,
                success = outcome.is_ok(),
                "Provider attempt finished"
            );
        }

        outcome
            .map(|completion| (completion, latency_ms))
            .map_err(|err| RouterError::ProviderCallFailed {
                provider,
                reason: err.to_string(),
            })
    }

    async fn call(
        &self,
        client: &Arc<dyn ProviderClient>,
        request: &CompletionRequest,
    ) -> Result<Completion> {
        match tokio::time::timeout(
            self.attempt_timeout,
            client.complete(&request.prompt, &request.options),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(RouterError::ExternalError(format!(
                "timed out after {}s",
                self.attempt_timeout.as_secs_f64()
            ))),
        }
    }
}

impl Default for FallbackOrchestrator {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

fn routed(
    completion: Completion,
    provider: ProviderKind,
    latency_ms: u64,
    attempted: Vec<ProviderKind>,
) -> RoutedCompletion {
    RoutedCompletion {
        content: completion.text,
        provider,
        model: completion.model,
        usage: completion.usage,
        latency_ms,
        attempted,
    }
}

fn failure_reason(err: &RouterError) -> String {
    match err {
        RouterError::ProviderCallFailed { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}
