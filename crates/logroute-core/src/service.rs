//! Router service: the operations exposed to front ends
//!
//! Holds the shared stores (memory, stats) and the swappable provider
//! registry. Every operation takes `&self`, so one instance can serve
//! concurrent callers behind an `Arc`.

use crate::config::{Config, ProviderSettings, ProvidersConfig, RoutingConfig};
use crate::error::{RequestFailure, Result, RouterError};
use crate::memory::{ConversationMemory, Insights, TurnMetadata};
use crate::planner;
use crate::provider::{
    build_client, CompletionOptions, CompletionRequest, ProviderClient, ProviderKind,
    ProviderRegistry, ProviderStatus, TokenUsage,
};
use crate::routing::{
    classify, FallbackOrchestrator, ProviderStat, RoutedCompletion, RoutingCategory,
    RoutingPolicy, SelectionReason, StatsTracker,
};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

const PROBE_PROMPT: &str = "Reply with OK.";

/// How a routed request was served
#[derive(Debug, Clone, Serialize)]
pub struct ProviderDetails {
    pub model: String,
    pub latency_ms: u64,
    pub usage: TokenUsage,
    pub attempted: Vec<ProviderKind>,
    pub used_fallback: bool,
    pub category: RoutingCategory,
    pub confidence: f64,
    pub selection: SelectionReason,
}

/// Successful result of `route_request`
#[derive(Debug, Clone, Serialize)]
pub struct RouteResponse {
    pub response_text: String,
    pub provider_used: ProviderKind,
    pub provider_details: ProviderDetails,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub available_providers: Vec<ProviderKind>,
    pub provider_stats: BTreeMap<ProviderKind, ProviderStat>,
    pub routing_config: RoutingConfig,
    pub session_override: Option<Vec<ProviderKind>>,
    pub enable_fallback: bool,
    pub total_requests: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    NotConfigured,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderHealth {
    pub provider: ProviderKind,
    pub status: HealthStatus,
    pub latency_ms: Option<u64>,
    pub model: Option<String>,
    pub error: Option<String>,
}

impl ProviderHealth {
    fn not_configured(provider: ProviderKind) -> Self {
        Self {
            provider,
            status: HealthStatus::NotConfigured,
            latency_ms: None,
            model: None,
            error: Some("provider is not configured".to_string()),
        }
    }
}

/// One provider's answer in a side-by-side comparison
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub provider: ProviderKind,
    pub success: bool,
    pub response: Option<String>,
    pub model: Option<String>,
    pub latency_ms: Option<u64>,
    pub usage: Option<TokenUsage>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetConfirmation {
    pub reset: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

pub struct RouterService {
    registry: RwLock<Arc<ProviderRegistry>>,
    policy: RwLock<RoutingPolicy>,
    orchestrator: FallbackOrchestrator,
    stats: Arc<StatsTracker>,
    memory: Arc<ConversationMemory>,
    enable_fallback: bool,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

impl RouterService {
    pub fn new(
        registry: ProviderRegistry,
        routing: RoutingConfig,
        orchestrator: FallbackOrchestrator,
        stats: Arc<StatsTracker>,
        memory: Arc<ConversationMemory>,
    ) -> Self {
        Self {
            registry: RwLock::new(Arc::new(registry)),
            policy: RwLock::new(RoutingPolicy::new(routing)),
            orchestrator,
            stats,
            memory,
            enable_fallback: true,
        }
    }

    /// Build clients for every configured credential plus fresh stores
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = ProviderRegistry::from_config(&config.providers)?;
        let orchestrator =
            FallbackOrchestrator::new(Duration::from_secs(config.system.attempt_timeout_secs))
                .with_performance_logging(config.system.log_performance);

        Ok(Self::new(
            registry,
            config.routing.clone(),
            orchestrator,
            Arc::new(StatsTracker::new()),
            Arc::new(ConversationMemory::new(config.memory.clone())),
        )
        .with_fallback(config.system.enable_fallback))
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.enable_fallback = enabled;
        self
    }

    pub fn memory(&self) -> &Arc<ConversationMemory> {
        &self.memory
    }

    pub fn stats(&self) -> &Arc<StatsTracker> {
        &self.stats
    }

    /// Current registry snapshot
    pub fn registry(&self) -> Arc<ProviderRegistry> {
        Arc::clone(&read(&self.registry))
    }

    pub fn provider_statuses(&self) -> Vec<ProviderStatus> {
        self.registry().statuses()
    }

    /// Route free-form text to a provider and record the turn.
    ///
    /// `session_override` applies to this call only. Failures are recorded
    /// as turns too and come back as a structured `RequestFailure`.
    pub async fn route_request(
        &self,
        text: &str,
        session_override: Option<ProviderKind>,
    ) -> std::result::Result<RouteResponse, RequestFailure> {
        let start = Instant::now();

        match self.route_inner(text, session_override).await {
            Ok(response) => {
                self.memory.add_conversation_turn(
                    text,
                    &response.response_text,
                    TurnMetadata::success(start.elapsed().as_millis() as u64),
                );
                Ok(response)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Request failed");
                let failure = RequestFailure::new(text, &err);
                self.memory.add_conversation_turn(
                    text,
                    "",
                    TurnMetadata::failure(failure.message.clone()),
                );
                Err(failure)
            }
        }
    }

    async fn route_inner(
        &self,
        text: &str,
        session_override: Option<ProviderKind>,
    ) -> Result<RouteResponse> {
        let analysis = classify(text)?;
        let context = self.memory.query_enhancement_context(text);
        let request = CompletionRequest::new(planner::contextual_prompt(text, &context));

        let (routed, selection) = self
            .dispatch(&request, analysis.category, None, session_override)
            .await?;

        Ok(RouteResponse {
            provider_details: ProviderDetails {
                used_fallback: routed.used_fallback(),
                model: routed.model,
                latency_ms: routed.latency_ms,
                usage: routed.usage,
                attempted: routed.attempted,
                category: analysis.category,
                confidence: analysis.confidence,
                selection,
            },
            response_text: routed.content,
            provider_used: routed.provider,
            timestamp: Utc::now(),
        })
    }

    /// Select a provider for `category` and execute with fallback
    pub async fn dispatch(
        &self,
        request: &CompletionRequest,
        category: RoutingCategory,
        explicit_preference: Option<ProviderKind>,
        session_override: Option<ProviderKind>,
    ) -> Result<(RoutedCompletion, SelectionReason)> {
        let registry = self.registry();

        let (selected, reason) = {
            let policy = read(&self.policy);
            match session_override {
                Some(provider) => policy
                    .clone()
                    .with_session_override(Some(vec![provider]))
                    .select_with_reason(category, explicit_preference, &registry)?,
                None => policy.select_with_reason(category, explicit_preference, &registry)?,
            }
        };

        tracing::info!(
            provider = %selected,
            category = %category,
            reason = ?reason,
            "Routing request"
        );

        let routed = self
            .orchestrator
            .execute(request, selected, self.enable_fallback, &registry, &self.stats)
            .await?;

        Ok((routed, reason))
    }

    /// Set or clear the override consulted before category preferences
    pub fn set_session_override(&self, providers: Option<Vec<ProviderKind>>) {
        write(&self.policy).set_session_override(providers);
    }

    pub fn get_stats(&self) -> StatsReport {
        let policy = read(&self.policy);
        StatsReport {
            available_providers: self.registry().available(),
            provider_stats: self.stats.snapshot(),
            routing_config: policy.config().clone(),
            session_override: policy.session_override().map(<[ProviderKind]>::to_vec),
            enable_fallback: self.enable_fallback,
            total_requests: self.stats.total_requests(),
        }
    }

    /// Probe every registry slot in parallel; probes are not counted in stats
    pub async fn check_health(&self) -> Vec<ProviderHealth> {
        let registry = self.registry();
        let timeout = self.orchestrator.attempt_timeout();

        let probes = registry.records().iter().map(|record| {
            let kind = record.kind;
            let client = record.client.clone();
            async move {
                match client {
                    Some(client) => probe(kind, client, timeout).await,
                    None => ProviderHealth::not_configured(kind),
                }
            }
        });

        join_all(probes).await
    }

    /// Send one prompt to several providers concurrently.
    ///
    /// An empty `providers` list means every available provider. Each
    /// attempt is recorded in stats.
    pub async fn compare_providers(
        &self,
        prompt: &str,
        providers: &[ProviderKind],
    ) -> Result<Vec<ComparisonResult>> {
        if prompt.trim().is_empty() {
            return Err(RouterError::InvalidInput(
                "comparison prompt must not be empty".to_string(),
            ));
        }

        let registry = self.registry();
        let targets = if providers.is_empty() {
            registry.available()
        } else {
            providers.to_vec()
        };
        let timeout = self.orchestrator.attempt_timeout();
        let options = CompletionOptions::default();

        let calls = targets.into_iter().map(|kind| {
            let client = registry.get(kind);
            let stats = Arc::clone(&self.stats);
            let options = options.clone();
            async move {
                let Some(client) = client else {
                    return ComparisonResult {
                        provider: kind,
                        success: false,
                        response: None,
                        model: None,
                        latency_ms: None,
                        usage: None,
                        error: Some("provider is not configured".to_string()),
                    };
                };

                let start = Instant::now();
                let outcome = timed_complete(&client, prompt, &options, timeout).await;
                let elapsed = start.elapsed();
                stats.record(kind, elapsed, outcome.is_err());
                let latency_ms = Some(elapsed.as_millis() as u64);

                match outcome {
                    Ok(completion) => ComparisonResult {
                        provider: kind,
                        success: true,
                        response: Some(completion.text),
                        model: Some(completion.model),
                        latency_ms,
                        usage: Some(completion.usage),
                        error: None,
                    },
                    Err(err) => ComparisonResult {
                        provider: kind,
                        success: false,
                        response: None,
                        model: Some(client.model_name().to_string()),
                        latency_ms,
                        usage: None,
                        error: Some(err.to_string()),
                    },
                }
            }
        });

        Ok(join_all(calls).await)
    }

    /// Clear session-scoped memory; learned patterns and stats survive
    pub fn reset_session(&self) -> ResetConfirmation {
        self.memory.clear_memory();
        ResetConfirmation {
            reset: true,
            message: "Conversation memory cleared".to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn insights(&self) -> Insights {
        self.memory.insights()
    }

    /// Rebuild the registry from explicit provider settings
    pub fn reload_providers(&self, providers: &ProvidersConfig) -> Result<Vec<ProviderStatus>> {
        let registry = ProviderRegistry::from_config(providers)?;
        let statuses = registry.statuses();
        *write(&self.registry) = Arc::new(registry);
        tracing::info!(
            available = statuses.iter().filter(|s| s.available).count(),
            "Provider registry reloaded"
        );
        Ok(statuses)
    }

    /// Probe a provider built from `settings` without touching the registry
    pub async fn test_provider(
        &self,
        kind: ProviderKind,
        settings: &ProviderSettings,
    ) -> ProviderHealth {
        if settings.credential().is_none() {
            return ProviderHealth::not_configured(kind);
        }

        match build_client(kind, settings) {
            Ok(client) => probe(kind, client, self.orchestrator.attempt_timeout()).await,
            Err(err) => ProviderHealth {
                provider: kind,
                status: HealthStatus::Unhealthy,
                latency_ms: None,
                model: None,
                error: Some(err.to_string()),
            },
        }
    }
}

async fn timed_complete(
    client: &Arc<dyn ProviderClient>,
    prompt: &str,
    options: &CompletionOptions,
    timeout: Duration,
) -> Result<crate::provider::Completion> {
    match tokio::time::timeout(timeout, client.complete(prompt, options)).await {
        Ok(result) => result,
        Err(_) => Err(RouterError::ExternalError(format!(
            "timed out after {}s",
            timeout.as_secs_f64()
        ))),
    }
}

async fn probe(
    kind: ProviderKind,
    client: Arc<dyn ProviderClient>,
    timeout: Duration,
) -> ProviderHealth {
    let start = Instant::now();
    let outcome = timed_complete(&client, PROBE_PROMPT, &CompletionOptions::probe(), timeout).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(completion) => ProviderHealth {
            provider: kind,
            status: HealthStatus::Healthy,
            latency_ms: Some(latency_ms),
            model: Some(completion.model),
            error: None,
        },
        Err(err) => {
            tracing::warn!(provider = %kind, error = %err, "Health probe failed");
            ProviderHealth {
                provider: kind,
                status: HealthStatus::Unhealthy,
                latency_ms: None,
                model: Some(client.model_name().to_string()),
                error: Some(err.to_string()),
            }
        }
    }
}
