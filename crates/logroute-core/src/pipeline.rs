//! Natural-language log questions, end to end

use crate::config::{PlannerConfig, SearchConfig};
use crate::error::{RequestFailure, Result};
use crate::memory::{ContextMetadata, TurnMetadata};
use crate::planner;
use crate::provider::{CompletionOptions, CompletionRequest, ProviderKind};
use crate::routing::classify;
use crate::search::{SearchBackend, SearchResults};
use crate::service::RouterService;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub query: String,
    pub generated_query: Value,
    /// True when the model output was unusable and the broad query ran instead
    pub used_fallback_query: bool,
    pub results: SearchResults,
    pub summary: String,
    pub provider: ProviderKind,
    pub model: String,
    pub latency_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Translates questions into log queries, runs them and remembers the outcome
pub struct LogAssistant {
    service: Arc<RouterService>,
    backend: Arc<dyn SearchBackend>,
    planner: PlannerConfig,
    fallback_lookback_days: u32,
}

impl LogAssistant {
    pub fn new(
        service: Arc<RouterService>,
        backend: Arc<dyn SearchBackend>,
        planner: PlannerConfig,
        search: &SearchConfig,
    ) -> Self {
        Self {
            service,
            backend,
            planner,
            fallback_lookback_days: search.fallback_lookback_days,
        }
    }

    pub fn service(&self) -> &Arc<RouterService> {
        &self.service
    }

    pub async fn ask(&self, text: &str) -> std::result::Result<AskResponse, RequestFailure> {
        self.ask_with_provider(text, None).await
    }

    /// Like [`ask`](Self::ask) with `provider` tried first instead of the
    /// planner's preferred provider
    pub async fn ask_with_provider(
        &self,
        text: &str,
        provider: Option<ProviderKind>,
    ) -> std::result::Result<AskResponse, RequestFailure> {
        let start = Instant::now();
        let memory = Arc::clone(self.service.memory());

        match self.ask_inner(text, provider).await {
            Ok(response) => {
                memory.add_conversation_turn(
                    text,
                    &response.summary,
                    TurnMetadata::success(start.elapsed().as_millis() as u64),
                );
                Ok(response)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Log question failed");
                let failure = RequestFailure::new(text, &err);
                memory.add_conversation_turn(
                    text,
                    "",
                    TurnMetadata::failure(failure.message.clone()),
                );
                Err(failure)
            }
        }
    }

    async fn ask_inner(&self, text: &str, provider: Option<ProviderKind>) -> Result<AskResponse> {
        let analysis = classify(text)?;
        let memory = self.service.memory();
        let context = memory.query_enhancement_context(text);

        let request = CompletionRequest::new(planner::build_query_prompt(text, &context))
            .with_options(CompletionOptions {
                model: self.planner.model.clone(),
                temperature: self.planner.temperature,
                max_tokens: self.planner.max_tokens,
            });

        let (routed, _) = self
            .service
            .dispatch(
                &request,
                analysis.category,
                provider.or(self.planner.preferred_provider),
                None,
            )
            .await?;

        tracing::info!(
            provider = %routed.provider,
            model = %routed.model,
            latency_ms = routed.latency_ms,
            "Query generated"
        );

        let (generated_query, used_fallback_query) =
            match planner::clean_generated_query(&routed.content)
                .and_then(|cleaned| serde_json::from_str::<Value>(&cleaned).ok())
            {
                Some(query) => (query, false),
                None => (planner::fallback_query(self.fallback_lookback_days), true),
            };

        let results = self.backend.execute(&generated_query).await?;

        memory.add_query_context(
            text,
            &generated_query.to_string(),
            &results,
            ContextMetadata {
                execution_time_ms: Some(results.took_ms),
            },
        );

        Ok(AskResponse {
            query: text.to_string(),
            summary: planner::summarize_results(&results),
            generated_query,
            used_fallback_query,
            results,
            provider: routed.provider,
            model: routed.model,
            latency_ms: routed.latency_ms,
            timestamp: Utc::now(),
        })
    }
}
