//! Provider selection policy

use super::RoutingCategory;
use crate::config::RoutingConfig;
use crate::error::{Result, RouterError};
use crate::provider::{ProviderKind, ProviderRegistry};

/// Where a routing decision came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    ExplicitPreference,
    SessionOverride,
    CategoryPreference,
    LastResort,
}

/// Maps routing categories to provider preference lists
#[derive(Debug, Clone, Default)]
pub struct RoutingPolicy {
    config: RoutingConfig,
    session_override: Option<Vec<ProviderKind>>,
}

impl RoutingPolicy {
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            config,
            session_override: None,
        }
    }

    /// Replace the session-level override; `None` or an empty list clears it
    pub fn set_session_override(&mut self, providers: Option<Vec<ProviderKind>>) {
        self.session_override = providers.filter(|p| !p.is_empty());
    }

    pub fn with_session_override(mut self, providers: Option<Vec<ProviderKind>>) -> Self {
        self.set_session_override(providers);
        self
    }

    pub fn session_override(&self) -> Option<&[ProviderKind]> {
        self.session_override.as_deref()
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Preference list for a category, or the default list
    pub fn preference_order(&self, category: RoutingCategory) -> &[ProviderKind] {
        self.config
            .categories
            .get(&category)
            .filter(|order| !order.is_empty())
            .unwrap_or(&self.config.default)
    }

    /// Pick the provider for a request
    pub fn select(
        &self,
        category: RoutingCategory,
        explicit_preference: Option<ProviderKind>,
        registry: &ProviderRegistry,
    ) -> Result<ProviderKind> {
        self.select_with_reason(category, explicit_preference, registry)
            .map(|(provider, _)| provider)
    }

    pub fn select_with_reason(
        &self,
        category: RoutingCategory,
        explicit_preference: Option<ProviderKind>,
        registry: &ProviderRegistry,
    ) -> Result<(ProviderKind, SelectionReason)> {
        if let Some(preferred) = explicit_preference {
            if registry.is_available(preferred) {
                return Ok((preferred, SelectionReason::ExplicitPreference));
            }
            tracing::debug!(provider = %preferred, "Preferred provider unavailable");
        }

        if let Some(first) = self.session_override().and_then(|o| o.first()) {
            if registry.is_available(*first) {
                tracing::info!(provider = %first, "Using session-selected provider");
                return Ok((*first, SelectionReason::SessionOverride));
            }
        }

        if let Some(provider) = self
            .preference_order(category)
            .iter()
            .find(|p| registry.is_available(**p))
        {
            return Ok((*provider, SelectionReason::CategoryPreference));
        }

        registry
            .available()
            .first()
            .map(|p| (*p, SelectionReason::LastResort))
            .ok_or(RouterError::NoProviderAvailable)
    }
}
