//! Registry of initialized provider clients

use super::{ClaudeClient, GeminiClient, OpenAiClient, ProviderClient, ProviderKind};
use crate::config::{ProviderSettings, ProvidersConfig};
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;

/// A provider slot in the registry
#[derive(Clone)]
pub struct ProviderRecord {
    pub kind: ProviderKind,
    pub client: Option<Arc<dyn ProviderClient>>,
}

impl ProviderRecord {
    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }
}

/// Availability summary of a registry slot
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider: ProviderKind,
    pub available: bool,
    pub model: Option<String>,
}

/// Providers keyed by kind, in insertion order.
///
/// Insertion order is the fallback order used by the orchestrator.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    records: Vec<ProviderRecord>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build clients for every provider with a credential.
    ///
    /// Providers without credentials are kept as unavailable slots.
    pub fn from_config(config: &ProvidersConfig) -> Result<Self> {
        let mut registry = Self::new();

        for kind in ProviderKind::ALL {
            let settings = config.get(kind);
            if settings.credential().is_none() {
                tracing::debug!(provider = %kind, "No credential configured");
                registry.insert_unavailable(kind);
                continue;
            }
            let client = build_client(kind, settings)?;
            tracing::info!(provider = %kind, model = client.model_name(), "Provider initialized");
            registry.insert(kind, client);
        }

        let available = registry.available();
        tracing::info!(
            "AI providers initialized: {} available ({})",
            available.len(),
            available
                .iter()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(registry)
    }

    /// Add or replace a client; new kinds go to the end of the order
    pub fn insert(&mut self, kind: ProviderKind, client: Arc<dyn ProviderClient>) {
        match self.records.iter_mut().find(|r| r.kind == kind) {
            Some(record) => record.client = Some(client),
            None => self.records.push(ProviderRecord {
                kind,
                client: Some(client),
            }),
        }
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_client(mut self, kind: ProviderKind, client: Arc<dyn ProviderClient>) -> Self {
        self.insert(kind, client);
        self
    }

    pub fn insert_unavailable(&mut self, kind: ProviderKind) {
        if !self.records.iter().any(|r| r.kind == kind) {
            self.records.push(ProviderRecord { kind, client: None });
        }
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ProviderClient>> {
        self.records
            .iter()
            .find(|r| r.kind == kind)
            .and_then(|r| r.client.clone())
    }

    pub fn is_available(&self, kind: ProviderKind) -> bool {
        self.records
            .iter()
            .any(|r| r.kind == kind && r.is_available())
    }

    /// Available providers in insertion order
    pub fn available(&self) -> Vec<ProviderKind> {
        self.records
            .iter()
            .filter(|r| r.is_available())
            .map(|r| r.kind)
            .collect()
    }

    pub fn records(&self) -> &[ProviderRecord] {
        &self.records
    }

    pub fn statuses(&self) -> Vec<ProviderStatus> {
        self.records
            .iter()
            .map(|r| ProviderStatus {
                provider: r.kind,
                available: r.is_available(),
                model: r.client.as_ref().map(|c| c.model_name().to_string()),
            })
            .collect()
    }
}

/// Construct the concrete client for a provider kind
pub fn build_client(
    kind: ProviderKind,
    settings: &ProviderSettings,
) -> Result<Arc<dyn ProviderClient>> {
    let client: Arc<dyn ProviderClient> = match kind {
        ProviderKind::OpenAi => Arc::new(OpenAiClient::new(settings)?),
        ProviderKind::Claude => Arc::new(ClaudeClient::new(settings)?),
        ProviderKind::Gemini => Arc::new(GeminiClient::new(settings)?),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_marks_missing_credentials_unavailable() {
        let mut config = ProvidersConfig::default();
        config.claude = ProviderSettings::with_api_key("sk-ant-test");

        let registry = ProviderRegistry::from_config(&config).unwrap();

        assert_eq!(registry.records().len(), 3);
        assert_eq!(registry.available(), vec![ProviderKind::Claude]);
        assert!(!registry.is_available(ProviderKind::OpenAi));
        assert!(registry.get(ProviderKind::Gemini).is_none());
        assert_eq!(
            registry.get(ProviderKind::Claude).unwrap().model_name(),
            "claude-3-sonnet-20240229"
        );
    }

    #[test]
    fn test_empty_config_has_no_available_providers() {
        let registry = ProviderRegistry::from_config(&ProvidersConfig::default()).unwrap();
        assert!(registry.available().is_empty());
        assert!(registry.statuses().iter().all(|s| !s.available));
    }

    #[test]
    fn test_model_override_is_used() {
        let mut config = ProvidersConfig::default();
        config.openai = ProviderSettings {
            api_key: Some("sk-test".to_string()),
            model: Some("gpt-4o-mini".to_string()),
            ..Default::default()
        };
        let registry = ProviderRegistry::from_config(&config).unwrap();
        let statuses = registry.statuses();
        assert_eq!(statuses[0].model.as_deref(), Some("gpt-4o-mini"));
    }
}
