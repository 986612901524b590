//! Error types for logroute

use crate::provider::ProviderKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Result type alias using RouterError
pub type Result<T> = std::result::Result<T, RouterError>;

/// Error type alias for convenience
pub type Error = RouterError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const PROVIDER_FAILURE: i32 = 4;
}

/// Main error type for logroute
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("Classification error: {0}")]
    Classification(String),

    #[error("No AI provider available: configure at least one API key")]
    NoProviderAvailable,

    #[error("{provider} request failed: {reason}")]
    ProviderCallFailed {
        provider: ProviderKind,
        reason: String,
    },

    #[error(
        "All AI providers failed (tried {}). Original error: {original}",
        join_providers(.attempted)
    )]
    AllProvidersFailed {
        original: String,
        attempted: Vec<ProviderKind>,
    },

    #[error("Could not parse generated query: {0}")]
    ContextParse(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

fn join_providers(providers: &[ProviderKind]) -> String {
    providers
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl RouterError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::UnknownProvider(_) => exit_codes::NOT_FOUND,
            Self::Classification(_)
            | Self::InvalidInput(_)
            | Self::Config(_)
            | Self::NoProviderAvailable => exit_codes::INVALID_INPUT,
            Self::ProviderCallFailed { .. } | Self::AllProvidersFailed { .. } => {
                exit_codes::PROVIDER_FAILURE
            }
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Stable machine-readable name of the failure category
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Classification(_) | Self::InvalidInput(_) => FailureKind::Classification,
            Self::NoProviderAvailable => FailureKind::NoProviderAvailable,
            Self::ProviderCallFailed { .. } => FailureKind::ProviderCallFailed,
            Self::AllProvidersFailed { .. } => FailureKind::AllProvidersFailed,
            Self::Config(_) | Self::UnknownProvider(_) => FailureKind::Configuration,
            _ => FailureKind::Internal,
        }
    }

    /// Providers that were attempted before this error was raised
    pub fn attempted_providers(&self) -> Vec<ProviderKind> {
        match self {
            Self::ProviderCallFailed { provider, .. } => vec![*provider],
            Self::AllProvidersFailed { attempted, .. } => attempted.clone(),
            _ => Vec::new(),
        }
    }
}

/// Failure category exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Classification,
    NoProviderAvailable,
    ProviderCallFailed,
    AllProvidersFailed,
    Configuration,
    Internal,
}

/// User-visible description of a failed request.
///
/// Carries the original request text so a front end can offer a retry
/// without ever showing partial provider output.
#[derive(Debug, Clone, Serialize, Error)]
#[error("{message}")]
pub struct RequestFailure {
    pub request: String,
    pub kind: FailureKind,
    pub message: String,
    pub attempted_providers: Vec<ProviderKind>,
    pub exit_code: i32,
    pub timestamp: DateTime<Utc>,
}

impl RequestFailure {
    pub fn new(request: impl Into<String>, error: &RouterError) -> Self {
        Self {
            request: request.into(),
            kind: error.kind(),
            message: error.to_string(),
            attempted_providers: error.attempted_providers(),
            exit_code: error.exit_code(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_failed_message_lists_providers() {
        let err = RouterError::AllProvidersFailed {
            original: "quota exceeded".to_string(),
            attempted: vec![ProviderKind::OpenAi, ProviderKind::Claude],
        };
        let msg = err.to_string();
        assert!(msg.contains("openai, claude"));
        assert!(msg.contains("quota exceeded"));
        assert_eq!(err.exit_code(), exit_codes::PROVIDER_FAILURE);
    }

    #[test]
    fn test_request_failure_keeps_request_text() {
        let err = RouterError::NoProviderAvailable;
        let failure = RequestFailure::new("show errors from today", &err);
        assert_eq!(failure.request, "show errors from today");
        assert_eq!(failure.kind, FailureKind::NoProviderAvailable);
        assert!(failure.attempted_providers.is_empty());
        assert_eq!(failure.exit_code, exit_codes::INVALID_INPUT);
    }
}
