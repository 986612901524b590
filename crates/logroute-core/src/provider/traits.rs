//! Provider trait definitions

use super::ProviderKind;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default sampling temperature when a caller does not choose one
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default completion length when a caller does not choose one
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Uniform interface to a single LLM backend
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Issue one completion request
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<Completion>;

    /// Which backend this client talks to
    fn kind(&self) -> ProviderKind;

    /// Model used when options carry no override
    fn model_name(&self) -> &str;
}

/// Per-request generation options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionOptions {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl CompletionOptions {
    /// Minimal options used by health probes
    pub fn probe() -> Self {
        Self {
            model: None,
            temperature: 0.0,
            max_tokens: 8,
        }
    }

    /// Model for this request, falling back to the client's own
    pub fn model_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.model.as_deref().unwrap_or(fallback)
    }
}

/// A prompt plus its generation options
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    pub prompt: String,
    pub options: CompletionOptions,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            options: CompletionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }
}

/// Token accounting normalized across providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens + output_tokens,
        }
    }
}

/// Normalized completion result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub model: String,
    #[serde(default)]
    pub usage: TokenUsage,
}
