//! LLM provider integration
//!
//! Provides:
//! - The `ProviderClient` trait every backend implements
//! - HTTP clients for OpenAI, Claude and Gemini
//! - A registry of initialized clients keyed by provider kind

mod anthropic;
mod gemini;
mod http;
mod kind;
mod openai;
mod registry;
mod traits;

pub use anthropic::ClaudeClient;
pub use gemini::GeminiClient;
pub use kind::ProviderKind;
pub use openai::OpenAiClient;
pub use registry::{build_client, ProviderRecord, ProviderRegistry, ProviderStatus};
pub use traits::*;
