//! Scripted providers and search backend shared by integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use logroute_core::{
    Completion, CompletionOptions, LogEntry, ProviderClient, ProviderKind, ProviderRegistry,
    Result, RouterError, SearchBackend, SearchResults, TokenUsage,
};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct ScriptedClient {
    kind: ProviderKind,
    reply: std::result::Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn ok(kind: ProviderKind, reply: &str) -> Arc<Self> {
        Arc::new(Self::build(kind, Ok(reply.to_string()), None))
    }

    pub fn failing(kind: ProviderKind, reason: &str) -> Arc<Self> {
        Arc::new(Self::build(kind, Err(reason.to_string()), None))
    }

    pub fn slow(kind: ProviderKind, reply: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self::build(kind, Ok(reply.to_string()), Some(delay)))
    }

    fn build(
        kind: ProviderKind,
        reply: std::result::Result<String, String>,
        delay: Option<Duration>,
    ) -> Self {
        Self {
            kind,
            reply,
            delay,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderClient for ScriptedClient {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.reply {
            Ok(text) => Ok(Completion {
                text: text.clone(),
                model: options.model_or(self.model_name()).to_string(),
                usage: TokenUsage::new(10, 5),
            }),
            Err(reason) => Err(RouterError::ExternalError(reason.clone())),
        }
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn model_name(&self) -> &str {
        match self.kind {
            ProviderKind::OpenAi => "mock-gpt",
            ProviderKind::Claude => "mock-claude",
            ProviderKind::Gemini => "mock-gemini",
        }
    }
}

/// Registry in the standard openai, claude, gemini order
pub fn registry(clients: &[Arc<ScriptedClient>]) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();
    for kind in ProviderKind::ALL {
        match clients.iter().find(|c| c.kind() == kind) {
            Some(client) => registry.insert(kind, client.clone()),
            None => registry.insert_unavailable(kind),
        }
    }
    registry
}

/// Search backend returning a fixed page and remembering queries
pub struct RecordingBackend {
    results: SearchResults,
    queries: Mutex<Vec<Value>>,
}

impl RecordingBackend {
    pub fn new(items: Vec<LogEntry>) -> Arc<Self> {
        Arc::new(Self {
            results: SearchResults::from_items(items),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<Value> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for RecordingBackend {
    async fn execute(&self, query: &Value) -> Result<SearchResults> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.results.clone())
    }
}
