//! Anthropic Claude messages client

use super::http::{base_url, build_client, require_key, send_json};
use super::{Completion, CompletionOptions, ProviderClient, ProviderKind, TokenUsage};
use crate::config::ProviderSettings;
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Claude `/v1/messages` client
pub struct ClaudeClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let kind = ProviderKind::Claude;
        Ok(Self {
            http_client: build_client(settings)?,
            base_url: base_url(kind, settings),
            api_key: require_key(kind, settings)?,
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| kind.default_model().to_string()),
        })
    }
}

#[async_trait]
impl ProviderClient for ClaudeClient {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<Completion> {
        #[derive(Serialize)]
        struct MessagesRequest<'a> {
            model: &'a str,
            max_tokens: u32,
            temperature: f32,
            messages: Vec<Message<'a>>,
        }

        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct MessagesResponse {
            content: Vec<ContentBlock>,
            #[serde(default)]
            model: Option<String>,
            #[serde(default)]
            usage: Option<Usage>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            kind: String,
            #[serde(default)]
            text: Option<String>,
        }

        #[derive(Deserialize)]
        struct Usage {
            #[serde(default)]
            input_tokens: u32,
            #[serde(default)]
            output_tokens: u32,
        }

        let model = options.model_or(&self.model);
        let request = MessagesRequest {
            model,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/v1/messages", self.base_url);
        let req = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request);

        let response: MessagesResponse = send_json(self.kind(), req).await?;

        let text = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .find_map(|block| block.text)
            .ok_or_else(|| RouterError::Llm("No text content from Claude".to_string()))?;

        Ok(Completion {
            text,
            model: response.model.unwrap_or_else(|| model.to_string()),
            usage: response
                .usage
                .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
                .unwrap_or_default(),
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_default_model() {
        let client = ClaudeClient::new(&ProviderSettings::with_api_key("test-key")).unwrap();
        assert_eq!(client.model_name(), ProviderKind::Claude.default_model());
        assert_eq!(client.kind(), ProviderKind::Claude);
    }

    #[test]
    fn test_new_requires_key() {
        let err = ClaudeClient::new(&ProviderSettings::default()).err().unwrap();
        assert!(matches!(err, RouterError::Config(_)));
    }
}
