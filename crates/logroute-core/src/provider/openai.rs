//! OpenAI chat completions client

use super::http::{base_url, build_client, require_key, send_json};
use super::{Completion, CompletionOptions, ProviderClient, ProviderKind, TokenUsage};
use crate::config::ProviderSettings;
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible `/v1/chat/completions` client
pub struct OpenAiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let kind = ProviderKind::OpenAi;
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
impl ProviderClient for OpenAiClient {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<Completion> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            temperature: f32,
            max_tokens: u32,
        }

        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
            #[serde(default)]
            model: Option<String>,
            #[serde(default)]
            usage: Option<ChatUsage>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ChoiceMessage,
        }

        #[derive(Deserialize)]
        struct ChoiceMessage {
            #[serde(default)]
            content: Option<String>,
        }

        #[derive(Deserialize)]
        struct ChatUsage {
            #[serde(default)]
            prompt_tokens: u32,
            #[serde(default)]
            completion_tokens: u32,
        }

        let model = options.model_or(&self.model);
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let req = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request);

        let response: ChatResponse = send_json(self.kind(), req).await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RouterError::Llm("No response from OpenAI".to_string()))?;

        let usage = response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(Completion {
            text: text.trim().to_string(),
            model: response.model.unwrap_or_else(|| model.to_string()),
            usage,
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
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
        let client = OpenAiClient::new(&ProviderSettings::with_api_key("test-key")).unwrap();
        assert_eq!(client.model_name(), ProviderKind::OpenAi.default_model());
        assert_eq!(client.kind(), ProviderKind::OpenAi);
    }

    #[test]
    fn test_new_requires_key() {
        let err = OpenAiClient::new(&ProviderSettings::default()).err().unwrap();
        assert!(matches!(err, RouterError::Config(_)));
    }
}
