//! Google Gemini generateContent client

use super::http::{base_url, build_client, require_key, send_json};
use super::{Completion, CompletionOptions, ProviderClient, ProviderKind, TokenUsage};
use crate::config::ProviderSettings;
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Gemini `models/{model}:generateContent` client
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self> {
        let kind = ProviderKind::Gemini;
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
impl ProviderClient for GeminiClient {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<Completion> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerateRequest<'a> {
            contents: Vec<Content<'a>>,
            generation_config: GenerationConfig,
        }

        #[derive(Serialize)]
        struct Content<'a> {
            role: &'a str,
            parts: Vec<Part<'a>>,
        }

        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            temperature: f32,
            max_output_tokens: u32,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerateResponse {
            #[serde(default)]
            candidates: Vec<Candidate>,
            #[serde(default)]
            usage_metadata: Option<UsageMetadata>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            #[serde(default)]
            content: Option<CandidateContent>,
        }

        #[derive(Deserialize)]
        struct CandidateContent {
            #[serde(default)]
            parts: Vec<CandidatePart>,
        }

        #[derive(Deserialize)]
        struct CandidatePart {
            #[serde(default)]
            text: Option<String>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct UsageMetadata {
            #[serde(default)]
            prompt_token_count: u32,
            #[serde(default)]
            candidates_token_count: u32,
        }

        let model = options.model_or(&self.model);
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_tokens,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        );
        let req = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request);

        let response: GenerateResponse = send_json(self.kind(), req).await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| RouterError::Llm("No candidates returned by Gemini".to_string()))?;

        Ok(Completion {
            text,
            model: model.to_string(),
            usage: response
                .usage_metadata
                .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
                .unwrap_or_default(),
        })
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
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
        let client = GeminiClient::new(&ProviderSettings::with_api_key("test-key")).unwrap();
        assert_eq!(client.model_name(), ProviderKind::Gemini.default_model());
        assert_eq!(client.kind(), ProviderKind::Gemini);
    }

    #[test]
    fn test_new_requires_key() {
        let err = GeminiClient::new(&ProviderSettings::default()).err().unwrap();
        assert!(matches!(err, RouterError::Config(_)));
    }
}
