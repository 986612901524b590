//! Shared HTTP plumbing for provider clients

use super::ProviderKind;
use crate::config::ProviderSettings;
use crate::error::{Result, RouterError};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Build a reqwest client honouring the provider's timeout
pub(crate) fn build_client(settings: &ProviderSettings) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(settings.timeout_secs))
        .build()
        .map_err(RouterError::Http)
}

/// Resolve the API key or fail with a configuration error
pub(crate) fn require_key(kind: ProviderKind, settings: &ProviderSettings) -> Result<String> {
    settings.credential().map(str::to_string).ok_or_else(|| {
        RouterError::Config(format!(
            "{} requires an API key ({})",
            kind,
            kind.credential_env()
        ))
    })
}

pub(crate) fn base_url(kind: ProviderKind, settings: &ProviderSettings) -> String {
    settings
        .base_url
        .as_deref()
        .unwrap_or(kind.default_base_url())
        .trim_end_matches('/')
        .to_string()
}

/// Send a request and decode the JSON body, mapping non-2xx statuses to errors
pub(crate) async fn send_json<T: DeserializeOwned>(
    kind: ProviderKind,
    request: reqwest::RequestBuilder,
) -> Result<T> {
    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(RouterError::ExternalError(format!(
            "{} API error (HTTP {}): {}",
            kind,
            status.as_u16(),
            truncate(&body, 500)
        )));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| RouterError::Llm(format!("{} returned a malformed response: {}", kind, e)))
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_override_trims_slash() {
        let settings = ProviderSettings {
            base_url: Some("http://localhost:8080/".to_string()),
            ..Default::default()
        };
        assert_eq!(
            base_url(ProviderKind::OpenAi, &settings),
            "http://localhost:8080"
        );
        assert_eq!(
            base_url(ProviderKind::Claude, &ProviderSettings::default()),
            "https://api.anthropic.com"
        );
    }

    #[test]
    fn test_require_key_rejects_blank() {
        let settings = ProviderSettings::with_api_key("  ");
        let err = require_key(ProviderKind::Gemini, &settings).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("hi", 10), "hi");
    }
}
