//! Elasticsearch `_search` backend

use super::{LogEntry, SearchBackend, SearchResults};
use crate::config::SearchConfig;
use crate::error::{Result, RouterError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Thin HTTP client for an Elasticsearch index pattern
pub struct ElasticsearchBackend {
    http_client: reqwest::Client,
    config: SearchConfig,
}

impl ElasticsearchBackend {
    pub fn new(config: SearchConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    took: u64,
    hits: Hits,
}

#[derive(Deserialize)]
struct Hits {
    total: Option<Total>,
    #[serde(default)]
    hits: Vec<Hit>,
}

/// `hits.total` is an object on 7.x+ and a bare number on older clusters
#[derive(Deserialize)]
#[serde(untagged)]
enum Total {
    Object { value: u64 },
    Count(u64),
}

#[derive(Deserialize)]
struct Hit {
    #[serde(rename = "_source", default)]
    source: Value,
}

fn to_entry(source: &Value) -> LogEntry {
    let field = |name: &str, fallback: &str| {
        source
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or(fallback)
            .to_string()
    };

    LogEntry {
        timestamp: source
            .get("@timestamp")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        service: field("service", "unknown"),
        level: field("level", "INFO"),
        message: field("message", "No message"),
    }
}

fn parse_response(response: SearchResponse) -> SearchResults {
    let items: Vec<LogEntry> = response.hits.hits.iter().map(|h| to_entry(&h.source)).collect();
    let total = match response.hits.total {
        Some(Total::Object { value }) | Some(Total::Count(value)) => value,
        None => items.len() as u64,
    };
    SearchResults {
        total,
        items,
        took_ms: response.took,
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    async fn execute(&self, query: &Value) -> Result<SearchResults> {
        let mut body = query.clone();
        if let Some(obj) = body.as_object_mut() {
            obj.entry("size")
                .or_insert_with(|| Value::from(self.config.max_results));
        }

        let url = format!(
            "{}/{}/_search",
            self.config.url.trim_end_matches('/'),
            self.config.index
        );
        let mut req = self.http_client.post(&url).json(&body);
        if let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) {
            req = req.basic_auth(user, Some(pass));
        }

        let response = req.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(RouterError::Search(format!(
                "search backend returned HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }

        let parsed: SearchResponse = response.json().await?;
        Ok(parse_response(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_modern_total_and_defaults() {
        let raw = json!({
            "took": 7,
            "hits": {
                "total": {"value": 42, "relation": "eq"},
                "hits": [
                    {"_source": {"@timestamp": "2024-01-01T00:00:00Z", "service": "auth-service", "level": "ERROR", "message": "boom"}},
                    {"_source": {"@timestamp": "2024-01-01T00:00:01Z"}}
                ]
            }
        });
        let results = parse_response(serde_json::from_value(raw).unwrap());
        assert_eq!(results.total, 42);
        assert_eq!(results.took_ms, 7);
        assert_eq!(results.items[0].service, "auth-service");
        assert_eq!(results.items[1].service, "unknown");
        assert_eq!(results.items[1].level, "INFO");
        assert_eq!(results.items[1].message, "No message");
    }

    #[test]
    fn test_parse_legacy_numeric_total() {
        let raw = json!({"took": 1, "hits": {"total": 3, "hits": []}});
        let results = parse_response(serde_json::from_value(raw).unwrap());
        assert_eq!(results.total, 3);
        assert!(results.items.is_empty());
    }
}
