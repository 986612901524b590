//! Configuration management

use crate::error::{Result, RouterError};
use crate::provider::ProviderKind;
use crate::routing::RoutingCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "LOGROUTE_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Credentials and endpoints per provider
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Category to provider preference lists
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Fallback and timeout behaviour
    #[serde(default)]
    pub system: SystemConfig,

    /// Conversation memory capacities
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Log search backend
    #[serde(default)]
    pub search: SearchConfig,

    /// Query translation settings
    #[serde(default)]
    pub planner: PlannerConfig,
}

/// Settings for all known providers
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderSettings,

    #[serde(default)]
    pub claude: ProviderSettings,

    #[serde(default)]
    pub gemini: ProviderSettings,
}

impl ProvidersConfig {
    pub fn get(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Claude => &self.claude,
            ProviderKind::Gemini => &self.gemini,
        }
    }

    pub fn get_mut(&mut self, kind: ProviderKind) -> &mut ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &mut self.openai,
            ProviderKind::Claude => &mut self.claude,
            ProviderKind::Gemini => &mut self.gemini,
        }
    }
}

/// Settings for a single provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// API key; the provider is unavailable without one
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model override (falls back to the provider's default model)
    #[serde(default)]
    pub model: Option<String>,

    /// Base URL override, mostly for proxies and tests
    #[serde(default)]
    pub base_url: Option<String>,

    /// HTTP client timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ProviderSettings {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// The API key, treating empty strings as absent
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    120
}

/// Provider preference lists per routing category
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingConfig {
    #[serde(default = "default_categories")]
    pub categories: BTreeMap<RoutingCategory, Vec<ProviderKind>>,

    /// Used when a category has no list of its own
    #[serde(default = "default_order")]
    pub default: Vec<ProviderKind>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            default: default_order(),
        }
    }
}

fn default_categories() -> BTreeMap<RoutingCategory, Vec<ProviderKind>> {
    use ProviderKind::*;

    let mut categories = BTreeMap::new();
    // Simple retrieval goes to the faster, cheaper model first
    categories.insert(RoutingCategory::Simple, vec![Gemini, OpenAi, Claude]);
    categories.insert(RoutingCategory::Complex, vec![Claude, OpenAi, Gemini]);
    categories.insert(RoutingCategory::Code, vec![OpenAi, Claude, Gemini]);
    categories
}

fn default_order() -> Vec<ProviderKind> {
    vec![
        ProviderKind::OpenAi,
        ProviderKind::Claude,
        ProviderKind::Gemini,
    ]
}

/// System-wide routing behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Try the remaining providers when the selected one fails
    #[serde(default = "default_true")]
    pub enable_fallback: bool,

    /// Upper bound for a single provider attempt
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,

    /// Log latency for every provider attempt
    #[serde(default = "default_true")]
    pub log_performance: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            enable_fallback: true,
            attempt_timeout_secs: default_attempt_timeout(),
            log_performance: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_attempt_timeout() -> u64 {
    60
}

/// Conversation memory capacities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    #[serde(default = "default_max_contexts")]
    pub max_contexts: usize,

    /// Cap on distinct error signatures and services; unbounded when unset
    #[serde(default)]
    pub max_tracked_patterns: Option<usize>,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            max_contexts: default_max_contexts(),
            max_tracked_patterns: None,
        }
    }
}

fn default_max_turns() -> usize {
    50
}

fn default_max_contexts() -> usize {
    20
}

/// Elasticsearch connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_url")]
    pub url: String,

    #[serde(default = "default_index")]
    pub index: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Window of the query issued when translation fails
    #[serde(default = "default_lookback_days")]
    pub fallback_lookback_days: u32,

    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: default_search_url(),
            index: default_index(),
            username: None,
            password: None,
            max_results: default_max_results(),
            fallback_lookback_days: default_lookback_days(),
            timeout_secs: default_search_timeout(),
        }
    }
}

fn default_search_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_index() -> String {
    "application-logs-*".to_string()
}

fn default_max_results() -> usize {
    10
}

fn default_lookback_days() -> u32 {
    1
}

fn default_search_timeout() -> u64 {
    30
}

/// Settings for natural-language to query translation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Provider tried first for query generation
    #[serde(default = "default_planner_provider")]
    pub preferred_provider: Option<ProviderKind>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "default_planner_temperature")]
    pub temperature: f32,

    #[serde(default = "default_planner_max_tokens")]
    pub max_tokens: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            preferred_provider: default_planner_provider(),
            model: None,
            temperature: default_planner_temperature(),
            max_tokens: default_planner_max_tokens(),
        }
    }
}

fn default_planner_provider() -> Option<ProviderKind> {
    // OpenAI tends to produce the cleanest structured JSON
    Some(ProviderKind::OpenAi)
}

fn default_planner_temperature() -> f32 {
    0.3
}

fn default_planner_max_tokens() -> u32 {
    1500
}

impl Config {
    /// Load config from the default path with environment overrides applied
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::default_path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from a file, returning defaults when it does not exist
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::default_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Overlay credentials and switches from the process environment.
    ///
    /// The environment is only read here; nothing in the crate writes to it.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        for kind in ProviderKind::ALL {
            if let Some(key) = non_empty(kind.credential_env()) {
                self.providers.get_mut(kind).api_key = Some(key);
            }
        }

        if let Some(url) = non_empty("ELASTICSEARCH_URL") {
            self.search.url = url;
        }
        if let Some(username) = non_empty("ELASTICSEARCH_USERNAME") {
            self.search.username = Some(username);
        }
        if let Some(password) = non_empty("ELASTICSEARCH_PASSWORD") {
            self.search.password = Some(password);
        }
        if let Some(flag) = non_empty("ENABLE_MODEL_FALLBACK") {
            self.system.enable_fallback = flag.trim() != "false";
        }
        if let Some(flag) = non_empty("LOG_AI_PERFORMANCE") {
            self.system.log_performance = flag.trim() != "false";
        }
    }

    fn validate(&self) -> Result<()> {
        if self.memory.max_turns == 0 || self.memory.max_contexts == 0 {
            return Err(RouterError::Config(
                "memory capacities must be greater than zero".to_string(),
            ));
        }
        if self.system.attempt_timeout_secs == 0 {
            return Err(RouterError::Config(
                "system.attempt_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_routing_table() {
        let config = Config::default();
        assert_eq!(
            config.routing.categories[&RoutingCategory::Simple],
            vec![ProviderKind::Gemini, ProviderKind::OpenAi, ProviderKind::Claude]
        );
        assert_eq!(config.routing.default[0], ProviderKind::OpenAi);
        assert!(config.system.enable_fallback);
        assert_eq!(config.memory.max_turns, 50);
        assert_eq!(config.memory.max_contexts, 20);
    }

    #[test]
    fn test_env_overrides_skip_empty_values() {
        let env: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("ANTHROPIC_API_KEY", "   "),
            ("ENABLE_MODEL_FALLBACK", "false"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.providers.openai.credential(), Some("sk-test"));
        assert_eq!(config.providers.claude.credential(), None);
        assert!(!config.system.enable_fallback);
    }

    #[test]
    fn test_yaml_round_trip_through_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yml");

        let mut config = Config::default();
        config.providers.gemini.api_key = Some("g-key".to_string());
        config.routing.default = vec![ProviderKind::Gemini];
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.providers.gemini.credential(), Some("g-key"));
        assert_eq!(loaded.routing.default, vec![ProviderKind::Gemini]);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "routing:\n  default: [claude]\nmemory:\n  max_turns: 5\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.routing.default, vec![ProviderKind::Claude]);
        assert_eq!(config.routing.categories.len(), 3);
        assert_eq!(config.memory.max_turns, 5);
        assert_eq!(config.memory.max_contexts, 20);
        assert_eq!(config.search.index, "application-logs-*");
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "memory:\n  max_turns: 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(RouterError::Config(_))
        ));
    }
}
