//! Settings Models
//!
//! Application configuration and settings data structures.

use serde::{Deserialize, Serialize};
use url::Url;

use mentor_llm::http_client::HttpClientConfig;

/// Completion service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Full chat-completions endpoint URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// API key (absent until configured)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Default max tokens per call
    pub max_tokens: u32,
    /// Default sampling temperature
    pub temperature: f32,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: mentor_llm::openai::OPENAI_API_URL.to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

/// Repository-hosting API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubSettings {
    /// REST API root
    pub api_base_url: String,
    /// Personal access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// User-Agent sent with every request (required by the API)
    pub user_agent: String,
    /// Page size for ordinary listings
    pub per_page: u32,
    /// Page size when listing every repository
    pub per_page_all: u32,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.github.com".to_string(),
            token: None,
            user_agent: "mentor-assistant".to_string(),
            per_page: 30,
            per_page_all: 100,
        }
    }
}

/// Local build/fix bridge settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSettings {
    pub base_url: String,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Interview trigger settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewSettings {
    /// Lower-case substrings that start an interview
    pub trigger_keywords: Vec<String>,
}

/// Default trigger keywords (Russian and English)
pub const DEFAULT_TRIGGER_KEYWORDS: &[&str] = &[
    "стартап",
    "запустить",
    "бизнес",
    "свой проект",
    "свою компанию",
    "startup",
    "launch",
    "business",
    "my project",
    "my company",
];

impl Default for InterviewSettings {
    fn default() -> Self {
        Self {
            trigger_keywords: DEFAULT_TRIGGER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

/// Token quota settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSettings {
    /// Identity the usage counter is keyed to
    pub identity: String,
    /// Daily token limit; `None` means unlimited
    #[serde(default)]
    pub daily_limit: Option<u64>,
    /// Tokens assumed for a call before it is made (0 disables the check)
    #[serde(default)]
    pub preflight_estimate_tokens: u64,
}

impl Default for QuotaSettings {
    fn default() -> Self {
        Self {
            identity: "default".to_string(),
            daily_limit: None,
            preflight_estimate_tokens: 0,
        }
    }
}

/// Application configuration stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub github: GitHubSettings,
    #[serde(default)]
    pub bridge: BridgeSettings,
    #[serde(default)]
    pub http: HttpClientConfig,
    #[serde(default)]
    pub interview: InterviewSettings,
    #[serde(default)]
    pub quota: QuotaSettings,
    /// Enable debug logging
    #[serde(default)]
    pub debug_mode: bool,
}

/// Settings update request (partial update)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsUpdate {
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_max_tokens: Option<u32>,
    pub llm_temperature: Option<f32>,
    pub github_api_base_url: Option<String>,
    pub github_token: Option<String>,
    pub bridge_base_url: Option<String>,
    pub trigger_keywords: Option<Vec<String>>,
    pub quota_identity: Option<String>,
    /// `Some(None)` clears the limit
    pub daily_limit: Option<Option<u64>>,
    pub preflight_estimate_tokens: Option<u64>,
    pub debug_mode: Option<bool>,
}

impl AppConfig {
    /// Apply a partial update to the configuration
    pub fn apply_update(&mut self, update: SettingsUpdate) {
        if let Some(url) = update.llm_base_url {
            self.llm.base_url = url;
        }
        if let Some(model) = update.llm_model {
            self.llm.model = model;
        }
        if let Some(key) = update.llm_api_key {
            self.llm.api_key = Some(key).filter(|k| !k.trim().is_empty());
        }
        if let Some(max_tokens) = update.llm_max_tokens {
            self.llm.max_tokens = max_tokens;
        }
        if let Some(temperature) = update.llm_temperature {
            self.llm.temperature = temperature;
        }
        if let Some(url) = update.github_api_base_url {
            self.github.api_base_url = url;
        }
        if let Some(token) = update.github_token {
            self.github.token = Some(token).filter(|t| !t.trim().is_empty());
        }
        if let Some(url) = update.bridge_base_url {
            self.bridge.base_url = url;
        }
        if let Some(keywords) = update.trigger_keywords {
            self.interview.trigger_keywords = keywords;
        }
        if let Some(identity) = update.quota_identity {
            self.quota.identity = identity;
        }
        if let Some(limit) = update.daily_limit {
            self.quota.daily_limit = limit;
        }
        if let Some(estimate) = update.preflight_estimate_tokens {
            self.quota.preflight_estimate_tokens = estimate;
        }
        if let Some(debug) = update.debug_mode {
            self.debug_mode = debug;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        validate_http_url("llm.base_url", &self.llm.base_url)?;
        validate_http_url("github.api_base_url", &self.github.api_base_url)?;
        validate_http_url("bridge.base_url", &self.bridge.base_url)?;

        if self.llm.model.trim().is_empty() {
            return Err("llm.model must not be empty".to_string());
        }
        if self.llm.max_tokens == 0 {
            return Err("llm.max_tokens must be positive".to_string());
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            ));
        }

        if self.github.user_agent.trim().is_empty() {
            return Err("github.user_agent must not be empty".to_string());
        }
        if self.github.per_page == 0 || self.github.per_page > 100 {
            return Err("github.per_page must be between 1 and 100".to_string());
        }
        if self.github.per_page_all == 0 || self.github.per_page_all > 100 {
            return Err("github.per_page_all must be between 1 and 100".to_string());
        }

        if self
            .interview
            .trigger_keywords
            .iter()
            .any(|k| k.trim().is_empty())
        {
            return Err("interview.trigger_keywords must not contain blank entries".to_string());
        }

        if self.quota.identity.trim().is_empty() {
            return Err("quota.identity must not be empty".to_string());
        }

        if self.http.connect_timeout_secs == 0 || self.http.request_timeout_secs == 0 {
            return Err("http timeouts must be positive".to_string());
        }

        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<(), String> {
    let parsed = Url::parse(value).map_err(|e| format!("Invalid {}: {} ({})", field, value, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!(
            "Invalid {}: scheme must be http or https, got {}",
            field, other
        )),
    }
}
