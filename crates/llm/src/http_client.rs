//! HTTP Client Factory
//!
//! Builds reqwest clients with the shared timeout settings. Used by the
//! completion provider and by the application's remote API clients.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use mentor_core::error::{CoreError, CoreResult};

/// Timeout and identity settings shared by every outbound client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds (long generations need headroom)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("mentor-assistant/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Build a `reqwest::Client` with the configured timeouts.
pub fn build_http_client(config: &HttpClientConfig) -> CoreResult<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| CoreError::config(format!("failed to build HTTP client: {}", e)))
}
