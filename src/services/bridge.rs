//! Build Bridge Client
//!
//! Forwards `fix-android-bug` commands and build requests to the local HTTP
//! bridge, bypassing the completion model. Every outcome, including
//! transport failures, is rendered as message text.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use mentor_llm::{build_http_client, HttpClientConfig};

use crate::models::chat::{ChatMessage, MODEL_BUILD_SYSTEM};
use crate::models::settings::BridgeSettings;
use crate::utils::error::AppResult;

/// Command prefix routed to the bridge
pub const FIX_COMMAND: &str = "fix-android-bug";

pub const FIX_USAGE: &str =
    "❌ Invalid command format. Use: fix-android-bug <path> \"<bug description>\"";

const BUILD_TOOL: &str = "build-android-pipeline";

/// Whether `text` is a bridge command.
pub fn is_bridge_command(text: &str) -> bool {
    text.starts_with(FIX_COMMAND)
}

/// Body of a fix request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixRequest {
    pub project_path: String,
    pub bug_description: String,
}

/// Split `fix-android-bug <path> "<description>"` into its parts.
///
/// The text is split on single spaces into at most three parts, so the
/// description keeps its inner spaces. Surrounding quotes are removed.
pub fn parse_fix_command(text: &str) -> Option<FixRequest> {
    let parts: Vec<&str> = text.splitn(3, ' ').collect();
    if parts.len() < 3 {
        return None;
    }
    let description = parts[2];
    let description = description
        .strip_prefix('"')
        .and_then(|d| d.strip_suffix('"'))
        .unwrap_or(description);
    Some(FixRequest {
        project_path: parts[1].to_string(),
        bug_description: description.to_string(),
    })
}

#[derive(Debug, Serialize)]
struct BuildRequest<'a> {
    tool_name: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct BridgeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<BridgeData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BridgeData {
    #[serde(default)]
    content: Vec<BridgeContent>,
}

#[derive(Debug, Deserialize)]
struct BridgeContent {
    #[serde(default)]
    text: Option<String>,
}

/// Wording used when a successful response carries no text.
#[derive(Debug, Clone, Copy)]
struct Wording {
    no_text: &'static str,
    empty: &'static str,
    no_data: &'static str,
}

const FIX_WORDING: Wording = Wording {
    no_text: "Result received",
    empty: "✅ Analysis finished, but the result is empty",
    no_data: "✅ Analysis finished, but no data was returned",
};

const BUILD_WORDING: Wording = Wording {
    no_text: "Pipeline started",
    empty: "✅ Pipeline started, but the result is empty",
    no_data: "✅ Pipeline started, but no data was returned",
};

pub struct BridgeClient {
    client: reqwest::Client,
    base_url: String,
}

impl BridgeClient {
    pub fn new(settings: &BridgeSettings, http: &HttpClientConfig) -> AppResult<Self> {
        Ok(Self::with_client(build_http_client(http)?, settings))
    }

    pub fn with_client(client: reqwest::Client, settings: &BridgeSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Handle a `fix-android-bug` message end to end.
    pub async fn handle_command(&self, text: &str) -> ChatMessage {
        let content = match parse_fix_command(text) {
            Some(request) => self.fix_bug(&request).await,
            None => {
                debug!(text, "malformed bridge command");
                FIX_USAGE.to_string()
            }
        };
        ChatMessage::assistant(content, MODEL_BUILD_SYSTEM)
    }

    pub async fn fix_bug(&self, request: &FixRequest) -> String {
        info!(project = %request.project_path, "sending fix request to bridge");
        self.call(FIX_COMMAND, request, FIX_WORDING).await
    }

    pub async fn trigger_build(&self) -> String {
        info!("triggering build pipeline");
        self.call(BUILD_TOOL, &BuildRequest { tool_name: BUILD_TOOL }, BUILD_WORDING)
            .await
    }

    async fn call<B: Serialize>(&self, endpoint: &str, body: &B, wording: Wording) -> String {
        match self.post(endpoint, body, wording).await {
            Ok(text) => text,
            Err(e) => {
                warn!(endpoint, error = %e, "bridge command failed");
                format!("❌ Bridge command failed: {}", e)
            }
        }
    }

    async fn post<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
        wording: Wording,
    ) -> Result<String, reqwest::Error> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(endpoint, status = status.as_u16(), "bridge response");

        if !status.is_success() {
            return Ok(format!("❌ HTTP error: {} - {}", status.as_u16(), text));
        }
        Ok(match serde_json::from_str::<BridgeResponse>(&text) {
            Ok(parsed) => render_response(parsed, wording),
            Err(e) => format!("❌ Bridge command failed: invalid response: {}", e),
        })
    }
}

fn render_response(response: BridgeResponse, wording: Wording) -> String {
    if !response.success {
        let error = response.error.unwrap_or_else(|| "Unknown error".to_string());
        return format!("❌ Error: {}", error);
    }
    match response.data {
        None => wording.no_data.to_string(),
        Some(data) => match data.content.into_iter().next() {
            None => wording.empty.to_string(),
            Some(first) => first.text.unwrap_or_else(|| wording.no_text.to_string()),
        },
    }
}
