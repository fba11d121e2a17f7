//! Shared test support: a scripted completion provider and assistant
//! builders backed by in-memory SQLite.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mentor_assistant::models::settings::{BridgeSettings, GitHubSettings, InterviewSettings};
use mentor_assistant::services::assistant::Assistant;
use mentor_assistant::services::bridge::BridgeClient;
use mentor_assistant::services::github::{register_github_operations, GitHubClient};
use mentor_assistant::services::interview::{InterviewService, SessionRegistry, TopicList};
use mentor_assistant::services::quota::TokenUsageGate;
use mentor_assistant::storage::database::Database;
use mentor_assistant::storage::messages::SqliteMessageStore;
use mentor_assistant::storage::quota::SqliteQuotaService;
use mentor_core::OperationRegistry;
use mentor_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
    StopReason, UsageStats,
};
use mentor_tools::{CredentialGuard, OperationDispatcher};

pub const UNREACHABLE: &str = "http://127.0.0.1:1";

/// Provider that replays queued responses and records every prompt.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<LlmResult<LlmResponse>>>,
    prompts: Mutex<Vec<String>>,
    config: ProviderConfig,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            config: ProviderConfig::default(),
        }
    }

    pub fn push_text(&self, text: &str, tokens: u32) {
        self.push(Ok(response(text, tokens, StopReason::EndTurn)));
    }

    pub fn push_truncated(&self, text: &str, tokens: u32) {
        self.push(Ok(response(text, tokens, StopReason::MaxTokens)));
    }

    pub fn push_error(&self, err: LlmError) {
        self.push(Err(err));
    }

    fn push(&self, item: LlmResult<LlmResponse>) {
        self.responses.lock().unwrap().push_back(item);
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

fn response(text: &str, tokens: u32, stop_reason: StopReason) -> LlmResponse {
    LlmResponse {
        content: Some(text.to_string()),
        stop_reason,
        usage: UsageStats {
            input_tokens: tokens,
            output_tokens: 0,
        },
        model: "scripted".to_string(),
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        _system: Option<String>,
        _request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        if let Some(last) = messages.last() {
            self.prompts.lock().unwrap().push(last.content.clone());
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Other {
                    message: "script exhausted".to_string(),
                })
            })
    }
}

/// Knobs for `build_assistant`.
pub struct Setup {
    pub github_url: String,
    pub token: Option<String>,
    pub daily_limit: Option<u64>,
    pub preflight_estimate: u64,
    pub bridge_url: String,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            github_url: UNREACHABLE.to_string(),
            token: Some("ghp_test".to_string()),
            daily_limit: None,
            preflight_estimate: 0,
            bridge_url: UNREACHABLE.to_string(),
        }
    }
}

pub fn build_assistant(provider: Arc<dyn LlmProvider>, setup: Setup) -> Assistant {
    build_assistant_with_db(provider, setup, Database::new_in_memory().unwrap())
}

pub fn build_assistant_with_db(
    provider: Arc<dyn LlmProvider>,
    setup: Setup,
    db: Database,
) -> Assistant {
    let github_settings = GitHubSettings {
        api_base_url: setup.github_url,
        token: setup.token.clone(),
        ..Default::default()
    };
    let github = Arc::new(GitHubClient::with_client(reqwest::Client::new(), &github_settings));
    let mut registry = OperationRegistry::new();
    register_github_operations(&mut registry, github);
    let dispatcher = OperationDispatcher::new(registry, CredentialGuard::new(setup.token));

    let quota = Arc::new(SqliteQuotaService::new(db.clone(), setup.daily_limit));
    let gate = TokenUsageGate::new(quota, "integration", setup.preflight_estimate);

    let interview = InterviewService::new(
        provider.clone(),
        TopicList::default(),
        InterviewSettings::default().trigger_keywords,
        Arc::new(SessionRegistry::new()),
    );
    let bridge = BridgeClient::with_client(
        reqwest::Client::new(),
        &BridgeSettings {
            base_url: setup.bridge_url,
        },
    );

    Assistant::new(
        provider,
        dispatcher,
        gate,
        interview,
        bridge,
        Arc::new(SqliteMessageStore::new(db)),
    )
}

/// An analysis reply in the shape the interview analyzer expects.
pub fn analysis(score: u8, complete: bool, action: &str, next_question: &str) -> String {
    serde_json::json!({
        "analysis": {
            "is_complete": complete,
            "relevance_score": score,
            "missing_info": "",
            "next_action": action
        },
        "next_question": next_question,
        "topic_key": ""
    })
    .to_string()
}

/// One complete startup record.
pub fn startup_record(id: u32) -> String {
    serde_json::json!({
        "id": id.to_string(),
        "title": format!("Idea {}", id),
        "problem": "P",
        "solution": "S",
        "target_customer": "T",
        "value_prop": "V",
        "business_model": "B",
        "KPIs": ["k"],
        "revenue_forecast": "R",
        "status": "new",
        "next_actions": ["a"]
    })
    .to_string()
}
