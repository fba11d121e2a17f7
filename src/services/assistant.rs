//! Assistant
//!
//! Entry point for one user turn. Routes the text to the bridge, the startup
//! interview or the command pipeline (classify, parse, dispatch) and
//! persists both the user message and the reply.

use std::sync::Arc;

use tracing::{debug, info, warn};

use mentor_core::operation::OperationRegistry;
use mentor_llm::{LlmProvider, LlmRequestOptions, OpenAIProvider, ProviderConfig};
use mentor_tools::{
    build_classification_prompt, parse_structured_request, CredentialGuard, OperationDispatcher,
    ParseOutcome,
};

use crate::models::chat::{ChatMessage, MODEL_BUILD_SYSTEM, MODEL_GITHUB_API};
use crate::models::settings::AppConfig;
use crate::services::bridge::{is_bridge_command, BridgeClient};
use crate::services::completion::{complete, describe_llm_error};
use crate::services::github::{register_github_operations, GitHubClient};
use crate::services::interview::{InterviewReply, InterviewService, SessionRegistry, TopicList};
use crate::services::quota::{quota_exceeded_message, GateDecision, TokenUsageGate};
use crate::storage::database::Database;
use crate::storage::messages::{MessageStore, SqliteMessageStore};
use crate::storage::quota::SqliteQuotaService;
use crate::utils::error::{AppError, AppResult};

/// Reply when the model output is not a usable request
pub const UNRECOGNIZED_REPLY: &str = "❌ Could not understand your request. Try rephrasing.";

/// Result of `send_message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    Reply(ChatMessage),
    /// The interview was cancelled while this turn ran; nothing was written
    Discarded,
}

impl TurnOutcome {
    pub fn reply(&self) -> Option<&ChatMessage> {
        match self {
            TurnOutcome::Reply(msg) => Some(msg),
            TurnOutcome::Discarded => None,
        }
    }
}

pub struct Assistant {
    provider: Arc<dyn LlmProvider>,
    dispatcher: OperationDispatcher,
    gate: TokenUsageGate,
    interview: InterviewService,
    bridge: BridgeClient,
    store: Arc<dyn MessageStore>,
}

impl Assistant {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        dispatcher: OperationDispatcher,
        gate: TokenUsageGate,
        interview: InterviewService,
        bridge: BridgeClient,
        store: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            gate,
            interview,
            bridge,
            store,
        }
    }

    /// Wire every collaborator from the configuration.
    pub fn from_config(config: &AppConfig, db: Database) -> AppResult<Self> {
        let provider_config = ProviderConfig {
            api_key: config.llm.api_key.clone(),
            base_url: Some(config.llm.base_url.clone()),
            model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
            temperature: config.llm.temperature,
        };
        let provider = OpenAIProvider::with_http_config(provider_config, &config.http)
            .map_err(|e| AppError::config(e.to_string()))?;

        let github = Arc::new(GitHubClient::new(&config.github, &config.http)?);
        let mut registry = OperationRegistry::new();
        register_github_operations(&mut registry, github);
        let dispatcher =
            OperationDispatcher::new(registry, CredentialGuard::new(config.github.token.clone()));

        let quota = Arc::new(SqliteQuotaService::new(db.clone(), config.quota.daily_limit));
        let gate = TokenUsageGate::new(
            quota,
            config.quota.identity.clone(),
            config.quota.preflight_estimate_tokens,
        );

        let provider: Arc<dyn LlmProvider> = Arc::new(provider);
        let interview = InterviewService::new(
            provider.clone(),
            TopicList::default(),
            config.interview.trigger_keywords.clone(),
            Arc::new(SessionRegistry::new()),
        );
        let bridge = BridgeClient::new(&config.bridge, &config.http)?;
        let store = Arc::new(SqliteMessageStore::new(db));

        Ok(Self::new(provider, dispatcher, gate, interview, bridge, store))
    }

    pub fn interview(&self) -> &InterviewService {
        &self.interview
    }

    /// Process one user message. Only storage failures are errors.
    pub async fn send_message(&self, conversation_id: &str, text: &str) -> AppResult<TurnOutcome> {
        let _turn = self.interview.sessions().lock_turn(conversation_id).await;

        self.store.insert_one(&ChatMessage::user(text)).await?;

        let reply = if is_bridge_command(text.trim()) {
            debug!(conversation = conversation_id, "routing to bridge");
            self.bridge.handle_command(text.trim()).await
        } else if self.interview.claims(conversation_id, text) {
            match self.interview.handle_turn(conversation_id, text).await {
                InterviewReply::Message(msg) => msg,
                InterviewReply::Discarded => return Ok(TurnOutcome::Discarded),
            }
        } else {
            self.run_command(text).await
        };

        self.store.insert_one(&reply).await?;
        Ok(TurnOutcome::Reply(reply))
    }

    async fn run_command(&self, text: &str) -> ChatMessage {
        if let GateDecision::Refuse(usage) = self.gate.check_before().await {
            info!(used = usage.used_tokens, "daily token limit reached, call refused");
            return ChatMessage::system(quota_exceeded_message(&usage));
        }

        let prompt = build_classification_prompt(text, self.dispatcher.registry());
        let completion = match complete(
            self.provider.as_ref(),
            None,
            prompt,
            LlmRequestOptions::default(),
        )
        .await
        {
            Ok(completion) => completion,
            Err(e) => {
                warn!(error = %e, "classification call failed");
                return ChatMessage::assistant(describe_llm_error(&e), MODEL_GITHUB_API);
            }
        };

        if let GateDecision::Refuse(usage) = self.gate.record_after(completion.tokens_used).await {
            info!(used = usage.used_tokens, "daily token limit overrun, answer suppressed");
            return ChatMessage::system(quota_exceeded_message(&usage));
        }

        match parse_structured_request(&completion.text) {
            ParseOutcome::Recognized(request) => {
                info!(operation = %request.operation, "dispatching request");
                let outcome = self.dispatcher.dispatch(&request).await;
                ChatMessage::assistant(outcome.into_message(), MODEL_GITHUB_API)
            }
            ParseOutcome::Unrecognized { reason } => {
                debug!(reason = %reason, "model output not recognized");
                ChatMessage::assistant(UNRECOGNIZED_REPLY, MODEL_GITHUB_API)
            }
        }
    }

    /// Cancel the interview of `conversation_id` without waiting for a
    /// running turn, and persist the notice.
    pub async fn cancel_interview(&self, conversation_id: &str) -> AppResult<ChatMessage> {
        let notice = self.interview.cancel(conversation_id);
        self.store.insert_one(&notice).await?;
        Ok(notice)
    }

    /// Start the build pipeline through the bridge and persist the result.
    pub async fn trigger_build(&self) -> AppResult<ChatMessage> {
        let reply = ChatMessage::assistant(self.bridge.trigger_build().await, MODEL_BUILD_SYSTEM);
        self.store.insert_one(&reply).await?;
        Ok(reply)
    }

    pub async fn history(&self) -> AppResult<Vec<ChatMessage>> {
        self.store.read_all_ordered().await
    }

    pub async fn clear_history(&self) -> AppResult<()> {
        self.store.clear_all().await
    }

    pub async fn message_count(&self) -> AppResult<u64> {
        self.store.count().await
    }
}
