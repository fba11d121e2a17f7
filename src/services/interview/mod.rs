//! Startup Interview Service
//!
//! Multi-turn interview that collects information about a startup idea and
//! ends with generated recommendations.
//!
//! ## Architecture
//! - `topics.rs` - Ordered topic list and opening questions
//! - `analyzer.rs` - Model-graded answer analysis
//! - `machine.rs` - Pure transition function over `DialogState`
//! - `deliverable.rs` - Summary and recommendations generation
//! - `registry.rs` - Per-conversation sessions, epochs and turn locks

pub mod analyzer;
pub mod deliverable;
pub mod machine;
pub mod registry;
pub mod topics;

use std::sync::Arc;

use tracing::{debug, info};

use mentor_llm::LlmProvider;

use crate::models::chat::{ChatMessage, MODEL_STARTUP_EXPERT};

pub use analyzer::{AnalysisOutcome, AnalysisReply};
pub use machine::{format_clarification, is_trigger, Step, Transition};
pub use registry::{SessionRegistry, SessionSnapshot, TurnGuard};
pub use topics::{Topic, TopicList};

/// Notice appended when the user cancels an interview.
pub const CANCEL_NOTICE: &str = "❌ Startup dialog cancelled. You can ask any other question.";

/// Result of one interview turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewReply {
    Message(ChatMessage),
    /// The session was cancelled while the turn was running
    Discarded,
}

pub struct InterviewService {
    provider: Arc<dyn LlmProvider>,
    topics: TopicList,
    trigger_keywords: Vec<String>,
    sessions: Arc<SessionRegistry>,
}

impl InterviewService {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        topics: TopicList,
        trigger_keywords: Vec<String>,
        sessions: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            provider,
            topics,
            trigger_keywords,
            sessions,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Whether `text` belongs to the interview: a session is running or the
    /// text contains a trigger keyword.
    pub fn claims(&self, conversation_id: &str, text: &str) -> bool {
        self.sessions.is_active(conversation_id) || is_trigger(text, &self.trigger_keywords)
    }

    /// Run one turn. The caller holds the conversation's turn lock.
    pub async fn handle_turn(&self, conversation_id: &str, text: &str) -> InterviewReply {
        let snapshot = self.sessions.snapshot(conversation_id);

        let (transition, message) = if snapshot.state.is_active {
            let outcome =
                analyzer::analyze(self.provider.as_ref(), &self.topics, &snapshot.state, text).await;
            let transition = machine::transition(&snapshot.state, &self.topics, text, outcome);
            let message = self.render(&transition.step).await;
            (transition, message)
        } else {
            info!(conversation = conversation_id, "starting startup interview");
            let transition = machine::start(&self.topics, text);
            let message = self.render(&transition.step).await;
            (transition, message)
        };

        if self
            .sessions
            .commit(conversation_id, snapshot.epoch, transition.state)
        {
            InterviewReply::Message(message)
        } else {
            debug!(conversation = conversation_id, "interview turn discarded after cancel");
            InterviewReply::Discarded
        }
    }

    async fn render(&self, step: &Step) -> ChatMessage {
        match step {
            Step::AskTopic { question, .. } => {
                ChatMessage::assistant(question.clone(), MODEL_STARTUP_EXPERT)
            }
            Step::Clarify {
                question,
                attempts_left,
            } => ChatMessage::assistant(
                format_clarification(question, *attempts_left),
                MODEL_STARTUP_EXPERT,
            ),
            Step::Finish { answers } => {
                info!(answers = answers.len(), "interview finished, generating deliverable");
                deliverable::generate(self.provider.as_ref(), &self.topics, answers).await
            }
        }
    }

    /// Reset the session immediately and return the cancellation notice.
    pub fn cancel(&self, conversation_id: &str) -> ChatMessage {
        let was_active = self.sessions.cancel(conversation_id);
        info!(conversation = conversation_id, was_active, "startup interview cancelled");
        ChatMessage::system(CANCEL_NOTICE)
    }
}
