//! Chat Models
//!
//! Messages exchanged between the user and the assistant.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sender label for interview questions and summaries
pub const MODEL_STARTUP_EXPERT: &str = "startup-expert";
/// Sender label for the recommendations stage
pub const MODEL_RECOMMENDATIONS_EXPERT: &str = "startup-recommendations-expert";
/// Sender label for repository operation results
pub const MODEL_GITHUB_API: &str = "github-api";
/// Sender label for bridge (build/fix) results
pub const MODEL_BUILD_SYSTEM: &str = "build-system";
/// Sender label for notices generated locally
pub const MODEL_SYSTEM: &str = "system";

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message identifier (UUID)
    pub id: String,
    /// Message text (markdown)
    pub content: String,
    /// Whether the user wrote this message
    pub is_user: bool,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Which component produced the message (None for user messages)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Whether the display should be cleared before showing this message
    #[serde(default)]
    pub should_clear_chat: bool,
}

impl ChatMessage {
    fn new(content: impl Into<String>, is_user: bool, model: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            is_user,
            timestamp: chrono::Utc::now().timestamp_millis(),
            model,
            should_clear_chat: false,
        }
    }

    /// Create a message written by the user
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, true, None)
    }

    /// Create an assistant message attributed to `model`
    pub fn assistant(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new(content, false, Some(model.into()))
    }

    /// Create a locally generated notice
    pub fn system(content: impl Into<String>) -> Self {
        Self::assistant(content, MODEL_SYSTEM)
    }

    /// Mark the message as clearing the chat display
    pub fn clearing_chat(mut self) -> Self {
        self.should_clear_chat = true;
        self
    }
}
