//! Interview Models
//!
//! Session state and per-turn analysis records for the startup interview.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Clarification attempts allowed per topic before it is force-advanced.
pub const MAX_CLARIFICATIONS: u32 = 3;

/// What the analysis recommends after an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    Clarify,
    MoveOn,
    Complete,
}

impl NextAction {
    /// Lenient parse; any unknown value means `Clarify`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "move_on" => NextAction::MoveOn,
            "complete" => NextAction::Complete,
            _ => NextAction::Clarify,
        }
    }
}

/// Quality assessment of one user answer. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerAnalysis {
    /// Topic the answer was given for
    pub topic: String,
    /// The answer text
    pub user_answer: String,
    /// Whether the answer covers the topic
    pub is_complete: bool,
    /// Relevance score, 1..=10
    pub relevance_score: u8,
    /// What the answer lacks
    pub missing_info: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    /// True when the analysis call failed and the turn was force-advanced
    #[serde(default)]
    pub degraded: bool,
}

impl AnswerAnalysis {
    /// Clamp a raw score into 1..=10.
    pub fn clamp_score(raw: i64) -> u8 {
        raw.clamp(1, 10) as u8
    }

    /// Record for a turn whose analysis could not be obtained.
    pub fn degraded(topic: impl Into<String>, user_answer: impl Into<String>, reason: &str) -> Self {
        Self {
            topic: topic.into(),
            user_answer: user_answer.into(),
            is_complete: false,
            relevance_score: 1,
            missing_info: format!("analysis unavailable: {}", reason),
            timestamp: chrono::Utc::now().timestamp_millis(),
            degraded: true,
        }
    }

    /// Whether this analysis qualifies the answer to move on.
    pub fn qualifies_for_move_on(&self) -> bool {
        self.relevance_score >= 7 && self.is_complete
    }
}

/// Interview session state. `Default` is the idle state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DialogState {
    pub is_active: bool,
    /// Advances taken in this session
    pub current_step: u32,
    /// Topic key being asked; valid while active
    pub current_topic: String,
    /// Utterance that started the interview
    pub original_question: String,
    /// Answers per topic key
    pub collected_answers: BTreeMap<String, String>,
    /// One entry per answered turn
    pub answer_history: Vec<AnswerAnalysis>,
    /// Clarifications asked on the current topic
    pub clarification_attempts: u32,
}

impl DialogState {
    /// Fresh active session on `first_topic`.
    pub fn start(first_topic: impl Into<String>, original_question: impl Into<String>) -> Self {
        Self {
            is_active: true,
            current_step: 0,
            current_topic: first_topic.into(),
            original_question: original_question.into(),
            ..Default::default()
        }
    }

    /// Store an answer; a repeated key appends to the existing text.
    pub fn record_answer(&mut self, key: &str, answer: &str) {
        self.collected_answers
            .entry(key.to_string())
            .and_modify(|existing| {
                existing.push('\n');
                existing.push_str(answer);
            })
            .or_insert_with(|| answer.to_string());
    }

    /// Move to `next_topic`, resetting the clarification counter.
    pub fn advance_to(&mut self, next_topic: &str) {
        self.current_step += 1;
        self.current_topic = next_topic.to_string();
        self.clarification_attempts = 0;
    }
}
