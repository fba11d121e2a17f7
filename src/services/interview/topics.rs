//! Interview Topics
//!
//! The ordered list of topics the interview walks through.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};

/// One interview topic: a stable key plus the question that opens it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub key: String,
    pub question: String,
}

impl Topic {
    pub fn new(key: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            question: question.into(),
        }
    }
}

const DEFAULT_TOPICS: &[(&str, &str)] = &[
    (
        "idea",
        "Tell me more about your idea. What problem are you trying to solve?",
    ),
    (
        "target_audience",
        "Who is your target audience? Describe your ideal customers.",
    ),
    (
        "resources",
        "What resources do you have available? (time, money, team, skills)",
    ),
    (
        "experience",
        "What experience do you have in this field?",
    ),
    (
        "competitors",
        "Who are your main competitors? What makes you different?",
    ),
    (
        "motivation",
        "What motivates you to start this business? What are your goals?",
    ),
];

/// Non-empty ordered topic list with unique keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicList {
    topics: Vec<Topic>,
}

impl TopicList {
    pub fn new(topics: Vec<Topic>) -> AppResult<Self> {
        if topics.is_empty() {
            return Err(AppError::validation("topic list must not be empty"));
        }
        for (i, topic) in topics.iter().enumerate() {
            if topic.key.trim().is_empty() {
                return Err(AppError::validation("topic key must not be empty"));
            }
            if topics[..i].iter().any(|t| t.key == topic.key) {
                return Err(AppError::validation(format!(
                    "duplicate topic key: {}",
                    topic.key
                )));
            }
        }
        Ok(Self { topics })
    }

    pub fn first(&self) -> &Topic {
        // Non-empty by construction
        &self.topics[0]
    }

    /// Topic following `key`, or None when `key` is the last (or unknown).
    pub fn next_after(&self, key: &str) -> Option<&Topic> {
        let index = self.topics.iter().position(|t| t.key == key)?;
        self.topics.get(index + 1)
    }

    pub fn get(&self, key: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.key == key)
    }

    /// Opening question for `key`, or a generic prompt for unknown keys.
    pub fn question_for(&self, key: &str) -> String {
        self.get(key)
            .map(|t| t.question.clone())
            .unwrap_or_else(|| format!("Tell me more about {}.", key))
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Topic> {
        self.topics.iter()
    }

    /// Collected answers in interview order. Keys that are not topics
    /// (model-chosen storage keys) follow, alphabetically.
    pub fn ordered_answers<'a>(
        &self,
        answers: &'a BTreeMap<String, String>,
    ) -> Vec<(&'a str, &'a str)> {
        let mut ordered: Vec<(&str, &str)> = answers
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        ordered.sort_by_key(|(key, _)| {
            self.topics
                .iter()
                .position(|t| t.key == *key)
                .unwrap_or(self.topics.len())
        });
        ordered
    }
}

impl Default for TopicList {
    fn default() -> Self {
        Self {
            topics: DEFAULT_TOPICS
                .iter()
                .map(|(key, question)| Topic::new(*key, *question))
                .collect(),
        }
    }
}
