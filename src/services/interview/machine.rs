//! Interview State Machine
//!
//! Pure transition logic. `transition` takes the current session and the
//! analysis of one answer and returns the next session plus what to say.
//! Nothing here performs I/O, so the whole decision table is unit-testable.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::interview::{AnswerAnalysis, DialogState, NextAction, MAX_CLARIFICATIONS};

use super::analyzer::AnalysisOutcome;
use super::topics::TopicList;

/// What the assistant says after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Ask the opening question of a (new) topic
    AskTopic { topic: String, question: String },
    /// Re-ask the current topic
    Clarify { question: String, attempts_left: u32 },
    /// The interview is over; generate the deliverable from `answers`
    Finish { answers: BTreeMap<String, String> },
}

/// Next session state plus the step to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: DialogState,
    pub step: Step,
}

/// Whether `text` should start an interview.
///
/// Keywords match as case-insensitive substrings; blank keywords are ignored.
pub fn is_trigger(text: &str, keywords: &[String]) -> bool {
    let lowered = text.to_lowercase();
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .any(|k| lowered.contains(&k.to_lowercase()))
}

/// Open a session on the first topic.
pub fn start(topics: &TopicList, original_question: &str) -> Transition {
    let first = topics.first();
    Transition {
        state: DialogState::start(first.key.clone(), original_question),
        step: Step::AskTopic {
            topic: first.key.clone(),
            question: first.question.clone(),
        },
    }
}

/// Apply one analyzed answer to `state`.
pub fn transition(
    state: &DialogState,
    topics: &TopicList,
    answer: &str,
    outcome: AnalysisOutcome,
) -> Transition {
    let mut next = state.clone();
    let topic = state.current_topic.clone();

    let reply = match outcome {
        AnalysisOutcome::Analyzed(reply) => reply,
        AnalysisOutcome::Failed(reason) => {
            next.answer_history
                .push(AnswerAnalysis::degraded(topic.clone(), answer, &reason));
            next.record_answer(&topic, answer);
            debug!(topic = %topic, "analysis unavailable, advancing");
            return advance(next, topics);
        }
    };

    let key = if reply.topic_key.is_empty() {
        topic.clone()
    } else {
        reply.topic_key.clone()
    };
    next.record_answer(&key, answer);
    let qualifies = reply.analysis.qualifies_for_move_on();
    next.answer_history.push(reply.analysis);

    match reply.next_action {
        NextAction::Complete => finish(next),
        NextAction::MoveOn if qualifies => advance(next, topics),
        NextAction::MoveOn => clarify(
            next,
            topics,
            format!(
                "Please provide a more detailed and relevant answer about {}.",
                topic
            ),
        ),
        NextAction::Clarify => {
            let question = if reply.next_question.is_empty() {
                format!("Please provide a more detailed answer about {}.", topic)
            } else {
                reply.next_question
            };
            clarify(next, topics, question)
        }
    }
}

fn clarify(mut state: DialogState, topics: &TopicList, question: String) -> Transition {
    let attempts = state.clarification_attempts + 1;
    if attempts >= MAX_CLARIFICATIONS {
        debug!(topic = %state.current_topic, "clarification limit reached, advancing");
        return advance(state, topics);
    }
    state.clarification_attempts = attempts;
    Transition {
        state,
        step: Step::Clarify {
            question,
            attempts_left: MAX_CLARIFICATIONS - attempts,
        },
    }
}

fn advance(mut state: DialogState, topics: &TopicList) -> Transition {
    match topics.next_after(&state.current_topic) {
        Some(topic) => {
            state.advance_to(&topic.key);
            Transition {
                state,
                step: Step::AskTopic {
                    topic: topic.key.clone(),
                    question: topic.question.clone(),
                },
            }
        }
        None => finish(state),
    }
}

fn finish(state: DialogState) -> Transition {
    Transition {
        state: DialogState::default(),
        step: Step::Finish {
            answers: state.collected_answers,
        },
    }
}

/// Text of a clarification request.
pub fn format_clarification(question: &str, attempts_left: u32) -> String {
    let attempts_text = if attempts_left == 1 {
        "1 attempt left".to_string()
    } else {
        format!("{} attempts left", attempts_left)
    };
    format!(
        "🤔 **Clarification Needed** ({}/{})\n\n{}\n\nPlease provide a detailed and relevant answer.\n\n⚠️ **Note:** You have {} for this topic.",
        attempts_left, MAX_CLARIFICATIONS, question, attempts_text
    )
}
