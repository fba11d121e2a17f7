//! Answer Analyzer
//!
//! Asks the model to grade one interview answer and to pick what happens
//! next. The reply is untrusted: anything that is not the expected JSON
//! object is reported as `AnalysisOutcome::Failed` so the state machine can
//! fail open.

use serde_json::Value;
use tracing::{debug, warn};

use mentor_llm::{LlmProvider, LlmRequestOptions};
use mentor_tools::extract_json_from_response;

use crate::models::interview::{AnswerAnalysis, DialogState, NextAction};
use crate::services::completion::complete;

use super::topics::TopicList;

const ANALYSIS_MAX_TOKENS: u32 = 500;
const ANALYSIS_TEMPERATURE: f32 = 0.3;

/// Parsed analysis reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReply {
    pub analysis: AnswerAnalysis,
    pub next_action: NextAction,
    /// Follow-up question suggested by the model; may be empty
    pub next_question: String,
    /// Key to store the answer under; may be empty
    pub topic_key: String,
}

/// Result of one analysis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Analyzed(AnalysisReply),
    /// Transport or parse failure, with a short reason
    Failed(String),
}

/// System prompt for grading `answer` on the current topic.
pub fn build_analysis_prompt(topics: &TopicList, state: &DialogState, answer: &str) -> String {
    let collected = topics
        .ordered_answers(&state.collected_answers)
        .into_iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are a startup expert conducting a dialogue. Analyze the user's answer and decide:
1. Is the answer complete and relevant to the current topic?
2. What should be the next question?
3. Should we clarify the current topic or move to the next?

Current topic: {topic}
User's answer: {answer}
Already collected information: {collected}
Original question: {original}

Reply with JSON only, in this format:
{{
  "analysis": {{
    "is_complete": true,
    "relevance_score": 8,
    "missing_info": "what is missing",
    "next_action": "next_question|clarify|move_on|complete"
  }},
  "next_question": "the next question to ask",
  "topic_key": "key to store the answer under"
}}"#,
        topic = state.current_topic,
        answer = answer,
        collected = collected,
        original = state.original_question,
    )
}

/// Parse the model's analysis reply.
///
/// Requires an `analysis` object carrying `is_complete` (bool),
/// `relevance_score` (number or numeric string) and `next_action` (string).
/// A reply missing any of them is a parse failure. The remaining fields
/// default to empty.
pub fn parse_analysis_reply(raw: &str, topic: &str, answer: &str) -> Option<AnalysisReply> {
    let value: Value = serde_json::from_str(&extract_json_from_response(raw)).ok()?;
    let analysis = value.get("analysis")?.as_object()?;

    let is_complete = analysis.get("is_complete")?.as_bool()?;
    let relevance_score = AnswerAnalysis::clamp_score(score_value(analysis.get("relevance_score")?)?);
    let next_action = NextAction::parse(analysis.get("next_action")?.as_str()?);
    let missing_info = string_field(analysis.get("missing_info"));

    Some(AnalysisReply {
        analysis: AnswerAnalysis {
            topic: topic.to_string(),
            user_answer: answer.to_string(),
            is_complete,
            relevance_score,
            missing_info,
            timestamp: chrono::Utc::now().timestamp_millis(),
            degraded: false,
        },
        next_action,
        next_question: string_field(value.get("next_question")),
        topic_key: string_field(value.get("topic_key")),
    })
}

fn score_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_field(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Grade `answer` against the current state of the session.
pub async fn analyze(
    provider: &dyn LlmProvider,
    topics: &TopicList,
    state: &DialogState,
    answer: &str,
) -> AnalysisOutcome {
    let system = build_analysis_prompt(topics, state, answer);
    let prompt = format!("Please analyze my answer about: {}", state.current_topic);
    let options = LlmRequestOptions::default()
        .with_max_tokens(ANALYSIS_MAX_TOKENS)
        .with_temperature(ANALYSIS_TEMPERATURE);

    let completion = match complete(provider, Some(system), prompt, options).await {
        Ok(completion) => completion,
        Err(e) => {
            warn!(topic = %state.current_topic, error = %e, "answer analysis call failed");
            return AnalysisOutcome::Failed(e.to_string());
        }
    };

    match parse_analysis_reply(&completion.text, &state.current_topic, answer) {
        Some(reply) => {
            debug!(
                topic = %state.current_topic,
                score = reply.analysis.relevance_score,
                complete = reply.analysis.is_complete,
                action = ?reply.next_action,
                "answer analyzed"
            );
            AnalysisOutcome::Analyzed(reply)
        }
        None => {
            warn!(topic = %state.current_topic, "answer analysis reply was malformed");
            AnalysisOutcome::Failed("analysis reply was malformed".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::completion::mock::MockLlmProvider;

    #[test]
    fn test_parse_fenced_reply() {
        let raw = "```json\n{\"analysis\":{\"is_complete\":true,\"relevance_score\":8,\"missing_info\":\"\",\"next_action\":\"move_on\"},\"next_question\":\"Who buys it?\",\"topic_key\":\"idea\"}\n```";
        let reply = parse_analysis_reply(raw, "idea", "An app for dog walkers").unwrap();
        assert!(reply.analysis.is_complete);
        assert_eq!(reply.analysis.relevance_score, 8);
        assert_eq!(reply.next_action, NextAction::MoveOn);
        assert_eq!(reply.next_question, "Who buys it?");
        assert_eq!(reply.topic_key, "idea");
        assert!(!reply.analysis.degraded);
    }

    #[test]
    fn test_parse_optional_fields_and_clamping() {
        let raw = r#"{"analysis":{"is_complete":false,"relevance_score":"15","next_action":"next_question"}}"#;
        let reply = parse_analysis_reply(raw, "idea", "x").unwrap();
        assert!(!reply.analysis.is_complete);
        assert_eq!(reply.analysis.relevance_score, 10);
        assert_eq!(reply.next_action, NextAction::Clarify);
        assert_eq!(reply.analysis.missing_info, "");
        assert_eq!(reply.next_question, "");
        assert_eq!(reply.topic_key, "");
    }

    #[test]
    fn test_parse_rejects_missing_or_mistyped_required_fields() {
        for raw in [
            r#"{"analysis":{}}"#,
            r#"{"analysis":{"relevance_score":8,"next_action":"move_on"}}"#,
            r#"{"analysis":{"is_complete":"yes","relevance_score":8,"next_action":"move_on"}}"#,
            r#"{"analysis":{"is_complete":true,"next_action":"move_on"}}"#,
            r#"{"analysis":{"is_complete":true,"relevance_score":"high","next_action":"move_on"}}"#,
            r#"{"analysis":{"is_complete":true,"relevance_score":8}}"#,
            r#"{"analysis":{"is_complete":true,"relevance_score":8,"next_action":3}}"#,
        ] {
            assert!(parse_analysis_reply(raw, "idea", "x").is_none(), "accepted {}", raw);
        }
    }

    #[tokio::test]
    async fn test_analyze_empty_analysis_object_fails() {
        let provider = MockLlmProvider::with_texts(&[r#"{"analysis":{}}"#]);
        let state = DialogState::start("idea", "startup");
        let outcome = analyze(&provider, &TopicList::default(), &state, "x").await;
        assert!(matches!(outcome, AnalysisOutcome::Failed(_)));
    }

    #[test]
    fn test_parse_rejects_non_json_and_missing_analysis() {
        assert!(parse_analysis_reply("I think it is fine", "idea", "x").is_none());
        assert!(parse_analysis_reply(r#"{"next_question":"?"}"#, "idea", "x").is_none());
    }

    #[test]
    fn test_prompt_includes_context() {
        let mut state = DialogState::start("target_audience", "I want to launch a startup");
        state.record_answer("idea", "dog walking app");
        let prompt = build_analysis_prompt(&TopicList::default(), &state, "pet owners");
        assert!(prompt.contains("Current topic: target_audience"));
        assert!(prompt.contains("User's answer: pet owners"));
        assert!(prompt.contains("Already collected information: idea: dog walking app"));
        assert!(prompt.contains("Original question: I want to launch a startup"));
    }

    #[tokio::test]
    async fn test_analyze_failure_is_reported() {
        let provider = MockLlmProvider::new(vec![]);
        let state = DialogState::start("idea", "startup");
        let outcome = analyze(&provider, &TopicList::default(), &state, "x").await;
        assert!(matches!(outcome, AnalysisOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_analyze_sends_topic_prompt() {
        let provider = MockLlmProvider::with_texts(&[
            r#"{"analysis":{"is_complete":false,"relevance_score":3,"missing_info":"details","next_action":"clarify"},"next_question":"More?","topic_key":"idea"}"#,
        ]);
        let state = DialogState::start("idea", "startup");
        let outcome = analyze(&provider, &TopicList::default(), &state, "x").await;
        match outcome {
            AnalysisOutcome::Analyzed(reply) => assert_eq!(reply.analysis.missing_info, "details"),
            other => panic!("expected Analyzed, got {:?}", other),
        }
        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts[0], "Please analyze my answer about: idea");
    }
}
