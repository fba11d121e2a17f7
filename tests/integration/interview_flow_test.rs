//! Startup Interview Integration Tests
//!
//! Full conversations through `Assistant::send_message`:
//! - topic progression and the clarification cap
//! - fail-open analysis
//! - summary and recommendations generation, including repair
//! - cancellation while a turn is in flight

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use mentor_assistant::models::chat::{ChatMessage, MODEL_RECOMMENDATIONS_EXPERT, MODEL_STARTUP_EXPERT};
use mentor_assistant::services::assistant::TurnOutcome;
use mentor_assistant::services::interview::CANCEL_NOTICE;
use mentor_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
    StopReason, UsageStats,
};

use crate::support::{analysis, build_assistant, startup_record, ScriptedProvider, Setup};

const SUMMARY: &str = r#"{"startup_analysis":{"idea":"Dog walking","problem":"Busy owners"}}"#;

fn reply(outcome: TurnOutcome) -> ChatMessage {
    match outcome {
        TurnOutcome::Reply(msg) => msg,
        TurnOutcome::Discarded => panic!("turn discarded"),
    }
}

// ============================================================================
// Topic progression
// ============================================================================

#[tokio::test]
async fn test_full_interview_produces_recommendations() {
    let provider = Arc::new(ScriptedProvider::new());
    let assistant = build_assistant(provider.clone(), Setup::default());

    let first = reply(assistant.send_message("c", "I want to start a business").await.unwrap());
    assert_eq!(
        first.content,
        "Tell me more about your idea. What problem are you trying to solve?"
    );
    assert_eq!(provider.calls(), 0);

    let answers = [
        "An app that matches dog owners with walkers",
        "Busy professionals in big cities",
        "Two developers and six months of savings",
        "Five years building marketplaces",
        "Rover and Wag, we focus on vetted walkers",
        "I want a sustainable business with my own hours",
    ];
    let next_questions = [
        "Who is your target audience? Describe your ideal customers.",
        "What resources do you have available? (time, money, team, skills)",
        "What experience do you have in this field?",
        "Who are your main competitors? What makes you different?",
        "What motivates you to start this business? What are your goals?",
    ];

    for (i, answer) in answers.iter().enumerate() {
        provider.push_text(&analysis(8, true, "move_on", ""), 20);
        if i == answers.len() - 1 {
            provider.push_text(SUMMARY, 50);
            provider.push_text(
                &format!(r#"{{"startups":[{},{}]}}"#, startup_record(1), startup_record(2)),
                200,
            );
        }

        let msg = reply(assistant.send_message("c", answer).await.unwrap());
        if let Some(question) = next_questions.get(i) {
            assert_eq!(msg.content, *question);
            assert_eq!(msg.model.as_deref(), Some(MODEL_STARTUP_EXPERT));
        } else {
            assert!(msg
                .content
                .starts_with("💡 Startup Recommendations Generated!\n\n🚀 **Startup Recommendations**"));
            assert!(msg.content.contains("**2. Idea 2**"));
            assert!(msg.should_clear_chat);
            assert_eq!(msg.model.as_deref(), Some(MODEL_RECOMMENDATIONS_EXPERT));
        }
    }

    assert!(!assistant.interview().sessions().is_active("c"));
    assert!(!assistant.interview().sessions().is_tracked("c"));
    assert_eq!(provider.calls(), 8);
    let summary_prompt = &provider.prompts()[6];
    assert!(summary_prompt.contains("idea: An app that matches dog owners with walkers\n"));
    assert!(summary_prompt.contains("motivation: I want a sustainable business"));
    let position = |key: &str| summary_prompt.find(&format!("\n{}: ", key)).unwrap();
    assert!(position("idea") < position("target_audience"));
    assert!(position("resources") < position("experience"));
    assert!(position("competitors") < position("motivation"));
    assert_eq!(assistant.message_count().await.unwrap(), 14);
}

#[tokio::test]
async fn test_three_vague_answers_move_to_next_topic() {
    let provider = Arc::new(ScriptedProvider::new());
    let assistant = build_assistant(provider.clone(), Setup::default());
    assistant.send_message("c", "my startup").await.unwrap();

    for _ in 0..3 {
        provider.push_text(&analysis(3, false, "clarify", "What problem exactly?"), 10);
    }

    let first = reply(assistant.send_message("c", "an app").await.unwrap());
    assert!(first.content.starts_with("🤔 **Clarification Needed** (2/3)\n\nWhat problem exactly?"));
    assert!(first.content.ends_with("You have 2 attempts left for this topic."));

    let second = reply(assistant.send_message("c", "a good app").await.unwrap());
    assert!(second.content.starts_with("🤔 **Clarification Needed** (1/3)"));
    assert!(second.content.ends_with("You have 1 attempt left for this topic."));

    let third = reply(assistant.send_message("c", "a really good app").await.unwrap());
    assert_eq!(
        third.content,
        "Who is your target audience? Describe your ideal customers."
    );

    let state = assistant.interview().sessions().snapshot("c").state;
    assert_eq!(state.current_topic, "target_audience");
    assert_eq!(state.clarification_attempts, 0);
    assert_eq!(
        state.collected_answers["idea"],
        "an app\na good app\na really good app"
    );
}

#[tokio::test]
async fn test_move_on_with_low_score_is_a_clarification() {
    let provider = Arc::new(ScriptedProvider::new());
    let assistant = build_assistant(provider.clone(), Setup::default());
    assistant.send_message("c", "startup").await.unwrap();

    provider.push_text(&analysis(6, true, "move_on", ""), 10);
    let msg = reply(assistant.send_message("c", "food delivery").await.unwrap());
    assert!(msg
        .content
        .contains("Please provide a more detailed and relevant answer about idea."));
    assert_eq!(assistant.interview().sessions().snapshot("c").state.current_topic, "idea");
}

#[tokio::test]
async fn test_analysis_failure_fails_open() {
    let provider = Arc::new(ScriptedProvider::new());
    let assistant = build_assistant(provider.clone(), Setup::default());
    assistant.send_message("c", "startup").await.unwrap();

    provider.push_error(LlmError::NetworkError {
        message: "connection reset".to_string(),
    });
    let msg = reply(assistant.send_message("c", "pet sitting").await.unwrap());
    assert_eq!(
        msg.content,
        "Who is your target audience? Describe your ideal customers."
    );

    let state = assistant.interview().sessions().snapshot("c").state;
    assert_eq!(state.collected_answers["idea"], "pet sitting");
    let last = state.answer_history.last().unwrap();
    assert!(last.degraded);
    assert_eq!(last.topic, "idea");
}

#[tokio::test]
async fn test_analysis_without_required_fields_fails_open() {
    let provider = Arc::new(ScriptedProvider::new());
    let assistant = build_assistant(provider.clone(), Setup::default());
    assistant.send_message("c", "startup").await.unwrap();

    provider.push_text(r#"{"analysis":{}}"#, 10);
    let msg = reply(assistant.send_message("c", "pet sitting").await.unwrap());
    assert_eq!(
        msg.content,
        "Who is your target audience? Describe your ideal customers."
    );

    let state = assistant.interview().sessions().snapshot("c").state;
    assert_eq!(state.clarification_attempts, 0);
    assert!(state.answer_history.last().unwrap().degraded);
}

// ============================================================================
// Deliverable
// ============================================================================

#[tokio::test]
async fn test_complete_with_unstructured_summary() {
    let provider = Arc::new(ScriptedProvider::new());
    let assistant = build_assistant(provider.clone(), Setup::default());
    assistant.send_message("c", "startup").await.unwrap();

    provider.push_text(&analysis(9, true, "complete", ""), 10);
    provider.push_text("Sorry, here is prose instead", 10);
    let msg = reply(assistant.send_message("c", "everything you need").await.unwrap());
    assert_eq!(
        msg.content,
        "⚠️ Failed to generate structured summary. Here's the raw response:\nSorry, here is prose instead"
    );
    assert!(!msg.should_clear_chat);
    assert!(!assistant.interview().sessions().is_active("c"));
}

#[tokio::test]
async fn test_truncated_recommendations_are_repaired() {
    let provider = Arc::new(ScriptedProvider::new());
    let assistant = build_assistant(provider.clone(), Setup::default());
    assistant.send_message("c", "startup").await.unwrap();

    provider.push_text(&analysis(9, true, "complete", ""), 10);
    provider.push_text(&format!("```json\n{}\n```", SUMMARY), 10);
    provider.push_truncated(
        &format!(
            r#"{{"startups":[{},{},{{"id":"3","title":"Ide"#,
            startup_record(1),
            startup_record(2)
        ),
        4000,
    );

    let msg = reply(assistant.send_message("c", "all of it").await.unwrap());
    assert!(msg
        .content
        .starts_with("💡 Startup Recommendations Generated! (Fixed truncated response)"));
    assert!(msg.content.contains("**2. Idea 2**"));
    assert!(!msg.content.contains("Idea 3"));
    assert!(msg.should_clear_chat);
}

#[tokio::test]
async fn test_recommendations_failure_returns_summary() {
    let provider = Arc::new(ScriptedProvider::new());
    let assistant = build_assistant(provider.clone(), Setup::default());
    assistant.send_message("c", "startup").await.unwrap();

    provider.push_text(&analysis(9, true, "complete", ""), 10);
    provider.push_text(SUMMARY, 10);
    provider.push_error(LlmError::Other {
        message: "timeout".to_string(),
    });

    let msg = reply(assistant.send_message("c", "all of it").await.unwrap());
    assert!(msg.content.starts_with("⚠️ Failed to generate startup recommendations."));
    assert!(msg.content.contains("• **idea:** Dog walking"));
    assert!(msg.should_clear_chat);
}

// ============================================================================
// Cancellation
// ============================================================================

/// Provider that blocks until released, then answers with a move-on analysis.
struct GatedProvider {
    entered: Notify,
    release: Notify,
    config: ProviderConfig,
}

#[async_trait]
impl LlmProvider for GatedProvider {
    fn name(&self) -> &'static str {
        "gated"
    }

    fn model(&self) -> &str {
        "gated"
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    async fn send_message(
        &self,
        _messages: Vec<Message>,
        _system: Option<String>,
        _request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(LlmResponse {
            content: Some(analysis(9, true, "move_on", "")),
            stop_reason: StopReason::EndTurn,
            usage: UsageStats::default(),
            model: "gated".to_string(),
        })
    }
}

#[tokio::test]
async fn test_cancel_discards_in_flight_turn() {
    let provider = Arc::new(GatedProvider {
        entered: Notify::new(),
        release: Notify::new(),
        config: ProviderConfig::default(),
    });
    let assistant = Arc::new(build_assistant(provider.clone(), Setup::default()));
    assistant.send_message("c", "startup").await.unwrap();

    let turn = {
        let assistant = assistant.clone();
        tokio::spawn(async move { assistant.send_message("c", "dog walking").await })
    };

    provider.entered.notified().await;
    let notice = assistant.cancel_interview("c").await.unwrap();
    assert_eq!(notice.content, CANCEL_NOTICE);
    assert!(!assistant.interview().sessions().is_active("c"));

    provider.release.notify_one();
    let outcome = turn.await.unwrap().unwrap();
    assert_eq!(outcome, TurnOutcome::Discarded);

    assert!(!assistant.interview().sessions().is_active("c"));
    assert!(!assistant.interview().sessions().is_tracked("c"));
    let history = assistant.history().await.unwrap();
    let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents.len(), 4);
    assert_eq!(contents[2], "dog walking");
    assert_eq!(contents[3], CANCEL_NOTICE);
}
