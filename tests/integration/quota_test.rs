//! Token Quota Integration Tests
//!
//! The usage gate on the command path, backed by the SQLite usage counter.

use std::sync::Arc;

use mentor_assistant::services::assistant::TurnOutcome;
use mentor_assistant::storage::database::Database;
use mentor_assistant::storage::quota::{QuotaService, SqliteQuotaService};

use crate::support::{build_assistant, build_assistant_with_db, ScriptedProvider, Setup};

const UNKNOWN_OP: &str = r#"{"operation":"deploy","parameters":{}}"#;
const EXCEEDED: &str = "❌ **Daily token limit exceeded!**";

fn content(outcome: TurnOutcome) -> String {
    outcome.reply().map(|m| m.content.clone()).unwrap_or_default()
}

#[tokio::test]
async fn test_unlimited_never_refuses() {
    let provider = Arc::new(ScriptedProvider::new());
    for _ in 0..3 {
        provider.push_text(UNKNOWN_OP, 1_000_000);
    }
    let assistant = build_assistant(provider.clone(), Setup::default());

    for _ in 0..3 {
        let text = content(assistant.send_message("c", "deploy").await.unwrap());
        assert_eq!(text, "❓ Unknown operation: deploy");
    }
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_overrun_suppresses_answer_then_refuses() {
    let db = Database::new_in_memory().unwrap();
    let provider = Arc::new(ScriptedProvider::new());
    provider.push_text(UNKNOWN_OP, 60);
    provider.push_text(UNKNOWN_OP, 60);
    let assistant = build_assistant_with_db(
        provider.clone(),
        Setup {
            daily_limit: Some(100),
            ..Default::default()
        },
        db.clone(),
    );

    // 60 of 100: answered
    let first = content(assistant.send_message("c", "deploy").await.unwrap());
    assert_eq!(first, "❓ Unknown operation: deploy");

    // 120 of 100: produced but suppressed
    let second = content(assistant.send_message("c", "deploy").await.unwrap());
    assert_eq!(
        second,
        "❌ **Daily token limit exceeded!**\n\n📊 **Current usage:** 120 / 100 tokens\n📈 **Remaining:** -20 tokens\n\n⏰ Try again tomorrow or contact an administrator to reset the limit."
    );

    // Refused before the model is called
    let third = content(assistant.send_message("c", "deploy").await.unwrap());
    assert!(third.starts_with(EXCEEDED));
    assert_eq!(provider.calls(), 2);

    let usage = SqliteQuotaService::new(db, Some(100))
        .get_usage("integration")
        .await
        .unwrap();
    assert_eq!(usage.used_tokens, 120);
}

#[tokio::test]
async fn test_preflight_estimate_refuses_early() {
    let provider = Arc::new(ScriptedProvider::new());
    provider.push_text(UNKNOWN_OP, 10);
    let assistant = build_assistant(
        provider.clone(),
        Setup {
            daily_limit: Some(100),
            preflight_estimate: 500,
            ..Default::default()
        },
    );

    let text = content(assistant.send_message("c", "deploy").await.unwrap());
    assert!(text.starts_with(EXCEEDED));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_interview_is_not_gated() {
    let provider = Arc::new(ScriptedProvider::new());
    let assistant = build_assistant(
        provider,
        Setup {
            daily_limit: Some(0),
            preflight_estimate: 1,
            ..Default::default()
        },
    );
    let text = content(assistant.send_message("c", "help me launch my startup").await.unwrap());
    assert_eq!(
        text,
        "Tell me more about your idea. What problem are you trying to solve?"
    );
}
