//! Command Pipeline Integration Tests
//!
//! Free text → classification → `ParseOutcome` → dispatch against a
//! wiremock GitHub API, plus the bridge command path.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mentor_assistant::models::chat::{ChatMessage, MODEL_BUILD_SYSTEM, MODEL_GITHUB_API};
use mentor_assistant::services::assistant::{TurnOutcome, UNRECOGNIZED_REPLY};
use mentor_llm::LlmError;

use crate::support::{build_assistant, ScriptedProvider, Setup};

fn reply(outcome: TurnOutcome) -> ChatMessage {
    match outcome {
        TurnOutcome::Reply(msg) => msg,
        TurnOutcome::Discarded => panic!("turn discarded"),
    }
}

fn github_setup(server: &MockServer) -> Setup {
    Setup {
        github_url: server.uri(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_fenced_list_repositories() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(header("Authorization", "token ghp_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "mentor", "description": "assistant backend"},
            {"name": "dotfiles", "description": null}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(ScriptedProvider::new());
    provider.push_text(
        "```json\n{\"operation\":\"list_repositories\",\"parameters\":{}}\n```",
        30,
    );
    let assistant = build_assistant(provider.clone(), github_setup(&server));

    let msg = reply(assistant.send_message("c", "show my repositories").await.unwrap());
    assert_eq!(
        msg.content,
        "📋 Found 2 repositories:\n• mentor - assistant backend\n• dotfiles - no description"
    );
    assert_eq!(msg.model.as_deref(), Some(MODEL_GITHUB_API));
    assert!(provider.prompts()[0].contains("The user wrote: \"show my repositories\""));
    assert!(provider.prompts()[0].contains("- search_repositories:"));
}

#[tokio::test]
async fn test_create_repository_with_alias() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user/repos"))
        .and(body_json(json!({
            "name": "demo-app", "description": "", "private": false, "auto_init": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "demo-app", "html_url": "https://github.com/octo/demo-app"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = Arc::new(ScriptedProvider::new());
    provider.push_text(
        r#"{"operation":"create_repository","parameters":{"repo_name":"demo-app"},"description":"create"}"#,
        30,
    );
    let assistant = build_assistant(provider, github_setup(&server));

    let msg = reply(assistant.send_message("c", "create a repo called demo-app").await.unwrap());
    assert_eq!(
        msg.content,
        "✅ Repository 'demo-app' created successfully: https://github.com/octo/demo-app"
    );
}

#[tokio::test]
async fn test_missing_credential_makes_no_network_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    for token in [None, Some(""), Some("YOUR_GITHUB_TOKEN_HERE")] {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_text(
            r#"{"operation":"create_repository","parameters":{"repo_name":"x"}}"#,
            10,
        );
        let assistant = build_assistant(
            provider,
            Setup {
                github_url: server.uri(),
                token: token.map(String::from),
                ..Default::default()
            },
        );
        let msg = reply(assistant.send_message("c", "create repo x").await.unwrap());
        assert!(msg.content.starts_with("⚠️ GitHub token is not configured"));
    }
}

#[tokio::test]
async fn test_api_error_categories_are_rendered() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})))
        .mount(&server)
        .await;

    let provider = Arc::new(ScriptedProvider::new());
    provider.push_text(r#"{"operation":"analyze_profile","parameters":{}}"#, 10);
    let assistant = build_assistant(provider, github_setup(&server));

    let msg = reply(assistant.send_message("c", "analyze my profile").await.unwrap());
    assert_eq!(
        msg.content,
        "❌ analyze_profile failed (authorization error): Unauthorized: Bad credentials"
    );
}

#[tokio::test]
async fn test_search_code_passes_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/repositories"))
        .and(query_param("q", "tokio runtime"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": 4,
            "items": [
                {"name": "tokio", "full_name": "tokio-rs/tokio", "description": "runtime"},
                {"name": "a", "full_name": "o/a"},
                {"name": "b", "full_name": "o/b"},
                {"name": "c", "full_name": "o/c"}
            ]
        })))
        .mount(&server)
        .await;

    let provider = Arc::new(ScriptedProvider::new());
    provider.push_text(
        r#"{"operation":"search_code","parameters":{"query":"tokio runtime"}}"#,
        10,
    );
    let assistant = build_assistant(provider, github_setup(&server));

    let msg = reply(assistant.send_message("c", "find tokio runtime code").await.unwrap());
    assert!(msg.content.starts_with("🔍 Search for 'tokio runtime': found 4 repositories"));
    assert!(msg.content.contains("• tokio-rs/tokio - runtime"));
    assert!(!msg.content.contains("o/c"));
}

#[tokio::test]
async fn test_generate_report_tolerates_language_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "login": "octo", "name": "Octo Cat", "public_repos": 2, "followers": 7
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "api", "stargazers_count": 3, "forks_count": 1, "language": "Rust"},
            {"name": "web", "stargazers_count": 2, "language": "TypeScript"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/api/languages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Rust": 300, "Shell": 100})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/octo/web/languages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let provider = Arc::new(ScriptedProvider::new());
    provider.push_text(r#"{"operation":"generate_report","parameters":{}}"#, 10);
    let assistant = build_assistant(provider, github_setup(&server));

    let msg = reply(assistant.send_message("c", "full report please").await.unwrap());
    assert!(msg.content.contains("• Name: Octo Cat"));
    assert!(msg.content.contains("• Total stars: 5"));
    assert!(msg.content.contains("• Rust: 75.0%"));
    assert!(msg.content.contains("1. api"));
    assert!(msg.content.contains("📅 Report generated:"));
}

#[tokio::test]
async fn test_classification_failures() {
    let provider = Arc::new(ScriptedProvider::new());
    provider.push_error(LlmError::RateLimited {
        message: "slow".to_string(),
        retry_after: None,
    });
    provider.push_error(LlmError::AuthenticationFailed {
        message: "bad key".to_string(),
    });
    provider.push_text("I'd love to help, but which repository?", 10);
    let assistant = build_assistant(provider, Setup::default());

    let limited = reply(assistant.send_message("c", "list repos").await.unwrap());
    assert_eq!(
        limited.content,
        "⏳ Too many requests. Please wait a moment and try again."
    );
    let auth = reply(assistant.send_message("c", "list repos").await.unwrap());
    assert_eq!(auth.content, "🔑 Authorization error. Check the API key.");
    let prose = reply(assistant.send_message("c", "list repos").await.unwrap());
    assert_eq!(prose.content, UNRECOGNIZED_REPLY);
}

#[tokio::test]
async fn test_bridge_fix_command() {
    let bridge = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fix-android-bug"))
        .and(body_json(json!({
            "project_path": "/work/app",
            "bug_description": "crash when rotating screen"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"content": [{"text": "Fixed: saved state in onSaveInstanceState"}]}
        })))
        .expect(1)
        .mount(&bridge)
        .await;

    let provider = Arc::new(ScriptedProvider::new());
    let assistant = build_assistant(
        provider.clone(),
        Setup {
            bridge_url: bridge.uri(),
            ..Default::default()
        },
    );

    let msg = reply(
        assistant
            .send_message("c", "fix-android-bug /work/app \"crash when rotating screen\"")
            .await
            .unwrap(),
    );
    assert_eq!(msg.content, "Fixed: saved state in onSaveInstanceState");
    assert_eq!(msg.model.as_deref(), Some(MODEL_BUILD_SYSTEM));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_trigger_build_is_persisted() {
    let bridge = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/build-android-pipeline"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"content": [{"text": "Pipeline #42 queued"}]}
        })))
        .mount(&bridge)
        .await;

    let assistant = build_assistant(
        Arc::new(ScriptedProvider::new()),
        Setup {
            bridge_url: bridge.uri(),
            ..Default::default()
        },
    );
    let msg = assistant.trigger_build().await.unwrap();
    assert_eq!(msg.content, "Pipeline #42 queued");
    assert_eq!(assistant.history().await.unwrap(), vec![msg]);
}
