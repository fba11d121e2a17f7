//! Application State Integration Tests
//!
//! Config file handling and the assistant wired from it.

use std::fs;

use tempfile::tempdir;

use mentor_assistant::models::settings::SettingsUpdate;
use mentor_assistant::storage::config::ConfigService;
use mentor_assistant::storage::database::Database;
use mentor_assistant::{AppConfig, AppState, TurnOutcome};

#[tokio::test]
async fn test_default_config_is_written_and_usable() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let config = ConfigService::load_or_create(path.clone()).unwrap();
    assert!(path.exists());

    let on_disk: AppConfig = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(&on_disk, config.get_config());
    assert_eq!(on_disk.bridge.base_url, "http://localhost:8080");
    assert!(on_disk.quota.daily_limit.is_none());

    let state = AppState::new();
    state
        .initialize_with(config, Database::new_in_memory().unwrap())
        .await
        .unwrap();
    assert!(state.is_initialized().await);
}

#[tokio::test]
async fn test_invalid_config_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"github":{"api_base_url":"not a url","user_agent":"x","per_page":30,"per_page_all":100}}"#)
        .unwrap();
    assert!(ConfigService::load_or_create(path).is_err());
}

#[tokio::test]
async fn test_settings_update_persists_and_clears_limit() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut config = ConfigService::load_or_create(path.clone()).unwrap();

    config
        .update_config(SettingsUpdate {
            daily_limit: Some(Some(5000)),
            trigger_keywords: Some(vec!["venture".to_string()]),
            ..Default::default()
        })
        .unwrap();
    let reloaded = ConfigService::load_or_create(path.clone()).unwrap();
    assert_eq!(reloaded.get_config().quota.daily_limit, Some(5000));
    assert_eq!(reloaded.get_config().interview.trigger_keywords, vec!["venture"]);

    config
        .update_config(SettingsUpdate {
            daily_limit: Some(None),
            ..Default::default()
        })
        .unwrap();
    let reloaded = ConfigService::load_or_create(path).unwrap();
    assert_eq!(reloaded.get_config().quota.daily_limit, None);
}

#[tokio::test]
async fn test_configured_keywords_drive_the_interview() {
    let dir = tempdir().unwrap();
    let mut config = ConfigService::load_or_create(dir.path().join("config.json")).unwrap();
    config
        .update_config(SettingsUpdate {
            trigger_keywords: Some(vec!["venture".to_string()]),
            ..Default::default()
        })
        .unwrap();

    let state = AppState::new();
    state
        .initialize_with(config, Database::new_in_memory().unwrap())
        .await
        .unwrap();
    let assistant = state.assistant().await.unwrap();

    let outcome = assistant.send_message("c", "New Venture idea").await.unwrap();
    match outcome {
        TurnOutcome::Reply(msg) => assert_eq!(
            msg.content,
            "Tell me more about your idea. What problem are you trying to solve?"
        ),
        TurnOutcome::Discarded => panic!("turn discarded"),
    }
    assert!(assistant.interview().sessions().is_active("c"));
}
