//! Mentor Assistant - Rust Backend Library
//!
//! Conversational task-dispatch engine: a startup interview driven by a
//! dialog state machine, and a natural-language command pipeline that
//! classifies requests with a completion model and dispatches them to
//! GitHub operation handlers.
//! It includes:
//! - Business logic services (assistant, interview, GitHub operations, bridge)
//! - Storage layer (SQLite, JSON config)
//! - Data models and utilities

pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::chat::ChatMessage;
pub use models::settings::{AppConfig, SettingsUpdate};
pub use services::assistant::{Assistant, TurnOutcome};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
