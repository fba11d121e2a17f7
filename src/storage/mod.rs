//! Storage Layer
//!
//! Handles all data persistence: SQLite database, chat history, token usage
//! and JSON config.

pub mod config;
pub mod database;
pub mod messages;
pub mod quota;

pub use config::*;
pub use database::*;
pub use messages::*;
pub use quota::*;
