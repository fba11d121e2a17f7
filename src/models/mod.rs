//! Data Models
//!
//! Contains all data structures used throughout the application.

pub mod chat;
pub mod interview;
pub mod settings;

pub use chat::*;
pub use interview::*;
pub use settings::*;
