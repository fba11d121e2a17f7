//! Services
//!
//! Business logic services for the application.
//! `assistant` is the entry point; the other services are its collaborators.

pub mod assistant;
pub mod bridge;
pub mod completion;
pub mod github;
pub mod interview;
pub mod quota;

pub use assistant::{Assistant, TurnOutcome};
pub use bridge::BridgeClient;
pub use github::GitHubClient;
pub use interview::{InterviewService, SessionRegistry};
pub use quota::{GateDecision, TokenUsageGate};
