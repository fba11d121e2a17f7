//! Mentor Core
//!
//! Foundational types for the Mentor Assistant workspace. This crate has zero
//! dependencies on application-level code (database, HTTP clients, LLM providers).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `DispatchError`)
//! - `request` - Structured request triple and parameter alias resolution
//! - `operation` - Operation handler trait and registry (`OperationHandler`, `OperationRegistry`)

pub mod error;
pub mod operation;
pub mod request;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult, DispatchError, DispatchResult};

// ── Structured Requests ────────────────────────────────────────────────
pub use request::{OperationParams, StructuredRequest, REPOSITORY_NAME_ALIASES};

// ── Operation Registry ─────────────────────────────────────────────────
pub use operation::{OperationHandler, OperationRegistry};
