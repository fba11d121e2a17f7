//! Integration Tests Module
//!
//! End-to-end tests for Mentor Assistant through its public API: the startup
//! interview, the command pipeline against a mock GitHub server, the
//! token quota and application state wiring.

// Scripted provider and assistant builders
mod support;

// Startup interview conversations
mod interview_flow_test;

// Classify, parse and dispatch against a mock GitHub API
mod command_pipeline_test;

// Daily token limit enforcement
mod quota_test;

// Config file and application state
mod state_test;
