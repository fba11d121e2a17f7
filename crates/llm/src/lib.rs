//! Mentor LLM
//!
//! Provides the text completion interface used by the interview and the
//! command classifier, with an OpenAI-compatible implementation and the
//! HTTP client factory shared by every outbound client.

pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use http_client::{build_http_client, HttpClientConfig};
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use types::*;
