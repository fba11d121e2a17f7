//! Completion Helper
//!
//! One-shot text completion on top of `LlmProvider`, plus the mapping of
//! provider failures to user-facing text.

use mentor_llm::{LlmError, LlmProvider, LlmRequestOptions, LlmResult, Message};
use tracing::debug;

/// Text of a completion plus what it cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub tokens_used: u64,
    /// Generation stopped at the token limit
    pub truncated: bool,
}

/// Send a single user prompt with an optional system prompt.
///
/// A response without text is reported as a parse error.
pub async fn complete(
    provider: &dyn LlmProvider,
    system: Option<String>,
    prompt: impl Into<String>,
    options: LlmRequestOptions,
) -> LlmResult<Completion> {
    let response = provider
        .send_message(vec![Message::user(prompt)], system, options)
        .await?;

    let tokens_used = u64::from(response.usage.total_tokens());
    let truncated = response.is_truncated();
    let text = response
        .text()
        .map(str::to_string)
        .ok_or_else(|| LlmError::ParseError {
            message: format!(
                "response contained no text content (model: {}, stop_reason: {:?})",
                response.model, response.stop_reason
            ),
        })?;

    debug!(
        provider = provider.name(),
        tokens = tokens_used,
        truncated,
        "completion finished"
    );

    Ok(Completion {
        text,
        tokens_used,
        truncated,
    })
}

/// User-facing text for a failed completion on the command path.
pub fn describe_llm_error(err: &LlmError) -> String {
    match err {
        LlmError::RateLimited { .. } => {
            "⏳ Too many requests. Please wait a moment and try again.".to_string()
        }
        LlmError::AuthenticationFailed { .. } => {
            "🔑 Authorization error. Check the API key.".to_string()
        }
        LlmError::AccessDenied { .. } => {
            "🚫 Access denied (403). The API key may be blocked or expired.".to_string()
        }
        other => format!("❌ Sorry, an error occurred: {}", other),
    }
}
