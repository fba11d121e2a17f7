//! Structured Command Parsing
//!
//! Turns a raw model response into a `StructuredRequest`. Model output is
//! untrusted: it may be fenced, wrapped in prose, truncated or not JSON at
//! all. Every failure is a defined `ParseOutcome::Unrecognized`, never an
//! error, so callers branch on the outcome instead of handling exceptions.

use std::collections::HashMap;

use serde_json::Value;

use mentor_core::operation::OperationRegistry;
use mentor_core::request::StructuredRequest;

/// Result of parsing a classification response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A well-formed request was found.
    Recognized(StructuredRequest),
    /// The text did not contain a usable request.
    Unrecognized { reason: String },
}

impl ParseOutcome {
    fn unrecognized(reason: impl Into<String>) -> Self {
        ParseOutcome::Unrecognized {
            reason: reason.into(),
        }
    }

    pub fn is_recognized(&self) -> bool {
        matches!(self, ParseOutcome::Recognized(_))
    }

    /// The recognized request, if any.
    pub fn request(&self) -> Option<&StructuredRequest> {
        match self {
            ParseOutcome::Recognized(request) => Some(request),
            ParseOutcome::Unrecognized { .. } => None,
        }
    }
}

// ============================================================================
// Fence handling
// ============================================================================

/// Remove one leading ```` ```json ```` / ```` ``` ```` fence and one trailing
/// ```` ``` ```` fence. Text without fences is returned trimmed.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let without_close = without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open);
    without_close.trim()
}

/// Extract JSON from a model response string, handling markdown fences and
/// surrounding prose.
///
/// Looks for the first fenced block; failing that, takes the span from the
/// first `{` to the last `}`; failing that, returns the trimmed text.
pub fn extract_json_from_response(text: &str) -> String {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        // Skip optional language identifier (e.g., "json")
        let content_start = after_fence.find('\n').map(|nl| nl + 1).unwrap_or(0);
        let content = &after_fence[content_start..];
        if let Some(end) = content.find("```") {
            return content[..end].trim().to_string();
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start <= end {
            return trimmed[start..=end].to_string();
        }
    }

    trimmed.to_string()
}

// ============================================================================
// Request parsing
// ============================================================================

/// Parse a classification response into a structured request.
///
/// Requires a JSON object with a non-empty string `operation` and an object
/// `parameters`. `description` defaults to empty. Non-string parameter
/// values are kept as their JSON text; `null` becomes an empty string.
pub fn parse_structured_request(raw: &str) -> ParseOutcome {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return ParseOutcome::unrecognized("empty response");
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => return ParseOutcome::unrecognized(format!("invalid JSON: {}", e)),
    };

    let Value::Object(mut object) = value else {
        return ParseOutcome::unrecognized("top-level value is not an object");
    };

    let operation = match object.get("operation") {
        Some(Value::String(op)) if !op.trim().is_empty() => op.trim().to_string(),
        Some(Value::String(_)) => return ParseOutcome::unrecognized("operation is empty"),
        Some(_) => return ParseOutcome::unrecognized("operation is not a string"),
        None => return ParseOutcome::unrecognized("missing operation"),
    };

    let parameters = match object.remove("parameters") {
        Some(Value::Object(map)) => map
            .into_iter()
            .map(|(key, value)| (key, render_parameter(value)))
            .collect::<HashMap<_, _>>(),
        Some(_) => return ParseOutcome::unrecognized("parameters is not an object"),
        None => return ParseOutcome::unrecognized("missing parameters"),
    };

    let description = match object.remove("description") {
        Some(Value::String(text)) => text,
        _ => String::new(),
    };

    ParseOutcome::Recognized(StructuredRequest {
        operation,
        parameters,
        description,
    })
}

fn render_parameter(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// Classification prompt
// ============================================================================

/// Build the prompt asking the model to classify `user_message` into one of
/// the registered operations.
pub fn build_classification_prompt(user_message: &str, registry: &OperationRegistry) -> String {
    let mut operations = String::new();
    for handler in registry.handlers() {
        operations.push_str(&format!("- {}: {}", handler.name(), handler.description()));
        let hints = handler.parameter_hints();
        if !hints.is_empty() {
            operations.push_str(&format!(" (parameters: {})", hints.join(", ")));
        }
        operations.push('\n');
    }

    format!(
        r#"You are an assistant that helps users with GitHub operations.
The user wrote: "{user_message}"

Analyze the request and produce a structured request in JSON format.
Available operations:
{operations}
Reply with JSON only, in this format:
{{
  "operation": "operation_name",
  "parameters": {{
    "param1": "value1",
    "param2": "value2"
  }},
  "description": "what should be done"
}}"#,
        user_message = user_message,
        operations = operations,
    )
}
