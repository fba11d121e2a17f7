//! Interview Deliverable
//!
//! Two-stage generation run when an interview finishes: a structured
//! summary of the collected answers, then startup recommendations built
//! from that summary. A truncated recommendations document goes through
//! `repair_truncated_array` before it is given up on.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info, warn};

use mentor_llm::{LlmProvider, LlmRequestOptions};
use mentor_tools::{extract_json_from_response, repair_truncated_array, RecordShape};

use crate::models::chat::{ChatMessage, MODEL_RECOMMENDATIONS_EXPERT, MODEL_STARTUP_EXPERT};
use crate::services::completion::complete;

use super::topics::TopicList;

const RECOMMENDATIONS_MAX_TOKENS: u32 = 4000;
const RECOMMENDATIONS_TEMPERATURE: f32 = 0.7;

const RECOMMENDATIONS_SYSTEM_PROMPT: &str = r#"Generate 10 startup ideas in JSON: {"startups": [{"id": "1", "title": "Title", "problem": "Problem", "solution": "Solution", "target_customer": "Target", "value_prop": "Value", "business_model": "Model", "KPIs": ["KPI1"], "revenue_forecast": "Forecast", "status": "Status", "next_actions": ["Action1"]}]}"#;

/// Prompt for the summary stage. Answers are listed in interview order.
pub fn build_summary_prompt(topics: &TopicList, answers: &BTreeMap<String, String>) -> String {
    let mut prompt = String::from(
        "Based on the following startup information, provide a comprehensive analysis and recommendations in JSON format:\n\n",
    );
    for (key, value) in topics.ordered_answers(answers) {
        prompt.push_str(&format!("{}: {}\n", key, value));
    }
    prompt.push_str(
        r#"
Provide analysis in this JSON format:
{
  "startup_analysis": {
    "idea": "idea description",
    "problem": "problem being solved",
    "target_audience": "target audience",
    "resources": "available resources",
    "experience": "experience in the field",
    "competitors": "competitor analysis",
    "recommendations": "launch recommendations",
    "next_steps": "next steps"
  }
}"#,
    );
    prompt
}

/// Generate the final interview message from the collected answers.
///
/// Never fails: every failure mode produces a message that says what went
/// wrong. Only a message built on a valid summary clears the chat.
pub async fn generate(
    provider: &dyn LlmProvider,
    topics: &TopicList,
    answers: &BTreeMap<String, String>,
) -> ChatMessage {
    let summary_text = match complete(
        provider,
        None,
        build_summary_prompt(topics, answers),
        LlmRequestOptions::default(),
    )
    .await
    {
        Ok(completion) => completion.text,
        Err(e) => {
            warn!(error = %e, "summary generation failed");
            return ChatMessage::assistant(
                format!("⚠️ Failed to generate structured summary: {}", e),
                MODEL_STARTUP_EXPERT,
            );
        }
    };

    let summary_json = extract_json_from_response(&summary_text);
    let summary = match serde_json::from_str::<Value>(&summary_json) {
        Ok(value @ Value::Object(_)) => value,
        _ => {
            warn!("summary response is not a JSON object");
            return ChatMessage::assistant(
                format!(
                    "⚠️ Failed to generate structured summary. Here's the raw response:\n{}",
                    summary_text
                ),
                MODEL_STARTUP_EXPERT,
            );
        }
    };
    debug!(answers = answers.len(), "summary generated, requesting recommendations");

    match recommendations(provider, &summary_json).await {
        Some(content) => ChatMessage::assistant(content, MODEL_RECOMMENDATIONS_EXPERT).clearing_chat(),
        None => ChatMessage::assistant(
            format!(
                "⚠️ Failed to generate startup recommendations. This may be due to timeout or API limitations. You can try again later.\n\n{}",
                format_summary(&summary)
            ),
            MODEL_STARTUP_EXPERT,
        )
        .clearing_chat(),
    }
}

async fn recommendations(provider: &dyn LlmProvider, summary_json: &str) -> Option<String> {
    let options = LlmRequestOptions::default()
        .with_max_tokens(RECOMMENDATIONS_MAX_TOKENS)
        .with_temperature(RECOMMENDATIONS_TEMPERATURE);
    let completion = match complete(
        provider,
        Some(RECOMMENDATIONS_SYSTEM_PROMPT.to_string()),
        format!("Generate 10 startup ideas based on: {}", summary_json),
        options,
    )
    .await
    {
        Ok(completion) => completion,
        Err(e) => {
            warn!(error = %e, "recommendations generation failed");
            return None;
        }
    };

    let document = serde_json::from_str::<Value>(&extract_json_from_response(&completion.text));
    if let Some(formatted) = document.ok().as_ref().and_then(format_recommendations) {
        return Some(format!("💡 Startup Recommendations Generated!\n\n{}", formatted));
    }

    match repair_truncated_array(&completion.text, &RecordShape::startups()) {
        Ok(repaired) => {
            info!(
                records = repaired.record_count,
                truncated = completion.truncated,
                "recovered truncated recommendations"
            );
            let value: Value = serde_json::from_str(&repaired.json).ok()?;
            let formatted = format_recommendations(&value)?;
            Some(format!(
                "💡 Startup Recommendations Generated! (Fixed truncated response)\n\n{}",
                formatted
            ))
        }
        Err(e) => {
            warn!(error = %e, "recommendations response could not be repaired");
            None
        }
    }
}

/// Render a `{"startups": [...]}` document. None when there is no array.
pub fn format_recommendations(document: &Value) -> Option<String> {
    let startups = document.get("startups")?.as_array()?;

    let mut out = String::from("🚀 **Startup Recommendations**\n\n");
    for (i, startup) in startups.iter().enumerate() {
        out.push_str(&format!("**{}. {}**\n", i + 1, field(startup, "title")));
        out.push_str(&format!("📍 **Problem:** {}\n", field(startup, "problem")));
        out.push_str(&format!("💡 **Solution:** {}\n", field(startup, "solution")));
        out.push_str(&format!("🎯 **Target Customer:** {}\n", field(startup, "target_customer")));
        out.push_str(&format!("💎 **Value Proposition:** {}\n", field(startup, "value_prop")));
        out.push_str(&format!("💰 **Business Model:** {}\n", field(startup, "business_model")));
        out.push_str(&format!("📊 **KPIs:** {}\n", field(startup, "KPIs")));
        out.push_str(&format!("📈 **Revenue Forecast:** {}\n", field(startup, "revenue_forecast")));
        out.push_str(&format!("🔄 **Status:** {}\n", field(startup, "status")));
        out.push_str(&format!("🎯 **Next Actions:** {}\n", field(startup, "next_actions")));
        if i + 1 < startups.len() {
            out.push_str("---\n\n");
        }
    }
    Some(out)
}

/// Render the summary object (under `startup_analysis` when present).
pub fn format_summary(summary: &Value) -> String {
    let body = summary
        .get("startup_analysis")
        .filter(|v| v.is_object())
        .unwrap_or(summary);

    let mut out = String::from("📋 **Startup Summary**\n\n");
    if let Some(map) = body.as_object() {
        for (key, value) in map {
            out.push_str(&format!("• **{}:** {}\n", key, render_value(value)));
        }
    }
    out
}

fn field(record: &Value, key: &str) -> String {
    record.get(key).map(render_value).unwrap_or_default()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}
