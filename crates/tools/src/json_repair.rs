//! Truncated JSON Repair
//!
//! Recovers the longest valid prefix of a record array from a model response
//! that was cut off mid-record, e.g. when generation hit the token limit:
//!
//! ```text
//! {"items":[{"a":1},{"a":2},{"a":      ->      {"items":[{"a":1},{"a":2}]}
//! ```
//!
//! Only documents shaped as a top-level object holding one named array of
//! homogeneous records are handled. Kept records are copied byte for byte.

use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use mentor_core::error::{CoreError, CoreResult};

/// Fields every startup recommendation record carries.
pub const STARTUP_RECORD_FIELDS: &[&str] = &[
    "id",
    "title",
    "problem",
    "solution",
    "target_customer",
    "value_prop",
    "business_model",
    "KPIs",
    "revenue_forecast",
    "status",
    "next_actions",
];

/// Expected document shape: `{"<array_key>": [ {<fields>...}, ... ]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordShape {
    array_key: String,
    required_fields: Vec<String>,
}

impl RecordShape {
    pub fn new<I, S>(array_key: impl Into<String>, required_fields: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let array_key = array_key.into();
        if array_key.trim().is_empty() {
            return Err(CoreError::validation("record array key must not be empty"));
        }
        Ok(Self {
            array_key,
            required_fields: required_fields.into_iter().map(Into::into).collect(),
        })
    }

    /// Shape of the startup recommendations document.
    pub fn startups() -> Self {
        Self {
            array_key: "startups".to_string(),
            required_fields: STARTUP_RECORD_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn array_key(&self) -> &str {
        &self.array_key
    }

    fn accepts(&self, record: &Value) -> bool {
        match record {
            Value::Object(map) => self.required_fields.iter().all(|f| map.contains_key(f)),
            _ => false,
        }
    }
}

/// Why a document could not be repaired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepairError {
    #[error("array \"{key}\" not found in document")]
    ArrayNotFound { key: String },

    #[error("no complete record in array \"{key}\"")]
    NoCompleteRecord { key: String },

    #[error("invalid array key pattern: {0}")]
    Pattern(String),
}

/// A successfully repaired document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairedDocument {
    /// Re-synthesized JSON text
    pub json: String,
    /// Number of records kept
    pub record_count: usize,
}

/// Recover every complete, well-formed record preceding the first incomplete
/// one and close the array around them.
pub fn repair_truncated_array(
    text: &str,
    shape: &RecordShape,
) -> Result<RepairedDocument, RepairError> {
    let pattern = format!(r#""{}"\s*:\s*\["#, regex::escape(&shape.array_key));
    let array_open = Regex::new(&pattern).map_err(|e| RepairError::Pattern(e.to_string()))?;

    let found = array_open
        .find(text)
        .ok_or_else(|| RepairError::ArrayNotFound {
            key: shape.array_key.clone(),
        })?;

    let records: Vec<&str> = complete_records(&text[found.end()..])
        .into_iter()
        .take_while(|raw| {
            serde_json::from_str::<Value>(raw)
                .map(|value| shape.accepts(&value))
                .unwrap_or(false)
        })
        .collect();

    if records.is_empty() {
        return Err(RepairError::NoCompleteRecord {
            key: shape.array_key.clone(),
        });
    }

    let json = format!(
        "{{{}:[{}]}}",
        Value::String(shape.array_key.clone()),
        records.join(",")
    );
    debug!(
        key = %shape.array_key,
        records = records.len(),
        "repaired truncated record array"
    );

    Ok(RepairedDocument {
        json,
        record_count: records.len(),
    })
}

/// Split the array body (text after `[`) into brace-balanced record spans.
///
/// Stops at the closing `]`, at any non-object element, or at the first
/// record whose closing brace never arrives.
fn complete_records(body: &str) -> Vec<&str> {
    let bytes = body.as_bytes();
    let mut records = Vec::new();
    let mut pos = 0;

    loop {
        while pos < bytes.len() && (bytes[pos].is_ascii_whitespace() || bytes[pos] == b',') {
            pos += 1;
        }
        if pos >= bytes.len() || bytes[pos] != b'{' {
            break;
        }
        match matching_brace(bytes, pos) {
            Some(end) => {
                records.push(&body[pos..=end]);
                pos = end + 1;
            }
            None => break,
        }
    }

    records
}

/// Index of the `}` closing the object opened at `start`, string-aware.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (b == b'}').then_some(i);
                }
            }
            _ => {}
        }
    }

    None
}
