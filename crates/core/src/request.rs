//! Structured Requests
//!
//! The `{operation, parameters, description}` triple extracted from free text,
//! and the parameter view handed to operation handlers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Alias chain for a repository name, in resolution order.
pub const REPOSITORY_NAME_ALIASES: &[&str] = &["name", "repository_name", "repo_name"];

/// A request recognized in a model response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredRequest {
    /// Operation name, matched exactly against the registry
    pub operation: String,
    /// Flat string parameters
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Free-form description of the intent
    #[serde(default)]
    pub description: String,
}

impl StructuredRequest {
    /// Create a request with no parameters
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            parameters: HashMap::new(),
            description: String::new(),
        }
    }

    /// Add a parameter (builder style)
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Borrow the parameters as an `OperationParams` view
    pub fn params(&self) -> OperationParams<'_> {
        OperationParams::new(&self.parameters)
    }
}

/// Read-only parameter view with alias resolution.
#[derive(Debug, Clone, Copy)]
pub struct OperationParams<'a> {
    values: &'a HashMap<String, String>,
}

impl<'a> OperationParams<'a> {
    pub fn new(values: &'a HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Trimmed, non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&'a str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First non-empty value among `aliases`, checked in order.
    pub fn first_of(&self, aliases: &[&str]) -> Option<&'a str> {
        aliases.iter().find_map(|key| self.get(key))
    }

    /// Value for `key` or an empty string.
    pub fn get_or_empty(&self, key: &str) -> &'a str {
        self.get(key).unwrap_or("")
    }

    /// Repository name resolved through `REPOSITORY_NAME_ALIASES`.
    pub fn repository_name(&self) -> Option<&'a str> {
        self.first_of(REPOSITORY_NAME_ALIASES)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
