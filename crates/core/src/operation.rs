//! Operation Handler Trait
//!
//! Defines the core-layer abstraction for a dispatchable operation:
//!
//! - `OperationHandler` - identity, description and execution capability
//! - `OperationRegistry` - O(1) lookup registry with ordered iteration
//!
//! Handlers are registered by exact name. The dispatcher in `mentor-tools`
//! owns the policy around them (unknown names, credential guard, error
//! rendering); handlers only know how to do their one job.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DispatchResult;
use crate::request::OperationParams;

// ============================================================================
// Trait Definition
// ============================================================================

/// A named operation that can be executed from a structured request.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    /// Unique operation name (e.g., "list_repositories").
    fn name(&self) -> &str;

    /// Human-readable description, used in the classification prompt.
    fn description(&self) -> &str;

    /// Parameter keys the handler reads, in the form shown to the model.
    fn parameter_hints(&self) -> Vec<&'static str> {
        vec![]
    }

    /// Whether the handler needs the remote credential to be configured.
    fn requires_credential(&self) -> bool {
        true
    }

    /// Execute the operation and render a human-readable result.
    async fn execute(&self, params: OperationParams<'_>) -> DispatchResult<String>;
}

// ============================================================================
// OperationRegistry
// ============================================================================

/// Registry for `OperationHandler` implementations.
///
/// Provides O(1) lookup by name and registration-order iteration.
pub struct OperationRegistry {
    handlers: HashMap<String, Arc<dyn OperationHandler>>,
    /// Insertion order for deterministic iteration.
    order: Vec<String>,
}

impl OperationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a handler. Replaces any existing handler with the same name.
    pub fn register(&mut self, handler: Arc<dyn OperationHandler>) {
        let name = handler.name().to_string();
        if !self.handlers.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.handlers.insert(name, handler);
    }

    /// Unregister a handler by name. Returns the removed handler, or None.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn OperationHandler>> {
        self.order.retain(|n| n != name);
        self.handlers.remove(name)
    }

    /// Look up a handler by exact name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn OperationHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Check if an operation is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// All operation names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Handlers in registration order.
    pub fn handlers(&self) -> Vec<Arc<dyn OperationHandler>> {
        self.order
            .iter()
            .filter_map(|name| self.handlers.get(name).cloned())
            .collect()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
