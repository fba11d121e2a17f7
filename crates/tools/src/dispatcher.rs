//! Operation Dispatcher
//!
//! Routes a `StructuredRequest` to its registered handler. The dispatcher
//! never fails at its boundary: unknown operations, a missing credential and
//! handler errors all come back as a `DispatchOutcome` the caller can render.

use tracing::{debug, info, warn};

use mentor_core::error::DispatchError;
use mentor_core::operation::{OperationHandler, OperationRegistry};
use mentor_core::request::StructuredRequest;

/// Placeholder value shipped in sample configuration files.
pub const CREDENTIAL_PLACEHOLDER: &str = "YOUR_GITHUB_TOKEN_HERE";

// ============================================================================
// Outcome
// ============================================================================

/// Result of dispatching one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran and produced a rendered result
    Completed(String),
    /// The handler ran and failed; the message is already user-facing
    Failed(String),
    /// No handler is registered under this name
    Unrecognized { operation: String },
    /// The handler needs a credential that is not configured
    NotConfigured(String),
}

impl DispatchOutcome {
    /// User-facing text for this outcome.
    pub fn into_message(self) -> String {
        match self {
            DispatchOutcome::Completed(text)
            | DispatchOutcome::Failed(text)
            | DispatchOutcome::NotConfigured(text) => text,
            DispatchOutcome::Unrecognized { operation } => {
                format!("❓ Unknown operation: {}", operation)
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Completed(_))
    }
}

/// Render a handler error as an error-tagged message.
pub fn render_dispatch_error(operation: &str, err: &DispatchError) -> String {
    format!("❌ {} failed ({}): {}", operation, err.category(), err)
}

// ============================================================================
// Credential guard
// ============================================================================

/// Decides whether the remote-API credential is usable.
#[derive(Debug, Clone, Default)]
pub struct CredentialGuard {
    token: Option<String>,
}

impl CredentialGuard {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    /// A credential is configured when it is set, non-blank and not the
    /// sample placeholder.
    pub fn is_configured(&self) -> bool {
        match self.token.as_deref().map(str::trim) {
            Some(token) => !token.is_empty() && token != CREDENTIAL_PLACEHOLDER,
            None => false,
        }
    }

    /// Guidance shown when the credential is missing.
    pub fn guidance(&self) -> String {
        "⚠️ GitHub token is not configured. Set `github.token` in ~/.mentor/config.json \
         to a personal access token with the `repo` scope."
            .to_string()
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Handler registry plus the policy around it.
pub struct OperationDispatcher {
    registry: OperationRegistry,
    guard: CredentialGuard,
}

impl OperationDispatcher {
    pub fn new(registry: OperationRegistry, guard: CredentialGuard) -> Self {
        Self { registry, guard }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn guard(&self) -> &CredentialGuard {
        &self.guard
    }

    /// Look up, guard and execute.
    pub async fn dispatch(&self, request: &StructuredRequest) -> DispatchOutcome {
        let Some(handler) = self.registry.get(&request.operation) else {
            warn!(operation = %request.operation, "unknown operation requested");
            return DispatchOutcome::Unrecognized {
                operation: request.operation.clone(),
            };
        };

        if handler.requires_credential() && !self.guard.is_configured() {
            info!(operation = %request.operation, "credential not configured, skipping call");
            return DispatchOutcome::NotConfigured(self.guard.guidance());
        }

        self.execute(handler.as_ref(), request).await
    }

    async fn execute(
        &self,
        handler: &dyn OperationHandler,
        request: &StructuredRequest,
    ) -> DispatchOutcome {
        debug!(
            operation = %request.operation,
            params = request.parameters.len(),
            "dispatching operation"
        );
        match handler.execute(request.params()).await {
            Ok(text) => DispatchOutcome::Completed(text),
            Err(err) => {
                warn!(operation = %request.operation, error = %err, "operation failed");
                DispatchOutcome::Failed(render_dispatch_error(&request.operation, &err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use mentor_core::error::DispatchResult;
    use mentor_core::request::OperationParams;

    struct CountingOperation {
        name: &'static str,
        needs_token: bool,
        fail_with: Option<DispatchError>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl OperationHandler for CountingOperation {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "test operation"
        }

        fn requires_credential(&self) -> bool {
            self.needs_token
        }

        async fn execute(&self, params: OperationParams<'_>) -> DispatchResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            Ok(format!("done: {}", params.repository_name().unwrap_or("-")))
        }
    }

    fn dispatcher_with(
        op: CountingOperation,
        token: Option<&str>,
    ) -> OperationDispatcher {
        let mut registry = OperationRegistry::new();
        registry.register(Arc::new(op));
        OperationDispatcher::new(registry, CredentialGuard::new(token.map(String::from)))
    }

    fn op(name: &'static str, calls: &Arc<AtomicUsize>) -> CountingOperation {
        CountingOperation {
            name,
            needs_token: true,
            fail_with: None,
            calls: calls.clone(),
        }
    }

    #[test]
    fn test_credential_guard() {
        assert!(!CredentialGuard::new(None).is_configured());
        assert!(!CredentialGuard::new(Some("  ".into())).is_configured());
        assert!(!CredentialGuard::new(Some(CREDENTIAL_PLACEHOLDER.into())).is_configured());
        assert!(CredentialGuard::new(Some("ghp_abc".into())).is_configured());
    }

    #[tokio::test]
    async fn test_dispatch_completed() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(op("create_repository", &calls), Some("ghp_abc"));
        let request = StructuredRequest::new("create_repository").with_param("repo_name", "demo");

        let outcome = dispatcher.dispatch(&request).await;
        assert_eq!(outcome, DispatchOutcome::Completed("done: demo".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(op("create_repository", &calls), None);
        let request = StructuredRequest::new("create_repository").with_param("repo_name", "demo");

        let outcome = dispatcher.dispatch(&request).await;
        assert!(matches!(outcome, DispatchOutcome::NotConfigured(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_credential_free_handler_runs_without_token() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut handler = op("search_code", &calls);
        handler.needs_token = false;
        let dispatcher = dispatcher_with(handler, None);

        let outcome = dispatcher.dispatch(&StructuredRequest::new("search_code")).await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(op("list_repositories", &calls), Some("ghp_abc"));

        let outcome = dispatcher.dispatch(&StructuredRequest::new("deploy_rocket")).await;
        assert_eq!(
            outcome,
            DispatchOutcome::Unrecognized {
                operation: "deploy_rocket".to_string()
            }
        );
        assert_eq!(
            outcome.into_message(),
            "❓ Unknown operation: deploy_rocket".to_string()
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_error_is_rendered() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut handler = op("list_repositories", &calls);
        handler.fail_with = Some(DispatchError::from_status(403, "rate window closed"));
        let dispatcher = dispatcher_with(handler, Some("ghp_abc"));

        let outcome = dispatcher
            .dispatch(&StructuredRequest::new("list_repositories"))
            .await;
        match outcome {
            DispatchOutcome::Failed(message) => {
                assert!(message.starts_with("❌ "));
                assert!(message.contains("access denied"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }
}
