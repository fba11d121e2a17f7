//! Token Usage Gate
//!
//! Enforces the daily token limit around model calls on the command path.
//! The check before a call is best effort: if usage cannot be read, the last
//! snapshot decides, and with no snapshot the call goes ahead. After a call
//! the cost is recorded and an overrun suppresses the answer.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::storage::quota::{QuotaService, TokenUsage};

/// Gate verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Refuse(TokenUsage),
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }
}

/// User-facing text for an exhausted quota.
pub fn quota_exceeded_message(usage: &TokenUsage) -> String {
    let limit = usage
        .daily_limit
        .map(|l| l.to_string())
        .unwrap_or_else(|| "∞".to_string());
    let remaining = usage
        .remaining_tokens
        .map(|r| r.to_string())
        .unwrap_or_else(|| "∞".to_string());
    format!(
        "❌ **Daily token limit exceeded!**\n\n📊 **Current usage:** {} / {} tokens\n📈 **Remaining:** {} tokens\n\n⏰ Try again tomorrow or contact an administrator to reset the limit.",
        usage.used_tokens, limit, remaining
    )
}

pub struct TokenUsageGate {
    service: Arc<dyn QuotaService>,
    identity: String,
    preflight_estimate: u64,
    cached: Mutex<Option<TokenUsage>>,
}

impl TokenUsageGate {
    pub fn new(
        service: Arc<dyn QuotaService>,
        identity: impl Into<String>,
        preflight_estimate: u64,
    ) -> Self {
        Self {
            service,
            identity: identity.into(),
            preflight_estimate,
            cached: Mutex::new(None),
        }
    }

    /// Last snapshot seen by the gate.
    pub fn cached_usage(&self) -> Option<TokenUsage> {
        self.cached.lock().ok().and_then(|guard| *guard)
    }

    fn remember(&self, usage: TokenUsage) {
        if let Ok(mut guard) = self.cached.lock() {
            *guard = Some(usage);
        }
    }

    async fn current_usage(&self) -> Option<TokenUsage> {
        match self.service.get_usage(&self.identity).await {
            Ok(usage) => {
                self.remember(usage);
                Some(usage)
            }
            Err(e) => {
                warn!(identity = %self.identity, error = %e, "usage read failed, using cached snapshot");
                self.cached_usage()
            }
        }
    }

    /// Decide whether a model call may be made.
    pub async fn check_before(&self) -> GateDecision {
        let Some(usage) = self.current_usage().await else {
            return GateDecision::Allow;
        };

        if usage.is_exceeded() || usage.would_exceed(self.preflight_estimate) {
            debug!(
                used = usage.used_tokens,
                limit = ?usage.daily_limit,
                estimate = self.preflight_estimate,
                "quota check refused call"
            );
            return GateDecision::Refuse(usage);
        }
        GateDecision::Allow
    }

    /// Record the cost of a finished call; refuse if the limit is now overrun.
    pub async fn record_after(&self, tokens: u64) -> GateDecision {
        let updated = match self.service.update_usage(&self.identity, tokens).await {
            Ok(usage) => Some(usage),
            Err(e) => {
                warn!(identity = %self.identity, tokens, error = %e, "usage update failed");
                None
            }
        };

        let usage = match self.service.get_usage(&self.identity).await {
            Ok(usage) => Some(usage),
            Err(e) => {
                warn!(identity = %self.identity, error = %e, "usage re-read failed");
                updated.or_else(|| self.cached_usage())
            }
        };

        match usage {
            Some(usage) => {
                self.remember(usage);
                if usage.is_exceeded() {
                    GateDecision::Refuse(usage)
                } else {
                    GateDecision::Allow
                }
            }
            None => GateDecision::Allow,
        }
    }
}
