//! Token Usage Store
//!
//! Per-identity daily token counters behind the `QuotaService` trait.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::storage::database::Database;
use crate::utils::error::AppResult;

/// Usage snapshot for one identity and day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub used_tokens: u64,
    /// `None` means unlimited
    pub daily_limit: Option<u64>,
    /// `daily_limit - used_tokens`; negative once the limit is overrun
    pub remaining_tokens: Option<i64>,
}

impl TokenUsage {
    pub fn new(used_tokens: u64, daily_limit: Option<u64>) -> Self {
        Self {
            used_tokens,
            daily_limit,
            remaining_tokens: daily_limit.map(|limit| limit as i64 - used_tokens as i64),
        }
    }

    /// Whether the limit is set and already overrun.
    pub fn is_exceeded(&self) -> bool {
        self.daily_limit.is_some() && self.remaining_tokens.is_some_and(|r| r < 0)
    }

    /// Whether spending `requested` more tokens would cross the limit.
    pub fn would_exceed(&self, requested: u64) -> bool {
        match self.daily_limit {
            Some(limit) => self.used_tokens.saturating_add(requested) > limit,
            None => false,
        }
    }
}

/// Reads and updates token usage for an identity.
#[async_trait]
pub trait QuotaService: Send + Sync {
    /// Current usage for `identity`
    async fn get_usage(&self, identity: &str) -> AppResult<TokenUsage>;

    /// Add `delta` tokens to today's counter and return the new usage
    async fn update_usage(&self, identity: &str, delta: u64) -> AppResult<TokenUsage>;
}

/// SQLite-backed daily counter. The limit comes from configuration.
#[derive(Clone)]
pub struct SqliteQuotaService {
    db: Database,
    daily_limit: Option<u64>,
}

impl SqliteQuotaService {
    pub fn new(db: Database, daily_limit: Option<u64>) -> Self {
        Self { db, daily_limit }
    }

    fn today() -> String {
        Utc::now().date_naive().format("%Y-%m-%d").to_string()
    }

    fn read_used(&self, identity: &str, day: &str) -> AppResult<u64> {
        let conn = self.db.get_connection()?;
        let used: Option<i64> = conn
            .query_row(
                "SELECT used_tokens FROM token_usage WHERE identity = ?1 AND day = ?2",
                params![identity, day],
                |row| row.get(0),
            )
            .optional()?;
        Ok(used.unwrap_or(0).max(0) as u64)
    }
}

#[async_trait]
impl QuotaService for SqliteQuotaService {
    async fn get_usage(&self, identity: &str) -> AppResult<TokenUsage> {
        let used = self.read_used(identity, &Self::today())?;
        Ok(TokenUsage::new(used, self.daily_limit))
    }

    async fn update_usage(&self, identity: &str, delta: u64) -> AppResult<TokenUsage> {
        let day = Self::today();
        {
            let conn = self.db.get_connection()?;
            conn.execute(
                "INSERT INTO token_usage (identity, day, used_tokens) VALUES (?1, ?2, ?3)
                 ON CONFLICT(identity, day) DO UPDATE SET
                    used_tokens = used_tokens + excluded.used_tokens,
                    updated_at = CURRENT_TIMESTAMP",
                params![identity, day, delta as i64],
            )?;
        }
        let used = self.read_used(identity, &day)?;
        Ok(TokenUsage::new(used, self.daily_limit))
    }
}
