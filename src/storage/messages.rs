//! Message Store
//!
//! Persistent chat history behind the `MessageStore` trait.

use async_trait::async_trait;
use rusqlite::{params, Row};

use crate::models::chat::ChatMessage;
use crate::storage::database::Database;
use crate::utils::error::AppResult;

/// Ordered chat history.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist one message
    async fn insert_one(&self, message: &ChatMessage) -> AppResult<()>;

    /// Persist several messages, in order, atomically
    async fn insert_many(&self, messages: &[ChatMessage]) -> AppResult<()>;

    /// All messages ordered by timestamp, ties in insertion order
    async fn read_all_ordered(&self) -> AppResult<Vec<ChatMessage>>;

    /// Delete every message
    async fn clear_all(&self) -> AppResult<()>;

    /// Number of stored messages
    async fn count(&self) -> AppResult<u64>;
}

const INSERT_SQL: &str = "INSERT OR REPLACE INTO messages
    (id, content, is_user, timestamp, model, should_clear_chat)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// SQLite-backed message store
#[derive(Clone)]
pub struct SqliteMessageStore {
    db: Database,
}

impl SqliteMessageStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn row_to_message(row: &Row<'_>) -> rusqlite::Result<ChatMessage> {
        Ok(ChatMessage {
            id: row.get(0)?,
            content: row.get(1)?,
            is_user: row.get::<_, i64>(2)? != 0,
            timestamp: row.get(3)?,
            model: row.get(4)?,
            should_clear_chat: row.get::<_, i64>(5)? != 0,
        })
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn insert_one(&self, message: &ChatMessage) -> AppResult<()> {
        let conn = self.db.get_connection()?;
        conn.execute(
            INSERT_SQL,
            params![
                message.id,
                message.content,
                message.is_user as i64,
                message.timestamp,
                message.model,
                message.should_clear_chat as i64,
            ],
        )?;
        Ok(())
    }

    async fn insert_many(&self, messages: &[ChatMessage]) -> AppResult<()> {
        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_SQL)?;
            for message in messages {
                stmt.execute(params![
                    message.id,
                    message.content,
                    message.is_user as i64,
                    message.timestamp,
                    message.model,
                    message.should_clear_chat as i64,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    async fn read_all_ordered(&self) -> AppResult<Vec<ChatMessage>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, content, is_user, timestamp, model, should_clear_chat
             FROM messages ORDER BY timestamp ASC, seq ASC",
        )?;
        let messages = stmt
            .query_map([], Self::row_to_message)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(messages)
    }

    async fn clear_all(&self) -> AppResult<()> {
        let conn = self.db.get_connection()?;
        conn.execute("DELETE FROM messages", [])?;
        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        let conn = self.db.get_connection()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
