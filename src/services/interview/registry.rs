//! Session Registry
//!
//! Interview sessions keyed by conversation id. A turn reads a snapshot
//! (state plus epoch), computes without holding any lock on the map, then
//! commits once. Cancelling bumps the epoch, so a commit from a turn that
//! started before the cancel is rejected and its result discarded.
//!
//! Turns on one conversation are serialized by a per-conversation async
//! mutex; cancellation never takes it. Snapshots and commits happen under
//! that lock. A conversation is forgotten once its session is idle and no
//! turn holds or waits for its lock, so the maps only track live
//! conversations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use crate::models::interview::DialogState;

/// State read at the start of a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: DialogState,
    pub epoch: u64,
}

#[derive(Default)]
struct SessionEntry {
    state: DialogState,
    epoch: u64,
}

/// Exclusive use of one conversation for the length of a turn. Dropping it
/// releases the lock and forgets the conversation if nothing else needs it.
pub struct TurnGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    registry: &'a SessionRegistry,
    conversation_id: String,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.registry.prune(&self.conversation_id);
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionEntry>>,
    turn_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        // A poisoned map still holds consistent entries: every write is a
        // single assignment.
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current state and epoch; idle at epoch 0 for unknown conversations.
    pub fn snapshot(&self, conversation_id: &str) -> SessionSnapshot {
        let sessions = self.sessions();
        match sessions.get(conversation_id) {
            Some(entry) => SessionSnapshot {
                state: entry.state.clone(),
                epoch: entry.epoch,
            },
            None => SessionSnapshot {
                state: DialogState::default(),
                epoch: 0,
            },
        }
    }

    /// Store `state` if the epoch is still `epoch`. Returns false when the
    /// session was cancelled in the meantime.
    pub fn commit(&self, conversation_id: &str, epoch: u64, state: DialogState) -> bool {
        let mut sessions = self.sessions();
        let entry = sessions.entry(conversation_id.to_string()).or_default();
        if entry.epoch != epoch {
            debug!(
                conversation = conversation_id,
                expected = epoch,
                current = entry.epoch,
                "stale session commit rejected"
            );
            return false;
        }
        entry.state = state;
        true
    }

    /// Reset to idle and invalidate in-flight turns. Returns whether a
    /// session was active.
    pub fn cancel(&self, conversation_id: &str) -> bool {
        let was_active = {
            let mut sessions = self.sessions();
            let entry = sessions.entry(conversation_id.to_string()).or_default();
            let was_active = entry.state.is_active;
            entry.state = DialogState::default();
            entry.epoch += 1;
            was_active
        };
        self.prune(conversation_id);
        was_active
    }

    pub fn is_active(&self, conversation_id: &str) -> bool {
        self.sessions()
            .get(conversation_id)
            .map(|entry| entry.state.is_active)
            .unwrap_or(false)
    }

    fn turn_locks(&self) -> MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
        self.turn_locks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Wait for exclusive use of the conversation for one turn.
    pub async fn lock_turn(&self, conversation_id: &str) -> TurnGuard<'_> {
        let lock = self
            .turn_locks()
            .entry(conversation_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();
        TurnGuard {
            guard: Some(lock.lock_owned().await),
            registry: self,
            conversation_id: conversation_id.to_string(),
        }
    }

    /// Whether the registry holds any state for the conversation.
    pub fn is_tracked(&self, conversation_id: &str) -> bool {
        self.turn_locks().contains_key(conversation_id)
            || self.sessions().contains_key(conversation_id)
    }

    /// Forget an idle conversation whose turn lock nobody holds or awaits.
    ///
    /// Lock order is turn locks, then sessions.
    fn prune(&self, conversation_id: &str) {
        let mut locks = self.turn_locks();
        // Guards and waiters each hold a clone of the lock
        if locks
            .get(conversation_id)
            .is_some_and(|lock| Arc::strong_count(lock) > 1)
        {
            return;
        }
        let mut sessions = self.sessions();
        if sessions
            .get(conversation_id)
            .is_some_and(|entry| entry.state.is_active)
        {
            return;
        }
        let had_session = sessions.remove(conversation_id).is_some();
        let had_lock = locks.remove(conversation_id).is_some();
        if had_session || had_lock {
            debug!(conversation = conversation_id, "idle conversation released");
        }
    }
}
