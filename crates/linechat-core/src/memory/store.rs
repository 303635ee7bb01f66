//! Process-wide conversation memory keyed by user ID.
//!
//! `ConversationMemory` is backed by a sharded `DashMap`, so access is
//! serialized per shard (and therefore per user) without a global lock.
//! Every method clones what it returns; no `DashMap` guard ever escapes,
//! which keeps guards from being held across `.await` points.

use std::num::NonZeroUsize;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use linechat_types::chat::Turn;

use super::history::ConversationHistory;

/// Bounded per-user conversation histories.
///
/// Cloning produces a shared view of the same underlying map. Histories
/// are created lazily on the first append for a user and live until
/// [`reset`](Self::reset) or process exit.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    histories: Arc<DashMap<String, ConversationHistory>>,
    capacity: NonZeroUsize,
}

impl ConversationMemory {
    /// Create an empty memory retaining at most `capacity` turns per user.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            histories: Arc::new(DashMap::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Current history for `user_id`, oldest first. Empty if unseen.
    pub fn get(&self, user_id: &str) -> Vec<Turn> {
        self.histories
            .get(user_id)
            .map(|h| h.to_vec())
            .unwrap_or_default()
    }

    /// Append `turn` to the user's history, evicting the oldest turns
    /// beyond capacity.
    pub fn append(&self, user_id: &str, turn: Turn) {
        self.with_history(user_id, |history| {
            Self::push_logged(user_id, history, turn);
        });
    }

    /// Append `turn` and return the resulting history in one step.
    ///
    /// Both happen under the same shard lock, so the returned snapshot
    /// always ends with `turn`.
    pub fn append_and_snapshot(&self, user_id: &str, turn: Turn) -> Vec<Turn> {
        self.with_history(user_id, |history| {
            Self::push_logged(user_id, history, turn);
            history.to_vec()
        })
    }

    /// Drop all history for `user_id`. Returns whether any existed.
    pub fn reset(&self, user_id: &str) -> bool {
        let removed = self.histories.remove(user_id).is_some();
        if removed {
            debug!(user_id, "Conversation history reset");
        }
        removed
    }

    /// Number of turns currently held for `user_id`.
    pub fn len(&self, user_id: &str) -> usize {
        self.histories.get(user_id).map(|h| h.len()).unwrap_or(0)
    }

    /// Number of users with a history.
    pub fn user_count(&self) -> usize {
        self.histories.len()
    }

    fn with_history<R>(&self, user_id: &str, f: impl FnOnce(&mut ConversationHistory) -> R) -> R {
        if let Some(mut existing) = self.histories.get_mut(user_id) {
            return f(existing.value_mut());
        }
        let mut created = self
            .histories
            .entry(user_id.to_owned())
            .or_insert_with(|| ConversationHistory::new(self.capacity));
        f(created.value_mut())
    }

    fn push_logged(user_id: &str, history: &mut ConversationHistory, turn: Turn) {
        let evicted = history.push(turn);
        if evicted > 0 {
            debug!(user_id, evicted, retained = history.len(), "Evicted oldest turns");
        }
    }
}
