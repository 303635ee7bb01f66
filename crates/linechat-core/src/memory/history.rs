//! Fixed-capacity rolling history of turns for a single user.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use linechat_types::chat::Turn;

/// Ordered turns for one user, oldest first.
///
/// `len() <= capacity()` holds after every call. Pushing into a full
/// history evicts from the front.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<Turn>,
    capacity: NonZeroUsize,
}

impl ConversationHistory {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity.get()),
            capacity,
        }
    }

    /// Append a turn, evicting the oldest turns while over capacity.
    ///
    /// Returns the number of evicted turns.
    pub fn push(&mut self, turn: Turn) -> usize {
        self.turns.push_back(turn);
        let mut evicted = 0;
        while self.turns.len() > self.capacity.get() {
            self.turns.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Owned copy of the turns in chronological order.
    pub fn to_vec(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}
