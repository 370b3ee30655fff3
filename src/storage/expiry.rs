//! Expiry Index
//!
//! The scalar engine keeps every entry that was stored with a ttl in an
//! [`OrderedIndex`] keyed by the entry's key. A sweep walks only this index,
//! never the whole keyspace, so entries without a ttl cost nothing.
//!
//! ## Design
//!
//! The index holds the expiry instant of the *current* entry for each key.
//! Replacing an entry re-tracks it (or forgets it when the new entry has no
//! ttl), so a stale expiry can never be reported for a key that was reset.
//!
//! The sweep itself runs inside the scalar engine's worker loop, interleaved
//! with ordinary requests:
//! 1. Wake up on the worker's interval tick
//! 2. Ascend the index and collect every key with `now >= expires_at`
//! 3. Remove those keys from both the map and the index
//! 4. Hand each removed item to the expire callback in the background

use crate::index::OrderedIndex;
use std::ops::ControlFlow;
use tokio::time::Instant;

/// Ordered set of keys that will expire, with their deadlines.
#[derive(Debug, Default)]
pub struct ExpiryIndex {
    deadlines: OrderedIndex<Instant>,
}

impl ExpiryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the expiry of the current entry for `key`.
    ///
    /// `None` means the entry never expires and drops any earlier deadline.
    pub fn track(&mut self, key: &str, expires_at: Option<Instant>) {
        match expires_at {
            Some(at) => {
                self.deadlines.upsert(key, at);
            }
            None => {
                self.deadlines.delete(key);
            }
        }
    }

    /// Stops tracking `key`.
    pub fn forget(&mut self, key: &str) {
        self.deadlines.delete(key);
    }

    /// Returns the keys whose deadline has passed at `now`, in key order.
    pub fn due(&self, now: Instant) -> Vec<String> {
        let mut expired = Vec::new();
        self.deadlines.ascend(|key, at| {
            if now >= *at {
                expired.push(key.to_string());
            }
            ControlFlow::Continue(())
        });
        expired
    }

    pub fn deadline(&self, key: &str) -> Option<Instant> {
        self.deadlines.get(key).copied()
    }

    /// Number of keys currently carrying a ttl.
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}
