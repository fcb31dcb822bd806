//! Storage Layer — durable state for the game engine
//!
//! Two embedded LMDB environments, split the same way the data is shared:
//! - **CatalogStore**: read-mostly definition data (killers, dungeons,
//!   bots, shop items), seeded at startup, append-only afterwards.
//! - **ProfileStore**: read-write per-caller data (profiles, roles, clans,
//!   join listings, admin events, id counters).
//!
//! ## Architecture
//! ```text
//! [API Handlers]
//!       ↓ ProfileLocks (serialize per-caller mutations)
//! ┌───────────────┬───────────────┐
//! │ ProfileStore  │ CatalogStore  │
//! │ (player data) │ (definitions) │
//! └───────────────┴───────────────┘
//! ```
//!
//! Stored values are `serde`-encoded with `bincode`. Every multi-record
//! mutation commits in a single LMDB write transaction so a typed failure
//! never leaves partial state behind.

pub mod catalog_store;
pub mod profile_store;
pub mod seed_data;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Error type for both stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("LMDB error: {0}")]
    Heed(#[from] heed::Error),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for StoreError {
    fn from(e: bincode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Per-caller lock registry.
///
/// The engine processes calls as short-lived run-to-completion transactions
/// against a single profile record. Concurrent calls for the same caller
/// (two browser tabs, a double-click) must not interleave their
/// read–mutate–write cycles, so every mutating handler holds this lock for
/// the caller's key across the whole cycle. Locks are created on first use
/// and kept for the process lifetime; the per-caller footprint is one Arc
/// and one mutex.
#[derive(Default)]
pub struct ProfileLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProfileLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for one caller's profile record.
    pub fn for_caller(&self, caller: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        locks
            .entry(caller.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Locks for two callers, ordered by key so concurrent cross-profile
    /// operations (follow/unfollow) cannot deadlock.
    pub fn for_pair(&self, a: &str, b: &str) -> (Arc<Mutex<()>>, Arc<Mutex<()>>) {
        if a <= b {
            (self.for_caller(a), self.for_caller(b))
        } else {
            let second = self.for_caller(a);
            (self.for_caller(b), second)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_caller_gets_the_same_lock() {
        let locks = ProfileLocks::new();
        let a = locks.for_caller("alice");
        let b = locks.for_caller("alice");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn pair_order_is_independent_of_argument_order() {
        let locks = ProfileLocks::new();
        let (x1, y1) = locks.for_pair("alice", "bob");
        let (x2, y2) = locks.for_pair("bob", "alice");
        assert!(Arc::ptr_eq(&x1, &x2));
        assert!(Arc::ptr_eq(&y1, &y2));
    }
}
