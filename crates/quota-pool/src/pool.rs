//! Key pool: the set of currently-usable API keys
//!
//! Keys are added once at construction and the pool only shrinks from
//! there. Eviction is atomic remove-if-present, so concurrent requests
//! that fail on the same key both observe it removed exactly once and
//! neither sees an error. Picking favors the first remaining key in
//! configuration order for reproducibility.

use common::ApiKey;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Concurrency-safe, monotonically shrinking set of API keys.
///
/// The pool is the only state shared between concurrent requests; it is
/// passed in explicitly (usually behind an `Arc`) rather than living in
/// ambient process state.
pub struct KeyPool {
    keys: RwLock<Vec<ApiKey>>,
    initial_len: usize,
}

impl KeyPool {
    /// Create a pool from the configured keys, in configuration order.
    pub fn new(keys: Vec<ApiKey>) -> Self {
        let initial_len = keys.len();
        info!(keys = initial_len, "key pool initialized");
        Self {
            keys: RwLock::new(keys),
            initial_len,
        }
    }

    /// The first remaining key in configuration order, or `None` when the
    /// pool is empty.
    pub async fn pick(&self) -> Option<ApiKey> {
        self.keys.read().await.first().cloned()
    }

    /// Idempotently remove `key` from the pool.
    ///
    /// Returns `true` only for the call that actually removed the key;
    /// a later call for the same key is a no-op returning `false`.
    pub async fn evict(&self, key: &ApiKey) -> bool {
        let mut keys = self.keys.write().await;
        let Some(idx) = keys.iter().position(|k| k == key) else {
            return false;
        };
        keys.remove(idx);
        warn!(
            key = %key.fingerprint(),
            remaining = keys.len(),
            "key evicted from pool"
        );
        true
    }

    /// Number of keys currently in the pool. Non-increasing over time.
    pub async fn len(&self) -> usize {
        self.keys.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.keys.read().await.is_empty()
    }

    /// Number of keys the pool was constructed with.
    pub fn initial_len(&self) -> usize {
        self.initial_len
    }
}
