// Time-to-live cache shared by the provider, the ESPN client and the
// projection engine.
//
// Owned explicitly by whoever needs it (usually wrapped in an `Arc`); there
// is no process-global store. Values are inserted whole, so a reader either
// sees the previous value, nothing, or the complete new value.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// A mutex-guarded map whose entries expire after a per-entry TTL.
///
/// Uses `tokio::time::Instant`, so expiry follows the runtime clock and can
/// be driven deterministically in tests with a paused clock.
pub struct TtlCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a clone of the value for `key` if present and not expired.
    /// Expired entries are evicted on access.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or replace `key`, fresh for `ttl` from now.
    pub fn put(&self, key: K, value: V, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.lock().insert(key, Entry { value, expires_at });
    }

    pub fn invalidate(&self, key: &K) {
        self.lock().remove(key);
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, including ones that expired but have not
    /// been evicted yet.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Entries are only ever replaced whole, so a poisoned map is still
    // consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
