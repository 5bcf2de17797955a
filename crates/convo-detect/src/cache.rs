//! Content-addressed memoization for service calls.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// A pure memoization cache.
///
/// Keys are derived from message content, so entries never go stale
/// and eviction is unnecessary for the bounded inputs the detector
/// sees per session.
pub struct MemoCache<K, V> {
    inner: Mutex<HashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> MemoCache<K, V> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a previously memoized value.
    pub fn get(&self, key: &K) -> Option<V> {
        match self.inner.lock() {
            Ok(map) => map.get(key).cloned(),
            Err(poisoned) => poisoned.into_inner().get(key).cloned(),
        }
    }

    /// Memoize a value.
    pub fn insert(&self, key: K, value: V) {
        match self.inner.lock() {
            Ok(mut map) => {
                map.insert(key, value);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(key, value);
            }
        }
    }

    /// Number of memoized entries.
    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(map) => map.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// True when nothing has been memoized yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V: Clone> Default for MemoCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
