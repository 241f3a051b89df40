//! Keyed single-flight memoization over a `moka` cache.
//!
//! Concurrent callers for the same key are coalesced: one runs the
//! initializer, the others wait for it and share its value. Callers for other
//! keys are never blocked by an in-flight computation.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use moka::sync::Cache;

/// Cache of shared values, computed at most once per key until invalidated.
///
/// Failed computations are not stored; the next caller recomputes.
pub struct Memo<K, V> {
    name: &'static str,
    values: Cache<K, Arc<V>>,
}

impl<K, V> Memo<K, V>
where
    K: Eq + Hash + Clone + Debug + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    /// Empty cache; `name` labels its log events.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            values: Cache::builder().name(name).build(),
        }
    }

    /// Cached value for `key`, computing it with `init` on a miss.
    ///
    /// Concurrent callers for the same key wait for a single `init`. If it
    /// fails, every waiting caller receives the error and nothing is stored.
    pub fn get_or_try_init<E>(
        &self,
        key: K,
        init: impl FnOnce() -> Result<V, E>,
    ) -> Result<Arc<V>, E>
    where
        E: Clone + Send + Sync + 'static,
    {
        let entry = self
            .values
            .entry(key)
            .or_try_insert_with(|| init().map(Arc::new))
            .map_err(Arc::unwrap_or_clone)?;

        if entry.is_fresh() {
            tracing::debug!(cache = self.name, key = ?entry.key(), "cache miss");
        } else {
            tracing::debug!(cache = self.name, key = ?entry.key(), "cache hit");
        }
        Ok(entry.into_value())
    }

    /// Cached value for `key`, without computing. `None` while in flight.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.values.get(key)
    }

    /// Drop the value stored for `key`.
    pub fn invalidate(&self, key: &K) {
        if self.values.remove(key).is_some() {
            tracing::debug!(cache = self.name, ?key, "cache entry invalidated");
        }
    }

    /// Drop every stored value.
    pub fn clear(&self) {
        self.values.invalidate_all();
        self.values.run_pending_tasks();
        tracing::debug!(cache = self.name, "cache cleared");
    }

    /// Number of keys holding a computed value.
    pub fn len(&self) -> usize {
        self.values.run_pending_tasks();
        self.values.entry_count() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, V> Debug for Memo<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memo").field("name", &self.name).finish_non_exhaustive()
    }
}
