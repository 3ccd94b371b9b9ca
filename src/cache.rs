//! Bounded caches for externally rendered content (diagrams, images).
//!
//! Keys are SHA-256 digests of the source text and theme identifier, so they
//! are identical across runs and safe to persist or compare in tests.

use lru::LruCache;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::fmt;
use std::num::NonZeroUsize;

/// Stable key for one `(source, theme)` pair.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    pub fn new(source: &str, theme_id: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(theme_id.as_bytes());
        // Separator so ("ab", "c") and ("a", "bc") differ
        hasher.update([0u8]);
        hasher.update(source.as_bytes());
        CacheKey(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", &self.to_string()[..12])
    }
}

/// Strict LRU cache with an explicit capacity.
///
/// A hit promotes the entry to most recently used; inserting at capacity
/// evicts the least recently used entry.
pub struct RenderCache<V> {
    entries: Mutex<LruCache<CacheKey, V>>,
}

impl<V: Clone> RenderCache<V> {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.entries.lock().get(key).cloned()
    }

    /// Whether `key` is cached, without touching its recency.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.lock().contains(key)
    }

    /// Insert or replace, returning the entry evicted to make room.
    pub fn insert(&self, key: CacheKey, value: V) -> Option<(CacheKey, V)> {
        let evicted = self.entries.lock().push(key, value);
        match evicted {
            Some((old_key, _)) if old_key == key => None,
            Some((old_key, old_value)) => {
                log::debug!("Render cache evicted {}", old_key);
                Some((old_key, old_value))
            }
            None => None,
        }
    }

    /// Cached value for `key`, or the result of `render` (cached on success).
    pub fn get_or_try_insert_with<E>(
        &self,
        key: CacheKey,
        render: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = render()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
