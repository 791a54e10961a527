//! Cache backend trait and in-memory implementation.
//!
//! Backends store opaque byte payloads under string keys, with a set of tags
//! per entry for bulk invalidation. Serialization is owned by the callers
//! (builder and repositories), so a backend can be swapped without touching
//! their logic.

use async_trait::async_trait;
use mosaic_core::CacheError;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Cache backend for pluggable cache storage.
///
/// Implementations must be safe under concurrent access; the read layer
/// performs no locking of its own beyond a single backend call per
/// operation.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get the payload stored under a key, or `None` when absent.
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Store a payload under a key, replacing any previous entry and its
    /// tags.
    async fn save(&self, key: &str, value: &[u8], tags: &[String]) -> Result<(), CacheError>;

    /// Remove a single entry. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// Remove every entry carrying at least one of the given tags.
    ///
    /// Returns the number of entries evicted.
    async fn invalidate_tags(&self, tags: &[String]) -> Result<u64, CacheError>;

    /// Drop all entries.
    async fn clear(&self) -> Result<(), CacheError>;

    /// Get usage statistics.
    async fn stats(&self) -> Result<CacheStats, CacheError>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in the cache.
    pub entry_count: u64,
    /// Number of entries evicted through tag invalidation.
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    tags: HashSet<String>,
}

/// Process-local cache backend backed by a tagged hash map.
#[derive(Debug, Default)]
pub struct MemoryCacheBackend {
    entries: RwLock<HashMap<String, Entry>>,
    stats: RwLock<CacheStats>,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let entries = self.entries.read().map_err(|_| CacheError::LockPoisoned)?;
        let hit = entries.get(key).map(|entry| entry.value.clone());

        let mut stats = self.stats.write().map_err(|_| CacheError::LockPoisoned)?;
        if hit.is_some() {
            stats.hits += 1;
        } else {
            stats.misses += 1;
        }
        Ok(hit)
    }

    async fn save(&self, key: &str, value: &[u8], tags: &[String]) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                tags: tags.iter().cloned().collect(),
            },
        );

        let mut stats = self.stats.write().map_err(|_| CacheError::LockPoisoned)?;
        stats.entry_count = entries.len() as u64;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        entries.remove(key);

        let mut stats = self.stats.write().map_err(|_| CacheError::LockPoisoned)?;
        stats.entry_count = entries.len() as u64;
        Ok(())
    }

    async fn invalidate_tags(&self, tags: &[String]) -> Result<u64, CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        let before = entries.len();
        entries.retain(|_, entry| !tags.iter().any(|tag| entry.tags.contains(tag)));
        let evicted = (before - entries.len()) as u64;

        let mut stats = self.stats.write().map_err(|_| CacheError::LockPoisoned)?;
        stats.entry_count = entries.len() as u64;
        stats.invalidations += evicted;
        Ok(evicted)
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
        entries.clear();

        let mut stats = self.stats.write().map_err(|_| CacheError::LockPoisoned)?;
        stats.entry_count = 0;
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        let stats = self.stats.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(stats.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let cache = MemoryCacheBackend::new();
        cache.save("a", b"payload", &tags(&["t1"])).await.unwrap();

        assert_eq!(cache.load("a").await.unwrap(), Some(b"payload".to_vec()));
        assert_eq!(cache.load("b").await.unwrap(), None);

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 1);
    }

    #[tokio::test]
    async fn test_invalidate_tags_evicts_shared_tag_only() {
        let cache = MemoryCacheBackend::new();
        cache.save("a", b"1", &tags(&["widgets", "w1"])).await.unwrap();
        cache.save("b", b"2", &tags(&["widgets", "w2"])).await.unwrap();
        cache.save("c", b"3", &tags(&["groups"])).await.unwrap();

        let evicted = cache.invalidate_tags(&tags(&["w1"])).await.unwrap();
        assert_eq!(evicted, 1);
        assert_eq!(cache.load("a").await.unwrap(), None);
        assert!(cache.load("b").await.unwrap().is_some());

        let evicted = cache.invalidate_tags(&tags(&["widgets"])).await.unwrap();
        assert_eq!(evicted, 1);
        assert!(cache.load("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_replaces_entry_and_tags() {
        let cache = MemoryCacheBackend::new();
        cache.save("a", b"old", &tags(&["t1"])).await.unwrap();
        cache.save("a", b"new", &tags(&["t2"])).await.unwrap();

        // The old tag no longer reaches the entry.
        assert_eq!(cache.invalidate_tags(&tags(&["t1"])).await.unwrap(), 0);
        assert_eq!(cache.load("a").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn test_remove_absent_key_is_ok() {
        let cache = MemoryCacheBackend::new();
        cache.remove("missing").await.unwrap();
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = MemoryCacheBackend::new();
        cache.save("a", b"1", &[]).await.unwrap();
        cache.clear().await.unwrap();
        assert_eq!(cache.stats().await.unwrap().entry_count, 0);
    }

    #[test]
    fn test_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);
        assert!((CacheStats::default().hit_rate() - 0.0).abs() < 0.001);
    }
}
