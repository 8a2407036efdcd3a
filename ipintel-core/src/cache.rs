//! Shared TTL cache for intelligence records.
//!
//! [`CacheStore`] is the seam the enrichment and invalidation paths talk to.
//! [`MemoryCacheStore`] backs it with an in-process [`TtlCache`]; a remote
//! store can be plugged in behind the same trait.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::Result;

/// Lifetime of a cached intelligence record (14 days).
pub const RECORD_TTL: Duration = Duration::from_secs(1_209_600);

const KEY_PREFIX: &str = "ip-data:";

/// Cache key for an IP address.
///
/// Depends only on the IP, so invalidation can rebuild it without knowing
/// anything about the request that populated the entry.
pub fn cache_key(ip: &str) -> String {
    format!("{}{}", KEY_PREFIX, ip)
}

/// Key-value store with per-entry TTL, shared by all request handlers.
///
/// Every operation addresses exactly one key and is expected to be atomic at
/// that granularity. Expired entries must read as absent.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// A cache entry with TTL tracking.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// Creates a new cache entry.
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            inserted_at: Instant::now(),
            ttl,
        }
    }

    /// Returns true if the entry has outlived its TTL.
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() > self.ttl
    }

    /// Returns the age of the entry.
    fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }
}

/// Thread-safe map whose entries expire after their own TTL.
///
/// Expired entries stay in memory until [`TtlCache::cleanup`] runs or the
/// key is overwritten, but are never returned by [`TtlCache::get`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use ipintel_core::cache::TtlCache;
///
/// let cache: TtlCache<String, String> = TtlCache::new();
/// cache.insert_with_ttl("key".to_string(), "value".to_string(), Duration::from_secs(60));
///
/// assert_eq!(cache.get(&"key".to_string()), Some("value".to_string()));
/// ```
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Acquires the read lock, recovering from poisoning.
    fn read_entries(&self) -> RwLockReadGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("Cache read lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Acquires the write lock, recovering from poisoning.
    fn write_entries(&self) -> RwLockWriteGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("Cache write lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Gets a value if it exists and has not expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.read_entries();
        let entry = entries.get(key)?;

        if entry.is_expired() {
            debug!(?key, age_secs = entry.age().as_secs(), "Cache entry expired");
            None
        } else {
            Some(entry.value.clone())
        }
    }

    /// Inserts or replaces a value with its own TTL.
    pub fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let mut entries = self.write_entries();
        debug!(?key, ttl_secs = ttl.as_secs(), "Inserting cache entry");
        entries.insert(key, CacheEntry::new(value, ttl));
    }

    /// Removes a value from the cache, expired or not.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.write_entries().remove(key).map(|e| e.value)
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn cleanup(&self) -> usize {
        let mut entries = self.write_entries();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired());
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "Cache cleanup complete");
        }
        removed
    }

    /// Number of entries held, including expired ones not yet cleaned up.
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local [`CacheStore`].
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: TtlCache<String, String>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Purges expired entries; see [`TtlCache::cleanup`].
    pub fn cleanup(&self) -> usize {
        self.entries.cleanup()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(&key.to_string()))
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.entries.insert_with_ttl(key.to_string(), value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.entries.remove(&key.to_string()).is_none() {
            debug!(key, "Delete of absent cache key");
        }
        Ok(())
    }
}
