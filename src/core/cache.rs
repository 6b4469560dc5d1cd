//! In-memory memoization of upstream lookups
//!
//! Entries are keyed by a normalized query string and bounded both by count
//! (least recently used entries are evicted) and by age.

use crate::models::api::StructureSource;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

/// Bounded LRU cache with a per-entry time-to-live
pub struct ResponseCache<V> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a cache holding at most `capacity` entries for `ttl` each
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    /// Look up `key`, dropping the entry if it has expired
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().ok()?;

        let expired = match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
        }
        None
    }

    pub fn insert(&self, key: String, value: V) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(
                key,
                CacheEntry {
                    value,
                    inserted_at: Instant::now(),
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

/// Cache key for a protein name resolution
pub fn name_key(name: &str) -> String {
    format!("name:{}", name.trim().to_lowercase())
}

/// Cache key for structure metadata
pub fn metadata_key(source: StructureSource, id: &str) -> String {
    format!("meta:{}:{}", source, id.trim().to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_after_insert() {
        let cache = ResponseCache::new(4, Duration::from_secs(60));
        cache.insert(name_key("Insulin"), "P01308".to_string());
        assert_eq!(cache.get(&name_key(" insulin ")), Some("P01308".to_string()));
        assert_eq!(cache.get(&name_key("hemoglobin")), None);
    }

    #[test]
    fn test_least_recently_used_evicted() {
        let cache = ResponseCache::new(2, Duration::from_secs(60));
        cache.insert("a".to_string(), 1);
        cache.insert("b".to_string(), 2);

        // Touch "a" so "b" becomes the eviction candidate
        assert_eq!(cache.get("a"), Some(1));
        cache.insert("c".to_string(), 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn test_expired_entries_dropped() {
        let cache = ResponseCache::new(4, Duration::ZERO);
        cache.insert("a".to_string(), 1);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_metadata_key_normalizes_id() {
        assert_eq!(
            metadata_key(StructureSource::Pdb, "4hhb"),
            metadata_key(StructureSource::Pdb, "4HHB ")
        );
        assert_ne!(
            metadata_key(StructureSource::Pdb, "4HHB"),
            metadata_key(StructureSource::AlphaFold, "4HHB")
        );
    }
}
