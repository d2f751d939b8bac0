//! Memoizing wrapper around [`LocationNormalizer`].

use std::sync::{Mutex, MutexGuard};

use indexmap::IndexMap;

use crate::normalizer::{LocationClassifier, LocationNormalizer, RegionSet};
use crate::regions::RegionCatalog;
use crate::synonyms::normalize_key;

/// Default number of distinct inputs kept before LRU eviction.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Caches normalization results per distinct (lowercased, trimmed) input.
///
/// Injury tables repeat the same few location strings many times, so a
/// dashboard that re-aggregates on every refresh mostly hits the cache.
/// Results are identical to calling the inner normalizer directly. At most
/// `max_entries` inputs are kept; the least recently used is evicted first.
#[derive(Debug)]
pub struct CachedNormalizer {
    inner: LocationNormalizer,
    /// Result cache with LRU eviction (IndexMap preserves insertion order).
    cache: Mutex<IndexMap<String, RegionSet>>,
    max_entries: usize,
}

impl CachedNormalizer {
    /// Wrap a normalizer using the default entry limit.
    pub fn new(inner: LocationNormalizer) -> Self {
        Self::with_limit(inner, DEFAULT_MAX_ENTRIES)
    }

    /// Wrap a normalizer keeping at most `max_entries` cached inputs.
    ///
    /// A limit of 0 disables caching.
    pub fn with_limit(inner: LocationNormalizer, max_entries: usize) -> Self {
        Self {
            inner,
            cache: Mutex::new(IndexMap::new()),
            max_entries,
        }
    }

    /// The wrapped normalizer.
    pub fn inner(&self) -> &LocationNormalizer {
        &self.inner
    }

    /// Maximum number of cached inputs.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Number of distinct inputs cached so far.
    pub fn cached_entries(&self) -> usize {
        self.lock().len()
    }

    /// Drop all cached results.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Normalize `text`, serving repeated inputs from the cache.
    pub fn normalize(&self, text: &str) -> RegionSet {
        let key = normalize_key(text);

        {
            let mut cache = self.lock();
            // Move to end to mark as recently used
            if let Some(hit) = cache.shift_remove(&key) {
                cache.insert(key, hit.clone());
                return hit;
            }
        }

        let result = self.inner.normalize(&key);
        if self.max_entries == 0 {
            return result;
        }

        let mut cache = self.lock();
        cache.insert(key, result.clone());
        while cache.len() > self.max_entries {
            cache.shift_remove_index(0);
        }
        result
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<String, RegionSet>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl From<LocationNormalizer> for CachedNormalizer {
    fn from(inner: LocationNormalizer) -> Self {
        Self::new(inner)
    }
}

impl LocationClassifier for CachedNormalizer {
    fn classify(&self, text: &str) -> RegionSet {
        self.normalize(text)
    }

    fn catalog(&self) -> &RegionCatalog {
        self.inner.catalog()
    }
}
