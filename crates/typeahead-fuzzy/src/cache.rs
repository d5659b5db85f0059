//! Shared LRU cache for match results.
//!
//! Matching is re-run against the same candidate set on every keystroke, and
//! most keystrokes extend the previous query rather than replace it. Caching
//! `(query, candidate, case_sensitive) -> MatchResult` turns those repeated
//! passes into a lock plus a map probe. One [`SearchCache`] is created at
//! startup and handed to every engine behind an [`Arc`](std::sync::Arc), so
//! all dropdowns in a process share a single eviction budget.
//!
//! The cache is a pure optimization: a hit returns a clone of exactly what
//! the search produced, and evicting an entry only means the next lookup
//! recomputes the identical result. Fast-rejected candidates never reach the
//! cache at all, so `misses` counts real search work.
//!
//! Interior locking uses a [`Mutex`] with poison recovery: cache state is
//! plain data, so a panicked holder cannot leave it logically broken.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;
use rustc_hash::FxBuildHasher;

use crate::search::MatchResult;

/// Default number of cached match results.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

type Key = (String, String, bool);

struct Inner {
    entries: LruCache<Key, MatchResult, FxBuildHasher>,
    hits: u64,
    misses: u64,
}

/// Bounded, thread-safe store of previously computed match results.
pub struct SearchCache {
    inner: Mutex<Inner>,
}

impl SearchCache {
    /// Create a cache holding at most `capacity` results.
    ///
    /// A capacity of zero is clamped to one entry.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::with_hasher(capacity, FxBuildHasher),
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Look up a previously computed result, refreshing its recency.
    pub fn get(&self, query: &str, candidate: &str, case_sensitive: bool) -> Option<MatchResult> {
        let key = (query.to_owned(), candidate.to_owned(), case_sensitive);
        let inner = &mut *self.lock();
        let hit = inner.entries.get(&key).cloned();
        match hit {
            Some(result) => {
                inner.hits += 1;
                Some(result)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Store a computed result, evicting the least-recently-used entry when
    /// the cache is at capacity.
    pub fn insert(&self, query: &str, candidate: &str, case_sensitive: bool, result: MatchResult) {
        let key = (query.to_owned(), candidate.to_owned(), case_sensitive);
        self.lock().entries.put(key, result);
    }

    /// Number of cached results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of cached results.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.lock().entries.cap().get()
    }

    /// Drop all entries and reset hit/miss counters.
    pub fn clear(&self) {
        let inner = &mut *self.lock();
        inner.entries.clear();
        inner.hits = 0;
        inner.misses = 0;
    }

    /// Snapshot of occupancy and hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            entries: inner.entries.len(),
            capacity: inner.entries.cap().get(),
            hits: inner.hits,
            misses: inner.misses,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl fmt::Debug for SearchCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats();
        f.debug_struct("SearchCache")
            .field("entries", &stats.entries)
            .field("capacity", &stats.capacity)
            .field("hits", &stats.hits)
            .field("misses", &stats.misses)
            .finish()
    }
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups served from the cache. Zero when no lookups have
    /// happened yet.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: f32) -> MatchResult {
        MatchResult {
            score,
            offsets: vec![0],
        }
    }

    // ── Capacity ────────────────────────────────────────────────────────

    #[test]
    fn capacity_bounds_entry_count() {
        let cache = SearchCache::new(2);
        cache.insert("q", "a", false, result(1.0));
        cache.insert("q", "b", false, result(2.0));
        cache.insert("q", "c", false, result(3.0));
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let cache = SearchCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.insert("q", "a", false, result(1.0));
        assert_eq!(cache.len(), 1);
    }

    // ── Eviction ────────────────────────────────────────────────────────

    #[test]
    fn least_recently_used_entry_is_evicted() {
        let cache = SearchCache::new(2);
        cache.insert("q", "a", false, result(1.0));
        cache.insert("q", "b", false, result(2.0));
        // Touch "a" so "b" becomes the eviction victim.
        assert!(cache.get("q", "a", false).is_some());
        cache.insert("q", "c", false, result(3.0));
        assert!(cache.get("q", "a", false).is_some());
        assert!(cache.get("q", "b", false).is_none());
        assert!(cache.get("q", "c", false).is_some());
    }

    #[test]
    fn reinsert_after_eviction_returns_new_value() {
        let cache = SearchCache::new(1);
        cache.insert("q", "a", false, result(1.0));
        cache.insert("q", "b", false, result(2.0));
        assert!(cache.get("q", "a", false).is_none());
        cache.insert("q", "a", false, result(1.0));
        assert_eq!(cache.get("q", "a", false), Some(result(1.0)));
    }

    // ── Keys ────────────────────────────────────────────────────────────

    #[test]
    fn case_flag_distinguishes_entries() {
        let cache = SearchCache::new(8);
        cache.insert("Q", "a", false, result(1.0));
        assert!(cache.get("Q", "a", true).is_none());
        assert!(cache.get("Q", "a", false).is_some());
    }

    // ── Stats ───────────────────────────────────────────────────────────

    #[test]
    fn stats_track_hits_and_misses() {
        let cache = SearchCache::new(8);
        assert!(cache.get("q", "a", false).is_none());
        cache.insert("q", "a", false, result(1.0));
        assert!(cache.get("q", "a", false).is_some());
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn hit_rate_is_zero_before_any_lookup() {
        let cache = SearchCache::new(8);
        assert_eq!(cache.stats().hit_rate(), 0.0);
    }

    #[test]
    fn clear_resets_entries_and_counters() {
        let cache = SearchCache::new(8);
        cache.insert("q", "a", false, result(1.0));
        assert!(cache.get("q", "a", false).is_some());
        cache.clear();
        assert!(cache.is_empty());
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses), (0, 0));
    }
}
