//! Cache Statistics Module
//!
//! Tracks what the command stream did to the cache over a run.

use serde::Serialize;

// == Cache Stats ==
/// Counters for a simulation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// PUT directives executed
    pub puts: u64,
    /// GET directives executed
    pub gets: u64,
    /// GETs that found the file cached (fresh or expired)
    pub hits: u64,
    /// GETs for files not in the cache
    pub misses: u64,
    /// New entries created by PUT
    pub inserts: u64,
    /// PUTs on an already cached file (max-age change only)
    pub max_age_updates: u64,
    /// Entries removed by the eviction policy
    pub evictions: u64,
    /// Subset of evictions caused by expiration
    pub expired_evictions: u64,
    /// GET hits on expired entries that re-read the source
    pub refetches: u64,
    /// Lines that did not parse as a directive
    pub skipped: u64,
    /// Directives that failed (unreadable source, write failure)
    pub failed: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the GET hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no GETs have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_eviction(&mut self, expired: bool) {
        self.evictions += 1;
        if expired {
            self.expired_evictions += 1;
        }
    }
}
