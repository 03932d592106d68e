//! Cache Entry Module
//!
//! Defines the structure for individual cached files with TTL support.

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};

// == Cache Entry ==
/// A named file blob held by the cache, with its freshness metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// File name, unique within a store
    pub name: String,
    /// File contents as read from the source
    pub data: Bytes,
    /// Configured time-to-live in seconds
    pub max_age: i64,
    /// Instant at which the entry goes stale
    pub expiration: DateTime<Utc>,
    /// Instant of the most recent successful GET, None = never retrieved
    pub last_retrieved: Option<DateTime<Utc>>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a freshly inserted entry.
    ///
    /// # Arguments
    /// * `name` - File name the data was read from
    /// * `data` - File contents
    /// * `max_age` - TTL in seconds, counted from `now`
    /// * `now` - Insertion instant
    pub fn new(name: impl Into<String>, data: Bytes, max_age: i64, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            data,
            max_age,
            expiration: expiration_from(now, max_age),
            last_retrieved: None,
        }
    }

    // == Length ==
    /// Returns the size of the cached data in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // == Is Expired ==
    /// Checks if the entry is stale at `now`.
    ///
    /// Boundary condition: an entry whose expiration equals `now` is already
    /// expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiration <= now
    }

    // == Is Cold ==
    /// Returns true if the entry has never been retrieved since insertion.
    pub fn is_cold(&self) -> bool {
        self.last_retrieved.is_none()
    }

    // == Mark Retrieved ==
    /// Records a successful GET at `now` and slides the expiration forward.
    pub fn mark_retrieved(&mut self, now: DateTime<Utc>) {
        self.last_retrieved = Some(now);
        self.expiration = expiration_from(now, self.max_age);
    }
}

// == Utility Functions ==
/// Computes `now + max_age` seconds, saturating at the representable range.
pub fn expiration_from(now: DateTime<Utc>, max_age: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(max_age)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(if max_age < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}
