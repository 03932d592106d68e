//! Eviction Policy Module
//!
//! Picks the single entry to drop when the store runs out of room.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::cache::{CacheEntry, CacheStore};

// == Eviction Reason ==
/// Why a victim was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// The entry's expiration had passed
    Expired,
    /// Least recently retrieved among entries retrieved at least once
    LeastRecentlyRetrieved,
    /// Earliest inserted among entries never retrieved
    OldestCold,
}

impl fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EvictionReason::Expired => "expired",
            EvictionReason::LeastRecentlyRetrieved => "least recently retrieved",
            EvictionReason::OldestCold => "oldest never retrieved",
        };
        f.write_str(label)
    }
}

// == Victim ==
/// An entry selected for eviction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Victim {
    pub name: String,
    pub reason: EvictionReason,
}

impl Victim {
    fn new(entry: &CacheEntry, reason: EvictionReason) -> Self {
        Self {
            name: entry.name.clone(),
            reason,
        }
    }
}

// == Eviction Policy Trait ==
/// Chooses which entry leaves the store.
pub trait EvictionPolicy {
    /// Selects exactly one victim from a non-empty store, or None if empty.
    fn select_victim(&self, store: &CacheStore, now: DateTime<Utc>) -> Option<Victim>;
}

// == Two Tier Policy ==
/// Expired-first, then LRU among retrieved entries or FIFO among cold ones.
///
/// 1. The first expired entry in insertion order is evicted outright.
/// 2. Otherwise, if fewer than two entries have never been retrieved, the
///    least recently retrieved entry goes.
/// 3. With two or more never-retrieved entries, the earliest inserted of
///    them goes.
///
/// When step 2 applies but nothing has been retrieved yet (a single cold
/// entry), that cold entry is the victim.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoTierPolicy;

/// Cold entries needed before FIFO-cold eviction takes over from LRU.
pub const COLD_FIFO_THRESHOLD: usize = 2;

impl EvictionPolicy for TwoTierPolicy {
    fn select_victim(&self, store: &CacheStore, now: DateTime<Utc>) -> Option<Victim> {
        let mut cold_count = 0usize;
        let mut oldest_cold: Option<&CacheEntry> = None;
        let mut least_recent: Option<(&CacheEntry, DateTime<Utc>)> = None;

        for entry in store.iter() {
            if entry.is_expired_at(now) {
                return Some(Victim::new(entry, EvictionReason::Expired));
            }

            match entry.last_retrieved {
                None => {
                    cold_count += 1;
                    if oldest_cold.is_none() {
                        oldest_cold = Some(entry);
                    }
                }
                Some(retrieved) => {
                    // Strict comparison keeps the earliest inserted on ties
                    if least_recent.map_or(true, |(_, best)| retrieved < best) {
                        least_recent = Some((entry, retrieved));
                    }
                }
            }
        }

        if cold_count < COLD_FIFO_THRESHOLD {
            if let Some((entry, _)) = least_recent {
                return Some(Victim::new(entry, EvictionReason::LeastRecentlyRetrieved));
            }
        }

        oldest_cold.map(|entry| Victim::new(entry, EvictionReason::OldestCold))
    }
}
