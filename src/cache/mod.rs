//! Cache Module
//!
//! Capacity-bounded file cache with TTL expiration and two-tier eviction.

mod clock;
mod entry;
mod eviction;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{expiration_from, CacheEntry};
pub use eviction::{EvictionPolicy, EvictionReason, TwoTierPolicy, Victim, COLD_FIFO_THRESHOLD};
pub use stats::CacheStats;
pub use store::CacheStore;
