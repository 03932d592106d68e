//! Clock Module
//!
//! Time source used for expiration and retrieval timestamps.

use std::cell::Cell;

use chrono::{DateTime, TimeDelta, Utc};

// == Clock Trait ==
/// Supplies the current instant to the cache.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// == System Clock ==
/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// == Manual Clock ==
/// A clock that only moves when told to.
///
/// Lets tests and dry runs express "t=5" directly instead of sleeping.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Creates a clock frozen at the Unix epoch (t=0).
    pub fn at_epoch() -> Self {
        Self::new(DateTime::UNIX_EPOCH)
    }

    /// Moves the clock forward by `secs` seconds.
    pub fn advance(&self, secs: i64) {
        let next = TimeDelta::try_seconds(secs)
            .and_then(|delta| self.now.get().checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.now.set(next);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at_epoch()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
