//! Command Interpreter
//!
//! Executes directives against the cache store, the eviction policy and the
//! file collaborator.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::cache::{
    CacheEntry, CacheStats, CacheStore, Clock, EvictionPolicy, EvictionReason, TwoTierPolicy,
    Victim,
};
use crate::command::{output_name, Directive};
use crate::error::{CacheError, Result};
use crate::files::FileSystem;

// == Outcome ==
/// What a single command did to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// PUT miss: a new entry was created, possibly after an eviction
    Inserted { evicted: Option<Victim> },
    /// PUT hit: only the max-age of the existing entry changed
    MaxAgeUpdated { previous: i64 },
    /// GET hit: the entry's data was written to `output`
    Retrieved { output: String, refetched: bool },
    /// GET miss: nothing cached under that name
    NotCached,
    /// Line did not parse; the cache is untouched
    Skipped { reason: String },
}

// == Interpreter ==
/// Owns the cache for a run and executes commands against it one at a time.
#[derive(Debug)]
pub struct Interpreter<F, C, P = TwoTierPolicy> {
    store: CacheStore,
    fs: F,
    clock: C,
    policy: P,
    stats: CacheStats,
}

impl<F: FileSystem, C: Clock> Interpreter<F, C, TwoTierPolicy> {
    /// Creates an interpreter using the default two-tier eviction policy.
    pub fn new(store: CacheStore, fs: F, clock: C) -> Self {
        Self::with_policy(store, fs, clock, TwoTierPolicy)
    }
}

impl<F: FileSystem, C: Clock, P: EvictionPolicy> Interpreter<F, C, P> {
    pub fn with_policy(store: CacheStore, fs: F, clock: C, policy: P) -> Self {
        Self {
            store,
            fs,
            clock,
            policy,
            stats: CacheStats::new(),
        }
    }

    // == Execute Line ==
    /// Parses and executes one command line.
    ///
    /// Malformed lines are reported as `Outcome::Skipped` and leave the cache
    /// unchanged.
    pub fn execute_line(&mut self, line: &str) -> Result<Outcome> {
        match Directive::parse(line) {
            Ok(directive) => self.execute(&directive),
            Err(err) => {
                warn!("Skipping command: {}", err);
                self.stats.skipped += 1;
                Ok(Outcome::Skipped {
                    reason: err.to_string(),
                })
            }
        }
    }

    // == Execute ==
    /// Executes a parsed directive.
    ///
    /// # Errors
    /// - `SourceUnreadable` if a PUT or expired GET cannot read its file
    /// - `WriteFailed` / `ShortWrite` if the GET output cannot be written
    pub fn execute(&mut self, directive: &Directive) -> Result<Outcome> {
        debug!("Executing {}", directive);
        let now = self.clock.now();

        let result = match directive {
            Directive::Put { name, max_age } => self.put(name, *max_age, now),
            Directive::Get { name } => self.get(name, now),
        };

        if result.is_err() {
            self.stats.failed += 1;
        }
        result
    }

    // == PUT ==
    fn put(&mut self, name: &str, max_age: i64, now: DateTime<Utc>) -> Result<Outcome> {
        self.stats.puts += 1;

        if let Some(entry) = self.store.get_mut(name) {
            let previous = entry.max_age;
            entry.max_age = max_age;
            self.stats.max_age_updates += 1;
            debug!("Updated max-age of '{}': {} -> {}", name, previous, max_age);
            return Ok(Outcome::MaxAgeUpdated { previous });
        }

        let evicted = if self.store.is_full() {
            self.evict_one(now)
        } else {
            None
        };

        self.store.insert(&self.fs, name, max_age, now)?;
        self.stats.inserts += 1;
        debug!("Cached '{}' with max-age {}s", name, max_age);

        Ok(Outcome::Inserted { evicted })
    }

    // == GET ==
    fn get(&mut self, name: &str, now: DateTime<Utc>) -> Result<Outcome> {
        self.stats.gets += 1;

        let Some(entry) = self.store.get(name) else {
            self.stats.misses += 1;
            debug!("'{}' is not cached", name);
            return Ok(Outcome::NotCached);
        };
        self.stats.hits += 1;

        let refetched = entry.is_expired_at(now);
        let data = if refetched {
            let max_age = entry.max_age;
            debug!("'{}' expired, re-reading source", name);
            self.store.remove(name);
            self.stats.refetches += 1;
            self.store.insert(&self.fs, name, max_age, now)?.data.clone()
        } else {
            let mut refreshed: CacheEntry = entry.clone();
            refreshed.mark_retrieved(now);
            let data = refreshed.data.clone();
            self.store.update_in_place(name, refreshed);
            data
        };

        let output = output_name(name);
        let written = self
            .fs
            .write_all(&output, &data)
            .map_err(|source| CacheError::WriteFailed {
                name: output.clone(),
                source,
            })?;
        if written < data.len() {
            return Err(CacheError::ShortWrite {
                name: output,
                written,
                expected: data.len(),
            });
        }

        debug!("Wrote {} bytes of '{}' to '{}'", written, name, output);
        Ok(Outcome::Retrieved { output, refetched })
    }

    // == Evict One ==
    /// Removes the policy's victim from the store and deletes its file.
    fn evict_one(&mut self, now: DateTime<Utc>) -> Option<Victim> {
        let victim = self.policy.select_victim(&self.store, now)?;

        self.store.remove(&victim.name);
        self.fs.delete(&victim.name);
        self.stats
            .record_eviction(victim.reason == EvictionReason::Expired);
        debug!("Evicted '{}' ({})", victim.name, victim.reason);

        Some(victim)
    }

    // == Accessors ==
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Ends the run, releasing every cached entry.
    pub fn into_stats(self) -> CacheStats {
        self.stats
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::files::MemoryFs;
    use bytes::Bytes;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn sources(names: &[&str]) -> MemoryFs {
        let fs = MemoryFs::new();
        for name in names {
            fs.insert(*name, format!("contents of {name}"));
        }
        fs
    }

    fn interpreter<'a>(
        capacity: usize,
        fs: &'a MemoryFs,
        clock: &'a ManualClock,
    ) -> Interpreter<&'a MemoryFs, &'a ManualClock> {
        Interpreter::new(CacheStore::new(capacity).unwrap(), fs, clock)
    }

    #[test]
    fn test_put_miss_inserts() {
        let fs = sources(&["f.txt"]);
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(2, &fs, &clock);

        let outcome = interp.execute_line("PUT: f.txt\\MAX-AGE: 10").unwrap();
        assert_eq!(outcome, Outcome::Inserted { evicted: None });

        let entry = interp.store().get("f.txt").unwrap();
        assert_eq!(entry.expiration, at(10));
        assert!(entry.is_cold());
        assert_eq!(interp.stats().inserts, 1);
    }

    #[test]
    fn test_put_hit_updates_only_max_age() {
        let fs = sources(&["f.txt"]);
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(2, &fs, &clock);

        interp.execute_line("PUT: f.txt\\MAX-AGE: 10").unwrap();
        clock.advance(3);
        interp.execute_line("GET: f.txt").unwrap();
        let before = interp.store().get("f.txt").unwrap().clone();

        clock.advance(2);
        fs.insert("f.txt", "changed on disk");
        let outcome = interp.execute_line("PUT: f.txt\\MAX-AGE: 99").unwrap();
        assert_eq!(outcome, Outcome::MaxAgeUpdated { previous: 10 });

        let after = interp.store().get("f.txt").unwrap();
        assert_eq!(after.max_age, 99);
        assert_eq!(after.data, before.data);
        assert_eq!(after.expiration, before.expiration);
        assert_eq!(after.last_retrieved, before.last_retrieved);
        assert_eq!(interp.store().len(), 1);
    }

    #[test]
    fn test_put_at_capacity_evicts_exactly_one() {
        let fs = sources(&["a", "b", "c"]);
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(2, &fs, &clock);

        interp.execute_line("PUT: a\\MAX-AGE: 100").unwrap();
        clock.advance(1);
        interp.execute_line("PUT: b\\MAX-AGE: 100").unwrap();
        clock.advance(1);

        let outcome = interp.execute_line("PUT: c\\MAX-AGE: 100").unwrap();
        let Outcome::Inserted { evicted: Some(victim) } = outcome else {
            panic!("expected an eviction, got {outcome:?}");
        };
        assert_eq!(victim.name, "a");
        assert_eq!(victim.reason, EvictionReason::OldestCold);

        assert_eq!(interp.store().len(), 2);
        assert!(!interp.store().contains("a"));
        assert!(!fs.exists("a"), "evicted file should be deleted");
        assert_eq!(interp.stats().evictions, 1);
    }

    #[test]
    fn test_eviction_prefers_expired_entry() {
        let fs = sources(&["a", "b", "c"]);
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(2, &fs, &clock);

        interp.execute_line("PUT: a\\MAX-AGE: 100").unwrap();
        interp.execute_line("PUT: b\\MAX-AGE: 1").unwrap();
        clock.advance(2);

        let outcome = interp.execute_line("PUT: c\\MAX-AGE: 100").unwrap();
        let Outcome::Inserted { evicted: Some(victim) } = outcome else {
            panic!("expected an eviction, got {outcome:?}");
        };
        assert_eq!(victim.name, "b");
        assert_eq!(victim.reason, EvictionReason::Expired);
        assert_eq!(interp.stats().expired_evictions, 1);
    }

    #[test]
    fn test_get_slides_expiration() {
        let fs = sources(&["f.txt"]);
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(2, &fs, &clock);

        interp.execute_line("PUT: f.txt\\MAX-AGE: 10").unwrap();
        clock.advance(5);
        let outcome = interp.execute_line("GET: f.txt").unwrap();

        assert_eq!(
            outcome,
            Outcome::Retrieved {
                output: "f_output.txt".to_string(),
                refetched: false
            }
        );
        let entry = interp.store().get("f.txt").unwrap();
        assert_eq!(entry.expiration, at(15));
        assert_eq!(entry.last_retrieved, Some(at(5)));
        assert_eq!(fs.contents("f_output.txt"), Some(Bytes::from("contents of f.txt")));
    }

    #[test]
    fn test_get_expired_refetches() {
        let fs = sources(&["f.txt"]);
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(2, &fs, &clock);

        interp.execute_line("PUT: f.txt\\MAX-AGE: 1").unwrap();
        fs.insert("f.txt", "fresh contents");
        clock.advance(2);

        let outcome = interp.execute_line("GET: f.txt").unwrap();
        assert_eq!(
            outcome,
            Outcome::Retrieved {
                output: "f_output.txt".to_string(),
                refetched: true
            }
        );

        let entry = interp.store().get("f.txt").unwrap();
        assert!(entry.is_cold());
        assert_eq!(entry.expiration, at(3));
        assert_eq!(entry.data, Bytes::from("fresh contents"));
        assert_eq!(fs.contents("f_output.txt"), Some(Bytes::from("fresh contents")));
        assert_eq!(interp.stats().refetches, 1);
    }

    #[test]
    fn test_refetch_moves_entry_to_newest() {
        let fs = sources(&["a", "b"]);
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(2, &fs, &clock);

        interp.execute_line("PUT: a\\MAX-AGE: 1").unwrap();
        interp.execute_line("PUT: b\\MAX-AGE: 100").unwrap();
        clock.advance(2);
        interp.execute_line("GET: a").unwrap();

        let names: Vec<&str> = interp.store().names().collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_get_miss_is_noop() {
        let fs = sources(&[]);
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(2, &fs, &clock);

        assert_eq!(interp.execute_line("GET: nothing").unwrap(), Outcome::NotCached);
        assert!(fs.names().is_empty());
        assert_eq!(interp.stats().misses, 1);
    }

    #[test]
    fn test_malformed_line_is_skipped() {
        let fs = sources(&["f.txt"]);
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(2, &fs, &clock);
        interp.execute_line("PUT: f.txt\\MAX-AGE: 10").unwrap();
        let before = interp.store().get("f.txt").unwrap().clone();

        let outcome = interp.execute_line("PUT: f.txt\\MAX-AGE: soon").unwrap();
        assert!(matches!(outcome, Outcome::Skipped { .. }));
        assert_eq!(interp.store().len(), 1);
        assert_eq!(interp.store().get("f.txt").unwrap(), &before);
        assert_eq!(interp.stats().skipped, 1);
    }

    #[test]
    fn test_put_unreadable_source_fails() {
        let fs = sources(&[]);
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(2, &fs, &clock);

        let result = interp.execute_line("PUT: missing\\MAX-AGE: 5");
        assert!(matches!(result, Err(CacheError::SourceUnreadable { .. })));
        assert!(interp.store().is_empty());
        assert_eq!(interp.stats().failed, 1);
    }

    #[test]
    fn test_get_short_write_is_reported() {
        let fs = MemoryFs::with_write_limit(4);
        fs.insert("f.txt", "more than four bytes");
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(1, &fs, &clock);

        interp.execute_line("PUT: f.txt\\MAX-AGE: 10").unwrap();
        let result = interp.execute_line("GET: f.txt");
        assert!(matches!(
            result,
            Err(CacheError::ShortWrite {
                written: 4,
                expected: 20,
                ..
            })
        ));
    }

    #[test]
    fn test_capacity_one_replaces_lone_entry() {
        let fs = sources(&["a", "b"]);
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(1, &fs, &clock);

        interp.execute_line("PUT: a\\MAX-AGE: 100").unwrap();
        interp.execute_line("PUT: b\\MAX-AGE: 100").unwrap();

        let names: Vec<&str> = interp.store().names().collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_expired_get_with_missing_source_drops_entry() {
        let fs = sources(&["f.txt", "g.txt"]);
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(2, &fs, &clock);

        interp.execute_line("PUT: f.txt\\MAX-AGE: 1").unwrap();
        interp.execute_line("PUT: g.txt\\MAX-AGE: 100").unwrap();
        fs.delete("f.txt");
        clock.advance(2);

        let result = interp.execute_line("GET: f.txt");
        assert!(matches!(
            result,
            Err(CacheError::SourceUnreadable { ref name, .. }) if name == "f.txt"
        ));

        let names: Vec<&str> = interp.store().names().collect();
        assert_eq!(names, vec!["g.txt"]);
        assert!(!fs.exists("f_output.txt"), "no output for a failed re-fetch");

        let stats = interp.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.refetches, 1);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn test_failed_insert_after_eviction_keeps_eviction() {
        let fs = sources(&["a", "b"]);
        let clock = ManualClock::at_epoch();
        let mut interp = interpreter(2, &fs, &clock);

        interp.execute_line("PUT: a\\MAX-AGE: 100").unwrap();
        clock.advance(1);
        interp.execute_line("PUT: b\\MAX-AGE: 100").unwrap();

        let result = interp.execute_line("PUT: missing\\MAX-AGE: 100");
        assert!(matches!(result, Err(CacheError::SourceUnreadable { .. })));

        // The oldest cold entry was evicted before the read failed
        let names: Vec<&str> = interp.store().names().collect();
        assert_eq!(names, vec!["b"]);
        assert!(!fs.exists("a"), "victim's file should be deleted");
        assert!(fs.exists("b"));

        let stats = interp.stats();
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.inserts, 2);
        assert_eq!(stats.failed, 1);
    }
}
