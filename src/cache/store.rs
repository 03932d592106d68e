//! Cache Store Module
//!
//! Capacity-bounded, insertion-ordered collection of cached files.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};
use crate::files::FileSystem;

// == Cache Store ==
/// Ordered store of named file entries.
///
/// Iteration order is insertion order (oldest first) and is never changed
/// by retrievals; this is the FIFO basis for eviction tie-breaks.
#[derive(Debug)]
pub struct CacheStore {
    /// Name-indexed entries in insertion order
    entries: IndexMap<String, CacheEntry>,
    /// Maximum number of entries allowed
    capacity: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store that holds at most `capacity` entries.
    ///
    /// # Errors
    /// `InvalidCapacity` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(CacheError::InvalidCapacity(0));
        }

        Ok(Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
        })
    }

    // == Insert ==
    /// Reads `name` from the source and appends it as the newest entry.
    ///
    /// The new entry expires `max_age` seconds after `now` and starts out
    /// never retrieved. Callers must check that `name` is absent first.
    ///
    /// # Errors
    /// - `SourceUnreadable` if the file cannot be read
    /// - `CacheFull` if the store is already at capacity
    pub fn insert<F: FileSystem>(
        &mut self,
        fs: &F,
        name: &str,
        max_age: i64,
        now: DateTime<Utc>,
    ) -> Result<&CacheEntry> {
        debug_assert!(!self.contains(name), "duplicate insert of '{}'", name);

        if self.is_full() {
            return Err(CacheError::CacheFull(self.capacity));
        }

        let data = fs
            .read_all(name)
            .map_err(|source| CacheError::SourceUnreadable {
                name: name.to_string(),
                source,
            })?;

        let entry = CacheEntry::new(name, data, max_age, now);
        let (index, _) = self.entries.insert_full(name.to_string(), entry);
        Ok(&self.entries[index])
    }

    // == Lookup ==
    /// Returns the entry named `name` and its position in insertion order.
    pub fn lookup(&self, name: &str) -> Option<(usize, &CacheEntry)> {
        self.entries
            .get_full(name)
            .map(|(index, _, entry)| (index, entry))
    }

    pub fn get(&self, name: &str) -> Option<&CacheEntry> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CacheEntry> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    // == Update In Place ==
    /// Replaces the stored fields of `name` with `entry`, keeping its position.
    ///
    /// No-op if `name` is not cached.
    pub fn update_in_place(&mut self, name: &str, mut entry: CacheEntry) {
        if let Some(slot) = self.entries.get_mut(name) {
            entry.name = name.to_string();
            *slot = entry;
        }
    }

    // == Remove ==
    /// Removes the entry named `name`, preserving the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<CacheEntry> {
        self.entries.shift_remove(name)
    }

    // == Iteration ==
    /// Iterates entries oldest-inserted first.
    pub fn iter(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }
}

// Slot listing, one line per capacity slot.
impl fmt::Display for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (slot, entry) in self.entries.values().enumerate() {
            write!(
                f,
                "\t{}: FILE {}: length {}, max_age {}, ",
                slot + 1,
                entry.name,
                entry.len(),
                entry.max_age
            )?;
            match entry.last_retrieved {
                Some(at) => writeln!(f, "retrieved at {}", at.format("%H:%M:%S%.3f"))?,
                None => writeln!(f, "never retrieved")?,
            }
        }
        for slot in self.entries.len()..self.capacity {
            writeln!(f, "\t{}: NO FILE", slot + 1)?;
        }
        Ok(())
    }
}
