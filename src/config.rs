//! Configuration Module
//!
//! Handles loading simulation settings from environment variables.

use std::env;
use std::path::PathBuf;

use crate::error::{CacheError, Result};

/// Default number of cache slots.
pub const DEFAULT_CAPACITY: i64 = 8;

/// Simulation configuration parameters.
///
/// All values can be configured via environment variables with sensible
/// defaults; the binary lets command-line flags override them.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold (validated before use)
    pub capacity: i64,
    /// Directory that file names in the command stream are relative to
    pub root_dir: PathBuf,
    /// Log a listing of the cache after every command
    pub dump_cache: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Number of cache slots (default: 8)
    /// - `CACHE_ROOT` - Directory for source and output files (default: `.`)
    /// - `CACHE_DUMP` - Dump the cache after each command (default: false).
    ///   Accepts `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off`, any case;
    ///   anything else leaves it off.
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
            root_dir: env::var("CACHE_ROOT")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            dump_cache: env::var("CACHE_DUMP")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(false),
        }
    }

    // == Validated Capacity ==
    /// Returns the capacity as a slot count.
    ///
    /// # Errors
    /// `InvalidCapacity` for any capacity of zero or less.
    pub fn validated_capacity(&self) -> Result<usize> {
        usize::try_from(self.capacity)
            .ok()
            .filter(|&capacity| capacity > 0)
            .ok_or(CacheError::InvalidCapacity(self.capacity))
    }
}

/// Parses a boolean environment flag.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            root_dir: PathBuf::from("."),
            dump_cache: false,
        }
    }
}
