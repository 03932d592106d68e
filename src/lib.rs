//! File Cache Sim - A bounded, disk-backed file cache simulator
//!
//! Runs a stream of PUT/GET commands against a fixed-capacity cache with TTL
//! expiration and expired-first, LRU-or-FIFO eviction.

pub mod cache;
pub mod command;
pub mod config;
pub mod error;
pub mod files;
pub mod sim;

pub use cache::{CacheStore, Clock, ManualClock, SystemClock};
pub use command::{Directive, Interpreter, Outcome};
pub use config::Config;
pub use error::{CacheError, Result};
pub use files::{DiskFs, FileSystem, MemoryFs};
pub use sim::{run, RunSummary, Simulation};
