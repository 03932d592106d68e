//! Error types for the cache simulator
//!
//! Provides unified error handling using thiserror.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache simulator.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache was configured with a capacity that cannot hold an entry
    #[error("Invalid capacity: {0} (a cache must hold at least one entry)")]
    InvalidCapacity(i64),

    /// Insert attempted on a store that is already at capacity
    #[error("Cache full: {0} entries")]
    CacheFull(usize),

    /// Command line did not match the directive grammar
    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    /// Source file could not be read into a buffer
    #[error("Cannot read source '{name}': {source}")]
    SourceUnreadable {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Output file could not be created or written
    #[error("Cannot write output '{name}': {source}")]
    WriteFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    /// Output write accepted fewer bytes than requested
    #[error("Short write to '{name}': {written} of {expected} bytes")]
    ShortWrite {
        name: String,
        written: usize,
        expected: usize,
    },

    /// Command file itself could not be opened
    #[error("Cannot open command file '{}': {source}", path.display())]
    CommandFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// == Result Type Alias ==
/// Convenience Result type for the cache simulator.
pub type Result<T> = std::result::Result<T, CacheError>;
