//! Simulation Driver
//!
//! Feeds a command file through the interpreter, line by line, and reports
//! what happened.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, CacheStore, Clock, SystemClock};
use crate::command::Interpreter;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::files::{DiskFs, FileSystem};

// == Run Summary ==
/// Final report of a simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Non-blank lines processed
    pub commands: u64,
    /// Entries cached when the run ended
    pub final_size: usize,
    pub capacity: usize,
    /// GET hits over all GETs, 0.0 when no GET ran
    pub hit_rate: f64,
    pub stats: CacheStats,
}

// == Simulation ==
/// A single simulation run over one cache.
pub struct Simulation<F, C> {
    interpreter: Interpreter<F, C>,
    commands: u64,
    dump_cache: bool,
}

impl<F: FileSystem, C: Clock> Simulation<F, C> {
    /// Creates a run with a fresh cache of `capacity` slots.
    ///
    /// # Errors
    /// `InvalidCapacity` if `capacity` is zero.
    pub fn new(capacity: usize, fs: F, clock: C) -> Result<Self> {
        let store = CacheStore::new(capacity)?;
        Ok(Self {
            interpreter: Interpreter::new(store, fs, clock),
            commands: 0,
            dump_cache: false,
        })
    }

    /// Logs the cache listing after every command.
    pub fn with_dump(mut self, dump_cache: bool) -> Self {
        self.dump_cache = dump_cache;
        self
    }

    // == Run Script ==
    /// Executes every line of `script` in order.
    ///
    /// Blank lines are ignored. A failing command is logged and counted;
    /// the run carries on with the next line.
    pub fn run_script(&mut self, script: &str) {
        for line in script.lines().filter(|line| !line.trim().is_empty()) {
            self.commands += 1;
            match self.interpreter.execute_line(line) {
                Ok(outcome) => debug!("{:?}", outcome),
                Err(err) => warn!("Command {:?} failed: {}", line, err),
            }
            if self.dump_cache {
                info!("Cache after {:?}:\n{}", line, self.interpreter.store());
            }
        }
    }

    // == Run File ==
    /// Reads the command file at `path` and executes it.
    ///
    /// # Errors
    /// `CommandFile` if the file cannot be read; no command runs in that case.
    pub fn run_file(&mut self, path: &Path) -> Result<()> {
        let raw = fs::read(path).map_err(|source| CacheError::CommandFile {
            path: path.to_path_buf(),
            source,
        })?;
        let script = match String::from_utf8(raw) {
            Ok(script) => script,
            Err(err) => {
                warn!(
                    "Command file '{}' is not valid UTF-8; invalid bytes replaced",
                    path.display()
                );
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };
        self.run_script(&script);
        Ok(())
    }

    pub fn interpreter(&self) -> &Interpreter<F, C> {
        &self.interpreter
    }

    // == Finish ==
    /// Ends the run, dropping the cache and returning the summary.
    pub fn finish(self) -> RunSummary {
        let final_size = self.interpreter.store().len();
        let capacity = self.interpreter.store().capacity();
        let stats = self.interpreter.into_stats();
        RunSummary {
            commands: self.commands,
            final_size,
            capacity,
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

// == Run ==
/// Runs `command_file` against files under `config.root_dir` in real time.
///
/// # Errors
/// - `InvalidCapacity` if the configured capacity is not positive
/// - `CommandFile` if the command file cannot be read
pub fn run(config: &Config, command_file: &Path) -> Result<RunSummary> {
    let capacity = config.validated_capacity()?;
    let fs = DiskFs::new(config.root_dir.clone());

    info!(
        "Running '{}' with capacity {} in '{}'",
        command_file.display(),
        capacity,
        fs.root().display()
    );

    let mut simulation = Simulation::new(capacity, fs, SystemClock)?.with_dump(config.dump_cache);
    simulation.run_file(command_file)?;
    let summary = simulation.finish();

    info!(
        "Processed {} commands: {} hits, {} misses ({:.1}% hit rate), {} evictions, {} skipped, {} failed",
        summary.commands,
        summary.stats.hits,
        summary.stats.misses,
        summary.hit_rate * 100.0,
        summary.stats.evictions,
        summary.stats.skipped,
        summary.stats.failed
    );
    Ok(summary)
}
