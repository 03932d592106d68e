//! File Cache Sim - command-line driver
//!
//! Runs a command file against a disk-backed cache of the configured size.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use file_cache_sim::Config;

/// Simulate a bounded file cache driven by a PUT/GET command file.
#[derive(Parser, Debug)]
#[command(name = "file_cache_sim")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File of PUT/GET commands, one per line.
    command_file: PathBuf,

    /// Number of cache slots (overrides CACHE_CAPACITY).
    #[arg(short, long, allow_negative_numbers = true)]
    capacity: Option<i64>,

    /// Directory that cached file names are relative to (overrides CACHE_ROOT).
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Log the cache contents after every command.
    #[arg(long)]
    dump_cache: bool,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn into_config(self, mut config: Config) -> (Config, PathBuf, bool) {
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(root) = self.root {
            config.root_dir = root;
        }
        config.dump_cache |= self.dump_cache;
        (config, self.command_file, self.json)
    }
}

fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "file_cache_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (config, command_file, json) = Args::parse().into_config(Config::from_env());
    info!(
        "Configuration loaded: capacity={}, root={}, dump_cache={}",
        config.capacity,
        config.root_dir.display(),
        config.dump_cache
    );

    let summary = file_cache_sim::run(&config, &command_file)
        .with_context(|| format!("simulation over '{}' aborted", command_file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    info!("Simulation complete");
    Ok(())
}
