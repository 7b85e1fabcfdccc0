use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::constants::DEFAULT_PORT;

/// How accepted connections are handed to handling tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DispatchMode {
    /// One task per connection.
    Spawn,
    /// Fixed worker pool fed from an unbounded queue.
    Pool,
}

/// Fuel telemetry server configuration
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to listen on for telemetry producers.
    #[arg(long, value_name = "ADDR", default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))]
    pub listen: SocketAddr,

    /// Directory for the per-aircraft flight history files.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub history_dir: PathBuf,

    /// Connection dispatch strategy.
    #[arg(long, value_enum, default_value_t = DispatchMode::Spawn)]
    pub dispatch: DispatchMode,

    /// Number of workers for `--dispatch pool`.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: u16,

    /// Directory for the periodic aircraft.json snapshot (disabled if unset).
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Status logging interval in seconds, <= 0 to disable
    #[arg(long, default_value_t = 60, allow_negative_numbers = true)]
    pub status_interval: i32,

    /// Verbose logging (DEBUG level)
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}
