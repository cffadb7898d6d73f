//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Forwarder - replay analytics events through a pool of delivery workers
#[derive(Parser, Debug)]
#[command(
    name = "forwarder",
    author,
    version,
    about = "Event forwarder worker pool",
    long_about = "Distributes analytics events across a pool of workers and delivers them \n\
                  to a storage backend, either one by one or in flushed batches."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "FORWARDER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "FORWARDER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay newline-delimited JSON events into the worker pool
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "forwarder.toml",
        env = "FORWARDER_CONFIG"
    )]
    pub config: PathBuf,

    /// NDJSON event file to replay (stdin when omitted)
    #[arg(short, long, env = "FORWARDER_INPUT")]
    pub input: Option<PathBuf>,

    /// Override the number of workers from configuration
    #[arg(long, env = "FORWARDER_WORKERS")]
    pub workers: Option<usize>,

    /// Override the automatic flush interval in seconds (0 = disabled)
    #[arg(long, env = "FORWARDER_FLUSH_INTERVAL")]
    pub flush_interval: Option<u64>,

    /// Action tag attached to every replayed job
    #[arg(long, default_value = "1")]
    pub action: u32,

    /// Validate configuration and exit without starting workers
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "FORWARDER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "forwarder.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "forwarder.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show per-worker buffer capacities
    #[arg(long)]
    pub workers: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
