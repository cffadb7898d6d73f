//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::ForwarderConfig;
use tracing::info;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::replay::{Replay, ReplayConfig};

/// Execute the `run` command
pub async fn run_forwarder(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(workers) = args.workers {
        info!(workers, "Overriding worker count from CLI");
        config.dispatcher.max_workers = workers;
    }
    if let Some(interval) = args.flush_interval {
        info!(interval, "Overriding automatic flush interval from CLI");
        config.dispatcher.auto_flush_interval = interval;
    }
    config_loader::ConfigLoader::validate(&config).context("Invalid CLI overrides")?;

    info!(
        workers = config.dispatcher.max_workers,
        backend = ?config.backend.kind,
        buffered = config.backend.buffered,
        dialect = ?config.dialect,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let replay = Replay::new(ReplayConfig {
        forwarder: config,
        input: args.input.clone(),
        action: args.action,
    });

    info!("Starting replay...");
    let stats = replay.run().await.context("Replay failed")?;

    info!(
        jobs_submitted = stats.jobs_submitted,
        delivered = stats.workers.delivered_count,
        duration_secs = stats.duration.as_secs_f64(),
        throughput = format!("{:.2}", stats.throughput()),
        "Forwarder finished"
    );
    stats.print_summary();

    Ok(())
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &ForwarderConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Dispatcher:");
    println!("  Workers: {}", config.dispatcher.max_workers);
    println!("  Queue capacity: {}", config.dispatcher.queue_capacity);
    match config.dispatcher.auto_flush_interval() {
        Some(interval) => println!("  Automatic flush: every {}s", interval.as_secs()),
        None => println!("  Automatic flush: disabled"),
    }
    println!("\nWorker:");
    println!("  Retry attempts: {}", config.worker.retry_attempt);
    println!("  Buffer size: {}", config.worker.buffer_size);
    println!("  Spread buffer: {}", config.worker.spread_buffer);
    println!("\nBackend: {:?} (buffered: {})", config.backend.kind, config.backend.buffered);
    println!("Dialect: {:?}", config.dialect);
    println!();
}
