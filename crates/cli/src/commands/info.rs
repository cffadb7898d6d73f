//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{BackoffConfig, ForwarderConfig};
use dispatcher::buffer_size_for;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;
use crate::error::CliError;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    dispatcher: DispatcherInfo,
    worker: WorkerInfo,
    backend: BackendInfo,
    dialect: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    workers: Vec<WorkerSlot>,
}

#[derive(Serialize)]
struct DispatcherInfo {
    max_workers: usize,
    queue_capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    auto_flush_interval_secs: Option<u64>,
}

#[derive(Serialize)]
struct WorkerInfo {
    retry_attempt: u32,
    max_attempts: u32,
    buffer_size: usize,
    spread_buffer: bool,
    backoff: BackoffConfig,
}

#[derive(Serialize)]
struct BackendInfo {
    kind: String,
    buffered: bool,
    #[serde(skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    params: std::collections::BTreeMap<String, String>,
}

#[derive(Serialize)]
struct WorkerSlot {
    id: usize,
    buffer_size: usize,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        return Err(CliError::config_not_found(args.config.display().to_string()).into());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    let info = build_config_info(&config, args.workers);
    if args.json {
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&info);
    }

    Ok(())
}

fn build_config_info(config: &ForwarderConfig, with_workers: bool) -> ConfigInfo {
    let max_workers = config.dispatcher.max_workers;
    let workers = if with_workers {
        (0..max_workers)
            .map(|id| WorkerSlot {
                id,
                buffer_size: buffer_size_for(id, max_workers, &config.worker),
            })
            .collect()
    } else {
        Vec::new()
    };

    ConfigInfo {
        dispatcher: DispatcherInfo {
            max_workers,
            queue_capacity: config.dispatcher.queue_capacity,
            auto_flush_interval_secs: config
                .dispatcher
                .auto_flush_interval()
                .map(|d| d.as_secs()),
        },
        worker: WorkerInfo {
            retry_attempt: config.worker.retry_attempt,
            max_attempts: config.worker.retry_attempt.saturating_add(1),
            buffer_size: config.worker.buffer_size,
            spread_buffer: config.worker.spread_buffer,
            backoff: config.worker.backoff,
        },
        backend: BackendInfo {
            kind: format!("{:?}", config.backend.kind),
            buffered: config.backend.buffered,
            params: config.backend.params.clone().into_iter().collect(),
        },
        dialect: format!("{:?}", config.dialect),
        workers,
    }
}

fn print_config_info(info: &ConfigInfo) {
    println!("=== Forwarder Configuration ===\n");

    println!("Dispatcher");
    println!("   ├─ Workers: {}", info.dispatcher.max_workers);
    println!("   ├─ Queue capacity: {}", info.dispatcher.queue_capacity);
    match info.dispatcher.auto_flush_interval_secs {
        Some(secs) => println!("   └─ Automatic flush: every {}s", secs),
        None => println!("   └─ Automatic flush: disabled"),
    }

    println!("\nWorker");
    println!(
        "   ├─ Attempts: {} ({} retries)",
        info.worker.max_attempts, info.worker.retry_attempt
    );
    println!("   ├─ Backoff: {:?}", info.worker.backoff);
    println!("   ├─ Buffer size: {}", info.worker.buffer_size);
    println!("   └─ Spread buffer: {}", info.worker.spread_buffer);

    println!("\nBackend");
    println!("   ├─ Kind: {}", info.backend.kind);
    println!("   ├─ Dialect: {}", info.dialect);
    if info.backend.params.is_empty() {
        println!("   └─ Buffered: {}", info.backend.buffered);
    } else {
        println!("   ├─ Buffered: {}", info.backend.buffered);
        println!("   └─ Params:");
        for (key, value) in &info.backend.params {
            println!("        {} = {}", key, value);
        }
    }

    if !info.workers.is_empty() {
        println!("\nWorker buffers ({})", info.workers.len());
        for (i, slot) in info.workers.iter().enumerate() {
            let prefix = if i == info.workers.len() - 1 { "└─" } else { "├─" };
            println!("   {} worker {}: {}", prefix, slot.id, slot.buffer_size);
        }
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_lists_spread_capacities() {
        let config = config_loader::ConfigLoader::load_from_str(
            r#"
[dispatcher]
max_workers = 3

[worker]
buffer_size = 10000
spread_buffer = true

[backend]
kind = "log"
buffered = true
"#,
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();

        let info = build_config_info(&config, true);
        let sizes: Vec<_> = info.workers.iter().map(|w| w.buffer_size).collect();
        assert_eq!(sizes, vec![7500, 10000, 12500]);
        assert_eq!(info.worker.max_attempts, 1);
        assert!(info.dispatcher.auto_flush_interval_secs.is_none());
    }

    #[test]
    fn test_info_without_workers_flag() {
        let config = config_loader::ConfigLoader::load_from_str(
            "[backend]\nkind = \"log\"\n",
            config_loader::ConfigFormat::Toml,
        )
        .unwrap();
        assert!(build_config_info(&config, false).workers.is_empty());
    }
}
