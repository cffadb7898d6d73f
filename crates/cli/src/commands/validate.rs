//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{BackendKind, ForwarderConfig};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    max_workers: usize,
    queue_capacity: usize,
    backend: String,
    buffered: bool,
    dialect: String,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    max_workers: config.dispatcher.max_workers,
                    queue_capacity: config.dispatcher.queue_capacity,
                    backend: format!("{:?}", config.backend.kind),
                    buffered: config.backend.buffered,
                    dialect: format!("{:?}", config.dialect),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &ForwarderConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.worker.retry_attempt == 0 {
        warnings.push("worker.retry_attempt is 0 - failed deliveries are dropped at once".to_string());
    }

    if config.backend.buffered {
        if config.dispatcher.auto_flush_interval().is_none() {
            warnings.push(
                "Buffered backend without dispatcher.auto_flush_interval - partial buffers are only delivered on manual flush"
                    .to_string(),
            );
        }
        if config.worker.spread_buffer
            && config.worker.buffer_size <= config.dispatcher.max_workers
        {
            warnings.push(format!(
                "worker.buffer_size {} is too small to spread over {} workers - all workers share it",
                config.worker.buffer_size, config.dispatcher.max_workers
            ));
        }
    } else if config.worker.spread_buffer || config.dispatcher.auto_flush_interval().is_some() {
        warnings.push(
            "Buffer settings have no effect on a pass-through backend".to_string(),
        );
    }

    if config.backend.kind == BackendKind::Memory {
        warnings.push("Memory backend keeps deliveries in process only".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Workers: {}", summary.max_workers);
            println!("  Queue capacity: {}", summary.queue_capacity);
            println!("  Backend: {} (buffered: {})", summary.backend, summary.buffered);
            println!("  Dialect: {}", summary.dialect);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
