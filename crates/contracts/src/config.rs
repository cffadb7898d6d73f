//! ForwarderConfig - config_loader output
//!
//! Top-level process configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::WorkerOptions;

/// Forwarder configuration root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwarderConfig {
    /// Pool and queue settings
    #[serde(default)]
    pub dispatcher: DispatcherSection,

    /// Per-worker delivery options
    #[serde(default)]
    pub worker: WorkerOptions,

    /// Wire format of delivered payloads
    #[serde(default)]
    pub dialect: DialectKind,

    /// Storage backend
    pub backend: BackendConfig,
}

/// Pool sizing and flush timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatcherSection {
    /// Number of workers
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Job queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Automatic flush interval in seconds (0 = disabled)
    #[serde(default)]
    pub auto_flush_interval: u64,
}

fn default_max_workers() -> usize {
    4
}

fn default_queue_capacity() -> usize {
    1000
}

impl Default for DispatcherSection {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            queue_capacity: default_queue_capacity(),
            auto_flush_interval: 0,
        }
    }
}

impl DispatcherSection {
    /// Automatic flush interval, `None` when disabled
    pub fn auto_flush_interval(&self) -> Option<Duration> {
        (self.auto_flush_interval > 0).then(|| Duration::from_secs(self.auto_flush_interval))
    }
}

/// Encoder dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialectKind {
    /// Newline-delimited JSON objects
    #[default]
    Json,
    /// Comma separated rows
    Csv,
}

/// Storage backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend type
    pub kind: BackendKind,

    /// Buffer payloads locally and deliver them as batches
    #[serde(default)]
    pub buffered: bool,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Log output
    Log,
    /// Files in a local directory
    File,
    /// In-process recorder
    Memory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let config: ForwarderConfig = toml::from_str(
            r#"
[backend]
kind = "log"
"#,
        )
        .unwrap();
        assert_eq!(config.dispatcher, DispatcherSection::default());
        assert_eq!(config.dialect, DialectKind::Json);
        assert!(!config.backend.buffered);
        assert_eq!(config.dispatcher.auto_flush_interval(), None);
    }

    #[test]
    fn test_auto_flush_interval() {
        let section = DispatcherSection {
            auto_flush_interval: 60,
            ..Default::default()
        };
        assert_eq!(
            section.auto_flush_interval(),
            Some(Duration::from_secs(60))
        );
    }
}
