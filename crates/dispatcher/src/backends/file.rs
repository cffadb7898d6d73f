//! FileTransport - writes every delivery to a new file
//!
//! File names follow `<prefix>-<utc timestamp>-<seq>.<extension>`, one
//! payload per line, so a flushed batch lands in a single file.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use contracts::{ContractError, Payload, Transport};
use tracing::{debug, error, instrument};

/// Configuration for FileTransport
#[derive(Debug, Clone)]
pub struct FileTransportConfig {
    /// Output directory
    pub base_path: PathBuf,
    /// File name prefix
    pub prefix: String,
    /// File extension, without the dot
    pub extension: String,
    /// Line written at the top of every file (e.g. a CSV header)
    pub header: Option<String>,
}

impl FileTransportConfig {
    /// Create config from params map
    ///
    /// `extension` is used unless the params override it.
    pub fn from_params(params: &HashMap<String, String>, extension: &str) -> Self {
        let base_path = params
            .get("base_path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./output"));

        Self {
            base_path,
            prefix: params
                .get("prefix")
                .cloned()
                .unwrap_or_else(|| "events".to_string()),
            extension: params
                .get("extension")
                .cloned()
                .unwrap_or_else(|| extension.to_string()),
            header: params.get("header").cloned(),
        }
    }
}

/// Transport that persists payloads to local files
pub struct FileTransport {
    name: String,
    config: FileTransportConfig,
    seq: AtomicU64,
}

impl FileTransport {
    /// Create a new FileTransport
    pub fn new(name: impl Into<String>, config: FileTransportConfig) -> std::io::Result<Self> {
        fs::create_dir_all(&config.base_path)?;

        Ok(Self {
            name: name.into(),
            config,
            seq: AtomicU64::new(0),
        })
    }

    /// Output directory
    pub fn base_path(&self) -> &Path {
        &self.config.base_path
    }

    fn next_path(&self) -> PathBuf {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let timestamp = Utc::now().format("%Y%m%dT%H%M%S%.3fZ");
        self.config.base_path.join(format!(
            "{}-{}-{:06}.{}",
            self.config.prefix, timestamp, seq, self.config.extension
        ))
    }

    fn write_file(&self, payloads: &[Payload]) -> Result<PathBuf, ContractError> {
        let path = self.next_path();
        let mut content = Vec::with_capacity(payloads.iter().map(|p| p.len() + 1).sum());
        if let Some(header) = &self.config.header {
            content.extend_from_slice(header.as_bytes());
            content.push(b'\n');
        }
        for payload in payloads {
            content.extend_from_slice(payload);
            content.push(b'\n');
        }

        let mut file = fs::File::create(&path)?;
        file.write_all(&content)?;
        file.sync_data()?;
        Ok(path)
    }
}

impl Transport for FileTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "file_transport_send_one", skip(self, payload), fields(backend = %self.name))]
    async fn send_one(&self, payload: &Payload) -> Result<(), ContractError> {
        self.send_batch(std::slice::from_ref(payload)).await
    }

    #[instrument(
        name = "file_transport_send_batch",
        skip(self, payloads),
        fields(backend = %self.name, batch_len = payloads.len())
    )]
    async fn send_batch(&self, payloads: &[Payload]) -> Result<(), ContractError> {
        match self.write_file(payloads) {
            Ok(path) => {
                debug!(path = %path.display(), batch_len = payloads.len(), "Batch written");
                Ok(())
            }
            Err(e) => {
                error!(backend = %self.name, error = %e, "Failed to write batch");
                Err(ContractError::transport_send(&self.name, e.to_string()))
            }
        }
    }
}
