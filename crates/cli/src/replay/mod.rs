//! Replay orchestration - feeds NDJSON events through a worker pool.

mod source;
mod stats;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::{BackendKind, DialectKind, Encoder, ForwarderConfig, Transport};
use dialects::CsvEncoder;
use dispatcher::{
    create_dispatcher, job_queue, BufferedFactory, FileTransport, FileTransportConfig, FlushOptions,
    Job, JobSender, LogTransport, MemoryTransport, MetricsSnapshot, PassThroughFactory,
    StorageClientFactory,
};
use tokio::io::AsyncBufReadExt;
use tracing::{info, instrument, warn};

pub use source::{open_input, parse_event, EventInput};
pub use stats::ReplayStats;

/// Poll period while waiting for workers to empty the queue
const DRAIN_POLL: Duration = Duration::from_millis(20);

/// Replay configuration
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Validated forwarder configuration
    pub forwarder: ForwarderConfig,

    /// NDJSON input (None = stdin)
    pub input: Option<PathBuf>,

    /// Action tag attached to every job
    pub action: u32,
}

/// Replays an event stream into the configured backend
pub struct Replay {
    config: ReplayConfig,
}

impl Replay {
    /// Create a new replay with the given configuration
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }

    /// Run until the input is exhausted or a shutdown signal arrives
    pub async fn run(self) -> Result<ReplayStats> {
        let forwarder = &self.config.forwarder;
        let encoder = dialects::encoder_for(forwarder.dialect);
        let backend = &forwarder.backend;

        match backend.kind {
            BackendKind::Log => self.with_transport(Arc::new(LogTransport::new("log")), encoder).await,
            BackendKind::Memory => {
                self.with_transport(Arc::new(MemoryTransport::new("memory")), encoder)
                    .await
            }
            BackendKind::File => {
                let mut file_config =
                    FileTransportConfig::from_params(&backend.params, encoder.extension());
                if file_config.header.is_none() && forwarder.dialect == DialectKind::Csv {
                    file_config.header = Some(CsvEncoder::header());
                }
                let transport = FileTransport::new("file", file_config)
                    .context("Failed to create file backend")?;
                self.with_transport(Arc::new(transport), encoder).await
            }
        }
    }

    async fn with_transport<T: Transport + Sync + 'static>(
        self,
        transport: Arc<T>,
        encoder: Arc<dyn Encoder>,
    ) -> Result<ReplayStats> {
        if self.config.forwarder.backend.buffered {
            self.replay(BufferedFactory::new(transport), encoder).await
        } else {
            self.replay(PassThroughFactory::new(transport), encoder).await
        }
    }

    #[instrument(name = "replay", skip_all, fields(backend = ?self.config.forwarder.backend.kind))]
    async fn replay<F: StorageClientFactory>(
        self,
        factory: F,
        encoder: Arc<dyn Encoder>,
    ) -> Result<ReplayStats> {
        let start_time = Instant::now();
        let forwarder = &self.config.forwarder;

        let (jobs_tx, jobs_rx) = job_queue(forwarder.dispatcher.queue_capacity);
        let mut dispatcher = create_dispatcher(forwarder, jobs_rx, encoder, factory)
            .context("Failed to create dispatcher")?;
        dispatcher.run().context("Failed to start workers")?;

        let input = open_input(self.config.input.as_deref()).await?;

        let mut stats = ReplayStats {
            worker_count: dispatcher.max_workers(),
            ..Default::default()
        };

        let interrupted = tokio::select! {
            result = feed(input, &jobs_tx, self.config.action, &mut stats) => {
                result?;
                false
            }
            _ = shutdown_signal() => {
                warn!("Received shutdown signal, stopping replay...");
                true
            }
        };
        stats.interrupted = interrupted;

        if !interrupted {
            while !jobs_tx.is_empty() {
                tokio::time::sleep(DRAIN_POLL).await;
            }
        } else if !jobs_tx.is_empty() {
            warn!(pending = jobs_tx.len(), "Queued jobs abandoned at shutdown");
        }

        dispatcher.flush(FlushOptions::manual());
        dispatcher.stop().await;
        jobs_tx.close();

        stats.workers = MetricsSnapshot::total(dispatcher.metrics().iter().map(|(_, s)| s));
        stats.duration = start_time.elapsed();

        info!(
            submitted = stats.jobs_submitted,
            delivered = stats.workers.delivered_count,
            failed = stats.workers.failed_count,
            "Replay finished"
        );
        Ok(stats)
    }
}

/// Read the input line by line and submit every valid event
async fn feed(
    input: EventInput,
    jobs: &JobSender,
    action: u32,
    stats: &mut ReplayStats,
) -> Result<()> {
    let mut lines = input.lines();
    let mut line_no = 0u64;

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read event input")?
    {
        line_no += 1;
        match parse_event(line_no, &line) {
            Ok(Some(event)) => {
                stats.lines_read += 1;
                jobs.submit(Job::new(event, action))
                    .await
                    .context("Job queue closed during replay")?;
                stats.jobs_submitted += 1;
            }
            Ok(None) => {}
            Err(e) => {
                stats.lines_read += 1;
                stats.invalid_lines += 1;
                warn!(error = %e, "Skipping invalid event");
            }
        }
    }

    info!(lines = line_no, "Event input exhausted");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
