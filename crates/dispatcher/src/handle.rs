//! WorkerHandle - controls one spawned worker task

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, instrument, warn};

use contracts::FlushOptions;

use crate::metrics::WorkerMetrics;
use crate::storage::StorageClient;
use crate::worker::{WorkerCommand, WorkerTask};

/// Handle to a running worker
pub(crate) struct WorkerHandle {
    /// Worker ordinal
    id: usize,
    /// Whether the worker's client buffers payloads
    buffered: bool,
    /// Channel to send commands to the worker
    commands: mpsc::UnboundedSender<WorkerCommand>,
    /// Shared metrics
    metrics: Arc<WorkerMetrics>,
    /// Worker task handle
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawn the worker task and return its handle
    pub fn spawn<C: StorageClient + 'static>(
        task: WorkerTask<C>,
        commands: mpsc::UnboundedSender<WorkerCommand>,
    ) -> Self {
        let id = task.worker.id;
        let buffered = task.client.is_buffered();
        let metrics = Arc::clone(&task.metrics);

        let task = tokio::spawn(task.run());

        Self {
            id,
            buffered,
            commands,
            metrics,
            task,
        }
    }

    /// Get worker id
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<WorkerMetrics> {
        &self.metrics
    }

    /// Sender used to fan flush requests out to this worker, if it buffers
    pub fn flush_target(&self) -> Option<FlushTarget> {
        self.buffered.then(|| FlushTarget {
            id: self.id,
            commands: self.commands.clone(),
        })
    }

    /// Ask the worker to exit after its in-flight job
    pub fn request_stop(&self) {
        if self.commands.send(WorkerCommand::Stop).is_err() {
            debug!(worker_id = self.id, "Worker already stopped");
        }
    }

    /// Wait for the worker task to finish
    #[instrument(name = "worker_handle_join", skip(self), fields(worker_id = self.id))]
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!(worker_id = self.id, error = ?e, "Worker task panicked");
        }
        debug!(worker_id = self.id, "WorkerHandle shutdown complete");
    }
}

/// Flush channel of a buffering worker
#[derive(Debug, Clone)]
pub(crate) struct FlushTarget {
    id: usize,
    commands: mpsc::UnboundedSender<WorkerCommand>,
}

impl FlushTarget {
    /// Queue a flush request issued at `requested_at`
    pub fn request(&self, options: FlushOptions, requested_at: Instant) {
        let command = WorkerCommand::Flush {
            options,
            requested_at,
        };
        if self.commands.send(command).is_err() {
            warn!(worker_id = self.id, "Flush requested on a stopped worker");
        }
    }
}
