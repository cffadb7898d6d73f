//! Worker - queue consumer owning one storage client

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use contracts::{BackoffConfig, Encoder, FlushOptions, Job};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, instrument, warn};

use crate::error::DispatcherError;
use crate::metrics::WorkerMetrics;
use crate::queue::JobReceiver;
use crate::retry::RetryPolicy;
use crate::storage::StorageClient;

/// Worker record built by the dispatcher
///
/// Fixed for the lifetime of the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worker {
    /// Ordinal in `0..max_workers`
    pub id: usize,
    /// Extra delivery attempts after a failure
    pub retry_attempt: u32,
    /// Capacity of a buffering storage client
    pub buffer_size: usize,
    /// Delay between attempts
    pub backoff: BackoffConfig,
}

impl Worker {
    /// Retry policy used for every delivery of this worker
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_attempt, self.backoff)
    }
}

/// Control messages sent by the dispatcher to a running worker
#[derive(Debug, Clone, Copy)]
pub(crate) enum WorkerCommand {
    /// Drain the buffer; automatic requests wait for the flush interval
    Flush {
        options: FlushOptions,
        requested_at: Instant,
    },
    /// Exit after the in-flight job
    Stop,
}

/// Everything a worker task owns
pub(crate) struct WorkerTask<C> {
    pub worker: Worker,
    pub client: C,
    pub encoder: Arc<dyn Encoder>,
    pub jobs: JobReceiver,
    pub commands: mpsc::UnboundedReceiver<WorkerCommand>,
    pub metrics: Arc<WorkerMetrics>,
    /// Delay applied to automatic flush requests
    pub auto_flush_interval: Duration,
}

impl<C: StorageClient> WorkerTask<C> {
    /// Consume jobs until stopped or the queue is closed and drained
    ///
    /// Commands are polled first, so a stop is honored between jobs and a
    /// flush never interleaves with a send.
    #[instrument(
        name = "worker_loop",
        skip(self),
        fields(worker_id = self.worker.id, backend = %self.client.backend())
    )]
    pub async fn run(mut self) {
        debug!(worker_id = self.worker.id, "Worker started");

        // Due times of accepted automatic flushes, oldest first
        let mut pending_flushes: VecDeque<Instant> = VecDeque::new();

        loop {
            let next_flush = pending_flushes.front().copied();

            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(WorkerCommand::Flush { options, requested_at }) => {
                        if options.automatic {
                            let due = requested_at + self.auto_flush_interval;
                            schedule_flush(&mut pending_flushes, due);
                            debug!(
                                worker_id = self.worker.id,
                                pending = pending_flushes.len(),
                                "Automatic flush scheduled"
                            );
                        } else {
                            self.flush(options).await;
                        }
                    }
                    Some(WorkerCommand::Stop) | None => break,
                },

                _ = sleep_until(next_flush.unwrap_or_else(Instant::now)), if next_flush.is_some() => {
                    pending_flushes.pop_front();
                    self.flush(FlushOptions::automatic()).await;
                }

                job = self.jobs.recv() => match job {
                    Some(job) => self.deliver(job).await,
                    None => {
                        debug!(worker_id = self.worker.id, "Job queue closed");
                        break;
                    }
                },
            }
        }

        let remaining = self.client.buffered_len();
        if remaining > 0 {
            warn!(
                worker_id = self.worker.id,
                remaining, "Worker stopped with unflushed payloads"
            );
        }
        debug!(worker_id = self.worker.id, "Worker stopped");
    }

    /// Encode and hand one job to the storage client
    ///
    /// Failures are logged and counted; the loop always moves on.
    async fn deliver(&mut self, job: Job) {
        self.metrics.inc_received_count();
        observability::record_job_received(self.worker.id);

        let payload = match self.encoder.encode(&job.event) {
            Ok(payload) => payload,
            Err(e) => {
                self.metrics.inc_encode_failure_count();
                observability::record_delivery_failure(self.client.backend(), "encode", 1);
                error!(
                    worker_id = self.worker.id,
                    dialect = self.encoder.name(),
                    nr = job.event.nr,
                    error = %e,
                    "Failed to encode event, job dropped"
                );
                return;
            }
        };

        match self.client.send(payload).await {
            Ok(delivered) => self.metrics.add_delivered(delivered),
            Err(e) => {
                self.metrics.add_failed(dropped_by(&e));
                error!(
                    worker_id = self.worker.id,
                    action = job.action,
                    error = %e,
                    "Delivery failed"
                );
            }
        }
        self.metrics.set_buffered_len(self.client.buffered_len());
    }

    async fn flush(&mut self, options: FlushOptions) {
        match self.client.flush(options).await {
            Ok(0) => {}
            Ok(delivered) => {
                self.metrics.inc_flush_count();
                self.metrics.add_delivered(delivered);
            }
            Err(e) => {
                self.metrics.add_failed(dropped_by(&e));
                error!(
                    worker_id = self.worker.id,
                    automatic = options.automatic,
                    error = %e,
                    "Flush failed"
                );
            }
        }
        self.metrics.set_buffered_len(self.client.buffered_len());
    }
}

/// Queue an automatic flush due at `due`, keeping the queue ordered
///
/// Requests arrive in issue order, so `due` normally goes at the back.
fn schedule_flush(pending: &mut VecDeque<Instant>, due: Instant) {
    let at = pending.partition_point(|queued| *queued <= due);
    pending.insert(at, due);
}

/// Payloads lost by a failed send or flush
fn dropped_by(error: &DispatcherError) -> usize {
    match error {
        DispatcherError::DeliveryExhausted { dropped, .. } => *dropped,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_flush_keeps_every_deadline_in_order() {
        let now = Instant::now();
        let mut pending = VecDeque::new();

        schedule_flush(&mut pending, now + Duration::from_millis(200));
        schedule_flush(&mut pending, now + Duration::from_millis(400));
        schedule_flush(&mut pending, now + Duration::from_millis(300));
        schedule_flush(&mut pending, now + Duration::from_millis(400));

        let offsets: Vec<_> = pending.iter().map(|at| *at - now).collect();
        assert_eq!(
            offsets,
            vec![
                Duration::from_millis(200),
                Duration::from_millis(300),
                Duration::from_millis(400),
                Duration::from_millis(400),
            ]
        );
    }
}
