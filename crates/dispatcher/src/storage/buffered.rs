//! BufferedClient - batch delivery
//!
//! Buffer lifecycle: empty -> accumulating -> draining -> empty.
//! A drain is triggered when the buffer reaches capacity or on flush. A
//! failed drain is retried with the worker's policy; once exhausted the batch
//! is dropped, so the buffer is empty after every drain either way.

use std::sync::Arc;

use contracts::{FlushOptions, Payload, Transport};
use tracing::{debug, error, instrument};

use crate::error::DispatcherError;
use crate::retry::RetryPolicy;
use crate::storage::{flush_trigger, StorageClient};

/// Accumulates payloads and delivers them through `send_batch`
pub struct BufferedClient<T> {
    transport: Arc<T>,
    worker_id: usize,
    capacity: usize,
    retry: RetryPolicy,
    buffer: Vec<Payload>,
}

impl<T: Transport + Sync> BufferedClient<T> {
    /// Create a new BufferedClient holding at most `capacity` payloads
    pub fn new(transport: Arc<T>, worker_id: usize, capacity: usize, retry: RetryPolicy) -> Self {
        Self {
            transport,
            worker_id,
            capacity: capacity.max(1),
            retry,
            buffer: Vec::new(),
        }
    }

    #[instrument(
        name = "buffered_drain",
        skip(self),
        fields(worker_id = self.worker_id, batch_len = self.buffer.len())
    )]
    async fn drain(&mut self, trigger: &'static str) -> Result<usize, DispatcherError> {
        if self.buffer.is_empty() {
            return Ok(0);
        }

        let batch = std::mem::take(&mut self.buffer);
        let batch_len = batch.len();
        observability::record_buffer_depth(self.worker_id, 0);

        let transport: &T = &self.transport;
        let payloads = batch.as_slice();
        let result = self
            .retry
            .run(transport.name(), move || transport.send_batch(payloads))
            .await;

        match result {
            Ok(()) => {
                debug!(
                    worker_id = self.worker_id,
                    batch_len,
                    trigger,
                    "Buffer drained"
                );
                observability::record_batch_flushed(transport.name(), trigger, batch_len);
                observability::record_jobs_delivered(transport.name(), batch_len);
                Ok(batch_len)
            }
            Err(exhausted) => {
                error!(
                    worker_id = self.worker_id,
                    batch_len,
                    trigger,
                    attempts = exhausted.attempts,
                    error = %exhausted.source,
                    "Batch dropped after exhausting retries"
                );
                observability::record_delivery_failure(transport.name(), "flush", batch_len);
                Err(exhausted.into_error(transport.name(), batch_len))
            }
        }
    }
}

impl<T: Transport + Sync> StorageClient for BufferedClient<T> {
    fn backend(&self) -> &str {
        self.transport.name()
    }

    fn is_buffered(&self) -> bool {
        true
    }

    fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    async fn send(&mut self, payload: Payload) -> Result<usize, DispatcherError> {
        self.buffer.push(payload);
        observability::record_buffer_depth(self.worker_id, self.buffer.len());

        if self.buffer.len() >= self.capacity {
            self.drain("full").await
        } else {
            Ok(0)
        }
    }

    async fn flush(&mut self, options: FlushOptions) -> Result<usize, DispatcherError> {
        self.drain(flush_trigger(options)).await
    }
}
