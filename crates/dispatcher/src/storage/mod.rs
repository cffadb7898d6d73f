//! Storage clients
//!
//! A worker hands every encoded payload to its own storage client. Two
//! variants share the call-site contract:
//! - [`PassThroughClient`]: forwards each payload immediately
//! - [`BufferedClient`]: accumulates payloads and delivers them as a batch

mod buffered;
mod pass_through;

use std::sync::Arc;

use contracts::{FlushOptions, Payload, Transport};

use crate::error::DispatcherError;
use crate::worker::Worker;

pub use self::buffered::BufferedClient;
pub use self::pass_through::PassThroughClient;

/// Delivery capability owned by one worker
///
/// Both operations return how many payloads reached the backend.
#[trait_variant::make(StorageClient: Send)]
pub trait LocalStorageClient {
    /// Backend name (used for logging/metrics)
    fn backend(&self) -> &str;

    /// Whether the client holds payloads between sends
    fn is_buffered(&self) -> bool;

    /// Payloads currently held
    fn buffered_len(&self) -> usize;

    /// Deliver or buffer one payload
    ///
    /// # Errors
    /// Returns `DeliveryExhausted` when the retries for the payload (or the
    /// batch it completed) ran out; the affected payloads are gone.
    async fn send(&mut self, payload: Payload) -> Result<usize, DispatcherError>;

    /// Drain buffered payloads regardless of fill level
    ///
    /// A no-op for clients with nothing buffered.
    async fn flush(&mut self, options: FlushOptions) -> Result<usize, DispatcherError>;
}

/// Creates one storage client per worker when the pool starts
pub trait StorageClientFactory: Send + Sync + 'static {
    type Client: StorageClient + 'static;

    /// Build the client for `worker`, sized by its buffer capacity
    fn create(&self, worker: &Worker) -> Result<Self::Client, DispatcherError>;
}

/// Factory for [`PassThroughClient`]s sharing one transport
#[derive(Debug)]
pub struct PassThroughFactory<T> {
    transport: Arc<T>,
}

impl<T> PassThroughFactory<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }
}

impl<T: Transport + Sync + 'static> StorageClientFactory for PassThroughFactory<T> {
    type Client = PassThroughClient<T>;

    fn create(&self, worker: &Worker) -> Result<Self::Client, DispatcherError> {
        Ok(PassThroughClient::new(
            Arc::clone(&self.transport),
            worker.id,
            worker.retry_policy(),
        ))
    }
}

/// Factory for [`BufferedClient`]s sharing one transport
#[derive(Debug)]
pub struct BufferedFactory<T> {
    transport: Arc<T>,
}

impl<T> BufferedFactory<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }
}

impl<T: Transport + Sync + 'static> StorageClientFactory for BufferedFactory<T> {
    type Client = BufferedClient<T>;

    fn create(&self, worker: &Worker) -> Result<Self::Client, DispatcherError> {
        if worker.buffer_size == 0 {
            return Err(DispatcherError::ClientCreation {
                worker_id: worker.id,
                message: "buffer_size must be >= 1".to_string(),
            });
        }
        Ok(BufferedClient::new(
            Arc::clone(&self.transport),
            worker.id,
            worker.buffer_size,
            worker.retry_policy(),
        ))
    }
}

/// Label used in metrics for a flush request
pub(crate) fn flush_trigger(options: FlushOptions) -> &'static str {
    if options.automatic {
        "automatic"
    } else {
        "manual"
    }
}
