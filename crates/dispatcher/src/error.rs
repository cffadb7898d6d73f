//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Pool parameters rejected at construction
    #[error("invalid worker pool: {message}")]
    InvalidPool { message: String },

    /// Storage client creation error
    #[error("failed to create storage client for worker {worker_id}: {message}")]
    ClientCreation { worker_id: usize, message: String },

    /// `start` was called on a running pool
    #[error("dispatcher already started")]
    AlreadyStarted,

    /// Queue full - job rejected
    #[error("job queue full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// Queue closed - no worker will take the job
    #[error("job queue closed")]
    QueueClosed,

    /// Every delivery attempt failed; the payloads were dropped
    #[error(
        "delivery to '{backend}' failed after {attempts} attempt(s), {dropped} payload(s) dropped: {source}"
    )]
    DeliveryExhausted {
        backend: String,
        attempts: u32,
        dropped: usize,
        #[source]
        source: contracts::ContractError,
    },
}

impl DispatcherError {
    /// Create an invalid pool error
    pub fn invalid_pool(message: impl Into<String>) -> Self {
        Self::InvalidPool {
            message: message.into(),
        }
    }
}
