//! PassThroughClient - one backend call per payload

use std::sync::Arc;

use contracts::{FlushOptions, Payload, Transport};
use tracing::{error, instrument};

use crate::error::DispatcherError;
use crate::retry::RetryPolicy;
use crate::storage::StorageClient;

/// Forwards every payload straight to the transport
pub struct PassThroughClient<T> {
    transport: Arc<T>,
    worker_id: usize,
    retry: RetryPolicy,
}

impl<T: Transport + Sync> PassThroughClient<T> {
    /// Create a new PassThroughClient
    pub fn new(transport: Arc<T>, worker_id: usize, retry: RetryPolicy) -> Self {
        Self {
            transport,
            worker_id,
            retry,
        }
    }
}

impl<T: Transport + Sync> StorageClient for PassThroughClient<T> {
    fn backend(&self) -> &str {
        self.transport.name()
    }

    fn is_buffered(&self) -> bool {
        false
    }

    fn buffered_len(&self) -> usize {
        0
    }

    #[instrument(
        name = "pass_through_send",
        skip(self, payload),
        fields(worker_id = self.worker_id, backend = %self.transport.name())
    )]
    async fn send(&mut self, payload: Payload) -> Result<usize, DispatcherError> {
        let transport: &T = &self.transport;
        let payload = &payload;

        match self
            .retry
            .run(transport.name(), move || transport.send_one(payload))
            .await
        {
            Ok(()) => {
                observability::record_jobs_delivered(transport.name(), 1);
                Ok(1)
            }
            Err(exhausted) => {
                error!(
                    worker_id = self.worker_id,
                    attempts = exhausted.attempts,
                    error = %exhausted.source,
                    "Payload dropped after exhausting retries"
                );
                observability::record_delivery_failure(transport.name(), "send", 1);
                Err(exhausted.into_error(transport.name(), 1))
            }
        }
    }

    async fn flush(&mut self, _options: FlushOptions) -> Result<usize, DispatcherError> {
        // Nothing is ever held
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryTransport;
    use contracts::BackoffConfig;

    #[tokio::test]
    async fn test_send_forwards_immediately() {
        let transport = Arc::new(MemoryTransport::new("memory"));
        let mut client =
            PassThroughClient::new(Arc::clone(&transport), 0, RetryPolicy::default());

        assert_eq!(client.send(Payload::from_static(b"a")).await.unwrap(), 1);
        assert_eq!(client.send(Payload::from_static(b"b")).await.unwrap(), 1);

        assert_eq!(transport.call_count(), 2);
        assert_eq!(
            transport.payloads(),
            vec![Payload::from_static(b"a"), Payload::from_static(b"b")]
        );
    }

    #[tokio::test]
    async fn test_send_retries_then_succeeds() {
        let transport = Arc::new(MemoryTransport::new("memory"));
        transport.fail_next(2);
        let mut client = PassThroughClient::new(
            Arc::clone(&transport),
            0,
            RetryPolicy::new(2, BackoffConfig::None),
        );

        assert_eq!(client.send(Payload::from_static(b"a")).await.unwrap(), 1);
        assert_eq!(transport.payloads().len(), 1);
    }

    #[tokio::test]
    async fn test_send_exhausted_drops_payload() {
        let transport = Arc::new(MemoryTransport::new("memory"));
        transport.fail_next(3);
        let mut client = PassThroughClient::new(
            Arc::clone(&transport),
            0,
            RetryPolicy::new(1, BackoffConfig::None),
        );

        let err = client.send(Payload::from_static(b"a")).await.unwrap_err();
        assert!(matches!(
            err,
            DispatcherError::DeliveryExhausted {
                attempts: 2,
                dropped: 1,
                ..
            }
        ));
        assert!(transport.payloads().is_empty());
    }

    #[tokio::test]
    async fn test_flush_is_noop() {
        let transport = Arc::new(MemoryTransport::new("memory"));
        let mut client =
            PassThroughClient::new(Arc::clone(&transport), 0, RetryPolicy::default());

        assert_eq!(client.flush(FlushOptions::manual()).await.unwrap(), 0);
        assert_eq!(transport.call_count(), 0);
        assert!(!client.is_buffered());
    }
}
