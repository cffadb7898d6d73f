//! MemoryTransport - records deliveries in process

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{ContractError, Payload, Transport};

/// Transport that keeps every delivered batch in memory
///
/// Each backend call is recorded as one batch; `send_one` records a batch of one.
#[derive(Debug)]
pub struct MemoryTransport {
    name: String,
    batches: Mutex<Vec<Vec<Payload>>>,
    pending_failures: AtomicU32,
}

impl MemoryTransport {
    /// Create a new MemoryTransport
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            batches: Mutex::new(Vec::new()),
            pending_failures: AtomicU32::new(0),
        }
    }

    /// Make the next `count` calls fail without recording anything
    pub fn fail_next(&self, count: u32) {
        self.pending_failures.store(count, Ordering::SeqCst);
    }

    /// Successful backend calls so far
    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    /// Delivered batches in arrival order
    pub fn batches(&self) -> Vec<Vec<Payload>> {
        self.lock().clone()
    }

    /// Delivered payloads in arrival order
    pub fn payloads(&self) -> Vec<Payload> {
        self.lock().iter().flatten().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Vec<Payload>>> {
        self.batches.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, batch: Vec<Payload>) -> Result<(), ContractError> {
        let injected = self
            .pending_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(ContractError::transport_send(&self.name, "injected failure"));
        }
        self.lock().push(batch);
        Ok(())
    }
}

impl Transport for MemoryTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send_one(&self, payload: &Payload) -> Result<(), ContractError> {
        self.record(vec![payload.clone()])
    }

    async fn send_batch(&self, payloads: &[Payload]) -> Result<(), ContractError> {
        self.record(payloads.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_batches() {
        let transport = MemoryTransport::new("memory");
        transport
            .send_one(&Payload::from_static(b"a"))
            .await
            .unwrap();
        transport
            .send_batch(&[Payload::from_static(b"b"), Payload::from_static(b"c")])
            .await
            .unwrap();

        assert_eq!(transport.call_count(), 2);
        assert_eq!(transport.batches()[1].len(), 2);
        assert_eq!(transport.payloads().len(), 3);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let transport = MemoryTransport::new("memory");
        transport.fail_next(1);

        assert!(transport.send_one(&Payload::from_static(b"a")).await.is_err());
        assert!(transport.send_one(&Payload::from_static(b"a")).await.is_ok());
        assert_eq!(transport.call_count(), 1);
    }
}
