//! LogTransport - logs delivery summaries via tracing

use contracts::{ContractError, Payload, Transport};
use tracing::{debug, info, instrument};

/// Transport that logs what it would deliver
pub struct LogTransport {
    name: String,
}

impl LogTransport {
    /// Create a new LogTransport with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Transport for LogTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_transport_send_one",
        skip(self, payload),
        fields(backend = %self.name)
    )]
    async fn send_one(&self, payload: &Payload) -> Result<(), ContractError> {
        info!(
            backend = %self.name,
            bytes = payload.len(),
            payload = %String::from_utf8_lossy(payload),
            "Payload delivered"
        );
        Ok(())
    }

    #[instrument(
        name = "log_transport_send_batch",
        skip(self, payloads),
        fields(backend = %self.name, batch_len = payloads.len())
    )]
    async fn send_batch(&self, payloads: &[Payload]) -> Result<(), ContractError> {
        let bytes: usize = payloads.iter().map(|p| p.len()).sum();
        info!(
            backend = %self.name,
            batch_len = payloads.len(),
            bytes,
            "Batch delivered"
        );
        for payload in payloads {
            debug!(payload = %String::from_utf8_lossy(payload), "Batch entry");
        }
        Ok(())
    }
}
