//! Transport trait - storage backend interface
//!
//! Defines how encoded payloads leave the process.

use crate::{ContractError, Payload};

/// Backend transport
///
/// Shared by every worker of a pool, so it takes `&self`.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Backend name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver a single payload
    ///
    /// # Errors
    /// Returns a send error (should include context)
    async fn send_one(&self, payload: &Payload) -> Result<(), ContractError>;

    /// Deliver a batch of payloads as one unit
    async fn send_batch(&self, payloads: &[Payload]) -> Result<(), ContractError>;
}
