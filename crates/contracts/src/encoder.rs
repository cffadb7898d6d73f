//! Encoder trait - dialect interface
//!
//! Turns an `Event` into the wire payload a backend expects.

use crate::{ContractError, Event, Payload};

/// Event serializer
///
/// Implementations must be deterministic and free of side effects.
pub trait Encoder: Send + Sync {
    /// Dialect name (used for logging)
    fn name(&self) -> &str;

    /// File extension hint for backends that persist payloads
    fn extension(&self) -> &str;

    /// Encode one event
    ///
    /// # Errors
    /// Returns an encode error when the event cannot be represented
    fn encode(&self, event: &Event) -> Result<Payload, ContractError>;
}
