//! Job - unit of dispatch work

use bytes::Bytes;

use crate::Event;

/// Encoded wire payload, opaque to the dispatch core
pub type Payload = Bytes;

/// One event queued for delivery
///
/// Moved into the queue by the producer and out of it by exactly one worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// The event to deliver
    pub event: Event,

    /// Action / weight tag supplied by the producer
    pub action: u32,
}

impl Job {
    /// Create a new job
    pub fn new(event: Event, action: u32) -> Self {
        Self { event, action }
    }
}
