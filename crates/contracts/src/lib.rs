//! # Contracts
//!
//! Frozen interface contracts shared by every forwarder crate.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Data flow
//! producer -> `Job` queue -> worker -> `Encoder` -> storage client -> `Transport`

mod config;
mod encoder;
mod error;
mod event;
mod job;
mod transport;
mod worker_options;

pub use config::*;
pub use encoder::Encoder;
pub use error::*;
pub use event::Event;
pub use job::{Job, Payload};
pub use transport::{LocalTransport, Transport};
pub use worker_options::*;
