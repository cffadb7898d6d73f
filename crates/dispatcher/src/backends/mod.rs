//! Backend transport implementations
//!
//! Contains LogTransport, FileTransport, and MemoryTransport.

mod file;
mod log;
mod memory;

pub use self::file::{FileTransport, FileTransportConfig};
pub use self::log::LogTransport;
pub use self::memory::MemoryTransport;
