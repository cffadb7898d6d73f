//! # Dispatcher
//!
//! 事件分发模块。
//!
//! 负责：
//! - 从共享队列竞争消费 `Job`
//! - 每个 worker 持有一个 storage client（直通或缓冲）
//! - 手动 / 自动 flush，失败重试
//!
//! Workers compete for jobs on one bounded queue. A slow backend only
//! stalls the worker delivering to it; the others keep draining the queue.

pub mod backends;
pub mod dispatcher;
pub mod error;
mod handle;
pub mod metrics;
pub mod queue;
pub mod retry;
pub mod storage;
pub mod worker;

pub use backends::{FileTransport, FileTransportConfig, LogTransport, MemoryTransport};
pub use contracts::{Encoder, FlushOptions, Job, Transport, WorkerOptions};
pub use dispatcher::{buffer_size_for, create_dispatcher, Dispatcher, DispatcherConfig};
pub use error::DispatcherError;
pub use metrics::{MetricsSnapshot, WorkerMetrics};
pub use queue::{job_queue, JobReceiver, JobSender};
pub use retry::{RetryExhausted, RetryPolicy};
pub use storage::{
    BufferedClient, BufferedFactory, PassThroughClient, PassThroughFactory, StorageClient,
    StorageClientFactory,
};
pub use worker::Worker;
