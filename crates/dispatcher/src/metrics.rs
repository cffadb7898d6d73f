//! Worker metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics for a single worker
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    /// Jobs taken from the queue
    received_count: AtomicU64,
    /// Payloads accepted by the backend
    delivered_count: AtomicU64,
    /// Payloads dropped after exhausting retries
    failed_count: AtomicU64,
    /// Jobs whose event could not be encoded
    encode_failure_count: AtomicU64,
    /// Non-empty flushes performed
    flush_count: AtomicU64,
    /// Payloads currently held in the worker's buffer
    buffered_len: AtomicUsize,
}

impl WorkerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get received count
    pub fn received_count(&self) -> u64 {
        self.received_count.load(Ordering::Relaxed)
    }

    /// Increment received count
    pub fn inc_received_count(&self) {
        self.received_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get delivered count
    pub fn delivered_count(&self) -> u64 {
        self.delivered_count.load(Ordering::Relaxed)
    }

    /// Add delivered payloads
    pub fn add_delivered(&self, count: usize) {
        self.delivered_count
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get failed count
    pub fn failed_count(&self) -> u64 {
        self.failed_count.load(Ordering::Relaxed)
    }

    /// Add dropped payloads
    pub fn add_failed(&self, count: usize) {
        self.failed_count.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get encode failure count
    pub fn encode_failure_count(&self) -> u64 {
        self.encode_failure_count.load(Ordering::Relaxed)
    }

    /// Increment encode failure count
    pub fn inc_encode_failure_count(&self) {
        self.encode_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get flush count
    pub fn flush_count(&self) -> u64 {
        self.flush_count.load(Ordering::Relaxed)
    }

    /// Increment flush count
    pub fn inc_flush_count(&self) {
        self.flush_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get buffered length
    pub fn buffered_len(&self) -> usize {
        self.buffered_len.load(Ordering::Relaxed)
    }

    /// Set buffered length
    pub fn set_buffered_len(&self, len: usize) {
        self.buffered_len.store(len, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received_count: self.received_count(),
            delivered_count: self.delivered_count(),
            failed_count: self.failed_count(),
            encode_failure_count: self.encode_failure_count(),
            flush_count: self.flush_count(),
            buffered_len: self.buffered_len(),
        }
    }
}

/// Snapshot of worker metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub received_count: u64,
    pub delivered_count: u64,
    pub failed_count: u64,
    pub encode_failure_count: u64,
    pub flush_count: u64,
    pub buffered_len: usize,
}

impl MetricsSnapshot {
    /// Sum snapshots of several workers
    pub fn total<'a>(snapshots: impl IntoIterator<Item = &'a MetricsSnapshot>) -> Self {
        snapshots
            .into_iter()
            .fold(Self::default(), |acc, s| Self {
                received_count: acc.received_count + s.received_count,
                delivered_count: acc.delivered_count + s.delivered_count,
                failed_count: acc.failed_count + s.failed_count,
                encode_failure_count: acc.encode_failure_count + s.encode_failure_count,
                flush_count: acc.flush_count + s.flush_count,
                buffered_len: acc.buffered_len + s.buffered_len,
            })
    }
}
