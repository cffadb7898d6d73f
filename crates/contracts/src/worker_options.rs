//! Worker pool options shared across crates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-worker delivery options
///
/// Read-only once a dispatcher has been built from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerOptions {
    /// Extra delivery attempts after the first failure
    #[serde(default)]
    pub retry_attempt: u32,

    /// Base buffer capacity of a buffering storage client
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Distribute buffer capacities around `buffer_size` instead of using it for everyone
    #[serde(default)]
    pub spread_buffer: bool,

    /// Delay between delivery attempts
    #[serde(default)]
    pub backoff: BackoffConfig,
}

fn default_buffer_size() -> usize {
    100
}

impl Default for WorkerOptions {
    fn default() -> Self {
        Self {
            retry_attempt: 0,
            buffer_size: default_buffer_size(),
            spread_buffer: false,
            backoff: BackoffConfig::default(),
        }
    }
}

/// Delay strategy between retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackoffConfig {
    /// Retry immediately
    #[default]
    None,
    /// Constant delay
    Fixed { delay_ms: u64 },
    /// Doubling delay, capped at `max_ms`
    Exponential { initial_ms: u64, max_ms: u64 },
}

impl BackoffConfig {
    /// Delay to wait before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Fixed { delay_ms } => Duration::from_millis(delay_ms),
            Self::Exponential { initial_ms, max_ms } => {
                let shift = retry.saturating_sub(1).min(32);
                let delay = initial_ms.saturating_mul(1u64 << shift);
                Duration::from_millis(delay.min(max_ms))
            }
        }
    }
}

/// Flush request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushOptions {
    /// Request comes from the interval timer rather than an external trigger
    pub automatic: bool,
}

impl FlushOptions {
    /// Immediate, externally triggered flush
    pub fn manual() -> Self {
        Self { automatic: false }
    }

    /// Interval-gated flush issued by the timer
    pub fn automatic() -> Self {
        Self { automatic: true }
    }
}
