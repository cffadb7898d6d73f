//! Replay statistics.

use std::time::Duration;

use dispatcher::MetricsSnapshot;

/// Statistics from a replay run
#[derive(Debug, Clone, Default)]
pub struct ReplayStats {
    /// Non-empty input lines read
    pub lines_read: u64,

    /// Jobs handed to the queue
    pub jobs_submitted: u64,

    /// Lines skipped because they were not valid events
    pub invalid_lines: u64,

    /// Whether the run ended on a shutdown signal
    pub interrupted: bool,

    /// Total duration of the run
    pub duration: Duration,

    /// Worker counters summed over the pool
    pub workers: MetricsSnapshot,

    /// Number of workers in the pool
    pub worker_count: usize,
}

impl ReplayStats {
    /// Delivered payloads per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.workers.delivered_count as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of received jobs that were lost, as a percentage
    pub fn loss_rate(&self) -> f64 {
        let received = self.workers.received_count;
        if received > 0 {
            let lost = self.workers.failed_count + self.workers.encode_failure_count;
            (lost as f64 / received as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Replay Statistics ===\n");

        println!("Input");
        println!("   ├─ Lines read: {}", self.lines_read);
        println!("   ├─ Jobs submitted: {}", self.jobs_submitted);
        println!("   ├─ Invalid lines: {}", self.invalid_lines);
        println!("   └─ Interrupted: {}", self.interrupted);

        println!("\nWorkers ({})", self.worker_count);
        println!("   ├─ Received: {}", self.workers.received_count);
        println!("   ├─ Delivered: {}", self.workers.delivered_count);
        println!("   ├─ Failed: {}", self.workers.failed_count);
        println!("   ├─ Encode failures: {}", self.workers.encode_failure_count);
        println!("   ├─ Flushes: {}", self.workers.flush_count);
        println!("   ├─ Left in buffers: {}", self.workers.buffered_len);
        println!("   └─ Loss rate: {:.2}%", self.loss_rate());

        println!("\nDuration: {:.2}s ({:.2} payloads/s)", self.duration.as_secs_f64(), self.throughput());
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates() {
        let stats = ReplayStats {
            duration: Duration::from_secs(2),
            workers: MetricsSnapshot {
                received_count: 10,
                delivered_count: 8,
                failed_count: 1,
                encode_failure_count: 1,
                ..Default::default()
            },
            ..Default::default()
        };

        assert!((stats.throughput() - 4.0).abs() < f64::EPSILON);
        assert!((stats.loss_rate() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_run_rates() {
        let stats = ReplayStats::default();
        assert_eq!(stats.throughput(), 0.0);
        assert_eq!(stats.loss_rate(), 0.0);
    }
}
