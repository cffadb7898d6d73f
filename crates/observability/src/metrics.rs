//! 投递指标记录
//!
//! Global counters for the dispatch core, exported through whatever
//! `metrics` recorder is installed (Prometheus via [`crate::init`]).

use metrics::{counter, gauge, histogram};

/// 记录 worker 领取的任务
pub fn record_job_received(worker_id: usize) {
    counter!(
        "forwarder_jobs_received_total",
        "worker" => worker_id.to_string()
    )
    .increment(1);
}

/// 记录成功投递的 payload 数量
pub fn record_jobs_delivered(backend: &str, count: usize) {
    counter!(
        "forwarder_jobs_delivered_total",
        "backend" => backend.to_string()
    )
    .increment(count as u64);
}

/// 记录一次失败后的重试
pub fn record_retry(backend: &str) {
    counter!(
        "forwarder_retries_total",
        "backend" => backend.to_string()
    )
    .increment(1);
}

/// 记录重试耗尽后丢弃的 payload
///
/// `stage` is `"encode"`, `"send"` or `"flush"`.
pub fn record_delivery_failure(backend: &str, stage: &str, dropped: usize) {
    counter!(
        "forwarder_delivery_failures_total",
        "backend" => backend.to_string(),
        "stage" => stage.to_string()
    )
    .increment(1);
    counter!(
        "forwarder_payloads_dropped_total",
        "backend" => backend.to_string()
    )
    .increment(dropped as u64);
}

/// 记录一次批量写出
pub fn record_batch_flushed(backend: &str, trigger: &str, batch_len: usize) {
    counter!(
        "forwarder_batches_flushed_total",
        "backend" => backend.to_string(),
        "trigger" => trigger.to_string()
    )
    .increment(1);
    histogram!("forwarder_batch_size").record(batch_len as f64);
}

/// 记录缓冲区深度
pub fn record_buffer_depth(worker_id: usize, depth: usize) {
    gauge!(
        "forwarder_buffer_depth",
        "worker" => worker_id.to_string()
    )
    .set(depth as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_job_received(0);
        record_jobs_delivered("memory", 3);
        record_retry("memory");
        record_delivery_failure("memory", "send", 1);
        record_batch_flushed("memory", "full", 3);
        record_buffer_depth(0, 2);
    }
}
