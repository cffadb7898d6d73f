//! Shared job queue
//!
//! A bounded multi-consumer channel: every worker holds a receiver clone and
//! the first idle worker takes the next job. A job is received exactly once.

use async_channel::{bounded, Receiver, Sender, TrySendError};
use contracts::Job;
use tracing::warn;

use crate::error::DispatcherError;

/// Create a job queue with the given capacity
pub fn job_queue(capacity: usize) -> (JobSender, JobReceiver) {
    let (tx, rx) = bounded(capacity.max(1));
    (JobSender { tx }, JobReceiver { rx })
}

/// Producer side of the job queue
#[derive(Debug, Clone)]
pub struct JobSender {
    tx: Sender<Job>,
}

impl JobSender {
    /// Enqueue a job, waiting for space when the queue is full
    pub async fn submit(&self, job: Job) -> Result<(), DispatcherError> {
        self.tx
            .send(job)
            .await
            .map_err(|_| DispatcherError::QueueClosed)
    }

    /// Enqueue a job without waiting
    pub fn try_submit(&self, job: Job) -> Result<(), DispatcherError> {
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(job)) => {
                warn!(
                    device_id = %job.event.device_id,
                    nr = job.event.nr,
                    "Job queue full, job rejected"
                );
                Err(DispatcherError::QueueFull {
                    capacity: self.capacity(),
                })
            }
            Err(TrySendError::Closed(_)) => Err(DispatcherError::QueueClosed),
        }
    }

    /// Jobs waiting in the queue
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    /// Whether the queue holds no jobs
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    /// Queue capacity
    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(usize::MAX)
    }

    /// Close the queue; workers exit once the remaining jobs are taken
    pub fn close(&self) -> bool {
        self.tx.close()
    }
}

/// Consumer side of the job queue, cloned once per worker
#[derive(Debug, Clone)]
pub struct JobReceiver {
    rx: Receiver<Job>,
}

impl JobReceiver {
    /// Wait for the next job; `None` once the queue is closed and drained
    pub async fn recv(&self) -> Option<Job> {
        self.rx.recv().await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::Event;

    fn job(nr: u64) -> Job {
        Job::new(Event::new("dev", "client", "s", nr, "Test", Utc::now()), 1)
    }

    #[tokio::test]
    async fn test_fifo_admission() {
        let (tx, rx) = job_queue(4);
        for nr in 0..3 {
            tx.submit(job(nr)).await.unwrap();
        }
        assert_eq!(tx.len(), 3);
        for nr in 0..3 {
            assert_eq!(rx.recv().await.unwrap().event.nr, nr);
        }
    }

    #[tokio::test]
    async fn test_try_submit_full() {
        let (tx, _rx) = job_queue(1);
        tx.try_submit(job(1)).unwrap();
        assert!(matches!(
            tx.try_submit(job(2)),
            Err(DispatcherError::QueueFull { capacity: 1 })
        ));
    }

    #[tokio::test]
    async fn test_closed_queue_drains_then_ends() {
        let (tx, rx) = job_queue(2);
        tx.submit(job(1)).await.unwrap();
        tx.close();

        assert!(matches!(
            tx.submit(job(2)).await,
            Err(DispatcherError::QueueClosed)
        ));
        assert_eq!(rx.recv().await.unwrap().event.nr, 1);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_competing_consumers_receive_each_job_once() {
        let (tx, rx) = job_queue(16);
        let other = rx.clone();
        for nr in 0..10 {
            tx.submit(job(nr)).await.unwrap();
        }
        drop(tx);

        let a = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(job) = rx.recv().await {
                seen.push(job.event.nr);
            }
            seen
        });
        let b = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(job) = other.recv().await {
                seen.push(job.event.nr);
            }
            seen
        });

        let mut all = a.await.unwrap();
        all.extend(b.await.unwrap());
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }
}
