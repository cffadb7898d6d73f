//! Dispatcher - worker pool lifecycle and flush coordination

use std::sync::Arc;
use std::time::Duration;

use contracts::{DispatcherSection, Encoder, FlushOptions, ForwarderConfig, WorkerOptions};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::error::DispatcherError;
use crate::handle::{FlushTarget, WorkerHandle};
use crate::metrics::{MetricsSnapshot, WorkerMetrics};
use crate::queue::JobReceiver;
use crate::storage::StorageClientFactory;
use crate::worker::{Worker, WorkerTask};

/// Dispatcher configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Period of the automatic flush timer (`None` = disabled)
    ///
    /// Also the delay between an automatic flush request and the drain.
    pub auto_flush_interval: Option<Duration>,
}

impl From<&DispatcherSection> for DispatcherConfig {
    fn from(section: &DispatcherSection) -> Self {
        Self {
            auto_flush_interval: section.auto_flush_interval(),
        }
    }
}

/// Buffer capacity of worker `index` in a pool of `max_workers`
///
/// Without spreading every worker gets `buffer_size`. With spreading the
/// capacities form an arithmetic progression centered on `buffer_size`
/// with step `buffer_size / (max_workers + 1)`, e.g. 7500/10000/12500 for
/// three workers around 10000. Capacities beyond `usize::MAX` saturate.
pub fn buffer_size_for(index: usize, max_workers: usize, options: &WorkerOptions) -> usize {
    if !options.spread_buffer || max_workers == 0 {
        return options.buffer_size;
    }

    let base = options.buffer_size as i128;
    let workers = max_workers as i128;
    let step = base / (workers + 1);
    let offset = index as i128 - (workers - 1) / 2;
    let size = base + offset * step;
    usize::try_from(size.max(0)).unwrap_or(usize::MAX)
}

/// Flush senders of every buffering worker
#[derive(Debug, Clone, Default)]
struct FlushFanout {
    targets: Arc<[FlushTarget]>,
}

impl FlushFanout {
    fn new(targets: Vec<FlushTarget>) -> Self {
        Self {
            targets: targets.into(),
        }
    }

    fn len(&self) -> usize {
        self.targets.len()
    }

    fn flush(&self, options: FlushOptions) {
        let requested_at = Instant::now();
        for target in self.targets.iter() {
            target.request(options, requested_at);
        }
    }
}

/// Owner of the worker pool
///
/// Workers compete for jobs on one shared queue; each delivers through the
/// storage client built for it by the factory.
pub struct Dispatcher<F: StorageClientFactory> {
    max_workers: usize,
    options: WorkerOptions,
    workers: Vec<Worker>,
    jobs: JobReceiver,
    encoder: Arc<dyn Encoder>,
    factory: F,
    config: DispatcherConfig,
    handles: Vec<WorkerHandle>,
    worker_metrics: Vec<(usize, Arc<WorkerMetrics>)>,
    fanout: FlushFanout,
    ticker: Option<JoinHandle<()>>,
}

impl<F: StorageClientFactory> Dispatcher<F> {
    /// Build the worker records of a pool
    ///
    /// Nothing runs until [`start`](Self::start) or [`run`](Self::run).
    ///
    /// # Errors
    /// `InvalidPool` when `max_workers` is zero
    pub fn new(
        max_workers: usize,
        options: WorkerOptions,
        jobs: JobReceiver,
        encoder: Arc<dyn Encoder>,
        factory: F,
    ) -> Result<Self, DispatcherError> {
        if max_workers == 0 {
            return Err(DispatcherError::invalid_pool("max_workers must be >= 1"));
        }

        let workers = (0..max_workers)
            .map(|id| Worker {
                id,
                retry_attempt: options.retry_attempt,
                buffer_size: buffer_size_for(id, max_workers, &options),
                backoff: options.backoff,
            })
            .collect();

        Ok(Self {
            max_workers,
            options,
            workers,
            jobs,
            encoder,
            factory,
            config: DispatcherConfig::default(),
            handles: Vec::new(),
            worker_metrics: Vec::new(),
            fanout: FlushFanout::default(),
            ticker: None,
        })
    }

    /// Set the dispatcher configuration
    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Pool size
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Worker records in id order
    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    /// Buffer capacity of worker `index` in this pool
    pub fn buffer_size(&self, index: usize) -> usize {
        buffer_size_for(index, self.max_workers, &self.options)
    }

    /// Whether worker tasks are running
    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    /// Get metrics for all workers of the last start
    ///
    /// Still readable after [`stop`](Self::stop).
    pub fn metrics(&self) -> Vec<(usize, MetricsSnapshot)> {
        self.worker_metrics
            .iter()
            .map(|(id, metrics)| (*id, metrics.snapshot()))
            .collect()
    }

    /// Create every storage client and spawn one task per worker
    ///
    /// Returns once the tasks are scheduled. Clients are all created before
    /// any task starts, so a factory error leaves nothing running.
    #[instrument(name = "dispatcher_start", skip(self), fields(max_workers = self.max_workers))]
    pub fn start(&mut self) -> Result<(), DispatcherError> {
        if self.is_running() {
            return Err(DispatcherError::AlreadyStarted);
        }

        let clients = self
            .workers
            .iter()
            .map(|worker| self.factory.create(worker))
            .collect::<Result<Vec<_>, _>>()?;

        let auto_flush_interval = self.config.auto_flush_interval.unwrap_or(Duration::ZERO);
        for (worker, client) in self.workers.iter().zip(clients) {
            let (tx, rx) = mpsc::unbounded_channel();
            let task = WorkerTask {
                worker: worker.clone(),
                client,
                encoder: Arc::clone(&self.encoder),
                jobs: self.jobs.clone(),
                commands: rx,
                metrics: Arc::new(WorkerMetrics::new()),
                auto_flush_interval,
            };
            self.handles.push(WorkerHandle::spawn(task, tx));
        }

        self.worker_metrics = self
            .handles
            .iter()
            .map(|h| (h.id(), Arc::clone(h.metrics())))
            .collect();
        self.fanout = FlushFanout::new(
            self.handles
                .iter()
                .filter_map(WorkerHandle::flush_target)
                .collect(),
        );

        info!(
            workers = self.handles.len(),
            buffered = self.fanout.len(),
            dialect = self.encoder.name(),
            "Dispatcher started"
        );
        Ok(())
    }

    /// Start the pool and, when configured, the automatic flush timer
    #[instrument(name = "dispatcher_run", skip(self))]
    pub fn run(&mut self) -> Result<(), DispatcherError> {
        self.start()?;

        if let Some(period) = self.config.auto_flush_interval {
            if self.fanout.len() > 0 {
                let fanout = self.fanout.clone();
                self.ticker = Some(tokio::spawn(auto_flush_loop(fanout, period)));
                info!(
                    interval_secs = period.as_secs_f64(),
                    "Automatic flush enabled"
                );
            }
        }
        Ok(())
    }

    /// Ask every buffering worker to drain its buffer
    ///
    /// Returns once the requests are queued. A manual flush drains as soon as
    /// the worker finishes its in-flight job; an automatic one drains after
    /// the configured interval has elapsed.
    pub fn flush(&self, options: FlushOptions) {
        if !self.is_running() {
            warn!("Flush requested on a dispatcher that is not running");
            return;
        }
        debug!(
            automatic = options.automatic,
            targets = self.fanout.len(),
            "Flush requested"
        );
        self.fanout.flush(options);
    }

    /// Stop the timer and every worker, waiting for in-flight jobs
    ///
    /// Buffered payloads are not flushed; call [`flush`](Self::flush) first.
    #[instrument(name = "dispatcher_stop", skip(self))]
    pub async fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }

        let handles = std::mem::take(&mut self.handles);
        for handle in &handles {
            handle.request_stop();
        }
        for handle in handles {
            handle.join().await;
        }
        self.fanout = FlushFanout::default();

        info!("Dispatcher stopped");
    }
}

/// Issue an automatic flush every `period`, starting one period from now
async fn auto_flush_loop(fanout: FlushFanout, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        debug!(targets = fanout.len(), "Automatic flush tick");
        fanout.flush(FlushOptions::automatic());
    }
}

/// Convenience function to create a dispatcher from process configuration
#[instrument(name = "dispatcher_create", skip_all)]
pub fn create_dispatcher<F: StorageClientFactory>(
    config: &ForwarderConfig,
    jobs: JobReceiver,
    encoder: Arc<dyn Encoder>,
    factory: F,
) -> Result<Dispatcher<F>, DispatcherError> {
    Ok(Dispatcher::new(
        config.dispatcher.max_workers,
        config.worker.clone(),
        jobs,
        encoder,
        factory,
    )?
    .with_config(DispatcherConfig::from(&config.dispatcher)))
}
