//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置契约测试
//! - 端到端投递测试（config -> dialect -> dispatcher -> backend）

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{BackendKind, BackoffConfig, DialectKind};

    const FULL_CONFIG: &str = r#"
dialect = "csv"

[dispatcher]
max_workers = 3
queue_capacity = 64
auto_flush_interval = 30

[worker]
retry_attempt = 2
buffer_size = 500
spread_buffer = true

[worker.backoff]
kind = "exponential"
initial_ms = 50
max_ms = 1000

[backend]
kind = "file"
buffered = true

[backend.params]
base_path = "/var/lib/forwarder"
prefix = "events"
"#;

    #[test]
    fn test_full_config_contract() {
        let config = ConfigLoader::load_from_str(FULL_CONFIG, ConfigFormat::Toml).unwrap();

        assert_eq!(config.dialect, DialectKind::Csv);
        assert_eq!(config.dispatcher.max_workers, 3);
        assert_eq!(config.dispatcher.queue_capacity, 64);
        assert_eq!(config.worker.retry_attempt, 2);
        assert_eq!(
            config.worker.backoff,
            BackoffConfig::Exponential {
                initial_ms: 50,
                max_ms: 1000
            }
        );
        assert_eq!(config.backend.kind, BackendKind::File);
        assert_eq!(config.backend.params["prefix"], "events");
    }

    #[test]
    fn test_toml_and_json_agree() {
        let config = ConfigLoader::load_from_str(FULL_CONFIG, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let reloaded = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();

        assert_eq!(reloaded.dispatcher, config.dispatcher);
        assert_eq!(reloaded.worker, config.worker);
        assert_eq!(reloaded.backend.params, config.backend.params);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Event, ForwarderConfig, Job};
    use dispatcher::{
        create_dispatcher, job_queue, BufferedFactory, FileTransport, FileTransportConfig,
        FlushOptions, MemoryTransport, MetricsSnapshot, PassThroughFactory,
    };
    use tokio::time::{sleep, Instant};

    fn test_event(nr: u64) -> Event {
        let at = Utc.with_ymd_and_hms(2016, 2, 5, 15, 5, 4).unwrap();
        let mut event = Event::new("a73b1c37", "ios", "f0ee0c1e", nr, "Client.CreateUser", at);
        event.system = "OSX".to_string();
        event.ip = "214.160.227.22".to_string();
        event
    }

    fn load(toml: &str) -> ForwarderConfig {
        ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap()
    }

    async fn wait_for(condition: impl Fn() -> bool, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            sleep(Duration::from_millis(20)).await;
        }
        condition()
    }

    /// Competing workers deliver every job exactly once
    #[tokio::test]
    async fn test_e2e_pass_through_competing_workers() {
        let config = load(
            r#"
[dispatcher]
max_workers = 4
queue_capacity = 16

[backend]
kind = "memory"
"#,
        );
        let transport = Arc::new(MemoryTransport::new("memory"));
        let (tx, rx) = job_queue(config.dispatcher.queue_capacity);
        let mut dispatcher = create_dispatcher(
            &config,
            rx,
            dialects::encoder_for(config.dialect),
            PassThroughFactory::new(Arc::clone(&transport)),
        )
        .unwrap();
        dispatcher.run().unwrap();

        for nr in 0..100 {
            tx.submit(Job::new(test_event(nr), 1)).await.unwrap();
        }

        assert!(wait_for(|| transport.call_count() == 100, Duration::from_secs(2)).await);
        dispatcher.stop().await;

        let delivered: Vec<Event> = transport
            .payloads()
            .iter()
            .map(|p| serde_json::from_slice(p).unwrap())
            .collect();
        let numbers: HashSet<u64> = delivered.iter().map(|e| e.nr).collect();
        assert_eq!(delivered.len(), 100);
        assert_eq!(numbers.len(), 100);
        assert_eq!(delivered[0].device_id, "a73b1c37");

        let total = MetricsSnapshot::total(dispatcher.metrics().iter().map(|(_, s)| s));
        assert_eq!(total.received_count, 100);
        assert_eq!(total.delivered_count, 100);
    }

    /// Partial buffers reach the backend through the automatic flush timer
    #[tokio::test]
    async fn test_e2e_automatic_flush_drains_spread_buffers() {
        let config = load(
            r#"
dialect = "csv"

[dispatcher]
max_workers = 3
auto_flush_interval = 1

[worker]
buffer_size = 1000
spread_buffer = true

[backend]
kind = "memory"
buffered = true
"#,
        );
        let transport = Arc::new(MemoryTransport::new("memory"));
        let (tx, rx) = job_queue(config.dispatcher.queue_capacity);
        let mut dispatcher = create_dispatcher(
            &config,
            rx,
            dialects::encoder_for(config.dialect),
            BufferedFactory::new(Arc::clone(&transport)),
        )
        .unwrap();
        dispatcher.run().unwrap();

        let sizes: Vec<_> = dispatcher.workers().iter().map(|w| w.buffer_size).collect();
        assert_eq!(sizes, vec![750, 1000, 1250]);

        for nr in 0..10 {
            tx.submit(Job::new(test_event(nr), 1)).await.unwrap();
        }

        sleep(Duration::from_millis(300)).await;
        assert_eq!(transport.call_count(), 0, "nothing before the first tick");

        assert!(
            wait_for(
                || transport.payloads().len() == 10,
                Duration::from_millis(3500)
            )
            .await
        );
        for payload in transport.payloads() {
            let row = std::str::from_utf8(&payload).unwrap();
            assert!(row.starts_with("a73b1c37,ios,f0ee0c1e,"), "row: {row}");
        }

        dispatcher.stop().await;
    }

    /// A buffered file backend writes one file per flushed batch
    #[tokio::test]
    async fn test_e2e_manual_flush_to_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(
            r#"
[dispatcher]
max_workers = 1

[worker]
buffer_size = 4

[backend]
kind = "memory"
buffered = true
"#,
        );
        let transport = Arc::new(
            FileTransport::new(
                "file",
                FileTransportConfig {
                    base_path: dir.path().to_path_buf(),
                    prefix: "events".to_string(),
                    extension: "json".to_string(),
                    header: None,
                },
            )
            .unwrap(),
        );
        let (tx, rx) = job_queue(config.dispatcher.queue_capacity);
        let mut dispatcher = create_dispatcher(
            &config,
            rx,
            dialects::encoder_for(config.dialect),
            BufferedFactory::new(transport),
        )
        .unwrap();
        dispatcher.run().unwrap();

        // 4 fill the buffer, 2 stay until the manual flush
        for nr in 0..6 {
            tx.submit(Job::new(test_event(nr), 1)).await.unwrap();
        }
        assert!(
            wait_for(
                || {
                    let (_, snapshot) = dispatcher.metrics()[0];
                    snapshot.delivered_count == 4 && snapshot.buffered_len == 2
                },
                Duration::from_secs(1)
            )
            .await
        );

        dispatcher.flush(FlushOptions::manual());
        dispatcher.stop().await;

        let mut files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();
        assert_eq!(files.len(), 2);

        let lines: Vec<usize> = files
            .iter()
            .map(|path| std::fs::read_to_string(path).unwrap().lines().count())
            .collect();
        assert_eq!(lines, vec![4, 2]);

        let first = std::fs::read_to_string(&files[0]).unwrap();
        let event: Event = serde_json::from_str(first.lines().next().unwrap()).unwrap();
        assert_eq!(event, test_event(0));
    }

    /// Transient backend failures are absorbed by the retry policy
    #[tokio::test]
    async fn test_e2e_retry_with_backoff() {
        let config = load(
            r#"
[dispatcher]
max_workers = 1

[worker]
retry_attempt = 3

[worker.backoff]
kind = "fixed"
delay_ms = 10

[backend]
kind = "memory"
"#,
        );
        let transport = Arc::new(MemoryTransport::new("memory"));
        transport.fail_next(2);
        let (tx, rx) = job_queue(config.dispatcher.queue_capacity);
        let mut dispatcher = create_dispatcher(
            &config,
            rx,
            dialects::encoder_for(config.dialect),
            PassThroughFactory::new(Arc::clone(&transport)),
        )
        .unwrap();
        dispatcher.run().unwrap();

        tx.submit(Job::new(test_event(42), 1)).await.unwrap();

        assert!(
            wait_for(
                || dispatcher.metrics()[0].1.delivered_count == 1,
                Duration::from_secs(1)
            )
            .await
        );
        let (_, snapshot) = dispatcher.metrics()[0];
        assert_eq!(snapshot.failed_count, 0);
        assert_eq!(transport.call_count(), 1);

        dispatcher.stop().await;
    }
}
