//! End-to-end scenarios and testable properties from spec §8, driven
//! against the hand-written mock object client in `tests/common`.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::{MockClientFactory, MockObjectClient, MockOutcome, MockPage};
use s3pd_core::config::Config;
use s3pd_core::logging::Logger;
use s3pd_core::orchestrator;

fn config(destination: &std::path::Path, overrides: impl FnOnce(&mut Config)) -> Arc<Config> {
    let mut c = Config {
        bucket: "bucket".to_string(),
        prefix: String::new(),
        destination: destination.to_path_buf(),
        output_every_secs: 3600,
        ..Config::default()
    };
    overrides(&mut c);
    Arc::new(c)
}

// E1: one page, two objects, exact byte match.
#[tokio::test]
async fn e1_single_page_writes_expected_files_and_byte_total() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), |_| {});

    let page = MockPage {
        objects: vec![("a", 10), ("d/b", 20)],
        continuation_token: None,
    };
    let mut bodies = HashMap::new();
    bodies.insert("a".to_string(), MockOutcome::Bytes(vec![1u8; 10]));
    bodies.insert("d/b".to_string(), MockOutcome::Bytes(vec![2u8; 20]));

    let client = Arc::new(MockObjectClient::new(vec![Ok(page)], bodies));
    let factory = Arc::new(MockClientFactory::new(client));
    let logger = Arc::new(Logger::new(0));

    let report = orchestrator::run(cfg.clone(), factory, logger).await;

    assert!(report.success);
    assert_eq!(report.counters.bytes_downloaded(), 30);
    assert_eq!(report.counters.objects_downloaded(), 2);
    assert_eq!(std::fs::metadata(dir.path().join("a")).unwrap().len(), 10);
    assert_eq!(std::fs::metadata(dir.path().join("d/b")).unwrap().len(), 20);
}

// E2: three pages of 1000 keys each, all succeed.
#[tokio::test]
async fn e2_three_pages_of_a_thousand_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), |c| c.concurrent_downloads = 64);

    let mut pages = Vec::new();
    let mut bodies = HashMap::new();
    let mut leaked_keys: Vec<&'static str> = Vec::new();
    for page_idx in 0..3 {
        let mut objects = Vec::new();
        for i in 0..1000 {
            let key: &'static str = Box::leak(format!("p{page_idx}/k{i}").into_boxed_str());
            leaked_keys.push(key);
            objects.push((key, 1024u64));
            bodies.insert(key.to_string(), MockOutcome::Bytes(vec![7u8; 1024]));
        }
        pages.push(Ok(MockPage {
            objects,
            continuation_token: None,
        }));
    }
    // Continuation tokens chain pages 0 -> 1 -> 2 -> done.
    if let Ok(p) = &mut pages[0] {
        p.continuation_token = Some("p1");
    }
    if let Ok(p) = &mut pages[1] {
        p.continuation_token = Some("p2");
    }

    let client = Arc::new(MockObjectClient::new(pages, bodies));
    let factory = Arc::new(MockClientFactory::new(client));
    let logger = Arc::new(Logger::new(0));

    let report = orchestrator::run(cfg, factory, logger).await;

    assert!(report.success);
    assert_eq!(report.counters.objects_downloaded(), 3000);
    assert_eq!(report.counters.bytes_downloaded(), 3 * 1000 * 1024);
}

// E3: list error after one page; already-queued job still completes.
#[tokio::test]
async fn e3_list_error_after_first_page_still_drains_queued_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), |_| {});

    let page = Ok(MockPage {
        objects: vec![("k1", 5)],
        continuation_token: Some("next"),
    });
    let err = Err("simulated list failure".to_string());

    let mut bodies = HashMap::new();
    bodies.insert("k1".to_string(), MockOutcome::Bytes(vec![9u8; 5]));

    let client = Arc::new(MockObjectClient::new(vec![page, err], bodies));
    let factory = Arc::new(MockClientFactory::new(client));
    let logger = Arc::new(Logger::new(0));

    let report = orchestrator::run(cfg, factory, logger).await;

    assert!(!report.success);
    assert_eq!(report.counters.objects_downloaded(), 1);
    assert_eq!(report.counters.objects_queued(), 1);
    assert!(std::fs::metadata(dir.path().join("k1")).unwrap().len() == 5);
}

// E4: concurrency bound is respected under artificial per-GET delay.
#[tokio::test(start_paused = true)]
async fn e4_in_flight_gets_never_exceed_concurrent_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), |c| c.concurrent_downloads = 4);

    let mut objects = Vec::new();
    let mut bodies = HashMap::new();
    let mut leaked_keys: Vec<&'static str> = Vec::new();
    for i in 0..100 {
        let key: &'static str = Box::leak(format!("k{i}").into_boxed_str());
        leaked_keys.push(key);
        objects.push((key, 1u64));
        bodies.insert(key.to_string(), MockOutcome::Bytes(vec![0u8; 1]));
    }
    let page = Ok(MockPage {
        objects,
        continuation_token: None,
    });

    let client = Arc::new(
        MockObjectClient::new(vec![page], bodies).with_delay(Duration::from_millis(50)),
    );
    let max_in_flight = client.max_in_flight.clone();
    let factory = Arc::new(MockClientFactory::new(client));
    let logger = Arc::new(Logger::new(0));

    let report = orchestrator::run(cfg, factory, logger).await;

    assert!(report.success);
    assert!(max_in_flight.load(std::sync::atomic::Ordering::SeqCst) <= 4);
}

// E5: benchmark mode discards bytes; nothing appears on disk.
#[tokio::test]
async fn e5_benchmark_mode_discards_bytes_and_writes_no_files() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), |c| c.benchmark = true);

    let mut objects = Vec::new();
    let mut bodies = HashMap::new();
    let mut leaked_keys: Vec<&'static str> = Vec::new();
    for i in 0..10 {
        let key: &'static str = Box::leak(format!("k{i}").into_boxed_str());
        leaked_keys.push(key);
        objects.push((key, 1_048_576u64));
        bodies.insert(key.to_string(), MockOutcome::Bytes(vec![5u8; 1_048_576]));
    }
    let page = Ok(MockPage {
        objects,
        continuation_token: None,
    });

    let client = Arc::new(MockObjectClient::new(vec![page], bodies));
    let factory = Arc::new(MockClientFactory::new(client));
    let logger = Arc::new(Logger::new(0));

    let report = orchestrator::run(cfg, factory, logger).await;

    assert!(report.success);
    assert_eq!(report.counters.bytes_downloaded(), 10 * 1_048_576);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

// E6: two interfaces, 50 keys, every key consumed exactly once across the
// union of both workers' completions.
#[tokio::test]
async fn e6_multiple_interfaces_partition_work_with_no_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), |c| {
        c.interfaces = vec!["eth0".to_string(), "eth1".to_string()];
    });

    let mut objects = Vec::new();
    let mut bodies = HashMap::new();
    let mut leaked_keys: Vec<&'static str> = Vec::new();
    for i in 0..50 {
        let key: &'static str = Box::leak(format!("k{i}").into_boxed_str());
        leaked_keys.push(key);
        objects.push((key, 1u64));
        bodies.insert(key.to_string(), MockOutcome::Bytes(vec![1u8; 1]));
    }
    let page = Ok(MockPage {
        objects,
        continuation_token: None,
    });

    let client = Arc::new(MockObjectClient::new(vec![page], bodies));
    let dequeued = client.dequeued_keys.clone();
    let factory = Arc::new(MockClientFactory::new(client));
    let logger = Arc::new(Logger::new(0));

    let report = orchestrator::run(cfg, factory, logger).await;

    assert!(report.success);
    assert_eq!(report.counters.objects_downloaded(), 50);

    let mut seen = dequeued.lock().unwrap().clone();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 50, "every key consumed exactly once");
}

// Completeness: empty prefix is a successful no-op with zero counters.
#[tokio::test]
async fn empty_prefix_returns_promptly_with_zero_counters() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), |_| {});

    let client = Arc::new(MockObjectClient::new(
        vec![Ok(MockPage {
            objects: Vec::new(),
            continuation_token: None,
        })],
        HashMap::new(),
    ));
    let factory = Arc::new(MockClientFactory::new(client));
    let logger = Arc::new(Logger::new(0));

    let report = orchestrator::run(cfg, factory, logger).await;

    assert!(report.success);
    assert_eq!(report.counters.objects_queued(), 0);
    assert_eq!(report.counters.objects_downloaded(), 0);
}

// Termination without deadlock: K objects, mixed success/failure, Start
// still returns after exactly K completions.
#[tokio::test]
async fn termination_reaches_exactly_k_completions_with_mixed_outcomes() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), |_| {});

    let mut bodies = HashMap::new();
    bodies.insert("ok".to_string(), MockOutcome::Bytes(vec![1u8; 4]));
    bodies.insert("bad".to_string(), MockOutcome::Fail);

    let page = Ok(MockPage {
        objects: vec![("ok", 4), ("bad", 4)],
        continuation_token: None,
    });

    let client = Arc::new(MockObjectClient::new(vec![page], bodies));
    let factory = Arc::new(MockClientFactory::new(client));
    let logger = Arc::new(Logger::new(0));

    let report = orchestrator::run(cfg, factory, logger).await;

    assert!(!report.success);
    assert_eq!(report.counters.objects_downloaded(), 2);
    assert_eq!(report.counters.objects_queued(), 2);
}
