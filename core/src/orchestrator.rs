//! C8: the orchestrator, spec §4.7.
//!
//! Owns the whole lifecycle: initializes the object-client subsystem,
//! spawns the lister and one worker per configured interface (or exactly
//! one, if none are configured), runs the progress observer, waits for
//! quiescence, and tears everything down. Quiescence is
//! `producer_done && objects_downloaded == objects_queued` — spec §9 calls
//! out the original's `producerDone && queue.empty()` as the wrong
//! predicate, since in-flight jobs can have left the queue without having
//! completed yet; this orchestrator never even asks the queue whether it is
//! empty, only whether the counters agree.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::client::ClientFactory;
use crate::config::Config;
use crate::counters::Counters;
use crate::logging::Logger;
use crate::queue::WorkQueue;
use crate::sink::SinkFactory;
use crate::{lister, worker};

pub struct RunReport {
    pub counters: Arc<Counters>,
    /// Disjunction of "lister failed" and "any worker recorded >= 1 GET
    /// failure" — spec §4.7/§7's exit-code rule.
    pub success: bool,
}

pub async fn run(config: Arc<Config>, factory: Arc<dyn ClientFactory>, logger: Arc<Logger>) -> RunReport {
    let counters = Arc::new(Counters::new());
    let queue = WorkQueue::new(counters.clone());

    let sink_factory = Arc::new(if config.benchmark {
        SinkFactory::discard()
    } else {
        SinkFactory::filesystem(config.destination.clone())
    });

    let interfaces: Vec<Option<String>> = if config.interfaces.is_empty() {
        vec![None]
    } else {
        config.interfaces.iter().cloned().map(Some).collect()
    };

    let mut clients = Vec::with_capacity(interfaces.len());
    for interface in &interfaces {
        match factory.build(interface.as_deref()).await {
            Ok(client) => clients.push(client),
            Err(e) => {
                logger.error(&format!("failed to initialize object-client subsystem: {e}"));
                return RunReport {
                    counters,
                    success: false,
                };
            }
        }
    }

    let (stop_tx, stop_rx) = watch::channel(false);

    let progress_handle = tokio::spawn(crate::progress::run(
        counters.clone(),
        logger.clone(),
        Duration::from_secs(config.output_every_secs),
        stop_rx,
    ));

    let lister_handle = tokio::spawn(lister::run(
        clients[0].clone(),
        config.bucket.clone(),
        config.prefix.clone(),
        queue.clone(),
        logger.clone(),
    ));

    let bucket = Arc::new(config.bucket.clone());
    let mut worker_handles = Vec::with_capacity(clients.len());
    for client in clients {
        worker_handles.push(tokio::spawn(worker::run(
            bucket.clone(),
            client,
            queue.clone(),
            counters.clone(),
            sink_factory.clone(),
            logger.clone(),
            config.concurrent_downloads,
        )));
    }

    let list_result = lister_handle.await.expect("lister task panicked");

    let mut had_worker_failure = false;
    for handle in worker_handles {
        let outcome = handle.await.expect("worker task panicked");
        had_worker_failure |= outcome.had_failure;
    }

    let _ = stop_tx.send(true);
    let _ = progress_handle.await;

    debug_assert_eq!(counters.objects_downloaded(), counters.objects_queued());

    logger.info(&format!(
        "mirror complete: {} objects, {} bytes downloaded",
        counters.objects_downloaded(),
        counters.bytes_downloaded()
    ));

    RunReport {
        counters,
        success: list_result.is_ok() && !had_worker_failure,
    }
}
