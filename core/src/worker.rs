//! C5: the worker pipeline, spec §4.4.
//!
//! A worker is a long-lived loop bound to one optional network interface
//! and one object-client instance, bounding in-flight GETs with a permit
//! semaphore and dispatching each as a spawned task so the loop never awaits
//! a GET directly. The drain phase — not returning until every dispatched
//! GET's completion handler has fired — is implemented by holding every
//! spawned task's `JoinHandle` and awaiting them all once the queue reports
//! closed, rather than literally re-acquiring `concurrent_downloads`
//! permits in sequence as spec §4.4 describes the C++ original doing: both
//! guarantee the same thing (no completion fires after the worker returns),
//! and joining handles doesn't require the worker to know how many permits
//! it still holds.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::client::ObjectClient;
use crate::counters::Counters;
use crate::error::S3pdError;
use crate::logging::Logger;
use crate::queue::{PollResult, WorkQueue};
use crate::sink::SinkFactory;

pub struct WorkerOutcome {
    pub had_failure: bool,
}

pub async fn run(
    bucket: Arc<String>,
    client: Arc<dyn ObjectClient>,
    queue: WorkQueue,
    counters: Arc<Counters>,
    sink_factory: Arc<SinkFactory>,
    logger: Arc<Logger>,
    concurrent_downloads: usize,
) -> WorkerOutcome {
    let semaphore = Arc::new(Semaphore::new(concurrent_downloads.max(1)));
    let mut dispatched = Vec::new();

    loop {
        let object = match queue.poll().await {
            PollResult::Job(object) => object,
            PollResult::Closed => break,
        };

        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore is never closed");

        let client = client.clone();
        let sink_factory = sink_factory.clone();
        let counters = counters.clone();
        let logger = logger.clone();
        let bucket = bucket.clone();

        dispatched.push(tokio::spawn(async move {
            let key = object.key.clone();

            let result: Result<(), S3pdError> = async {
                let sink = sink_factory
                    .create(&key)
                    .await
                    .map_err(|e| S3pdError::sink(&key, e))?;

                let counters_for_chunk = counters.clone();
                let on_chunk = move |n: u64| counters_for_chunk.add_downloaded_bytes(n);

                client.get_object(&bucket, &object, &sink, &on_chunk).await
            }
            .await;

            if let Err(e) = &result {
                logger.error(&format!("{e}"));
            }

            // objects_downloaded counts terminal attempts, success or
            // failure, so the `objects_downloaded == objects_queued`
            // termination check in the orchestrator can be reached even
            // when some jobs fail (spec §4.4/§7).
            counters.add_downloaded_object();
            drop(permit);

            result.is_err()
        }));
    }

    let mut had_failure = false;
    for handle in dispatched {
        match handle.await {
            Ok(failed) => had_failure |= failed,
            Err(_join_error) => had_failure = true,
        }
    }

    WorkerOutcome { had_failure }
}
