//! Hand-written mock `ObjectClient`/`ClientFactory` used by the integration
//! tests in this directory to exercise spec §8's testable properties
//! without any real network access.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use s3pd_core::client::{ChunkCallback, ClientFactory, ObjectClient};
use s3pd_core::error::S3pdError;
use s3pd_core::object::{ListPage, ObjectRef};
use s3pd_core::sink::{AnySink, Sink};

#[derive(Clone)]
pub struct MockPage {
    pub objects: Vec<(&'static str, u64)>,
    pub continuation_token: Option<&'static str>,
}

pub enum MockOutcome {
    Bytes(Vec<u8>),
    Fail,
}

/// Shared test double: pages are consumed in order by whichever worker
/// calls `list_page` next (there is only ever one lister in this
/// architecture, but the mock doesn't assume that). `get_object` looks up
/// canned bytes per key and optionally delays, to drive the concurrency
/// bound test.
pub struct MockObjectClient {
    pages: Mutex<VecDeque<Result<MockPage, String>>>,
    bodies: HashMap<String, MockOutcome>,
    delay: Option<std::time::Duration>,
    pub max_in_flight: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    pub dequeued_keys: Arc<Mutex<Vec<String>>>,
}

impl MockObjectClient {
    pub fn new(pages: Vec<Result<MockPage, String>>, bodies: HashMap<String, MockOutcome>) -> Self {
        Self {
            pages: Mutex::new(pages.into_iter().collect()),
            bodies,
            delay: None,
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            dequeued_keys: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl ObjectClient for MockObjectClient {
    async fn list_page(
        &self,
        _bucket: &str,
        _prefix: &str,
        _continuation_token: Option<&str>,
        _page_size: i32,
    ) -> Result<ListPage, S3pdError> {
        let next = self.pages.lock().unwrap().pop_front();
        match next {
            None => Ok(ListPage {
                objects: Vec::new(),
                continuation_token: None,
            }),
            Some(Err(msg)) => Err(S3pdError::List(msg)),
            Some(Ok(page)) => Ok(ListPage {
                objects: page
                    .objects
                    .into_iter()
                    .map(|(k, s)| ObjectRef::new(k, s))
                    .collect(),
                continuation_token: page.continuation_token.map(str::to_string),
            }),
        }
    }

    async fn get_object(
        &self,
        _bucket: &str,
        object: &ObjectRef,
        sink: &AnySink,
        on_chunk: &ChunkCallback,
    ) -> Result<(), S3pdError> {
        self.dequeued_keys.lock().unwrap().push(object.key.clone());

        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let result = match self.bodies.get(&object.key) {
            Some(MockOutcome::Bytes(bytes)) => {
                sink.write_at(0, bytes::Bytes::from(bytes.clone()))
                    .await
                    .map_err(|e| S3pdError::sink(&object.key, e))?;
                on_chunk(bytes.len() as u64);
                sink.finish(object.size).await.map_err(|e| S3pdError::sink(&object.key, e))
            }
            Some(MockOutcome::Fail) => Err(S3pdError::get(
                object.key.clone(),
                std::io::Error::new(std::io::ErrorKind::Other, "mock failure"),
            )),
            None => Err(S3pdError::get(
                object.key.clone(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no mock body registered"),
            )),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Hands out the same client for every interface (single-node test setup);
/// each "worker" in multi-interface tests still gets distinguishable
/// dequeue tracking through `dequeued_keys`.
pub struct MockClientFactory {
    pub client: Arc<MockObjectClient>,
}

impl MockClientFactory {
    pub fn new(client: Arc<MockObjectClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClientFactory for MockClientFactory {
    async fn build(&self, _interface: Option<&str>) -> Result<Arc<dyn ObjectClient>, S3pdError> {
        Ok(self.client.clone())
    }
}
