//! C1: the abstract object-store client. Spec §4.1/§4.4/§6 treat the
//! HTTP/range-GET transport as an abstract capability; this trait is that
//! seam. Production code uses `client::s3::S3ObjectClient`; tests use a
//! hand-written mock (see `core/tests/common`).

pub mod interface;
pub mod s3;

use crate::error::S3pdError;
use crate::object::ListPage;
use crate::object::ObjectRef;
use crate::sink::AnySink;
use async_trait::async_trait;
use std::sync::Arc;

/// Invoked from the body-chunk callback on the hot path as bytes arrive;
/// implementations must be cheap (an atomic increment, typically).
pub type ChunkCallback = dyn Fn(u64) + Send + Sync;

#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Issues one paginated list request. `continuation_token` is `None` on
    /// the first call; callers pass the previous page's token until a page
    /// comes back with `continuation_token: None`, which signals the end.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<&str>,
        page_size: i32,
    ) -> Result<ListPage, S3pdError>;

    /// Fetches one object, internally parallelizing into ranged
    /// sub-requests sized by the client's configured part size and
    /// streaming each chunk to `sink` as it arrives. `on_chunk` is called
    /// once per received chunk with its length in bytes; this is the
    /// worker's hot-path counter update (spec §4.2/§4.4).
    async fn get_object(
        &self,
        bucket: &str,
        object: &ObjectRef,
        sink: &AnySink,
        on_chunk: &ChunkCallback,
    ) -> Result<(), S3pdError>;
}

/// Builds one `ObjectClient` per worker. Spec §4.4/§4.7/§9: "pin egress by
/// constructing a dedicated client per interface"; the orchestrator calls
/// this once per configured interface (or once, with `None`, if none are
/// configured) as part of "initialize the object-client subsystem once,
/// process-wide."
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn build(&self, interface: Option<&str>) -> Result<Arc<dyn ObjectClient>, S3pdError>;
}
