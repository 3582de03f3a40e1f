//! Shared atomic tallies, spec §3/§4.2.
//!
//! Four nonnegative monotonic integers, each updated by a distinct set of
//! writers and read without synchronization by the progress observer.
//! Relaxed ordering is sufficient: the observer tolerates staleness, and the
//! termination check only reads `objects_downloaded == objects_queued` after
//! `producer_done` has already been observed true (acquire/release on that
//! flag lives in `WorkQueue`, not here).

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Counters {
    bytes_queued: AtomicU64,
    bytes_downloaded: AtomicU64,
    objects_queued: AtomicU64,
    objects_downloaded: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_queued(&self, objects: u64, bytes: u64) {
        self.objects_queued.fetch_add(objects, Ordering::Relaxed);
        self.bytes_queued.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn add_downloaded_bytes(&self, bytes: u64) {
        self.bytes_downloaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn add_downloaded_object(&self) {
        self.objects_downloaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_queued(&self) -> u64 {
        self.bytes_queued.load(Ordering::Relaxed)
    }

    pub fn bytes_downloaded(&self) -> u64 {
        self.bytes_downloaded.load(Ordering::Relaxed)
    }

    pub fn objects_queued(&self) -> u64 {
        self.objects_queued.load(Ordering::Relaxed)
    }

    pub fn objects_downloaded(&self) -> u64 {
        self.objects_downloaded.load(Ordering::Relaxed)
    }
}
