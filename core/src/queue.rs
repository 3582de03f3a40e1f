//! C2: the bounded-or-unbounded FIFO of pending `ObjectRef`s, spec §4.1.
//!
//! Built on `async_channel` — the same crate the teacher already reaches for
//! as its SPMC primitive (its `enumerate_files` work queue). A `push` is
//! exactly the channel's `send`; `closeProducer` is `Sender::close`; `poll`
//! is `Receiver::recv`, which already has the closed-and-drained semantics
//! spec §4.1 asks for: it blocks while the queue is empty and open, returns
//! the head immediately once one is queued (even after the producer has
//! closed), and only reports closed once empty *and* closed.

use std::sync::Arc;

use crate::counters::Counters;
use crate::object::ObjectRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    Job(ObjectRef),
    Closed,
}

#[derive(Clone)]
pub struct WorkQueue {
    tx: async_channel::Sender<ObjectRef>,
    rx: async_channel::Receiver<ObjectRef>,
    counters: Arc<Counters>,
}

impl WorkQueue {
    pub fn new(counters: Arc<Counters>) -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self { tx, rx, counters }
    }

    /// Appends `object`, updates `objects_queued`/`bytes_queued`, and wakes
    /// one waiter. Cannot fail under correct usage: the only way `send`
    /// returns an error is if every receiver (every worker) has already
    /// dropped, which cannot happen before `close_producer` runs.
    pub fn push(&self, object: ObjectRef) {
        self.counters.add_queued(1, object.size);
        let _ = self.tx.try_send(object);
    }

    /// Sets `producer_done` and wakes every waiter. Idempotent.
    pub fn close_producer(&self) {
        self.tx.close();
    }

    /// Blocks until a job is available or the queue is closed and drained.
    pub async fn poll(&self) -> PollResult {
        match self.rx.recv().await {
            Ok(object) => PollResult::Job(object),
            Err(async_channel::RecvError) => PollResult::Closed,
        }
    }
}
