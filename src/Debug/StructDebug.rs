use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use crate::Core::Event;
use crate::Buffer::ring::Ring;
use crate::Buffer::{Batch, MpscQueue, Queue, SpscQueue};
use crate::Worker::Activity;

/// Shared rendering for both queue variants
///
/// Shows:
/// - Capacity (0 when never reserved)
/// - Producer and consumer cursors
/// - Blocked-claim counter
///
/// Slot contents are never read, so this is safe to call from any thread.
fn debug_queue<T>(
    name: &str,
    ring: Option<&Ring<T>>,
    producer: &AtomicI64,
    consumer: &AtomicI64,
    blocks: &AtomicUsize,
    f: &mut fmt::Formatter<'_>,
) -> fmt::Result {
    f.debug_struct(name)
        .field("capacity", &ring.map_or(0, Ring::capacity))
        .field("producer", &producer.load(Ordering::Relaxed))
        .field("consumer", &consumer.load(Ordering::Relaxed))
        .field("blocks", &blocks.load(Ordering::Relaxed))
        .finish_non_exhaustive()
}

impl<T> fmt::Debug for SpscQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_queue(
            "SpscQueue",
            self.ring.as_ref(),
            &self.producer,
            &self.consumer,
            &self.blocks,
            f,
        )
    }
}

impl<T> fmt::Debug for MpscQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_queue(
            "MpscQueue",
            self.ring.as_ref(),
            &self.producer,
            &self.consumer,
            &self.blocks,
            f,
        )
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("raised", &self.raised.load(Ordering::Relaxed))
            .field("consumed", &self.consumed.load(Ordering::Relaxed))
            .field("sleepers", &self.sleepers.load(Ordering::Relaxed))
            .finish()
    }
}

/// Debug for Activity
///
/// The worker handle is reported by presence only; its lock is taken with
/// `try_lock` so formatting never waits on a concurrent `stop`.
impl<T, Q> fmt::Debug for Activity<T, Q>
where
    Q: Queue<Item = T> + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let worker = match self.worker.try_lock() {
            Some(guard) if guard.is_some() => "running",
            Some(_) => "none",
            None => "<locked>",
        };
        f.debug_struct("Activity")
            .field("thread", &self.thread_name)
            .field("worker", &format_args!("{worker}"))
            .field("stopping", &self.shared.stopping.load(Ordering::Relaxed))
            .field("queue", &self.shared.queue)
            .field("event", &self.shared.event)
            .finish()
    }
}

impl<Q: Queue> fmt::Debug for Batch<'_, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batch")
            .field("size", &self.size())
            .field("fetched", &self.fetched_count())
            .field("head", &self.try_fetch())
            .finish_non_exhaustive()
    }
}
