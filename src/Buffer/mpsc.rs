use crossbeam_utils::CachePadded;
use std::sync::atomic::Ordering::{Relaxed, Release};
use std::sync::atomic::{AtomicI64, AtomicUsize};
use std::thread;
use std::time::{Duration, Instant};

use super::ring::{self, Ring};
use super::{MultiProducer, Queue};
use crate::error::Result;
use crate::Core::Sequence;

/// Bounded multi-producer, single-consumer queue.
///
/// ### Concurrency Design:
/// - **Producers (claim)**: each claim takes the next sequence with a
///   `fetch_add` on the shared producer cursor, so racing producers never
///   share a slot.
/// - **Publication**: a producer writes its slot, then stores `seq + 1` into
///   the slot's marker with release ordering.
/// - **Consumer (fetch)**: the consumer only advances when the marker of the
///   slot at its cursor equals `cursor + 1`. Entries therefore surface in
///   sequence order, and a producer that claimed early but publishes late
///   holds back everything claimed after it.
pub struct MpscQueue<T> {
    pub(crate) ring: Option<Ring<T>>,
    pub(crate) producer: CachePadded<AtomicI64>,
    pub(crate) consumer: CachePadded<AtomicI64>,
    pub(crate) blocks: AtomicUsize,
}

// SAFETY: every claimed slot belongs to exactly one producer until it is
// published, and to the consumer from then until `fetched`.
unsafe impl<T: Send> Sync for MpscQueue<T> {}

impl<T> Default for MpscQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MpscQueue<T> {
    /// An empty queue with no storage. Every claim fails until `reserve`.
    pub fn new() -> Self {
        Self {
            ring: None,
            producer: CachePadded::new(AtomicI64::new(0)),
            consumer: CachePadded::new(AtomicI64::new(0)),
            blocks: AtomicUsize::new(0),
        }
    }

    fn ring(&self) -> &Ring<T> {
        match &self.ring {
            Some(ring) => ring,
            None => panic!("slot access on a queue that was never reserved"),
        }
    }
}

impl<T: Default + Send> MpscQueue<T> {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut queue = Self::new();
        queue.reserve(capacity)?;
        Ok(queue)
    }
}

impl<T: Default + Send> Queue for MpscQueue<T> {
    type Item = T;

    fn is_reserved(&self) -> bool {
        self.ring.is_some()
    }

    fn reserve(&mut self, capacity: usize) -> Result<()> {
        self.ring = Some(Ring::new(capacity)?);
        *self.producer.get_mut() = 0;
        *self.consumer.get_mut() = 0;
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.ring.as_ref().map_or(0, Ring::capacity)
    }

    fn size(&self) -> usize {
        ring::size(&self.consumer, &self.producer)
    }

    fn blocks_count(&self) -> usize {
        self.blocks.load(Relaxed)
    }

    fn clear_blocks_count(&self) {
        self.blocks.store(0, Relaxed);
    }

    fn claim(&self) -> Sequence {
        let Some(ring) = &self.ring else {
            return Sequence::INVALID;
        };

        let p = self.producer.fetch_add(1, Relaxed);
        ring.wait_for_room(p, &self.consumer, &self.blocks);
        Sequence::new(p)
    }

    /// Bounded claim.
    ///
    /// Unlike [`claim`](Queue::claim) this only takes a sequence once the ring
    /// has room for it, using a compare-exchange on the producer cursor. A
    /// claim that times out therefore owns no sequence, and the consumer is
    /// never left waiting on a slot nobody will publish.
    fn claim_for(&self, timeout: Duration) -> Sequence {
        let Some(ring) = &self.ring else {
            return Sequence::INVALID;
        };

        let mut started: Option<Instant> = None;
        let mut p = self.producer.load(Relaxed);
        loop {
            if ring.has_room(p, &self.consumer) {
                match self
                    .producer
                    .compare_exchange_weak(p, p + 1, Relaxed, Relaxed)
                {
                    Ok(_) => return Sequence::new(p),
                    Err(actual) => {
                        p = actual;
                        continue;
                    }
                }
            }

            let since = *started.get_or_insert_with(|| {
                self.blocks.fetch_add(1, Relaxed);
                tracing::trace!(sequence = p, ?timeout, "bounded claim blocked on a full ring");
                Instant::now()
            });
            if since.elapsed() >= timeout {
                return Sequence::INVALID;
            }

            thread::yield_now();
            p = self.producer.load(Relaxed);
        }
    }

    unsafe fn slot_mut(&self, seq: Sequence) -> &mut T {
        &mut *self.ring().slot(seq)
    }

    unsafe fn publish(&self, seq: Sequence) {
        self.ring().publish(seq);
    }

    fn try_fetch(&self) -> Sequence {
        ring::try_fetch(self.ring.as_ref(), &self.consumer)
    }

    fn is_fetchable(&self, seq: Sequence) -> bool {
        ring::is_fetchable(self.ring.as_ref(), &self.consumer, seq)
    }

    unsafe fn slot(&self, seq: Sequence) -> &T {
        &*self.ring().slot(seq)
    }

    unsafe fn fetched(&self) {
        let head = self.consumer.load(Relaxed);
        self.consumer.store(head + 1, Release);
    }
}

// SAFETY: `claim` and `claim_for` hand out each sequence exactly once even
// when called from many threads at the same time.
unsafe impl<T: Default + Send> MultiProducer for MpscQueue<T> {}
