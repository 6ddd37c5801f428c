use crossbeam_utils::CachePadded;
use std::sync::atomic::Ordering::{Relaxed, Release};
use std::sync::atomic::{AtomicI64, AtomicUsize};
use std::time::Duration;

use super::ring::{self, Ring};
use super::Queue;
use crate::error::Result;
use crate::Core::Sequence;

/// Bounded single-producer, single-consumer queue.
///
/// The producer cursor is only ever written by the one producer thread, so a
/// claim is a plain load/store rather than a read-modify-write. Entries reach
/// the consumer in exactly the order they were claimed.
///
/// There is no safe `push` on this type: two threads claiming at once could
/// be handed the same slot. Use [`MpscQueue`](super::MpscQueue) when producers
/// are shared.
pub struct SpscQueue<T> {
    pub(crate) ring: Option<Ring<T>>,
    pub(crate) producer: CachePadded<AtomicI64>,
    pub(crate) consumer: CachePadded<AtomicI64>,
    pub(crate) blocks: AtomicUsize,
}

// SAFETY: slot contents only cross threads through the publish/fetch
// handshake, which hands each value from one thread to another.
unsafe impl<T: Send> Sync for SpscQueue<T> {}

impl<T> Default for SpscQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SpscQueue<T> {
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

impl<T: Default + Send> SpscQueue<T> {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut queue = Self::new();
        queue.reserve(capacity)?;
        Ok(queue)
    }
}

impl<T: Default + Send> Queue for SpscQueue<T> {
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

        let p = self.producer.load(Relaxed);
        self.producer.store(p + 1, Relaxed);
        ring.wait_for_room(p, &self.consumer, &self.blocks);
        Sequence::new(p)
    }

    fn claim_for(&self, timeout: Duration) -> Sequence {
        let Some(ring) = &self.ring else {
            return Sequence::INVALID;
        };

        // The cursor only moves once the slot is ours, so a timeout leaves
        // nothing behind for the consumer to stall on.
        let p = self.producer.load(Relaxed);
        if !ring.wait_for_room_for(p, &self.consumer, &self.blocks, timeout) {
            return Sequence::INVALID;
        }
        self.producer.store(p + 1, Relaxed);
        Sequence::new(p)
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
