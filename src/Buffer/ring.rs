use std::cell::UnsafeCell;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};
use std::sync::atomic::{AtomicI64, AtomicUsize};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::Core::Sequence;

/// Round a requested capacity up to the slot count actually allocated:
/// the next power of two, and never less than 2.
pub fn ring_capacity(requested: usize) -> Result<usize> {
    requested
        .max(2)
        .checked_next_power_of_two()
        .filter(|&n| i64::try_from(n).is_ok())
        .ok_or(Error::CapacityOverflow(requested))
}

/// Slot storage shared by both queue variants.
///
/// `published[i]` holds `seq + 1` of the last sequence made visible in slot
/// `i`, so a zeroed marker means "never published" and a marker left over from
/// the previous lap never matches the sequence the consumer is looking for.
pub(crate) struct Ring<T> {
    pub(crate) slots: Box<[UnsafeCell<T>]>,
    pub(crate) published: Box<[AtomicI64]>,
    pub(crate) mask: i64,
}

impl<T: Default> Ring<T> {
    pub(crate) fn new(requested: usize) -> Result<Self> {
        let capacity = ring_capacity(requested)?;
        let slots = (0..capacity).map(|_| UnsafeCell::new(T::default())).collect();
        let published = (0..capacity).map(|_| AtomicI64::new(0)).collect();
        Ok(Self {
            slots,
            published,
            mask: capacity as i64 - 1,
        })
    }
}

impl<T> Ring<T> {
    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn index(&self, seq: Sequence) -> usize {
        (seq.value() & self.mask) as usize
    }

    #[inline]
    pub(crate) fn slot(&self, seq: Sequence) -> *mut T {
        self.slots[self.index(seq)].get()
    }

    /// Release-store the marker; pairs with the acquire in `is_published`.
    #[inline]
    pub(crate) fn publish(&self, seq: Sequence) {
        self.published[self.index(seq)].store(seq.value() + 1, Release);
    }

    #[inline]
    pub(crate) fn is_published(&self, seq: Sequence) -> bool {
        self.published[self.index(seq)].load(Acquire) == seq.value() + 1
    }

    #[inline]
    pub(crate) fn has_room(&self, producer: i64, consumer: &AtomicI64) -> bool {
        producer - consumer.load(Acquire) < self.mask + 1
    }

    /// Spin-yield until sequence `producer` fits in the ring.
    pub(crate) fn wait_for_room(&self, producer: i64, consumer: &AtomicI64, blocks: &AtomicUsize) {
        if self.has_room(producer, consumer) {
            return;
        }

        blocks.fetch_add(1, Relaxed);
        tracing::trace!(sequence = producer, "claim blocked on a full ring");

        while !self.has_room(producer, consumer) {
            thread::yield_now();
        }
    }

    /// Like [`Ring::wait_for_room`] but gives up after `timeout`.
    /// Returns whether the slot became free.
    pub(crate) fn wait_for_room_for(
        &self,
        producer: i64,
        consumer: &AtomicI64,
        blocks: &AtomicUsize,
        timeout: Duration,
    ) -> bool {
        if self.has_room(producer, consumer) {
            return true;
        }

        blocks.fetch_add(1, Relaxed);
        tracing::trace!(sequence = producer, ?timeout, "bounded claim blocked on a full ring");

        let started = Instant::now();
        loop {
            thread::yield_now();
            if self.has_room(producer, consumer) {
                return true;
            }
            if started.elapsed() >= timeout {
                return false;
            }
        }
    }
}

/// Consumer-side bookkeeping identical in both variants.
pub(crate) fn try_fetch<T>(ring: Option<&Ring<T>>, consumer: &AtomicI64) -> Sequence {
    let Some(ring) = ring else {
        return Sequence::INVALID;
    };
    let head = Sequence::new(consumer.load(Relaxed));
    if ring.is_published(head) {
        head
    } else {
        Sequence::INVALID
    }
}

pub(crate) fn is_fetchable<T>(ring: Option<&Ring<T>>, consumer: &AtomicI64, seq: Sequence) -> bool {
    match ring {
        Some(ring) => seq.value() == consumer.load(Relaxed) && ring.is_published(seq),
        None => false,
    }
}

/// Consumer cursor first: the producer cursor can only be ahead of it.
pub(crate) fn size(consumer: &AtomicI64, producer: &AtomicI64) -> usize {
    let consumer = consumer.load(Relaxed);
    let producer = producer.load(Relaxed);
    producer.saturating_sub(consumer).max(0) as usize
}
