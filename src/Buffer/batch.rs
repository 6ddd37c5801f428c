use std::ops::{Index, IndexMut};

use super::Queue;
use crate::Core::Sequence;

/// Consumer view of a queue for one wake-up of the worker.
///
/// A batch owns nothing: every call goes straight to the queue, so entries
/// published while the handler runs are fetchable through the same batch.
/// [`size`](Batch::size) is the queue depth when the batch was made and can
/// be stale by the time it is read.
///
/// Indexing only accepts the sequence currently at the consumer cursor and
/// panics otherwise, which keeps handler code free of `unsafe`.
pub struct Batch<'a, Q: Queue> {
    queue: &'a Q,
    size: usize,
    fetched: usize,
}

impl<'a, Q: Queue> Batch<'a, Q> {
    /// # Safety
    /// The caller must be the queue's only consumer for as long as the batch
    /// lives.
    pub unsafe fn new(queue: &'a Q) -> Self {
        Self {
            queue,
            size: queue.size(),
            fetched: 0,
        }
    }

    /// Queue depth when the batch was created.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Entries this batch has acknowledged so far.
    pub fn fetched_count(&self) -> usize {
        self.fetched
    }

    pub fn try_fetch(&self) -> Sequence {
        self.queue.try_fetch()
    }

    /// Acknowledge the entry returned by the last successful
    /// [`try_fetch`](Batch::try_fetch).
    ///
    /// # Panics
    /// If no entry is fetchable at the cursor.
    pub fn fetched(&mut self) {
        assert!(
            self.queue.try_fetch().is_valid(),
            "fetched() called without a fetchable entry"
        );
        // SAFETY: we are the single consumer and the head slot is published.
        unsafe { self.queue.fetched() };
        self.fetched += 1;
    }

    /// Move the value out of `seq`, leaving `Default` behind.
    pub fn take(&mut self, seq: Sequence) -> Q::Item
    where
        Q::Item: Default,
    {
        std::mem::take(&mut self[seq])
    }

    /// Hand every fetchable entry to `f` in order, acknowledging each one.
    /// Returns how many entries were processed.
    pub fn drain<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(Sequence, &mut Q::Item),
    {
        let mut count = 0;
        loop {
            let seq = self.try_fetch();
            if seq.is_invalid() {
                return count;
            }
            f(seq, &mut self[seq]);
            self.fetched();
            count += 1;
        }
    }

    fn check(&self, seq: Sequence) {
        assert!(
            self.queue.is_fetchable(seq),
            "{seq} is not the fetchable head of the queue"
        );
    }
}

impl<Q: Queue> Index<Sequence> for Batch<'_, Q> {
    type Output = Q::Item;

    fn index(&self, seq: Sequence) -> &Q::Item {
        self.check(seq);
        // SAFETY: single consumer, `seq` is the published head.
        unsafe { self.queue.slot(seq) }
    }
}

impl<Q: Queue> IndexMut<Sequence> for Batch<'_, Q> {
    fn index_mut(&mut self, seq: Sequence) -> &mut Q::Item {
        self.check(seq);
        // SAFETY: single consumer, `seq` is the published head, and the
        // producer cannot reuse the slot before `fetched`.
        unsafe { self.queue.slot_mut(seq) }
    }
}
