mod batch;
mod mpsc;
pub(crate) mod ring;
mod spsc;

pub use batch::Batch;
pub use mpsc::MpscQueue;
pub use ring::ring_capacity;
pub use spsc::SpscQueue;

use std::time::Duration;

use crate::error::{Error, Result};
use crate::Core::Sequence;

/// Claim/publish on the producer side, fetch/ack on the consumer side.
///
/// A producer claims a [`Sequence`], writes the slot through
/// [`slot_mut`](Queue::slot_mut) and makes it visible with
/// [`publish`](Queue::publish). The single consumer polls
/// [`try_fetch`](Queue::try_fetch), reads the slot, then acknowledges it with
/// [`fetched`](Queue::fetched). Consumers normally go through [`Batch`],
/// which keeps those steps safe.
pub trait Queue: Send + Sync {
    type Item;

    fn is_reserved(&self) -> bool;

    /// Allocate storage for at least `capacity` entries (rounded up to a power
    /// of two, minimum 2) and reset both cursors.
    fn reserve(&mut self, capacity: usize) -> Result<()>;

    /// Slots allocated, `0` before `reserve`.
    fn capacity(&self) -> usize;

    /// Claimed but not yet acknowledged entries. Approximate while producers
    /// are active.
    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// How many claims found the ring full and had to wait.
    fn blocks_count(&self) -> usize;

    fn clear_blocks_count(&self);

    /// Reserve the next sequence, spin-yielding while the ring is full.
    /// Returns [`Sequence::INVALID`] only if the queue was never reserved.
    fn claim(&self) -> Sequence;

    /// Like [`claim`](Queue::claim) but gives up with [`Sequence::INVALID`]
    /// once `timeout` has passed. A timed-out claim owns no slot.
    fn claim_for(&self, timeout: Duration) -> Sequence;

    /// Exclusive access to a slot.
    ///
    /// # Safety
    /// The caller must be the only thread touching the slot: either the
    /// producer that claimed `seq` and has not published it yet, or the
    /// consumer holding `seq` between `try_fetch` and `fetched`.
    #[allow(clippy::mut_from_ref)]
    unsafe fn slot_mut(&self, seq: Sequence) -> &mut Self::Item;

    /// Make a claimed slot visible to the consumer.
    ///
    /// # Safety
    /// `seq` must be a sequence the caller claimed, fully written, and not
    /// published before. After this call the caller must not touch the slot.
    unsafe fn publish(&self, seq: Sequence);

    /// The consumer cursor if its slot has been published, otherwise
    /// [`Sequence::INVALID`]. Never advances anything.
    fn try_fetch(&self) -> Sequence;

    /// Whether `seq` is the consumer cursor and its slot is published.
    fn is_fetchable(&self, seq: Sequence) -> bool;

    /// Consumer access to the slot at the cursor.
    ///
    /// # Safety
    /// Only the single consumer may call this, with a sequence returned by
    /// `try_fetch` and not yet acknowledged.
    unsafe fn slot(&self, seq: Sequence) -> &Self::Item;

    /// Acknowledge the entry at the cursor and free its slot.
    ///
    /// # Safety
    /// Only the single consumer may call this, once per successful
    /// `try_fetch`, after it has finished with the slot.
    unsafe fn fetched(&self);
}

/// Queues whose claims may race from any number of threads.
///
/// # Safety
/// Implementors guarantee that concurrent `claim`/`claim_for` calls never
/// return the same sequence.
pub unsafe trait MultiProducer: Queue {
    /// Claim, write and publish `value` in one step.
    fn push(&self, value: Self::Item) -> Result<()> {
        let seq = self.claim();
        if seq.is_invalid() {
            return Err(Error::NotReserved);
        }
        // SAFETY: `seq` is ours alone until published.
        unsafe {
            *self.slot_mut(seq) = value;
            self.publish(seq);
        }
        Ok(())
    }

    /// [`push`](MultiProducer::push) with a bound on how long a full ring may
    /// hold the caller.
    fn push_for(&self, value: Self::Item, timeout: Duration) -> Result<()> {
        let seq = self.claim_for(timeout);
        if seq.is_invalid() {
            return Err(if self.is_reserved() {
                Error::Timeout
            } else {
                Error::NotReserved
            });
        }
        // SAFETY: `seq` is ours alone until published.
        unsafe {
            *self.slot_mut(seq) = value;
            self.publish(seq);
        }
        Ok(())
    }
}
