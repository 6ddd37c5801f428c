use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

#[cfg(not(target_os = "linux"))]
use parking_lot::{Condvar, Mutex};

/// Single-waiter wake-up signal backed by one futex word.
///
/// Only `raised` is waited on by the kernel. `consumed` and `sleepers` are
/// bookkeeping words beside it: `raised` counts notifications issued,
/// `consumed` the ones a waiter has already returned for, and `sleepers` how
/// many threads are parked right now. A notification that lands while nobody is parked
/// stays pending until the next [`Event::wait`], and any number of pending
/// notifications collapse into one wake-up.
///
/// Notifiers only pay for a syscall when a waiter is actually parked.
pub struct Event {
    pub(crate) raised: CachePadded<AtomicU32>,
    pub(crate) consumed: AtomicU32,
    pub(crate) sleepers: AtomicU32,
    #[cfg(not(target_os = "linux"))]
    lock: Mutex<()>,
    #[cfg(not(target_os = "linux"))]
    cond: Condvar,
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

impl Event {
    pub fn new() -> Self {
        Self {
            raised: CachePadded::new(AtomicU32::new(0)),
            consumed: AtomicU32::new(0),
            sleepers: AtomicU32::new(0),
            #[cfg(not(target_os = "linux"))]
            lock: Mutex::new(()),
            #[cfg(not(target_os = "linux"))]
            cond: Condvar::new(),
        }
    }

    /// Raise the event and wake the parked waiter, if any.
    pub fn notify_one(&self) {
        self.raised.fetch_add(1, Ordering::SeqCst);
        if self.sleepers.load(Ordering::SeqCst) == 0 {
            return;
        }
        self.wake();
    }

    /// Block until a notification arrives. Returns immediately if one is
    /// already pending.
    pub fn wait(&self) {
        self.wait_until(None);
    }

    /// Block for at most `timeout`. Returns `true` if woken by a notification,
    /// `false` if the timeout elapsed first.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        self.wait_until(Instant::now().checked_add(timeout))
    }

    /// Drop any pending notification.
    pub fn reset(&self) {
        let raised = self.raised.load(Ordering::Acquire);
        self.consumed.store(raised, Ordering::Release);
    }

    /// Whether a notification is waiting to be consumed.
    pub fn is_pending(&self) -> bool {
        self.raised.load(Ordering::Acquire) != self.consumed.load(Ordering::Acquire)
    }

    fn wait_until(&self, deadline: Option<Instant>) -> bool {
        loop {
            let raised = self.raised.load(Ordering::Acquire);
            let consumed = self.consumed.load(Ordering::Acquire);
            if raised != consumed {
                if self
                    .consumed
                    .compare_exchange(consumed, raised, Ordering::AcqRel, Ordering::Relaxed)
                    .is_ok()
                {
                    return true;
                }
                continue;
            }

            let remaining = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    Some(deadline - now)
                }
                None => None,
            };

            self.park(raised, remaining);
        }
    }

    #[cfg(target_os = "linux")]
    fn park(&self, expected: u32, timeout: Option<Duration>) {
        self.sleepers.fetch_add(1, Ordering::SeqCst);
        if self.raised.load(Ordering::SeqCst) == expected {
            super::futex::futex_wait(&self.raised, expected, timeout);
        }
        self.sleepers.fetch_sub(1, Ordering::SeqCst);
    }

    #[cfg(target_os = "linux")]
    fn wake(&self) {
        super::futex::futex_wake(&self.raised, 1);
    }

    #[cfg(not(target_os = "linux"))]
    fn park(&self, expected: u32, timeout: Option<Duration>) {
        let mut guard = self.lock.lock();
        self.sleepers.fetch_add(1, Ordering::SeqCst);
        if self.raised.load(Ordering::SeqCst) == expected {
            match timeout {
                Some(timeout) => {
                    self.cond.wait_for(&mut guard, timeout);
                }
                None => self.cond.wait(&mut guard),
            }
        }
        self.sleepers.fetch_sub(1, Ordering::SeqCst);
    }

    #[cfg(not(target_os = "linux"))]
    fn wake(&self) {
        let _guard = self.lock.lock();
        self.cond.notify_one();
    }
}
