use parking_lot::Mutex;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::Core::{Event, Sequence};
use crate::Buffer::{Batch, MpscQueue, MultiProducer, Queue, SpscQueue};

pub(crate) const DEFAULT_THREAD_NAME: &str = "hydra-activity";

/// How long the worker parks when the handler acknowledged nothing but
/// entries are still fetchable.
const DECLINED_BACKOFF: Duration = Duration::from_millis(1);

/// State the worker thread shares with the owning [`Activity`].
pub(crate) struct Shared<Q> {
    pub(crate) queue: Q,
    pub(crate) event: Event,
    pub(crate) stopping: AtomicBool,
}

/// A queue with one dedicated consumer thread.
///
/// Producers claim, write and publish through the activity from any thread
/// (one thread only when `Q` is a [`SpscQueue`]). Every publish raises the
/// activity's [`Event`]; the worker parks on it between bursts and hands each
/// wake-up to the handler as a [`Batch`].
///
/// Lifecycle: `new` (idle) → `reserve` (ready) → `run` (running) → `stop`
/// (ready again). Dropping the activity stops and joins the worker.
pub struct Activity<T, Q = MpscQueue<T>>
where
    Q: Queue<Item = T>,
{
    pub(crate) shared: Arc<Shared<Q>>,
    pub(crate) worker: Mutex<Option<JoinHandle<()>>>,
    pub(crate) thread_name: String,
    _item: PhantomData<fn() -> T>,
}

/// Activity over a single-producer queue.
pub type SpscActivity<T> = Activity<T, SpscQueue<T>>;

impl<T, Q> Default for Activity<T, Q>
where
    Q: Queue<Item = T> + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, Q> Activity<T, Q>
where
    Q: Queue<Item = T> + Default,
{
    /// An idle activity: no storage, no thread.
    pub fn new() -> Self {
        Self::with_thread_name(DEFAULT_THREAD_NAME)
    }

    pub(crate) fn with_thread_name(name: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Q::default(),
                event: Event::new(),
                stopping: AtomicBool::new(false),
            }),
            worker: Mutex::new(None),
            thread_name: name.into(),
            _item: PhantomData,
        }
    }
}

impl<T, Q> Activity<T, Q>
where
    Q: Queue<Item = T>,
{
    /// Allocate the queue. Refused while a worker thread exists.
    pub fn reserve(&mut self, capacity: usize) -> Result<()> {
        if let Some(handle) = take_finished(self.worker.get_mut()) {
            self.join(handle);
        }
        if self.worker.get_mut().is_some() {
            tracing::warn!(thread = %self.thread_name, "reserve refused: worker is running");
            return Err(Error::Running);
        }
        let shared = Arc::get_mut(&mut self.shared).ok_or(Error::Running)?;
        shared.queue.reserve(capacity)?;
        tracing::debug!(
            thread = %self.thread_name,
            requested = capacity,
            capacity = shared.queue.capacity(),
            "activity reserved"
        );
        Ok(())
    }

    /// Start the worker. Returns `false`, changing nothing, if it is already
    /// running or the queue was never reserved.
    pub fn run<H>(&self, handler: H) -> bool
    where
        H: FnMut(&mut Batch<'_, Q>) + Send + 'static,
        Q: 'static,
    {
        self.try_run(handler).is_ok()
    }

    /// [`run`](Activity::run) with the reason for a refusal.
    pub fn try_run<H>(&self, handler: H) -> Result<()>
    where
        H: FnMut(&mut Batch<'_, Q>) + Send + 'static,
        Q: 'static,
    {
        let mut worker = self.worker.lock();
        if let Some(handle) = take_finished(&mut worker) {
            // The handler panicked and took the worker down with it.
            self.join(handle);
        }
        if worker.is_some() {
            tracing::warn!(thread = %self.thread_name, "run refused: worker already running");
            return Err(Error::AlreadyRunning);
        }
        if !self.shared.queue.is_reserved() {
            tracing::warn!(thread = %self.thread_name, "run refused: queue not reserved");
            return Err(Error::NotReserved);
        }

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name(self.thread_name.clone())
            .spawn(move || work(&shared, handler))?;
        *worker = Some(handle);

        tracing::debug!(thread = %self.thread_name, "worker started");
        Ok(())
    }

    /// Ask the worker to finish, wake it and join it.
    ///
    /// Blocks until the worker has drained what it can and exited. Does
    /// nothing if no worker is running. Must not be called from the handler.
    pub fn stop(&self) {
        let mut worker = self.worker.lock();
        let Some(handle) = worker.take() else {
            return;
        };

        self.shared.stopping.store(true, Ordering::Release);
        self.shared.event.notify_one();
        self.join(handle);
    }

    fn join(&self, handle: JoinHandle<()>) {
        match handle.join() {
            Ok(()) => tracing::debug!(thread = %self.thread_name, "worker stopped"),
            Err(_) => tracing::error!(thread = %self.thread_name, "worker thread panicked"),
        }
        self.shared.stopping.store(false, Ordering::Release);
    }

    /// Whether a worker thread is alive.
    pub fn active(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn queue(&self) -> &Q {
        &self.shared.queue
    }

    pub fn capacity(&self) -> usize {
        self.shared.queue.capacity()
    }

    pub fn size(&self) -> usize {
        self.shared.queue.size()
    }

    pub fn blocks_count(&self) -> usize {
        self.shared.queue.blocks_count()
    }

    pub fn clear_blocks_count(&self) {
        self.shared.queue.clear_blocks_count();
    }

    pub fn claim(&self) -> Sequence {
        self.shared.queue.claim()
    }

    pub fn claim_for(&self, timeout: Duration) -> Sequence {
        self.shared.queue.claim_for(timeout)
    }

    /// Write access to a claimed slot.
    ///
    /// # Safety
    /// `seq` must come from this activity's `claim`/`claim_for` on the calling
    /// thread and must not have been published yet.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn slot_mut(&self, seq: Sequence) -> &mut T {
        self.shared.queue.slot_mut(seq)
    }

    /// Publish a written slot and wake the worker.
    ///
    /// # Safety
    /// Same contract as [`Queue::publish`].
    pub unsafe fn publish(&self, seq: Sequence) {
        self.shared.queue.publish(seq);
        self.shared.event.notify_one();
    }
}

impl<T, Q> Activity<T, Q>
where
    Q: MultiProducer<Item = T>,
{
    /// Claim, write and publish `value`, waiting as long as the ring is full.
    pub fn push(&self, value: T) -> Result<()> {
        self.shared.queue.push(value)?;
        self.shared.event.notify_one();
        Ok(())
    }

    /// [`push`](Activity::push) bounded by `timeout`.
    pub fn push_for(&self, value: T, timeout: Duration) -> Result<()> {
        self.shared.queue.push_for(value, timeout)?;
        self.shared.event.notify_one();
        Ok(())
    }
}

impl<T, Q> Drop for Activity<T, Q>
where
    Q: Queue<Item = T>,
{
    fn drop(&mut self) {
        self.stop();
    }
}

/// The worker handle, if its thread has already exited.
fn take_finished(worker: &mut Option<JoinHandle<()>>) -> Option<JoinHandle<()>> {
    if worker.as_ref().is_some_and(JoinHandle::is_finished) {
        worker.take()
    } else {
        None
    }
}

/// Run the handler once if the queue holds anything. Returns the number of
/// entries it acknowledged.
fn process<Q, H>(shared: &Shared<Q>, handler: &mut H) -> usize
where
    Q: Queue,
    H: FnMut(&mut Batch<'_, Q>),
{
    if shared.queue.is_empty() {
        return 0;
    }
    // SAFETY: the worker thread is the queue's only consumer.
    let mut batch = unsafe { Batch::new(&shared.queue) };
    handler(&mut batch);
    batch.fetched_count()
}

fn work<Q, H>(shared: &Shared<Q>, mut handler: H)
where
    Q: Queue,
    H: FnMut(&mut Batch<'_, Q>),
{
    let mut handled = 0usize;
    loop {
        let n = process(shared, &mut handler);
        handled += n;
        if shared.stopping.load(Ordering::Acquire) {
            break;
        }
        if shared.queue.try_fetch().is_invalid() {
            shared.event.wait();
        } else if n == 0 {
            // The handler left the head in place. A producer may be blocked
            // on a full ring and will not notify again, so retry on a timer.
            shared.event.wait_for(DECLINED_BACKOFF);
        }
    }

    // Final drain: keep going while the handler makes progress.
    loop {
        let n = process(shared, &mut handler);
        handled += n;
        if n == 0 || shared.queue.try_fetch().is_invalid() {
            break;
        }
    }

    tracing::debug!(handled, "worker exiting");
}
