use super::activity::{Activity, DEFAULT_THREAD_NAME};
use crate::error::Result;
use crate::Buffer::{Batch, Queue};

pub struct ActivityBuilder {
    capacity: usize,
    thread_name: String,
}

impl Default for ActivityBuilder {
    fn default() -> Self {
        Self {
            capacity: 1024, // 1024 slots
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

impl ActivityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested queue capacity; rounded up to a power of two on reserve.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Name given to the worker thread.
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    /// A reserved activity, ready to `run`.
    pub fn build<T, Q>(self) -> Result<Activity<T, Q>>
    where
        Q: Queue<Item = T> + Default,
    {
        let mut activity = Activity::with_thread_name(self.thread_name);
        activity.reserve(self.capacity)?;
        Ok(activity)
    }

    /// A reserved activity whose worker is already running `handler`.
    pub fn spawn<T, Q, H>(self, handler: H) -> Result<Activity<T, Q>>
    where
        Q: Queue<Item = T> + Default + 'static,
        H: FnMut(&mut Batch<'_, Q>) + Send + 'static,
    {
        let activity = self.build()?;
        activity.try_run(handler)?;
        Ok(activity)
    }
}
