use std::io;

/// Errors reported by the non-hot-path and convenience APIs.
///
/// The raw claim/fetch protocol never produces these; it signals failure with
/// [`Sequence::INVALID`](crate::Sequence::INVALID) instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("queue has no storage; call reserve() first")]
    NotReserved,

    #[error("timed out waiting for a free slot")]
    Timeout,

    #[error("activity already has a worker thread")]
    AlreadyRunning,

    #[error("cannot reserve while the worker thread is alive")]
    Running,

    #[error("capacity {0} cannot be rounded up to a power of two")]
    CapacityOverflow(usize),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
