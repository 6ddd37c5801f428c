use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Block on `atomic` while it still holds `expected`.
///
/// Returns on wake, on timeout, on a signal, or straight away if the word no
/// longer equals `expected`. Callers re-check their own condition afterwards.
pub fn futex_wait(atomic: &AtomicU32, expected: u32, timeout: Option<Duration>) {
    use std::ptr;

    // Check condition first to avoid syscall if possible
    if atomic.load(Ordering::Relaxed) != expected {
        return;
    }

    let ts = timeout.map(|t| libc::timespec {
        tv_sec: t.as_secs().min(libc::time_t::MAX as u64) as libc::time_t,
        tv_nsec: t.subsec_nanos() as libc::c_long,
    });
    let ts_ptr = ts
        .as_ref()
        .map_or(ptr::null(), |ts| ts as *const libc::timespec);

    // SAFETY: the address points at a live AtomicU32 for the whole call and
    // the kernel only reads the word and the optional relative timeout.
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            atomic as *const AtomicU32 as *const u32,
            libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
            expected,
            ts_ptr,
            ptr::null::<u32>(),
            0u32,
        );
    }
}

/// Wake up to `count` threads parked on `atomic`.
pub fn futex_wake(atomic: &AtomicU32, count: i32) {
    // SAFETY: FUTEX_WAKE never dereferences the word, it only keys the queue.
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            atomic as *const AtomicU32 as *const u32,
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            count,
            std::ptr::null::<libc::timespec>(),
            std::ptr::null::<u32>(),
            0u32,
        );
    }
}
