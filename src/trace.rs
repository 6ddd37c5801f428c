//! Log output for demos and tests.
//!
//! The crate itself only emits through the `tracing` facade. Enable the
//! `subscriber` feature to get a ready-made fmt subscriber.

/// Install a fmt subscriber filtered by `RUST_LOG` (default `hydra=debug`).
///
/// Safe to call more than once; later calls are ignored.
#[cfg(feature = "subscriber")]
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hydra=debug"));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter)
        .try_init();
}

#[cfg(not(feature = "subscriber"))]
pub const fn init_tracing() {}
