use hydra::{ActivityBuilder, Batch, SpscActivity, SpscQueue};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

const MESSAGES: usize = 4_000_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    hydra::trace::init_tracing();

    let interrupted = Arc::new(AtomicBool::new(false));
    let closed = Arc::clone(&interrupted);

    let activity: SpscActivity<String> = ActivityBuilder::new()
        .with_capacity(2)
        .with_thread_name("stand")
        .spawn(move |batch: &mut Batch<'_, SpscQueue<String>>| {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            batch.drain(|_, line| {
                if closed.load(Ordering::Relaxed) {
                    return;
                }
                if let Err(e) = writeln!(out, "{line}") {
                    // Keep acknowledging so a producer blocked on the ring
                    // gets through and sees the flag.
                    tracing::error!(error = %e, "stdout write failed, stopping the stand");
                    closed.store(true, Ordering::Relaxed);
                }
            });
        })?;

    {
        let interrupted = Arc::clone(&interrupted);
        ctrlc::set_handler(move || interrupted.store(true, Ordering::Relaxed))?;
    }

    let started = Instant::now();
    for i in 0..MESSAGES {
        if interrupted.load(Ordering::Relaxed) {
            break;
        }
        let seq = activity.claim();
        assert!(seq.is_valid());
        // SAFETY: this thread is the only producer and owns `seq` until publish.
        unsafe {
            *activity.slot_mut(seq) = i.to_string();
            activity.publish(seq);
        }
    }
    let elapsed = started.elapsed();

    eprintln!(
        "Published {} messages in {:?}, {} blocked claims",
        MESSAGES,
        elapsed,
        activity.blocks_count()
    );
    eprintln!("Press ENTER (or Ctrl-C) to stop...");

    if !interrupted.load(Ordering::Relaxed) {
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
    }

    activity.stop();
    Ok(())
}
