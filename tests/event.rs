use hydra::Event;
use serial_test::serial;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn notification_before_wait_is_not_lost() {
    let event = Event::new();
    assert!(!event.is_pending());
    event.notify_one();
    assert!(event.is_pending());
    event.wait();
    assert!(!event.is_pending());
}

#[test]
fn pending_notifications_coalesce() {
    let event = Event::new();
    event.notify_one();
    event.notify_one();
    event.notify_one();
    assert!(event.wait_for(Duration::ZERO));
    assert!(!event.wait_for(Duration::from_millis(5)));
}

#[test]
fn reset_discards_pending_notification() {
    let event = Event::new();
    event.notify_one();
    event.reset();
    assert!(!event.wait_for(Duration::from_millis(5)));
}

#[test]
#[serial]
fn wait_for_times_out() {
    let event = Event::new();
    let timeout = Duration::from_millis(30);
    let started = Instant::now();
    assert!(!event.wait_for(timeout));
    let elapsed = started.elapsed();
    assert!(elapsed >= timeout);
    assert!(elapsed < Duration::from_secs(2));
}

#[test]
#[serial]
fn notify_wakes_parked_waiter() {
    let event = Arc::new(Event::new());
    let waiter = {
        let event = Arc::clone(&event);
        thread::spawn(move || {
            let started = Instant::now();
            let notified = event.wait_for(Duration::from_secs(10));
            (notified, started.elapsed())
        })
    };

    thread::sleep(Duration::from_millis(20));
    event.notify_one();

    let (notified, elapsed) = waiter.join().unwrap();
    assert!(notified);
    assert!(elapsed < Duration::from_secs(5));
}

#[test]
#[serial]
fn infinite_wait_returns_on_notify() {
    let event = Arc::new(Event::new());
    let waiter = {
        let event = Arc::clone(&event);
        thread::spawn(move || event.wait())
    };
    thread::sleep(Duration::from_millis(20));
    event.notify_one();
    waiter.join().unwrap();
}

#[test]
#[serial]
fn one_notification_wakes_exactly_one_waiter() {
    let event = Arc::new(Event::new());
    let spawn_waiter = || {
        let event = Arc::clone(&event);
        thread::spawn(move || event.wait_for(Duration::from_millis(200)))
    };
    let first = spawn_waiter();
    let second = spawn_waiter();

    thread::sleep(Duration::from_millis(20));
    event.notify_one();

    let first = first.join().unwrap();
    let second = second.join().unwrap();
    assert!(first != second, "exactly one waiter should see the notification");
}

#[test]
fn debug_shows_counters() {
    let event = Event::new();
    event.notify_one();
    let rendered = format!("{event:?}");
    assert!(rendered.contains("raised: 1"));
    assert!(rendered.contains("consumed: 0"));
}
