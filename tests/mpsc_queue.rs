use hydra::{Batch, Error, MpscQueue, MultiProducer, Queue, Sequence};
use serial_test::serial;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn unreserved_queue_rejects_claims() {
    let queue: MpscQueue<u32> = MpscQueue::default();
    assert!(!queue.is_reserved());
    assert!(queue.claim().is_invalid());
    assert!(queue.claim_for(Duration::from_millis(1)).is_invalid());
    assert!(matches!(queue.push(1), Err(Error::NotReserved)));
    assert!(matches!(
        queue.push_for(1, Duration::from_millis(1)),
        Err(Error::NotReserved)
    ));
}

#[test]
fn visibility_follows_sequence_order() {
    let queue = MpscQueue::<&'static str>::with_capacity(4).unwrap();
    let slow = queue.claim();
    let fast = queue.claim();
    assert_eq!(slow, Sequence::new(0));
    assert_eq!(fast, Sequence::new(1));

    unsafe {
        *queue.slot_mut(fast) = "fast";
        queue.publish(fast);
    }
    // The later sequence is published but held back by the earlier one.
    assert!(queue.try_fetch().is_invalid());

    unsafe {
        *queue.slot_mut(slow) = "slow";
        queue.publish(slow);
    }

    let mut batch = unsafe { Batch::new(&queue) };
    let mut order = Vec::new();
    batch.drain(|seq, value| order.push((seq.value(), *value)));
    assert_eq!(order, vec![(0, "slow"), (1, "fast")]);
}

#[test]
#[serial]
fn full_ring_blocks_claim_until_fetched() {
    let queue = Arc::new(MpscQueue::<u64>::with_capacity(2).unwrap());
    queue.push(0).unwrap();
    queue.push(1).unwrap();
    assert_eq!(queue.blocks_count(), 0);

    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let seq = queue.claim();
            unsafe {
                *queue.slot_mut(seq) = 2;
                queue.publish(seq);
            }
            seq
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!producer.is_finished());
    assert_eq!(queue.blocks_count(), 1);

    let mut batch = unsafe { Batch::new(&*queue) };
    let seq = batch.try_fetch();
    assert_eq!(batch[seq], 0);
    batch.fetched();

    assert_eq!(producer.join().unwrap(), Sequence::new(2));

    let mut rest = Vec::new();
    batch.drain(|_, value| rest.push(*value));
    assert_eq!(rest, vec![1, 2]);

    queue.clear_blocks_count();
    assert_eq!(queue.blocks_count(), 0);
}

#[test]
#[serial]
fn timed_out_claim_does_not_stall_the_consumer() {
    let queue = MpscQueue::<u32>::with_capacity(2).unwrap();
    queue.push(0).unwrap();
    queue.push(1).unwrap();

    assert!(queue.claim_for(Duration::from_millis(10)).is_invalid());
    assert!(matches!(
        queue.push_for(99, Duration::from_millis(10)),
        Err(Error::Timeout)
    ));
    assert_eq!(queue.blocks_count(), 2);

    let mut batch = unsafe { Batch::new(&queue) };
    let seq = batch.try_fetch();
    assert_eq!(batch.take(seq), 0);
    batch.fetched();

    queue.push_for(2, Duration::from_millis(10)).unwrap();

    let mut seen = Vec::new();
    batch.drain(|seq, value| seen.push((seq.value(), *value)));
    assert_eq!(seen, vec![(1, 1), (2, 2)]);
}

#[test]
fn many_producers_deliver_every_sequence_once() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 10_000;
    const TOTAL: usize = PRODUCERS * PER_PRODUCER;

    let queue = Arc::new(MpscQueue::<(usize, usize)>::with_capacity(64).unwrap());

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|id| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    if fastrand::u8(..) < 8 {
                        thread::yield_now();
                    }
                    queue.push((id, i)).unwrap();
                }
            })
        })
        .collect();

    let mut next_from = [0usize; PRODUCERS];
    let mut expected_seq = 0i64;
    let mut batch = unsafe { Batch::new(&*queue) };
    while (expected_seq as usize) < TOTAL {
        let seq = batch.try_fetch();
        if seq.is_invalid() {
            thread::yield_now();
            continue;
        }
        assert_eq!(seq.value(), expected_seq);
        let (id, i) = batch[seq];
        assert_eq!(i, next_from[id], "producer {id} delivered out of order");
        next_from[id] += 1;
        batch.fetched();
        expected_seq += 1;
    }

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(next_from, [PER_PRODUCER; PRODUCERS]);
    assert!(batch.try_fetch().is_invalid());
    assert_eq!(queue.size(), 0);
}

#[test]
fn racing_bounded_claims_hand_out_distinct_sequences() {
    const PRODUCERS: usize = 4;
    const PER_PRODUCER: usize = 2_000;
    const TOTAL: usize = PRODUCERS * PER_PRODUCER;

    let queue = Arc::new(MpscQueue::<usize>::with_capacity(8).unwrap());

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|id| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue
                        .push_for(id * PER_PRODUCER + i, Duration::from_secs(30))
                        .unwrap();
                }
            })
        })
        .collect();

    let mut seen = vec![false; TOTAL];
    let mut received = 0;
    let mut batch = unsafe { Batch::new(&*queue) };
    while received < TOTAL {
        let n = batch.drain(|_, value| {
            assert!(!seen[*value], "value {} delivered twice", *value);
            seen[*value] = true;
        });
        if n == 0 {
            thread::yield_now();
        }
        received += n;
    }

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(seen.iter().all(|&s| s));
}
