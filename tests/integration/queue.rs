//! Queue relay tests: ordering, loss and shutdown.

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::bounded;
use workpool::{Buffer, Queue, QueueError};

use crate::helpers::*;

/// Items enqueued by one producer come out in order with a slow consumer.
#[test]
fn test_queue_fifo_with_slow_consumer() {
    let (tx, rx) = bounded(0);
    let queue = Queue::new(tx);

    for i in 0..500u32 {
        queue.enqueue(i).unwrap();
    }

    for expected in 0..500u32 {
        if expected % 100 == 0 {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(rx.recv_timeout(SETTLE_TIMEOUT).unwrap(), expected);
    }

    queue.close();
}

/// Nothing is lost with several producers; each producer's order is kept.
#[test]
fn test_queue_many_producers_no_loss() {
    const PRODUCERS: u32 = 4;
    const PER_PRODUCER: u32 = 1_000;

    let (tx, rx) = bounded(0);
    let queue = Queue::new(tx);

    thread::scope(|scope| {
        for p in 0..PRODUCERS {
            let queue = &queue;
            scope.spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue.enqueue((p, i)).unwrap();
                }
            });
        }
    });

    let mut last = vec![None; PRODUCERS as usize];
    for _ in 0..PRODUCERS * PER_PRODUCER {
        let (p, i) = rx.recv_timeout(SETTLE_TIMEOUT).unwrap();
        let slot = &mut last[p as usize];
        assert!(slot.map_or(true, |prev| prev < i), "producer {} out of order", p);
        *slot = Some(i);
    }

    assert!(wait_until(SETTLE_TIMEOUT, || queue.length() == 0));
    queue.close();
}

/// Closing with a backlog and no consumer returns promptly.
#[test]
fn test_queue_close_with_backlog() {
    let (tx, _rx) = bounded(0);
    let queue = Queue::new(tx);

    for i in 0..10_000u32 {
        queue.enqueue(i).unwrap();
    }
    assert!(queue.length() > 0);

    let started = Instant::now();
    queue.close();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(queue.is_closed());
    assert_eq!(queue.enqueue(1), Err(QueueError::Closed));
}

/// The plain buffer is a shared FIFO.
#[test]
fn test_buffer_shared_between_threads() {
    let buffer = Buffer::new();

    thread::scope(|scope| {
        for t in 0..4 {
            let buffer = &buffer;
            scope.spawn(move || {
                for i in 0..250 {
                    buffer.enqueue(t * 1_000 + i);
                }
            });
        }
    });

    assert_eq!(buffer.length(), 1_000);

    let mut drained = 0;
    while buffer.dequeue().is_ok() {
        drained += 1;
    }
    assert_eq!(drained, 1_000);
    assert!(buffer.is_empty());
}
