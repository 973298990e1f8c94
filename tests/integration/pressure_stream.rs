//! PressureStream tests.

use std::thread;
use std::time::Duration;

use workpool::PressureStream;

use crate::helpers::*;

/// 10,000 signals sent without a reader arrive in order once one starts.
#[test]
fn test_signals_delivered_in_order() {
    let stream: PressureStream<u32, String> = PressureStream::new();

    for i in 0..10_000u32 {
        stream.send_signal(i).unwrap();
    }

    for expected in 0..10_000u32 {
        assert_eq!(stream.signals.recv_timeout(SETTLE_TIMEOUT).unwrap(), expected);
    }

    assert!(wait_until(SETTLE_TIMEOUT, || stream.remaining_signals() == 0));
    stream.close();
}

/// Signals and errors travel on independent lanes.
#[test]
fn test_signal_and_error_lanes_independent() {
    let stream: PressureStream<u32, String> = PressureStream::new();

    stream.send_error("disk full".to_string()).unwrap();
    for i in 0..3 {
        stream.send_signal(i).unwrap();
    }

    assert!(wait_until(SETTLE_TIMEOUT, || stream.remaining_signals() == 3));
    assert!(wait_until(SETTLE_TIMEOUT, || stream.remaining_errors() == 1));

    // Draining signals leaves the error untouched
    for expected in 0..3 {
        assert_eq!(stream.signals.recv_timeout(SETTLE_TIMEOUT).unwrap(), expected);
    }
    assert_eq!(
        stream.errors.recv_timeout(SETTLE_TIMEOUT).unwrap(),
        "disk full"
    );

    stream.close();
}

/// A consumer on another thread sees everything a producer sends.
#[test]
fn test_concurrent_producer_consumer() {
    let stream: PressureStream<u64, ()> = PressureStream::new();

    let sum = thread::scope(|scope| {
        let consumer = scope.spawn(|| {
            let mut sum = 0;
            for _ in 0..1_000 {
                sum += stream.signals.recv_timeout(SETTLE_TIMEOUT).unwrap();
            }
            sum
        });

        for i in 1..=1_000u64 {
            stream.send_signal(i).unwrap();
            if i % 250 == 0 {
                thread::sleep(Duration::from_millis(1));
            }
        }

        consumer.join().unwrap()
    });

    assert_eq!(sum, 500_500);
    stream.close();
    assert!(stream.send_signal(1).is_err());
}
