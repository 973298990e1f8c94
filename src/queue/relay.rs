//! Unbounded relay queue in front of a caller-supplied channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Select, Sender};

use super::buffer::Buffer;
use super::error::{QueueError, QueueResult};

/// Relays items from any number of producers to the consumer of `deq`.
///
/// Producers never wait for the consumer: items are parked in an internal
/// [`Buffer`] until the consumer receives them. A single manager thread is
/// the only reader of the inbound channel and the only writer of `deq`, so
/// items from one producer are delivered in the order they were enqueued.
///
/// Closing the queue discards items that were buffered but not yet
/// delivered. Drain `deq` before calling [`close`](Queue::close) if every
/// item must arrive.
pub struct Queue<T: Send + 'static> {
    buffer: Arc<Buffer<T>>,
    /// Head item taken out of the buffer and being offered on `deq`.
    staged: Arc<AtomicBool>,
    /// `None` once the queue is closed.
    enq: RwLock<Option<Sender<T>>>,
    done: Receiver<()>,
    manager: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Queue<T> {
    /// Create a queue delivering into `deq` and start its manager thread.
    ///
    /// The queue owns `deq`; the consumer observes disconnection once the
    /// queue is closed.
    pub fn new(deq: Sender<T>) -> Self {
        let buffer = Arc::new(Buffer::new());
        let staged = Arc::new(AtomicBool::new(false));
        let (enq_tx, enq_rx) = bounded::<T>(0);
        let (done_tx, done_rx) = bounded::<()>(0);

        let manager = Manager {
            buffer: Arc::clone(&buffer),
            staged: Arc::clone(&staged),
            enq: enq_rx,
            done: done_tx,
            deq,
        };

        let handle = thread::Builder::new()
            .name("queue-manager".into())
            .spawn(move || manager.run())
            .expect("Failed to spawn queue manager thread");

        Self {
            buffer,
            staged,
            enq: RwLock::new(Some(enq_tx)),
            done: done_rx,
            manager: Mutex::new(Some(handle)),
        }
    }

    /// Hand an item to the queue.
    ///
    /// Returns once the manager has accepted the item into its buffer, which
    /// does not depend on the consumer's pace.
    pub fn enqueue(&self, item: T) -> QueueResult<()> {
        let guard = self.enq.read().unwrap_or_else(PoisonError::into_inner);
        let enq = guard.as_ref().ok_or(QueueError::Closed)?;

        enq.send(item).map_err(|_| QueueError::Closed)?;
        self.done.recv().map_err(|_| QueueError::Closed)
    }

    /// Number of items accepted but not yet delivered. Advisory only.
    pub fn length(&self) -> usize {
        self.buffer.length() + usize::from(self.staged.load(Ordering::Acquire))
    }

    /// Returns true once [`close`](Queue::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.enq
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    /// Stop the manager and close the outbound channel.
    ///
    /// Waits for in-flight `enqueue` calls to be acknowledged, then for the
    /// manager thread to exit. Undelivered items are dropped.
    pub fn close(&self) {
        let enq = self
            .enq
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if enq.is_none() {
            return;
        }
        drop(enq);

        let handle = self
            .manager
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("queue manager thread panicked");
            }
        }

        let discarded = self.buffer.length();
        if discarded > 0 {
            tracing::debug!(discarded, "queue closed with undelivered items");
        }
        self.buffer.clear();
    }
}

impl<T: Send + 'static> Drop for Queue<T> {
    fn drop(&mut self) {
        self.close();
    }
}

/// State owned by the manager thread.
struct Manager<T> {
    buffer: Arc<Buffer<T>>,
    staged: Arc<AtomicBool>,
    enq: Receiver<T>,
    done: Sender<()>,
    deq: Sender<T>,
}

impl<T: Send> Manager<T> {
    fn run(self) {
        // Head of the buffer, held while it is offered to the consumer.
        let mut head: Option<T> = None;

        loop {
            if head.is_none() {
                if let Ok(item) = self.buffer.dequeue() {
                    self.staged.store(true, Ordering::Release);
                    head = Some(item);
                }
            }

            let Some(item) = head.take() else {
                // Nothing to deliver: only wait for producers.
                match self.enq.recv() {
                    Ok(item) => self.accept(item),
                    Err(_) => break,
                }
                continue;
            };

            let mut sel = Select::new();
            let recv_op = sel.recv(&self.enq);
            let send_op = sel.send(&self.deq);
            let oper = sel.select();

            match oper.index() {
                i if i == recv_op => {
                    head = Some(item);
                    match oper.recv(&self.enq) {
                        Ok(next) => self.accept(next),
                        Err(_) => break,
                    }
                }
                i if i == send_op => match oper.send(&self.deq, item) {
                    Ok(()) => self.staged.store(false, Ordering::Release),
                    Err(_) => {
                        tracing::warn!("queue consumer disconnected, discarding items");
                        self.staged.store(false, Ordering::Release);
                        self.discard();
                        break;
                    }
                },
                _ => unreachable!(),
            }
        }

        self.staged.store(false, Ordering::Release);
    }

    fn accept(&self, item: T) {
        self.buffer.enqueue(item);
        let _ = self.done.send(());
    }

    /// Keep acknowledging producers after the consumer is gone so that
    /// `enqueue` never blocks forever.
    fn discard(&self) {
        self.buffer.clear();
        while self.enq.recv().is_ok() {
            let _ = self.done.send(());
        }
    }
}
