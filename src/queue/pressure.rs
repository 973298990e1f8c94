//! Paired signal/error streams that never block producers.

use crossbeam_channel::{bounded, Receiver, TryRecvError};

use super::error::{QueueError, QueueResult};
use super::relay::Queue;

/// Two independent [`Queue`]s behind public `signals` and `errors`
/// receivers.
///
/// Producers feed both channels through one object without waiting for the
/// consumer. The two pipelines share nothing and are only closed together.
pub struct PressureStream<S: Send + 'static, E: Send + 'static> {
    /// Data signals, in the order they were sent.
    pub signals: Receiver<S>,
    /// Errors, in the order they were sent.
    pub errors: Receiver<E>,
    signal_queue: Queue<S>,
    error_queue: Queue<E>,
}

impl<S: Send + 'static, E: Send + 'static> PressureStream<S, E> {
    /// Create a stream with empty signal and error pipelines.
    pub fn new() -> Self {
        // Rendezvous channels keep the backlog inside the queues.
        let (signal_tx, signals) = bounded(0);
        let (error_tx, errors) = bounded(0);

        Self {
            signals,
            errors,
            signal_queue: Queue::new(signal_tx),
            error_queue: Queue::new(error_tx),
        }
    }

    /// Queue a data signal.
    pub fn send_signal(&self, signal: S) -> QueueResult<()> {
        self.signal_queue.enqueue(signal)
    }

    /// Queue an error.
    pub fn send_error(&self, error: E) -> QueueResult<()> {
        self.error_queue.enqueue(error)
    }

    /// Signals accepted but not yet received. Advisory only.
    pub fn remaining_signals(&self) -> usize {
        self.signal_queue.length()
    }

    /// Errors accepted but not yet received. Advisory only.
    pub fn remaining_errors(&self) -> usize {
        self.error_queue.length()
    }

    /// Receive a signal if one is ready.
    pub fn try_signal(&self) -> QueueResult<S> {
        self.signals.try_recv().map_err(map_try_recv)
    }

    /// Receive an error if one is ready.
    pub fn try_error(&self) -> QueueResult<E> {
        self.errors.try_recv().map_err(map_try_recv)
    }

    /// Close both pipelines. Undelivered signals and errors are dropped.
    pub fn close(&self) {
        self.signal_queue.close();
        self.error_queue.close();
    }
}

impl<S: Send + 'static, E: Send + 'static> Default for PressureStream<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

fn map_try_recv(err: TryRecvError) -> QueueError {
    match err {
        TryRecvError::Empty => QueueError::Empty,
        TryRecvError::Disconnected => QueueError::Closed,
    }
}
