//! Units of work and the envelope that carries them to workers.

use std::fmt;

use crate::context::Context;

/// Error returned by a unit of work.
///
/// The pool logs these and never hands them back to the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkError {
    pub message: String,
}

impl WorkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for WorkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WorkError {}

impl From<String> for WorkError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for WorkError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Result of running a unit of work.
pub type WorkResult = Result<(), WorkError>;

/// A unit of work executed by a pool worker.
///
/// `worker_id` identifies the worker thread running the work. Any
/// `FnOnce(&Context, usize) -> WorkResult` closure is a `Work`.
pub trait Work: Send + 'static {
    fn work(self: Box<Self>, context: &Context, worker_id: usize) -> WorkResult;
}

impl<F> Work for F
where
    F: FnOnce(&Context, usize) -> WorkResult + Send + 'static,
{
    fn work(self: Box<Self>, context: &Context, worker_id: usize) -> WorkResult {
        (*self)(context, worker_id)
    }
}

/// Work paired with the context it was submitted under.
pub(crate) struct Task {
    pub context: Context,
    pub work: Box<dyn Work>,
}

impl Task {
    pub fn new(context: &Context, work: impl Work) -> Self {
        Self {
            context: context.clone(),
            work: Box::new(work),
        }
    }

    pub fn run(self, worker_id: usize) -> WorkResult {
        self.work.work(&self.context, worker_id)
    }
}
