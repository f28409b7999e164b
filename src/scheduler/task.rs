/*!
 * Tasks and Result Handles
 *
 * A job is the type-erased unit the workers run. Submitted closures are
 * wrapped so that a panic inside them is caught at the job boundary: the
 * worker only ever sees `Ok(())` or the panic message.
 */

use crate::core::errors::{panic_message, TaskError, TaskResult};
use flume::{Receiver, RecvTimeoutError, TryRecvError};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

/// Type-erased job; `Err` carries the message of a caught panic
pub(crate) type Job = Box<dyn FnOnce() -> Result<(), String> + Send + 'static>;

/// Wrap fire-and-forget work
pub(crate) fn detached<F>(f: F) -> Job
where
    F: FnOnce() + Send + 'static,
{
    Box::new(move || {
        panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| panic_message(payload.as_ref()))
    })
}

/// Wrap work whose result is delivered through a [`TaskHandle`]
pub(crate) fn with_handle<F, R>(f: F) -> (Job, TaskHandle<R>)
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let (tx, rx) = flume::bounded(1);
    let job: Job = Box::new(move || match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => {
            // The caller may have dropped the handle; nothing to deliver to
            let _ = tx.send(Ok(value));
            Ok(())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            let _ = tx.send(Err(TaskError::Panicked(message.clone())));
            Err(message)
        }
    });
    (job, TaskHandle { result: rx })
}

/// Handle to the eventual result of a task submitted with `post_task`
///
/// The result is delivered exactly once. A task whose body panicked yields
/// `TaskError::Panicked`; a task dropped without running yields
/// `TaskError::Abandoned`.
pub struct TaskHandle<R> {
    result: Receiver<TaskResult<R>>,
}

impl<R> TaskHandle<R> {
    /// Block until the task has run and return its result
    pub fn join(self) -> TaskResult<R> {
        self.result.recv().unwrap_or(Err(TaskError::Abandoned))
    }

    /// Wait at most `timeout` for the result
    ///
    /// On `TaskError::Timeout` the result is still pending and can be
    /// collected by a later call.
    pub fn join_timeout(&self, timeout: Duration) -> TaskResult<R> {
        match self.result.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => Err(TaskError::Timeout),
            Err(RecvTimeoutError::Disconnected) => Err(TaskError::Abandoned),
        }
    }

    /// Collect the result if the task has already finished
    pub fn try_join(&self) -> Option<TaskResult<R>> {
        match self.result.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(TaskError::Abandoned)),
        }
    }

    /// Whether a result (or abandonment) is ready to collect
    pub fn is_finished(&self) -> bool {
        !self.result.is_empty() || self.result.is_disconnected()
    }
}

impl<R> fmt::Debug for TaskHandle<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("finished", &self.is_finished())
            .finish()
    }
}
