/*!
 * Error Types
 * Centralized error handling with thiserror and miette
 */

use miette::Diagnostic;
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Result type for task handles
pub type TaskResult<T> = Result<T, TaskError>;

/// Rejected push; the item is handed back to the caller
#[derive(Error, PartialEq, Eq, Clone, Copy, Diagnostic)]
pub enum PushError<T> {
    #[error("queue is full")]
    #[diagnostic(
        code(queue::full),
        help("Retry later, push to another queue, or use the blocking push.")
    )]
    Full(T),

    #[error("queue is closed")]
    #[diagnostic(
        code(queue::closed),
        help("The queue no longer accepts items. It is being drained for shutdown.")
    )]
    Closed(T),
}

impl<T> PushError<T> {
    /// Recover the rejected item
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(item) | PushError::Closed(item) => item,
        }
    }

    /// Whether the push failed because the queue was full
    pub fn is_full(&self) -> bool {
        matches!(self, PushError::Full(_))
    }

    /// Whether the push failed because the queue was closed
    pub fn is_closed(&self) -> bool {
        matches!(self, PushError::Closed(_))
    }
}

// Items are often closures, so don't require T: Debug
impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(_) => f.write_str("Full(..)"),
            PushError::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

/// Thread pool errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum PoolError {
    #[error("thread pool is shutting down")]
    #[diagnostic(
        code(pool::shut_down),
        help("Work can no longer be submitted once shutdown has started.")
    )]
    ShutDown,

    #[error("invalid pool configuration: {0}")]
    #[diagnostic(
        code(pool::invalid_config),
        help("Workers, queue capacity and steal factor must all be greater than zero.")
    )]
    InvalidConfig(String),

    #[error("failed to spawn worker thread: {0}")]
    #[diagnostic(
        code(pool::spawn_failed),
        help("The OS refused to create a thread. Check process thread limits.")
    )]
    SpawnFailed(String),
}

/// Failure observed through a task handle
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum TaskError {
    #[error("task panicked: {0}")]
    #[diagnostic(
        code(task::panicked),
        help("The task body panicked. The worker recovered and kept running.")
    )]
    Panicked(String),

    #[error("task was dropped before it ran")]
    #[diagnostic(
        code(task::abandoned),
        help("The task never executed, so no result will ever arrive.")
    )]
    Abandoned,

    #[error("task did not finish in time")]
    #[diagnostic(code(task::timeout))]
    Timeout,
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
