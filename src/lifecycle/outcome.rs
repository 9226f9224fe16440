//! Terminal results of a single coordinator run.

use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Error type a main task may return.
pub type TaskError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of a main task body.
pub type TaskResult = Result<(), TaskError>;

/// Why a main task body did not complete successfully.
#[derive(Debug, Error)]
pub enum TaskFailure {
    /// The body returned an error.
    #[error("{0}")]
    Error(TaskError),

    /// The body panicked.
    #[error("panicked: {0}")]
    Panic(String),
}

impl TaskFailure {
    /// Build a failure from a caught panic payload.
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        TaskFailure::Panic(message)
    }
}

/// Outcome of one coordinator invocation. Exactly one is produced per run.
#[derive(Debug)]
pub enum RunOutcome {
    /// The task completed before any termination request.
    Finished,
    /// A termination request was observed and the task was cancelled.
    Cancelled,
    /// The task body failed. Reported through `on_main_exception` only.
    Failed(TaskFailure),
    /// A termination request was observed and cancellation requested, but the
    /// body completed before the cancellation landed.
    SignalledShutdown,
}

impl RunOutcome {
    /// Stable label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::Finished => "finished",
            RunOutcome::Cancelled => "cancelled",
            RunOutcome::Failed(_) => "failed",
            RunOutcome::SignalledShutdown => "signalled_shutdown",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RunOutcome::Failed(_))
    }

    /// Whether the run ended because of a termination request.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, RunOutcome::Cancelled | RunOutcome::SignalledShutdown)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Failed(failure) => write!(f, "failed: {}", failure),
            other => f.write_str(other.label()),
        }
    }
}
