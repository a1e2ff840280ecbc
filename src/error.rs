//! Error types used by the callbridge runtime and calls.
//!
//! This module defines two error enums:
//!
//! - [`DispatchError`] — errors raised by the dispatcher runtime itself.
//! - [`CallError`] — errors raised by individual call executions.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! A [`CallError`] never escapes the dispatcher: the execution wrapper converts
//! it into a failed [`Completion`](crate::Completion) carrying the call's empty
//! response, so listeners observe failures through the normal delivery path.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the dispatcher runtime.
///
/// These represent failures in the coordination machinery itself,
/// such as submitting after shutdown or a shutdown overrunning its grace period.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The dispatcher has been shut down; the call was not accepted.
    #[error("dispatcher is shut down; call was not accepted")]
    Terminated,

    /// Shutdown grace period was exceeded; some workers were still running and were aborted.
    #[error("shutdown grace {grace:?} exceeded; {pending} worker(s) still busy; aborting")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Number of workers still executing a call when the grace expired.
        pending: usize,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use callbridge::DispatchError;
    ///
    /// assert_eq!(DispatchError::Terminated.as_label(), "dispatch_terminated");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Terminated => "dispatch_terminated",
            DispatchError::GraceExceeded { .. } => "dispatch_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DispatchError::Terminated => "dispatcher terminated".to_string(),
            DispatchError::GraceExceeded { grace, pending } => {
                format!("grace exceeded after {grace:?}; busy workers={pending}")
            }
        }
    }
}

/// # Errors produced by call execution.
///
/// A call signals failure by returning this error from
/// [`Call::execute`](crate::Call::execute). The dispatcher catches it at the
/// execution boundary and substitutes the call's empty response with the
/// success flag cleared; it is never propagated to `submit` callers or to
/// listeners as an error type.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CallError {
    /// Call execution failed; the message describes the underlying cause.
    #[error("call failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },
}

impl CallError {
    /// Creates a [`CallError::Failed`] from any displayable message.
    pub fn failed(error: impl Into<String>) -> Self {
        CallError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CallError::Failed { .. } => "call_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CallError::Failed { error } => format!("error: {error}"),
        }
    }
}
