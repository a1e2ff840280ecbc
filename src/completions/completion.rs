//! # Completion envelope for finished calls.
//!
//! A [`Completion`] is built by the execution wrapper, never by the call
//! itself: the wrapper measures elapsed time around `execute` alone and sets
//! the success flag from the execution outcome. On failure the envelope
//! carries the call's empty response and a human-readable reason.
//!
//! ## Ordering guarantees
//! Each completion has a globally unique sequence number (`seq`) that
//! increases monotonically. Channel delivery is FIFO in post order; use `seq`
//! to restore a total order across channels if ever needed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for completion ordering.
static COMPLETION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Outcome of one executed call, with metadata set by the dispatcher.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `elapsed`: brackets only the call's execution, not queueing or delivery
#[derive(Debug)]
pub struct Completion<R> {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp taken when the envelope was built.
    pub at: SystemTime,
    /// Name of the call that produced this completion.
    pub call: Arc<str>,
    /// The response payload; the call's empty response when `succeeded` is false.
    pub response: R,
    /// Whether execution produced a response (`true`) or failed (`false`).
    pub succeeded: bool,
    /// Wall-clock duration of the call's execution alone.
    pub elapsed: Duration,
    /// Human-readable failure reason; `None` on success.
    pub reason: Option<Arc<str>>,
}

impl<R> Completion<R> {
    /// Creates a successful completion with the current timestamp and next
    /// sequence number.
    pub fn new(call: impl Into<Arc<str>>, response: R, elapsed: Duration) -> Self {
        Self {
            seq: COMPLETION_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            call: call.into(),
            response,
            succeeded: true,
            elapsed,
            reason: None,
        }
    }

    /// Marks the completion as failed and attaches the failure reason.
    #[inline]
    pub fn with_failure(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.succeeded = false;
        self.reason = Some(reason.into());
        self
    }

    /// Elapsed execution time in whole milliseconds (saturating).
    #[inline]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis().min(u128::from(u64::MAX)) as u64
    }
}
