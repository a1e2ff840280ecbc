//! # Notification channel for completed calls.
//!
//! [`CompletionChannel`] is a thin wrapper around an unbounded
//! [`tokio::sync::mpsc`] channel that transports a [`Completion`] from
//! whichever worker produced it to the single consumer task that invokes
//! listeners.
//!
//! ## Architecture
//! ```text
//! Producers (many):                      Consumer (one):
//!   worker 1 ──┐
//!   worker 2 ──┼───► CompletionChannel ───► completion_listener ───► ListenerSet
//!   worker N ──┘        (mpsc, FIFO)          (in Dispatcher)
//! ```
//!
//! ## Rules
//! - **Non-blocking post**: `post()` never blocks or awaits; the channel is
//!   unbounded, so notifications queue indefinitely if the consumer is slow.
//! - **FIFO**: delivery order matches post order, not submission order.
//! - **Stale notifications**: a post after the consumer is gone is silently
//!   discarded rather than failing.

use tokio::sync::mpsc;

use super::completion::Completion;

/// Posting side of the single-consumer completion channel.
///
/// Cheap to clone (internally holds an `Arc`-backed sender); every in-flight
/// job holds one clone, and the channel closes once all clones are dropped.
pub struct CompletionChannel<R> {
    tx: mpsc::UnboundedSender<Completion<R>>,
}

impl<R> Clone for CompletionChannel<R> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<R> CompletionChannel<R> {
    /// Creates the channel, returning the posting side and the receive side.
    ///
    /// The receiver must be owned by exactly one consumer task.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Completion<R>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Posts a completion to the consumer.
    ///
    /// Never blocks. If the consumer has shut down, the completion is
    /// discarded.
    pub fn post(&self, completion: Completion<R>) {
        let _ = self.tx.send(completion);
    }
}
