//! # ListenerSet: deduplicated, insertion-ordered fan-out registry.
//!
//! [`ListenerSet`] maintains the set of currently registered listeners and
//! delivers each [`Completion`](crate::Completion) to all of them, serially
//! and in registration order.
//!
//! ## What it guarantees
//! - Identity-based deduplication: adding the same `Arc` twice is a no-op.
//! - `notify_all` snapshots the membership before invoking anyone, so a
//!   listener added or removed during an in-progress pass is deterministically
//!   not observed by that pass.
//! - Panics inside listeners are caught and reported (isolation).
//!
//! ## What it does **not** guarantee
//! - A listener removed while a completion is already snapshotted for
//!   delivery still receives that completion.
//! - No parallelism: a slow listener delays the listeners after it.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::RwLock;

use crate::completions::Completion;

use super::{Listener, ListenerRef};

/// Thread-safe registry of listeners with snapshot-based fan-out.
///
/// ### Responsibilities
/// - Keeps membership deduplicated (by `Arc` identity) and insertion-ordered
/// - Delivers completions serially, in registration order
/// - Isolates listener panics from the consumer task and from other listeners
pub struct ListenerSet<R> {
    inner: RwLock<Vec<ListenerRef<R>>>,
}

impl<R> ListenerSet<R>
where
    R: Send + Sync + 'static,
{
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Vec::new()),
        }
    }

    /// Registers a listener; no-op if the same handle is already present.
    ///
    /// Returns `true` if the listener was added, `false` on duplicate.
    pub async fn add(&self, listener: ListenerRef<R>) -> bool {
        let mut inner = self.inner.write().await;
        if inner.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            return false;
        }
        inner.push(listener);
        true
    }

    /// Removes a listener by identity; no-op if absent.
    ///
    /// Returns `true` if the listener was removed.
    pub async fn remove(&self, listener: &ListenerRef<R>) -> bool {
        let mut inner = self.inner.write().await;
        let before = inner.len();
        inner.retain(|l| !Arc::ptr_eq(l, listener));
        inner.len() != before
    }

    /// Number of registered listeners.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// True if no listeners are registered.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Invokes every currently registered listener with the completion,
    /// serially and in registration order.
    ///
    /// Membership is snapshotted before the first invocation; structural
    /// changes made while the pass runs take effect from the next completion.
    /// A panicking listener is reported and skipped; the rest still run.
    pub async fn notify_all(&self, completion: &Completion<R>) {
        let snapshot: Vec<ListenerRef<R>> = self.inner.read().await.clone();
        for listener in snapshot {
            let fut = listener.on_completion(completion);
            if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                eprintln!(
                    "[callbridge] listener '{}' panicked: {:?}",
                    listener.name(),
                    panic_err
                );
            }
        }
    }
}

impl<R> Default for ListenerSet<R>
where
    R: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
