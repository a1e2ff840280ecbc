//! # Completion listener trait.
//!
//! Provides [`Listener`], the extension point for observing completed calls.
//!
//! Each listener is invoked once per delivered completion, serially and in
//! registration order, from the dispatcher's single consumer task. All
//! listener invocations therefore happen on one task; a listener must not
//! block that task for longer than the surrounding application tolerates.

use async_trait::async_trait;

use crate::completions::Completion;

/// Observer invoked once per delivered completion.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the consumer task.
/// - Handle errors internally; panics are caught and reported, but the
///   completion is still considered delivered.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use callbridge::{Completion, Listener};
///
/// struct Audit;
///
/// #[async_trait]
/// impl Listener<String> for Audit {
///     async fn on_completion(&self, done: &Completion<String>) {
///         if !done.succeeded {
///             // record the failure, export a metric, etc.
///         }
///     }
///
///     fn name(&self) -> &'static str { "audit" }
/// }
/// ```
#[async_trait]
pub trait Listener<R>: Send + Sync + 'static
where
    R: Send + Sync + 'static,
{
    /// Processes a single delivered completion.
    ///
    /// Called from the dispatcher's consumer task, not from the worker that
    /// executed the call. Completions arrive in channel (post) order.
    async fn on_completion(&self, completion: &Completion<R>);

    /// Returns the listener name used in panic reports and logs.
    ///
    /// Prefer short, descriptive names (e.g., "audit", "metrics", "ui").
    /// The default uses `type_name::<Self>()`, which can be verbose.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a listener (`Arc<dyn Listener>`).
///
/// Registration and removal compare handles by identity (`Arc::ptr_eq`), so
/// keep the handle you registered if you intend to remove it later.
pub type ListenerRef<R> = std::sync::Arc<dyn Listener<R>>;
