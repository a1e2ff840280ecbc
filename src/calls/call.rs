//! # Call abstraction.
//!
//! This module defines the [`Call`] trait, the dispatcher's view of an opaque
//! unit of work. The common handle type is [`CallRef`], an `Arc<dyn Call>`
//! suitable for handing over to the worker pool.
//!
//! A call is polymorphic over two collaborator types it does not interpret:
//! - `C` — the execution context, constructed once per dispatcher and passed
//!   to every execution as a shared handle;
//! - `R` — the response produced on success.
//!
//! The dispatcher treats execution as opaque and potentially blocking: invoke
//! it, and it either produces a response or fails with a
//! [`CallError`](crate::CallError). Failure is converted into the call's
//! [`empty_response`](Call::empty_response) with the success flag cleared,
//! never propagated.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::CallError;

/// # Opaque, executable unit submitted for background execution.
///
/// A `Call` has a stable [`name`](Call::name), an async
/// [`execute`](Call::execute) method receiving the dispatcher's execution
/// context, and an [`empty_response`](Call::empty_response) used by the
/// runtime to build a failure placeholder when execution fails.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use callbridge::{Call, CallError};
///
/// struct Fetch;
///
/// #[async_trait]
/// impl Call<(), String> for Fetch {
///     fn name(&self) -> &str { "fetch" }
///
///     async fn execute(&self, _ctx: Arc<()>) -> Result<String, CallError> {
///         Ok("payload".to_string())
///     }
///
///     fn empty_response(&self) -> String {
///         String::new()
///     }
/// }
/// ```
#[async_trait]
pub trait Call<C, R>: Send + Sync + 'static
where
    C: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    /// Returns a stable, human-readable call name.
    fn name(&self) -> &str;

    /// Executes the call against the given execution context.
    ///
    /// May block internally for as long as the underlying work requires;
    /// offloading that blocking is the reason the dispatcher exists.
    async fn execute(&self, ctx: Arc<C>) -> Result<R, CallError>;

    /// Returns the placeholder response used when execution fails.
    ///
    /// The runtime delivers it with the completion's success flag cleared.
    fn empty_response(&self) -> R;
}

/// Shared handle to a call (`Arc<dyn Call>`).
pub type CallRef<C, R> = Arc<dyn Call<C, R>>;
