//! # Closure-backed call (`CallFn`)
//!
//! [`CallFn`] wraps an execute closure `F: Fn(Arc<C>) -> Fut`, producing a
//! fresh future per execution, plus an empty-response closure used to build
//! the failure placeholder. This avoids shared mutable state between
//! executions; if shared state is needed, capture an `Arc<...>` explicitly
//! inside the closure.

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::calls::Call;
use crate::error::CallError;

/// Closure-backed call implementation.
///
/// Wraps a closure that *creates* a new future per execution, and a second
/// closure producing the empty response for the failure path.
#[derive(Debug)]
pub struct CallFn<F, E> {
    name: Cow<'static, str>,
    f: F,
    empty: E,
}

impl<F, E> CallFn<F, E> {
    /// Creates a new closure-backed call.
    ///
    /// Prefer [`CallFn::arc`] when you immediately need a [`CallRef`](crate::CallRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F, empty: E) -> Self {
        Self {
            name: name.into(),
            f,
            empty,
        }
    }

    /// Creates the call and returns it as a shared handle.
    ///
    /// ## Example
    /// ```
    /// use std::sync::Arc;
    /// use callbridge::{Call, CallError, CallFn, CallRef};
    ///
    /// let call: CallRef<(), String> = CallFn::arc(
    ///     "hello",
    ///     |_ctx: Arc<()>| async move { Ok::<_, CallError>("world".to_string()) },
    ///     String::new,
    /// );
    /// assert_eq!(call.name(), "hello");
    /// ```
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F, empty: E) -> Arc<Self> {
        Arc::new(Self::new(name, f, empty))
    }
}

#[async_trait]
impl<C, R, F, Fut, E> Call<C, R> for CallFn<F, E>
where
    C: Send + Sync + 'static,
    R: Send + Sync + 'static,
    F: Fn(Arc<C>) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<R, CallError>> + Send + 'static,
    E: Fn() -> R + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, ctx: Arc<C>) -> Result<R, CallError> {
        (self.f)(ctx).await
    }

    fn empty_response(&self) -> R {
        (self.empty)()
    }
}
