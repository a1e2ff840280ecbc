//! # Execute one call and wrap the outcome.
//!
//! Invokes a [`Call`] against the execution context and always produces a
//! [`Completion`], never an error.
//!
//! - **Execute** the call with the shared context
//! - **Measure** wall-clock time around the execution alone (not queueing,
//!   not delivery)
//! - **Convert failure**: an `Err` from `execute`, or a panic inside it,
//!   becomes the call's empty response with the success flag cleared and the
//!   failure message attached
//!
//! ## Outcome flow
//! ```text
//! Success:
//!   call.execute() → Ok(response)  → Completion { response, succeeded: true }
//!
//! Failure:
//!   call.execute() → Err(e)        → Completion { empty_response, succeeded: false, reason: e }
//!
//! Panic:
//!   call.execute() → panic!        → caught → Completion { empty_response, succeeded: false }
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;

use crate::calls::Call;
use crate::completions::Completion;

/// Executes `call` and wraps the outcome into a [`Completion`].
///
/// Public so callers can run a call synchronously, without the pool or the
/// listener registry; the dispatcher's workers use the same path.
///
/// ### Conversion semantics
/// - `Ok(response)` → successful completion carrying the response.
/// - `Err(e)` → failed completion carrying
///   [`empty_response`](Call::empty_response) and `e`'s message; the error is
///   consumed here and never re-raised.
/// - A panic inside `execute` is caught and treated like an error; whatever
///   partial state the call left behind is the call's own concern.
pub async fn execute_and_wrap<C, R>(ctx: Arc<C>, call: &dyn Call<C, R>) -> Completion<R>
where
    C: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    let started = Instant::now();
    let outcome = AssertUnwindSafe(call.execute(ctx)).catch_unwind().await;
    let elapsed = started.elapsed();

    match outcome {
        Ok(Ok(response)) => Completion::new(call.name(), response, elapsed),
        Ok(Err(err)) => Completion::new(call.name(), call.empty_response(), elapsed)
            .with_failure(err.to_string()),
        Err(panic_err) => Completion::new(call.name(), call.empty_response(), elapsed)
            .with_failure(panic_message(panic_err.as_ref())),
    }
}

/// Extracts a printable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "call panicked".to_string()
    }
}
