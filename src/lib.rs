//! # callbridge
//!
//! **Callbridge** is a small asynchronous call dispatcher for Rust.
//!
//! It accepts opaque "call" operations, executes each on a bounded background
//! worker pool, and marshals the completed result onto a single consumer
//! task, where it fans out to a dynamic set of listeners. It exists to
//! decouple slow, potentially blocking call execution from a consumer context
//! that cannot tolerate blocking.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │     Call     │   │     Call     │   │     Call     │
//!     │  (user #1)   │   │  (user #2)   │   │  (user #3)   │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼ submit()         ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher (caller-owned, no global instance)                    │
//! │  - WorkerPool (core workers + bounded growth, unbounded queue)    │
//! │  - CompletionChannel (unbounded mpsc, FIFO)                       │
//! │  - ListenerSet (deduplicated, insertion-ordered fan-out)          │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!    worker 1           worker 2           worker 3
//!        │ execute_and_wrap(ctx, call):       │
//!        │   measure elapsed, convert         │
//!        │   failure → empty response         │
//!        └─────────── post(Completion) ───────┘
//!                           ▼
//!                  CompletionChannel
//!                           ▼
//!                 completion_listener (one consumer task)
//!                           ▼
//!              listener1 → listener2 → ... → listenerN
//!              (serial, registration order)
//! ```
//!
//! ## Guarantees
//! - `submit` never blocks and returns no result handle: delivery happens
//!   exclusively through registered listeners.
//! - Every accepted call yields exactly one [`Completion`] and one fan-out
//!   pass (unless the dispatcher shuts down before the call starts).
//! - A failing or panicking call is converted into its
//!   [`empty_response`](Call::empty_response) with the success flag cleared;
//!   failures never reach `submit` callers or listeners as errors.
//! - Elapsed time on a completion brackets only the call's execution.
//! - Listener registration is identity-deduplicated; the fan-out snapshot is
//!   taken at delivery time, so removal wins any race with an undelivered
//!   completion.
//!
//! ## Features
//! | Area           | Description                                                   | Key types / traits                    |
//! |----------------|---------------------------------------------------------------|---------------------------------------|
//! | **Calls**      | Define calls as trait impls or closures.                      | [`Call`], [`CallFn`], [`CallRef`]      |
//! | **Listeners**  | Observe every delivered completion (logging, metrics, UI).    | [`Listener`], [`ListenerSet`]          |
//! | **Delivery**   | Result envelope and single-consumer channel.                  | [`Completion`], [`CompletionChannel`]  |
//! | **Runtime**    | Pool sizing, direct execution, shutdown.                      | [`Dispatcher`], [`DispatcherConfig`]   |
//! | **Errors**     | Typed errors for the runtime and for call execution.          | [`DispatchError`], [`CallError`]       |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogListener`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use callbridge::{
//!     CallError, CallFn, CallRef, Completion, Dispatcher, DispatcherConfig, Listener,
//! };
//!
//! struct Print;
//!
//! #[async_trait]
//! impl Listener<String> for Print {
//!     async fn on_completion(&self, done: &Completion<String>) {
//!         println!("{} -> {} ({}ms)", done.call, done.response, done.elapsed_ms());
//!     }
//!
//!     fn name(&self) -> &'static str { "print" }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Explicit, caller-owned instance; the second argument is the
//!     // execution context shared with every call.
//!     let dispatcher = Dispatcher::new(DispatcherConfig::default(), ());
//!     dispatcher.add_listener(Arc::new(Print)).await;
//!
//!     let call: CallRef<(), String> = CallFn::arc(
//!         "hello",
//!         |_ctx: Arc<()>| async move { Ok::<_, CallError>("world".to_string()) },
//!         String::new,
//!     );
//!     dispatcher.submit(call)?;
//!
//!     tokio::time::sleep(Duration::from_millis(50)).await;
//!     dispatcher.shutdown(Duration::from_secs(1)).await?;
//!     Ok(())
//! }
//! ```

mod calls;
mod completions;
mod core;
mod error;
mod listeners;

// ---- Public re-exports ----

pub use calls::{Call, CallFn, CallRef};
pub use completions::{Completion, CompletionChannel};
pub use core::{Dispatcher, DispatcherConfig, execute_and_wrap};
pub use error::{CallError, DispatchError};
pub use listeners::{Listener, ListenerRef, ListenerSet};

// Optional: expose a simple built-in logging listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use listeners::LogListener;
