//! Completed-call results: envelope and notification channel.
//!
//! This module groups the completion **data model** and the **channel** used
//! to hand completed results from worker tasks to the single consumer task
//! that fans them out to listeners.
//!
//! ## Contents
//! - [`Completion`] result envelope with success flag, elapsed time and metadata
//! - [`CompletionChannel`] thin wrapper over `tokio::sync::mpsc` (unbounded)
//!
//! ## Quick reference
//! - **Producers**: worker jobs built by `Dispatcher::submit`, and
//!   `execute_and_wrap` when used directly.
//! - **Consumer**: `Dispatcher::completion_listener()` (fans out to
//!   `ListenerSet`).
//!
//! See `core/mod.rs` for the system-level wiring diagram.

mod channel;
mod completion;

pub use channel::CompletionChannel;
pub use completion::Completion;
