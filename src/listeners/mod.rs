//! # Completion listeners.
//!
//! This module provides the [`Listener`] trait and the registry used to fan
//! completed calls out to every registered observer.
//!
//! ## Architecture
//! ```text
//! Delivery flow:
//!   worker job ── post(Completion) ──► CompletionChannel ──► completion_listener
//!                                                                  │
//!                                                      ListenerSet::notify_all(&Completion)
//!                                                          │         │         │
//!                                                          ▼         ▼         ▼
//!                                                     listener1  listener2  listenerN
//!                                                     (serial, registration order)
//! ```
//!
//! ## Rules
//! - Registration is identity-based: the same `Arc` is never held twice.
//! - Listeners are invoked serially, in registration order, on the consumer
//!   task; a slow listener delays the ones after it and the next completion.
//! - A panicking listener is isolated; the remaining listeners still run.

mod listener;
mod set;

#[cfg(feature = "logging")]
mod log;

pub use listener::{Listener, ListenerRef};
pub use set::ListenerSet;

#[cfg(feature = "logging")]
pub use log::LogListener;
