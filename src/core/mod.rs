//! Runtime core: execution and delivery.
//!
//! This module contains the embedded implementation of the callbridge
//! runtime. The public API from this module is [`Dispatcher`] plus its
//! [`DispatcherConfig`] and the standalone [`execute_and_wrap`] helper.
//!
//! Internal modules:
//! - [`wrap`]: executes one call, measures it, converts failure into a failed completion;
//! - [`dispatcher`]: wires pool, channel, consumer task and listener registry;
//! - [`pool`]: elastic bounded worker pool over an unbounded FIFO queue;
//! - [`config`]: worker pool settings.

mod config;
mod dispatcher;
mod pool;
mod wrap;

pub use config::DispatcherConfig;
pub use dispatcher::Dispatcher;
pub use wrap::execute_and_wrap;
