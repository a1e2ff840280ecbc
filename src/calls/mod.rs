//! # Call abstractions.
//!
//! This module provides the core call-related types:
//! - [`Call`] - trait for implementing executable, failure-aware calls
//! - [`CallFn`] - closure-based call implementation
//! - [`CallRef`] - shared reference to a call (`Arc<dyn Call>`)

mod call;
mod call_fn;

pub use call::{Call, CallRef};
pub use call_fn::CallFn;
