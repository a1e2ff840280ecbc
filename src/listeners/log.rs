//! # Simple logging listener for debugging and demos.
//!
//! [`LogListener`] prints one line per delivered completion to stdout.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [finished] call=fetch-user elapsed=124ms
//! [failed] call=fetch-user elapsed=31ms reason="connection refused"
//! ```

use async_trait::async_trait;

use crate::completions::Completion;
use crate::listeners::Listener;

/// Simple stdout logging listener.
///
/// Enabled via the `logging` feature. Prints human-readable completion lines
/// for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Listener`] for
/// structured logging or metrics collection.
pub struct LogListener;

#[async_trait]
impl<R> Listener<R> for LogListener
where
    R: Send + Sync + 'static,
{
    async fn on_completion(&self, done: &Completion<R>) {
        if done.succeeded {
            println!("[finished] call={} elapsed={}ms", done.call, done.elapsed_ms());
        } else {
            println!(
                "[failed] call={} elapsed={}ms reason={:?}",
                done.call,
                done.elapsed_ms(),
                done.reason.as_deref().unwrap_or("unknown")
            );
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
