//! # Dispatcher configuration.
//!
//! Provides [`DispatcherConfig`], the settings for the worker pool behind a
//! [`Dispatcher`](crate::Dispatcher).
//!
//! ## Sentinel values
//! - `core_workers = 0` is clamped to 1 (the pool always keeps one resident worker)
//! - `max_workers < core_workers` is clamped up to `core_workers`

use std::time::Duration;

/// Configuration for the dispatcher's worker pool.
///
/// ## Field semantics
/// - `core_workers`: resident workers that never retire (min 1; clamped)
/// - `max_workers`: upper bound on simultaneously active workers (min `core_workers`; clamped)
/// - `keep_alive`: idle time after which a worker above the core count retires
///
/// The pending-work queue is unbounded; `max_workers` is the only
/// backpressure the dispatcher applies.
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// Number of resident workers kept alive for the dispatcher's lifetime.
    pub core_workers: usize,

    /// Maximum number of workers executing calls simultaneously.
    ///
    /// When every active worker is busy and work is queued, the pool grows
    /// up to this bound; surplus workers retire after `keep_alive` idle.
    pub max_workers: usize,

    /// Idle duration after which a surplus worker (above `core_workers`)
    /// exits.
    pub keep_alive: Duration,
}

impl DispatcherConfig {
    /// Returns the resident worker count clamped to a minimum of 1.
    #[inline]
    pub fn core_workers_clamped(&self) -> usize {
        self.core_workers.max(1)
    }

    /// Returns the worker cap clamped to at least the resident count.
    #[inline]
    pub fn max_workers_clamped(&self) -> usize {
        self.max_workers.max(self.core_workers_clamped())
    }
}

impl Default for DispatcherConfig {
    /// Default configuration:
    ///
    /// - `core_workers = 2`
    /// - `max_workers = 3`
    /// - `keep_alive = 60s`
    fn default() -> Self {
        Self {
            core_workers: 2,
            max_workers: 3,
            keep_alive: Duration::from_secs(60),
        }
    }
}
