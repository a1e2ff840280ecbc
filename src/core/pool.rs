//! # Bounded worker pool with an unbounded job queue.
//!
//! Executes submitted jobs concurrently, bounded by
//! [`DispatcherConfig::max_workers`]. Resident workers
//! ([`DispatcherConfig::core_workers`]) live for the pool's lifetime; surplus
//! workers are spawned when every active worker is busy and retire after
//! [`DispatcherConfig::keep_alive`] idle.
//!
//! ## Architecture
//! ```text
//! submit(job) ──► unbounded mpsc queue ──► shared receiver (async Mutex)
//!                                              │
//!                         ┌────────────────────┼────────────────────┐
//!                         ▼                    ▼                    ▼
//!                    worker 1 (core)      worker 2 (core)      worker 3 (surplus,
//!                                                               retires when idle)
//! ```
//!
//! ## Rules
//! - `submit` never blocks; the queue never reports "full".
//! - Jobs are dequeued in submission order by whichever worker is free;
//!   completion order depends on individual job duration.
//! - `close` stops intake and cancels idle workers; a worker mid-job finishes
//!   that job first. Queued jobs that never started are dropped at teardown.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::core::config::DispatcherConfig;
use crate::error::DispatchError;

/// A unit of work accepted by the pool.
pub(crate) type Job = std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 'static>>;

/// Single FIFO queue shared by all workers.
type SharedQueue = Arc<Mutex<mpsc::UnboundedReceiver<Job>>>;

/// Elastic worker pool: resident core, bounded growth, idle retirement.
pub(crate) struct WorkerPool {
    tx: mpsc::UnboundedSender<Job>,
    queue: SharedQueue,
    token: CancellationToken,
    active: Arc<AtomicUsize>,
    busy: Arc<AtomicUsize>,
    keep_alive: Duration,
    max_workers: usize,
    handles: StdMutex<Vec<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Creates the pool and spawns the resident workers.
    ///
    /// Must be called within a Tokio runtime.
    pub(crate) fn new(cfg: &DispatcherConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let pool = Self {
            tx,
            queue: Arc::new(Mutex::new(rx)),
            token: CancellationToken::new(),
            active: Arc::new(AtomicUsize::new(0)),
            busy: Arc::new(AtomicUsize::new(0)),
            keep_alive: cfg.keep_alive,
            max_workers: cfg.max_workers_clamped(),
            handles: StdMutex::new(Vec::new()),
        };
        for _ in 0..cfg.core_workers_clamped() {
            pool.active.fetch_add(1, Ordering::AcqRel);
            pool.spawn_worker(true);
        }
        pool
    }

    /// Enqueues a job; never blocks.
    ///
    /// Returns [`DispatchError::Terminated`] once the pool is closed.
    pub(crate) fn submit(&self, job: Job) -> Result<(), DispatchError> {
        if self.token.is_cancelled() {
            return Err(DispatchError::Terminated);
        }
        self.tx.send(job).map_err(|_| DispatchError::Terminated)?;
        self.maybe_grow();
        Ok(())
    }

    /// Stops intake and signals all workers to exit once idle.
    pub(crate) fn close(&self) {
        self.token.cancel();
    }

    /// True once [`close`](Self::close) has been called.
    pub(crate) fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Current number of live workers (resident + surplus).
    pub(crate) fn active(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    /// Waits for all workers to exit within `grace`.
    ///
    /// On timeout, aborts the stragglers and reports how many were still
    /// executing a job.
    pub(crate) async fn join(&self, grace: Duration) -> Result<(), DispatchError> {
        let handles: Vec<JoinHandle<()>> = {
            let mut guard = self.handles.lock().unwrap_or_else(|e| e.into_inner());
            guard.drain(..).collect()
        };
        let aborts: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();

        let all = async move {
            for handle in handles {
                let _ = handle.await;
            }
        };
        match time::timeout(grace, all).await {
            Ok(()) => Ok(()),
            Err(_) => {
                let pending = self.busy.load(Ordering::Acquire);
                for abort in aborts {
                    abort.abort();
                }
                Err(DispatchError::GraceExceeded { grace, pending })
            }
        }
    }

    /// Drops jobs that were queued but never started; returns how many.
    ///
    /// Only meaningful after the workers have exited.
    pub(crate) async fn discard_pending(&self) -> usize {
        let mut rx = self.queue.lock().await;
        let mut dropped = 0;
        while rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    /// Spawns one surplus worker if every active worker is busy and the cap
    /// allows it.
    ///
    /// The busy/active comparison is a heuristic: a worker between dequeue
    /// and its busy increment may be counted as free, in which case the job
    /// simply waits for the next free worker.
    fn maybe_grow(&self) {
        loop {
            let active = self.active.load(Ordering::Acquire);
            if active >= self.max_workers || self.busy.load(Ordering::Acquire) < active {
                return;
            }
            if self
                .active
                .compare_exchange(active, active + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                self.spawn_worker(false);
                return;
            }
        }
    }

    /// Spawns a worker task; `active` must already account for it.
    fn spawn_worker(&self, resident: bool) {
        let queue = Arc::clone(&self.queue);
        let token = self.token.clone();
        let active = Arc::clone(&self.active);
        let busy = Arc::clone(&self.busy);
        let keep_alive = self.keep_alive;
        let handle = tokio::spawn(worker_loop(queue, token, active, busy, keep_alive, resident));
        self.handles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(handle);
    }
}

/// Dequeues and runs jobs until cancellation, queue closure, or (for surplus
/// workers) a `keep_alive` of idleness.
async fn worker_loop(
    queue: SharedQueue,
    token: CancellationToken,
    active: Arc<AtomicUsize>,
    busy: Arc<AtomicUsize>,
    keep_alive: Duration,
    resident: bool,
) {
    loop {
        let Some(job) = next_job(&queue, &token, keep_alive, resident).await else {
            break;
        };
        busy.fetch_add(1, Ordering::AcqRel);
        job.await;
        busy.fetch_sub(1, Ordering::AcqRel);
    }
    active.fetch_sub(1, Ordering::AcqRel);
}

/// Waits for the next job; `None` means the worker should exit.
///
/// For surplus workers the idle timeout covers the wait for the queue lock
/// as well as the receive itself, so a surplus worker retires even while a
/// resident worker is parked on the receiver.
async fn next_job(
    queue: &SharedQueue,
    token: &CancellationToken,
    keep_alive: Duration,
    resident: bool,
) -> Option<Job> {
    let recv = async {
        let mut rx = queue.lock().await;
        tokio::select! {
            _ = token.cancelled() => None,
            job = rx.recv() => job,
        }
    };
    if resident {
        recv.await
    } else {
        time::timeout(keep_alive, recv).await.ok().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::sync::oneshot;

    fn cfg(core: usize, max: usize, keep_alive: Duration) -> DispatcherConfig {
        DispatcherConfig {
            core_workers: core,
            max_workers: max,
            keep_alive,
        }
    }

    fn job_signaling(tx: oneshot::Sender<()>, delay: Duration) -> Job {
        Box::pin(async move {
            time::sleep(delay).await;
            let _ = tx.send(());
        })
    }

    #[tokio::test]
    async fn runs_submitted_jobs() {
        let pool = WorkerPool::new(&cfg(1, 1, Duration::from_secs(60)));
        let (tx, rx) = oneshot::channel();
        pool.submit(job_signaling(tx, Duration::ZERO)).unwrap();
        time::timeout(Duration::from_secs(2), rx)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn grows_beyond_core_when_all_workers_busy() {
        let pool = WorkerPool::new(&cfg(1, 2, Duration::from_secs(60)));
        let started = Instant::now();
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();

        pool.submit(job_signaling(tx1, Duration::from_millis(200)))
            .unwrap();
        // let the resident worker pick the first job up
        time::sleep(Duration::from_millis(30)).await;
        pool.submit(job_signaling(tx2, Duration::from_millis(200)))
            .unwrap();
        assert_eq!(pool.active(), 2);

        rx1.await.unwrap();
        rx2.await.unwrap();
        // ran in parallel: well under the 430ms a serial pool would need
        assert!(started.elapsed() < Duration::from_millis(400));
    }

    #[tokio::test]
    async fn surplus_worker_retires_after_keep_alive() {
        let pool = WorkerPool::new(&cfg(1, 2, Duration::from_millis(100)));
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();

        pool.submit(job_signaling(tx1, Duration::from_millis(80)))
            .unwrap();
        time::sleep(Duration::from_millis(20)).await;
        pool.submit(job_signaling(tx2, Duration::from_millis(80)))
            .unwrap();
        assert_eq!(pool.active(), 2);
        rx1.await.unwrap();
        rx2.await.unwrap();

        time::sleep(Duration::from_millis(400)).await;
        assert_eq!(pool.active(), 1);
    }

    #[tokio::test]
    async fn submit_after_close_is_rejected() {
        let pool = WorkerPool::new(&cfg(1, 1, Duration::from_secs(60)));
        pool.close();
        let err = pool.submit(Box::pin(async {})).unwrap_err();
        assert!(matches!(err, DispatchError::Terminated));
    }

    #[tokio::test]
    async fn join_waits_for_in_flight_job() {
        let pool = WorkerPool::new(&cfg(1, 1, Duration::from_secs(60)));
        let (tx, rx) = oneshot::channel();
        pool.submit(job_signaling(tx, Duration::from_millis(80)))
            .unwrap();
        // make sure the worker has dequeued the job before closing
        time::sleep(Duration::from_millis(20)).await;
        pool.close();
        pool.join(Duration::from_secs(2)).await.unwrap();
        rx.await.unwrap();
        assert_eq!(pool.active(), 0);
    }

    #[tokio::test]
    async fn join_reports_grace_exceeded() {
        let pool = WorkerPool::new(&cfg(1, 1, Duration::from_secs(60)));
        let (tx, _rx) = oneshot::channel();
        pool.submit(job_signaling(tx, Duration::from_secs(30)))
            .unwrap();
        time::sleep(Duration::from_millis(20)).await;
        pool.close();
        let err = pool.join(Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::GraceExceeded { pending: 1, .. }
        ));
    }
}
