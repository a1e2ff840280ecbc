//! # Dispatcher: background execution, single-consumer delivery, graceful shutdown.
//!
//! The [`Dispatcher`] owns the worker pool, the completion channel, and the
//! [`ListenerSet`]. It accepts opaque calls, runs each on a pool worker,
//! wraps the outcome into a [`Completion`], and hands it to one dedicated
//! consumer task that invokes every registered listener in order.
//!
//! ## Key responsibilities
//! - accept calls without blocking the caller (`submit`)
//! - convert call failures into failed completions (never propagate)
//! - deliver every completion through a single consumer task
//! - perform graceful shutdown with a caller-supplied grace period
//!
//! ## High-level architecture
//! ```text
//! submit(call)
//!     │  builds a job: execute_and_wrap(ctx, call) → channel.post(completion)
//!     ▼
//! WorkerPool (core workers + bounded growth, unbounded FIFO queue)
//!     │ ... workers execute concurrently; completion order is unspecified
//!     ▼
//! CompletionChannel (unbounded mpsc, FIFO in post order)
//!     ▼
//! completion_listener (one consumer task)
//!     ▼
//! ListenerSet::notify_all(&completion)   (serial, registration order)
//! ```
//!
//! ## Shutdown path
//! ```text
//! shutdown(grace):
//!   ├─ stop intake (subsequent submits → Err(Terminated))
//!   ├─ pool.join(grace): in-flight jobs finish; stragglers aborted on timeout
//!   ├─ queued jobs that never started are discarded (reported via stderr)
//!   └─ consumer drains the channel, delivering every posted completion,
//!      then exits; shutdown returns after the drain
//! ```
//!
//! There is no implicit global instance: construct a `Dispatcher`, share it
//! (typically inside an `Arc`), and shut it down explicitly.

use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::calls::CallRef;
use crate::completions::{Completion, CompletionChannel};
use crate::core::config::DispatcherConfig;
use crate::core::pool::{Job, WorkerPool};
use crate::core::wrap::execute_and_wrap;
use crate::error::DispatchError;
use crate::listeners::{ListenerRef, ListenerSet};

/// Coordinates call execution, completion delivery, and graceful shutdown.
///
/// Generic over the execution context `C` (opaque, shared with every call)
/// and the response type `R` produced by calls.
pub struct Dispatcher<C, R> {
    ctx: Arc<C>,
    pool: WorkerPool,
    listeners: Arc<ListenerSet<R>>,
    channel: StdMutex<Option<CompletionChannel<R>>>,
    consumer: StdMutex<Option<JoinHandle<()>>>,
}

impl<C, R> Dispatcher<C, R>
where
    C: Send + Sync + 'static,
    R: Send + Sync + 'static,
{
    /// Creates a dispatcher, spawning its workers and the consumer task.
    ///
    /// Must be called within a Tokio runtime. The context is shared with
    /// every call execution and never interpreted by the dispatcher.
    pub fn new(cfg: DispatcherConfig, context: C) -> Self {
        let listeners = Arc::new(ListenerSet::new());
        let (channel, rx) = CompletionChannel::new();
        let consumer = Self::completion_listener(rx, Arc::clone(&listeners));
        Self {
            ctx: Arc::new(context),
            pool: WorkerPool::new(&cfg),
            listeners,
            channel: StdMutex::new(Some(channel)),
            consumer: StdMutex::new(Some(consumer)),
        }
    }

    /// Drains the completion channel and fans each completion out (the
    /// "designated thread" of the system).
    fn completion_listener(
        mut rx: mpsc::UnboundedReceiver<Completion<R>>,
        listeners: Arc<ListenerSet<R>>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(completion) = rx.recv().await {
                listeners.notify_all(&completion).await;
            }
        })
    }

    /// Enqueues a call for background execution; fire-and-forget.
    ///
    /// Returns immediately and never blocks. There is no handle to the
    /// eventual result: delivery happens exclusively through registered
    /// listeners. Exactly one completion is delivered per accepted call,
    /// unless the dispatcher shuts down before the call starts.
    pub fn submit(&self, call: CallRef<C, R>) -> Result<(), DispatchError> {
        let channel = self
            .channel
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        let Some(channel) = channel else {
            return Err(DispatchError::Terminated);
        };

        let ctx = Arc::clone(&self.ctx);
        let job: Job = Box::pin(async move {
            let completion = execute_and_wrap(ctx, call.as_ref()).await;
            channel.post(completion);
        });
        self.pool.submit(job)
    }

    /// Registers a listener; idempotent for the same handle.
    ///
    /// Returns `true` if the listener was added, `false` on duplicate.
    pub async fn add_listener(&self, listener: ListenerRef<R>) -> bool {
        self.listeners.add(listener).await
    }

    /// Removes a listener by identity; idempotent.
    ///
    /// Removal takes effect from the next fan-out pass: a completion whose
    /// delivery snapshot was already taken still reaches the listener.
    pub async fn remove_listener(&self, listener: &ListenerRef<R>) -> bool {
        self.listeners.remove(listener).await
    }

    /// Number of currently registered listeners.
    pub async fn listener_count(&self) -> usize {
        self.listeners.len().await
    }

    /// Returns a handle to the execution context.
    pub fn context(&self) -> Arc<C> {
        Arc::clone(&self.ctx)
    }

    /// True once [`shutdown`](Self::shutdown) has begun.
    pub fn is_terminated(&self) -> bool {
        self.pool.is_closed()
    }

    /// Shuts the dispatcher down.
    ///
    /// Stops intake, waits up to `grace` for in-flight calls to finish, then
    /// drains the completion channel so every posted completion is delivered
    /// before this method returns. Queued calls that never started are
    /// discarded. A second call is a no-op returning `Ok(())`.
    ///
    /// Returns [`DispatchError::GraceExceeded`] if workers had to be aborted.
    pub async fn shutdown(&self, grace: Duration) -> Result<(), DispatchError> {
        let channel = self.channel.lock().unwrap_or_else(|e| e.into_inner()).take();
        if channel.is_none() {
            return Ok(());
        }

        self.pool.close();
        let joined = self.pool.join(grace).await;

        let discarded = self.pool.discard_pending().await;
        if discarded > 0 {
            eprintln!("[callbridge] {discarded} queued call(s) discarded at shutdown");
        }

        // With intake stopped and the queue drained, dropping our posting
        // handle closes the channel once in-flight jobs are done; the
        // consumer then delivers what remains and exits.
        drop(channel);
        let consumer = self
            .consumer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = consumer {
            let _ = handle.await;
        }
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calls::CallFn;
    use crate::error::CallError;
    use crate::listeners::Listener;
    use async_trait::async_trait;
    use rand::Rng;
    use tokio::time;

    type Delivery = (String, bool, Option<String>, u64);

    /// Forwards every delivered completion into a test channel.
    struct Forward {
        tx: mpsc::UnboundedSender<Delivery>,
    }

    #[async_trait]
    impl Listener<String> for Forward {
        async fn on_completion(&self, done: &Completion<String>) {
            let _ = self.tx.send((
                done.response.clone(),
                done.succeeded,
                done.reason.as_deref().map(str::to_owned),
                done.elapsed_ms(),
            ));
        }

        fn name(&self) -> &'static str {
            "forward"
        }
    }

    fn dispatcher() -> Dispatcher<(), String> {
        Dispatcher::new(DispatcherConfig::default(), ())
    }

    fn forwarding_listener() -> (ListenerRef<String>, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Forward { tx }), rx)
    }

    fn ok_call(name: &'static str, delay: Duration, reply: &'static str) -> CallRef<(), String> {
        CallFn::arc(
            name,
            move |_ctx: Arc<()>| async move {
                time::sleep(delay).await;
                Ok(reply.to_string())
            },
            || "EMPTY".to_string(),
        )
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<Delivery>) -> Delivery {
        time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("delivery timed out")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn delivers_completion_to_listener() {
        let d = dispatcher();
        let (listener, mut rx) = forwarding_listener();
        d.add_listener(listener).await;

        d.submit(ok_call("ping", Duration::ZERO, "pong")).unwrap();

        let (response, succeeded, reason, _) = recv(&mut rx).await;
        assert_eq!(response, "pong");
        assert!(succeeded);
        assert!(reason.is_none());
    }

    #[tokio::test]
    async fn randomized_delays_all_calls_complete() {
        let d = dispatcher();
        let (listener, mut rx) = forwarding_listener();
        d.add_listener(listener).await;

        let mut rng = rand::rng();
        for i in 0..10 {
            let delay = Duration::from_millis(rng.random_range(0..50));
            d.submit(CallFn::arc(
                "randomized",
                move |_ctx: Arc<()>| async move {
                    time::sleep(delay).await;
                    Ok(format!("reply-{i}"))
                },
                || "EMPTY".to_string(),
            ))
            .unwrap();
        }

        let mut deliveries = Vec::new();
        for _ in 0..10 {
            deliveries.push(recv(&mut rx).await);
        }
        assert_eq!(deliveries.len(), 10);
        assert!(deliveries.iter().all(|(_, succeeded, _, _)| *succeeded));
    }

    #[tokio::test]
    async fn failed_call_delivers_empty_response_once() {
        let d = dispatcher();
        let (listener, mut rx) = forwarding_listener();
        d.add_listener(listener).await;

        d.submit(CallFn::arc(
            "broken",
            |_ctx: Arc<()>| async move { Err::<String, _>(CallError::failed("refused")) },
            || "EMPTY".to_string(),
        ))
        .unwrap();

        let (response, succeeded, reason, _) = recv(&mut rx).await;
        assert_eq!(response, "EMPTY");
        assert!(!succeeded);
        assert!(reason.unwrap().contains("refused"));

        // exactly one completion per call
        let extra = time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(extra.is_err());
    }

    #[tokio::test]
    async fn panicking_call_delivers_empty_response() {
        let d = dispatcher();
        let (listener, mut rx) = forwarding_listener();
        d.add_listener(listener).await;

        d.submit(CallFn::arc(
            "explosive",
            |_ctx: Arc<()>| async move {
                if true {
                    panic!("kaboom");
                }
                Ok::<String, CallError>(String::new())
            },
            || "EMPTY".to_string(),
        ))
        .unwrap();

        let (response, succeeded, reason, _) = recv(&mut rx).await;
        assert_eq!(response, "EMPTY");
        assert!(!succeeded);
        assert!(reason.unwrap().contains("kaboom"));
    }

    #[tokio::test]
    async fn duplicate_listener_is_notified_once() {
        let d = dispatcher();
        let (listener, mut rx) = forwarding_listener();
        assert!(d.add_listener(Arc::clone(&listener)).await);
        assert!(!d.add_listener(Arc::clone(&listener)).await);
        assert_eq!(d.listener_count().await, 1);

        d.submit(ok_call("once", Duration::ZERO, "reply")).unwrap();

        recv(&mut rx).await;
        let extra = time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(extra.is_err());
    }

    #[tokio::test]
    async fn listener_removed_before_delivery_is_not_notified() {
        let d = dispatcher();
        let (listener, mut rx) = forwarding_listener();
        d.add_listener(Arc::clone(&listener)).await;

        // the call outlives the removal below; the fan-out snapshot is taken
        // at delivery time, so the listener must not see the completion
        d.submit(ok_call("slow", Duration::from_millis(150), "late"))
            .unwrap();
        assert!(d.remove_listener(&listener).await);

        let nothing = time::timeout(Duration::from_millis(400), rx.recv()).await;
        assert!(nothing.is_err());
    }

    #[tokio::test]
    async fn listener_added_before_delivery_is_notified() {
        let d = dispatcher();
        let (listener, mut rx) = forwarding_listener();

        // registration after submission but before delivery: the fan-out
        // snapshot at delivery time includes the late-added listener
        d.submit(ok_call("slow", Duration::from_millis(150), "late"))
            .unwrap();
        assert!(d.add_listener(listener).await);

        let (response, succeeded, _, _) = recv(&mut rx).await;
        assert_eq!(response, "late");
        assert!(succeeded);
    }

    #[tokio::test]
    async fn elapsed_reflects_execution_duration() {
        let d = dispatcher();
        let (listener, mut rx) = forwarding_listener();
        d.add_listener(listener).await;

        d.submit(ok_call("sleepy", Duration::from_millis(30), "done"))
            .unwrap();

        let (_, succeeded, _, elapsed_ms) = recv(&mut rx).await;
        assert!(succeeded);
        assert!(elapsed_ms >= 30);
    }

    #[tokio::test]
    async fn context_is_passed_to_calls() {
        let d: Dispatcher<u32, String> = Dispatcher::new(DispatcherConfig::default(), 41);
        let (tx, mut rx) = mpsc::unbounded_channel();
        d.add_listener(Arc::new(Forward { tx })).await;

        d.submit(CallFn::arc(
            "ctx",
            |ctx: Arc<u32>| async move { Ok(format!("{}", *ctx + 1)) },
            String::new,
        ))
        .unwrap();

        let (response, _, _, _) = recv(&mut rx).await;
        assert_eq!(response, "42");
    }

    #[tokio::test]
    async fn submit_after_shutdown_is_rejected() {
        let d = dispatcher();
        d.shutdown(Duration::from_secs(1)).await.unwrap();
        assert!(d.is_terminated());

        let err = d
            .submit(ok_call("late", Duration::ZERO, "nope"))
            .unwrap_err();
        assert!(matches!(err, DispatchError::Terminated));
    }

    #[tokio::test]
    async fn shutdown_delivers_in_flight_completion() {
        let d = dispatcher();
        let (listener, mut rx) = forwarding_listener();
        d.add_listener(listener).await;

        d.submit(ok_call("in-flight", Duration::from_millis(50), "made-it"))
            .unwrap();
        // let a worker dequeue the job before stopping intake
        time::sleep(Duration::from_millis(20)).await;
        d.shutdown(Duration::from_secs(2)).await.unwrap();

        let (response, succeeded, _, _) = rx.try_recv().expect("completion not delivered");
        assert_eq!(response, "made-it");
        assert!(succeeded);
    }

    #[tokio::test]
    async fn shutdown_reports_grace_exceeded() {
        let d = dispatcher();
        d.submit(ok_call("stuck", Duration::from_secs(30), "never"))
            .unwrap();
        time::sleep(Duration::from_millis(20)).await;

        let err = d.shutdown(Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, DispatchError::GraceExceeded { .. }));
    }

    #[tokio::test]
    async fn second_shutdown_is_noop() {
        let d = dispatcher();
        d.shutdown(Duration::from_secs(1)).await.unwrap();
        d.shutdown(Duration::from_secs(1)).await.unwrap();
    }
}
