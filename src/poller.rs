//! Shared live-data polling loop.
//!
//! A poller owns one [`PollSource`], re-fetches it on a fixed cadence and
//! publishes the result to its view only when the fingerprint changed. Cycles
//! never overlap: the next one starts one interval after the previous one
//! settled. Dropping the [`PollHandle`] (the view unmounting) cancels the
//! loop and aborts any request still in flight.

use crate::bridge::{BridgeError, FetchOptions, NuiBridge};
use crate::events::NuiEvent;
use crate::fingerprint::Fingerprint;
use crate::platform;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Something a poller can fetch.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait PollSource: Send + Sync {
    type Item: Send;

    /// Name used in log lines
    fn label(&self) -> &str;

    async fn fetch(&self, cancel: &CancellationToken) -> Result<Self::Item, BridgeError>;
}

/// Typed endpoint source.
pub struct EventSource<E: NuiEvent> {
    bridge: Arc<NuiBridge>,
    payload: E::Payload,
    fallback: Option<E::Response>,
    timeout: Option<Duration>,
    _event: PhantomData<fn() -> E>,
}

impl<E: NuiEvent> EventSource<E> {
    pub fn new(bridge: Arc<NuiBridge>, payload: E::Payload) -> Self {
        EventSource {
            bridge,
            payload,
            fallback: None,
            timeout: None,
            _event: PhantomData,
        }
    }

    pub fn with_fallback(mut self, fallback: E::Response) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<E> PollSource for EventSource<E>
where
    E: NuiEvent,
    E::Response: Clone + Sync,
{
    type Item = E::Response;

    fn label(&self) -> &str {
        E::NAME
    }

    async fn fetch(&self, cancel: &CancellationToken) -> Result<E::Response, BridgeError> {
        let mut opts = FetchOptions::new().cancel(cancel.clone());
        opts.fallback = self.fallback.clone();
        opts.timeout = self.timeout;
        self.bridge.call::<E>(&self.payload, opts).await
    }
}

/// Untyped source: any event name, body decoded straight into `T`.
pub struct RawSource<T> {
    bridge: Arc<NuiBridge>,
    event: String,
    payload: Option<Value>,
    fallback: Option<T>,
}

impl<T> RawSource<T> {
    pub fn new(bridge: Arc<NuiBridge>, event: impl Into<String>, payload: Option<Value>) -> Self {
        RawSource {
            bridge,
            event: event.into(),
            payload,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: T) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl<T> PollSource for RawSource<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    type Item = T;

    fn label(&self) -> &str {
        &self.event
    }

    async fn fetch(&self, cancel: &CancellationToken) -> Result<T, BridgeError> {
        let mut opts = FetchOptions::new().cancel(cancel.clone());
        opts.fallback = self.fallback.clone();
        self.bridge
            .fetch_nui(&self.event, self.payload.as_ref(), opts)
            .await
    }
}

/// What a poller publishes to its view.
#[derive(Clone, Debug, PartialEq)]
pub enum PollEvent<T> {
    Updated(T),
    Failed(BridgeError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollPhase {
    Idle,
    Fetching,
}

/// Result of one poll cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// New fingerprint; the value was published
    Updated,
    /// Same fingerprint as last time; nothing published
    Unchanged,
    /// Fetch failed; the failure was published, state kept
    Failed,
    /// The view went away mid-cycle; nothing published
    Cancelled,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PollStats {
    pub cycles: u64,
    pub updates: u64,
    pub unchanged: u64,
    pub failures: u64,
    pub last_outcome: Option<CycleOutcome>,
    pub last_updated: Option<DateTime<Utc>>,
}

type Detector<T> = Box<dyn Fn(&T) -> Fingerprint + Send + Sync>;

pub struct LivePoller<S: PollSource> {
    source: S,
    interval: Duration,
    detector: Detector<S::Item>,
    last: Option<Fingerprint>,
    phase: PollPhase,
    stats: PollStats,
    events: UnboundedSender<PollEvent<S::Item>>,
}

impl<S: PollSource> LivePoller<S> {
    /// Poller over `source`; `detector` fingerprints each fetched value.
    pub fn new<F>(
        source: S,
        interval: Duration,
        detector: F,
    ) -> (Self, UnboundedReceiver<PollEvent<S::Item>>)
    where
        F: Fn(&S::Item) -> Fingerprint + Send + Sync + 'static,
    {
        let (events, rx) = unbounded_channel();
        let poller = LivePoller {
            source,
            interval,
            detector: Box::new(detector),
            last: None,
            phase: PollPhase::Idle,
            stats: PollStats::default(),
            events,
        };
        (poller, rx)
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run exactly one fetch-compare-publish cycle.
    pub async fn poll_once(&mut self, cancel: &CancellationToken) -> CycleOutcome {
        self.phase = PollPhase::Fetching;
        self.stats.cycles += 1;
        let result = self.source.fetch(cancel).await;
        self.phase = PollPhase::Idle;

        let outcome = if cancel.is_cancelled() || self.events.is_closed() {
            CycleOutcome::Cancelled
        } else {
            match result {
                Ok(item) => {
                    let fp = (self.detector)(&item);
                    if self.last == Some(fp) {
                        self.stats.unchanged += 1;
                        CycleOutcome::Unchanged
                    } else if self.events.send(PollEvent::Updated(item)).is_ok() {
                        self.last = Some(fp);
                        self.stats.updates += 1;
                        self.stats.last_updated = Some(Utc::now());
                        CycleOutcome::Updated
                    } else {
                        CycleOutcome::Cancelled
                    }
                }
                Err(BridgeError::Cancelled) => CycleOutcome::Cancelled,
                Err(e) => {
                    log::warn!("[nui][poll] {} failed: {e}", self.source.label());
                    self.stats.failures += 1;
                    let _ = self.events.send(PollEvent::Failed(e));
                    CycleOutcome::Failed
                }
            }
        };

        log::debug!("[nui][poll] {} cycle -> {:?}", self.source.label(), outcome);
        self.stats.last_outcome = Some(outcome);
        outcome
    }

    /// Poll until `cancel` fires or the view drops its receiver.
    pub async fn run(mut self, cancel: CancellationToken) -> PollStats {
        log::info!(
            "[nui][poll] {} started, every {}ms",
            self.source.label(),
            self.interval.as_millis()
        );
        loop {
            if cancel.is_cancelled() || self.events.is_closed() {
                break;
            }
            if self.poll_once(&cancel).await == CycleOutcome::Cancelled {
                break;
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = platform::sleep(self.interval) => {}
            }
        }
        log::info!(
            "[nui][poll] {} stopped after {} cycles",
            self.source.label(),
            self.stats.cycles
        );
        self.stats
    }
}

impl<S> LivePoller<S>
where
    S: PollSource + 'static,
    S::Item: 'static,
{
    /// Start the loop on the runtime (tokio natively, the event loop in the
    /// browser).
    pub fn spawn(self) -> PollHandle {
        let cancel = CancellationToken::new();
        let (done_tx, done_rx) = oneshot::channel();
        let token = cancel.clone();
        platform::spawn(async move {
            let stats = self.run(token).await;
            let _ = done_tx.send(stats);
        });
        PollHandle {
            cancel,
            done: Some(done_rx),
        }
    }
}

/// Owned by the view; dropping it stops the poller.
pub struct PollHandle {
    cancel: CancellationToken,
    done: Option<oneshot::Receiver<PollStats>>,
}

impl PollHandle {
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Token cancelled when the handle stops; share it with other work tied
    /// to the same view.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel and wait for the loop to finish.
    pub async fn stop(mut self) -> Option<PollStats> {
        self.cancel.cancel();
        match self.done.take() {
            Some(rx) => rx.await.ok(),
            None => None,
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a scripted sequence of results.
    struct Scripted {
        results: Mutex<VecDeque<Result<Vec<u32>, BridgeError>>>,
    }

    impl Scripted {
        fn new(results: Vec<Result<Vec<u32>, BridgeError>>) -> Self {
            Scripted {
                results: Mutex::new(results.into()),
            }
        }
    }

    #[async_trait]
    impl PollSource for Scripted {
        type Item = Vec<u32>;

        fn label(&self) -> &str {
            "scripted"
        }

        async fn fetch(&self, _cancel: &CancellationToken) -> Result<Vec<u32>, BridgeError> {
            self.results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    #[allow(clippy::ptr_arg)]
    fn unordered_ids(ids: &Vec<u32>) -> Fingerprint {
        Fingerprint::unordered(ids.iter())
    }

    #[tokio::test]
    async fn identical_sets_publish_once() {
        let source = Scripted::new(vec![Ok(vec![1, 2, 3]), Ok(vec![3, 1, 2])]);
        let (mut poller, mut rx) =
            LivePoller::new(source, Duration::from_secs(5), unordered_ids);
        let cancel = CancellationToken::new();

        assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Updated);
        assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Unchanged);

        assert_eq!(rx.try_recv().unwrap(), PollEvent::Updated(vec![1, 2, 3]));
        assert!(rx.try_recv().is_err());
        assert_eq!(poller.stats().updates, 1);
        assert_eq!(poller.stats().unchanged, 1);
        assert_eq!(poller.phase(), PollPhase::Idle);
    }

    #[tokio::test]
    async fn failure_keeps_last_fingerprint() {
        let source = Scripted::new(vec![
            Ok(vec![1]),
            Err(BridgeError::Timeout(Duration::from_secs(3))),
            Ok(vec![1]),
            Ok(vec![1, 2]),
        ]);
        let (mut poller, mut rx) =
            LivePoller::new(source, Duration::from_secs(5), unordered_ids);
        let cancel = CancellationToken::new();

        assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Updated);
        assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Failed);
        assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Unchanged);
        assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Updated);

        assert_eq!(rx.try_recv().unwrap(), PollEvent::Updated(vec![1]));
        assert!(matches!(
            rx.try_recv().unwrap(),
            PollEvent::Failed(BridgeError::Timeout(_))
        ));
        assert_eq!(rx.try_recv().unwrap(), PollEvent::Updated(vec![1, 2]));
        assert_eq!(poller.stats().failures, 1);
        assert_eq!(poller.stats().cycles, 4);
    }

    #[tokio::test]
    async fn cancelled_cycle_publishes_nothing() {
        let source = Scripted::new(vec![Ok(vec![9])]);
        let (mut poller, mut rx) =
            LivePoller::new(source, Duration::from_secs(5), unordered_ids);
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Cancelled);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_receiver_counts_as_unmount() {
        let source = Scripted::new(vec![Ok(vec![9])]);
        let (mut poller, rx) = LivePoller::new(source, Duration::from_secs(5), unordered_ids);
        drop(rx);

        let cancel = CancellationToken::new();
        assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Cancelled);
    }

    #[tokio::test]
    async fn dropping_handle_stops_loop() {
        let source = Scripted::new(vec![Ok(vec![1])]);
        let (poller, mut rx) =
            LivePoller::new(source, Duration::from_millis(20), unordered_ids);
        let handle = poller.spawn();

        assert_eq!(rx.recv().await, Some(PollEvent::Updated(vec![1])));
        drop(handle);
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn stop_returns_stats() {
        let source = Scripted::new(vec![Ok(vec![1]), Ok(vec![2])]);
        let (poller, mut rx) =
            LivePoller::new(source, Duration::from_millis(10), unordered_ids);
        let handle = poller.spawn();

        assert_eq!(rx.recv().await, Some(PollEvent::Updated(vec![1])));
        assert_eq!(rx.recv().await, Some(PollEvent::Updated(vec![2])));
        let stats = handle.stop().await.unwrap();
        assert!(stats.cycles >= 2);
        assert!(stats.updates >= 2);
    }
}
