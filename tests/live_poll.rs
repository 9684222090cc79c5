//! Live polling against a local host: change detection, cadence and unmount.

mod common;

use common::{player, spawn_host};
use nuibridge::events::{GetPlayers, GetServerStats, NoPayload};
use nuibridge::fingerprint::{Fingerprint, IdOrder};
use nuibridge::poller::{CycleOutcome, EventSource, RawSource};
use nuibridge::types::{LiveSnapshot, PlayerSummary};
use nuibridge::view::LoadState;
use nuibridge::{Environment, LivePoller, NuiBridge, PollEvent};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn bridge(base: &str) -> Arc<NuiBridge> {
    Arc::new(NuiBridge::new("admin-panel", Environment::EmbeddedHost).with_base_url(base))
}

fn player_ids(order: IdOrder) -> impl Fn(&Vec<PlayerSummary>) -> Fingerprint + Send + Sync {
    move |players: &Vec<PlayerSummary>| Fingerprint::of_ids(players.iter().map(|p| p.id), order)
}

#[tokio::test]
async fn reordered_players_are_not_a_change() {
    let (base, host) = spawn_host().await;
    host.script_players(vec![
        json!([player(1, "A"), player(2, "B"), player(3, "C")]),
        json!([player(3, "C"), player(1, "A"), player(2, "B")]),
        json!([player(1, "A"), player(2, "B")]),
    ]);

    let source = EventSource::<GetPlayers>::new(bridge(&base), NoPayload {});
    let (mut poller, mut rx) =
        LivePoller::new(source, Duration::from_secs(5), player_ids(IdOrder::Insensitive));
    let cancel = CancellationToken::new();

    assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Updated);
    assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Unchanged);
    assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Updated);

    let PollEvent::Updated(first) = rx.try_recv().unwrap() else {
        panic!("expected update");
    };
    assert_eq!(first.len(), 3);
    let PollEvent::Updated(second) = rx.try_recv().unwrap() else {
        panic!("expected update");
    };
    assert_eq!(second.len(), 2);
    assert!(rx.try_recv().is_err());
    assert_eq!(host.hits(), 3);
}

#[tokio::test]
async fn ordered_detector_sees_reorder() {
    let (base, host) = spawn_host().await;
    host.script_players(vec![
        json!([player(1, "A"), player(2, "B")]),
        json!([player(2, "B"), player(1, "A")]),
    ]);

    let source = EventSource::<GetPlayers>::new(bridge(&base), NoPayload {});
    let (mut poller, _rx) =
        LivePoller::new(source, Duration::from_secs(5), player_ids(IdOrder::Sensitive));
    let cancel = CancellationToken::new();

    assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Updated);
    assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Updated);
    assert_eq!(poller.stats().updates, 2);
}

#[tokio::test]
async fn raw_source_fingerprints_id_field() {
    let (base, host) = spawn_host().await;
    host.script_players(vec![
        json!([player(5, "E"), player(6, "F")]),
        json!([player(6, "F"), player(5, "E")]),
    ]);

    let source = RawSource::<Value>::new(bridge(&base), "getPlayers", None);
    let (mut poller, _rx) = LivePoller::new(source, Duration::from_secs(5), |v: &Value| {
        Fingerprint::of_json_ids(&v["players"], "id", IdOrder::Insensitive)
    });
    let cancel = CancellationToken::new();

    assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Updated);
    assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Unchanged);
}

#[tokio::test]
async fn failing_endpoint_reports_and_keeps_state() {
    let (base, _host) = spawn_host().await;
    let source = RawSource::<Value>::new(bridge(&base), "broken", None);
    let (mut poller, mut rx) = LivePoller::new(source, Duration::from_secs(5), |v: &Value| {
        Fingerprint::of_json(v)
    });
    let cancel = CancellationToken::new();

    assert_eq!(poller.poll_once(&cancel).await, CycleOutcome::Failed);

    let mut state: LoadState<Value> = LoadState::default();
    let notice = state.apply(rx.try_recv().unwrap(), "players", |_| false);
    assert!(notice.is_some());
    assert!(matches!(state, LoadState::Failed(_)));
}

#[tokio::test]
async fn snapshot_source_publishes_on_first_cycle() {
    let (base, _host) = spawn_host().await;
    let source = EventSource::<GetServerStats>::new(bridge(&base), NoPayload {});
    let (poller, mut rx) = LivePoller::new(
        source,
        Duration::from_millis(50),
        Fingerprint::of_json::<LiveSnapshot>,
    );
    let handle = poller.spawn();

    let Some(PollEvent::Updated(snap)) = rx.recv().await else {
        panic!("expected snapshot");
    };
    assert_eq!(snap.player_count, 2);

    let stats = handle.stop().await.unwrap();
    assert_eq!(stats.updates, 1);
}

#[tokio::test]
async fn unmount_during_flight_publishes_nothing() {
    let (base, host) = spawn_host().await;
    host.slow_ms.store(300, Ordering::SeqCst);
    host.script_players(vec![json!([player(1, "A")])]);

    let source = RawSource::<Value>::new(bridge(&base), "slowPlayers", None);
    let (poller, mut rx) = LivePoller::new(source, Duration::from_secs(5), |v: &Value| {
        Fingerprint::of_json(v)
    });
    let handle = poller.spawn();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(host.hits(), 1);
    drop(handle);

    let next = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("poller did not stop");
    assert_eq!(next, None);
}

#[tokio::test]
async fn slow_response_delays_next_cycle() {
    let (base, host) = spawn_host().await;
    host.slow_ms.store(300, Ordering::SeqCst);

    let source = RawSource::<Value>::new(bridge(&base), "slowPlayers", None);
    let interval = Duration::from_millis(20);
    let (poller, _rx) = LivePoller::new(source, interval, |v: &Value| Fingerprint::of_json(v));
    let handle = poller.spawn();

    let window = Duration::from_millis(700);
    tokio::time::sleep(window).await;
    let hits = host.hits();
    drop(handle);

    // One request in flight at a time: each cycle costs the host delay plus the interval.
    let ceiling = window.as_millis() / (300 + interval.as_millis()) + 1;
    assert!(hits >= 2, "poller stalled after {hits} cycles");
    assert!(hits as u128 <= ceiling, "{hits} requests in {window:?}, max {ceiling}");
}
