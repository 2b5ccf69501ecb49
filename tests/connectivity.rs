//! Startup, monitoring and shutdown behaviour of the connectivity core.

use std::sync::Arc;
use std::time::Duration;

use admin_backend::config::ConnectivityConfig;
use admin_backend::health::{
    ConnectivityState, HealthMonitor, Prober, SharedConnectivity, TransitionEvent,
};
use admin_backend::health::ErrorKind;
use admin_backend::lifecycle::{Lifecycle, StartOutcome, StartupError};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

mod common;
use common::{ScriptedStore, Step};

fn connectivity(max_attempts: u32, delay_ms: u64, timeout_ms: u64, poll_ms: u64) -> ConnectivityConfig {
    ConnectivityConfig {
        max_attempts,
        inter_attempt_delay_ms: delay_ms,
        per_attempt_timeout_ms: timeout_ms,
        poll_interval_ms: poll_ms,
        health_check_timeout_ms: timeout_ms,
        shutdown_timeout_ms: 10_000,
    }
}

fn monitor_on(
    store: Arc<ScriptedStore>,
    initial: ConnectivityState,
    poll_ms: u64,
) -> (HealthMonitor, Arc<SharedConnectivity>, mpsc::UnboundedReceiver<TransitionEvent>) {
    let state = Arc::new(SharedConnectivity::new());
    state.set(initial);
    let (tx, rx) = mpsc::unbounded_channel();
    let monitor = HealthMonitor::new(
        Arc::new(Prober::new(store)),
        state.clone(),
        Duration::from_millis(poll_ms),
        Duration::from_secs(5),
    )
    .with_events(tx);
    (monitor, state, rx)
}

fn drain(rx: &mut mpsc::UnboundedReceiver<TransitionEvent>) -> Vec<(ConnectivityState, ConnectivityState)> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push((event.from, event.to));
    }
    out
}

#[tokio::test(start_paused = true)]
async fn test_startup_fatal_when_every_attempt_times_out() {
    let store = Arc::new(ScriptedStore::always(Step::hang()));
    let mut lifecycle = Lifecycle::new(store.clone(), &connectivity(3, 0, 1000, 5000)).unwrap();

    let started = Instant::now();
    let err = lifecycle.start().await.unwrap_err();

    let StartupError::RetryExhausted { attempts, last } = err;
    assert_eq!(attempts, 3);
    assert_eq!(last.kind, ErrorKind::Timeout);
    assert_eq!(store.calls(), 3);
    assert_eq!(started.elapsed(), Duration::from_secs(3));
    assert_eq!(lifecycle.current_status(), ConnectivityState::Disconnected);
    assert!(!lifecycle.monitor_running(), "monitor must not start after a fatal startup");
}

#[tokio::test(start_paused = true)]
async fn test_interrupt_during_startup_retries_allows_clean_shutdown() {
    let store = Arc::new(ScriptedStore::always(Step::hang()));
    let mut lifecycle = Lifecycle::new(store.clone(), &connectivity(3, 2000, 5000, 1000)).unwrap();

    // Lands during the first attempt's 5s deadline.
    let started = Instant::now();
    let outcome = lifecycle
        .start_until(time::sleep(Duration::from_millis(1_500)))
        .await
        .unwrap();

    assert_eq!(outcome, StartOutcome::Interrupted);
    assert_eq!(started.elapsed(), Duration::from_millis(1_500));
    assert_eq!(store.calls(), 1);
    assert!(!lifecycle.monitor_running());

    lifecycle.shutdown().await;
    assert!(store.is_closed());

    time::sleep(Duration::from_secs(30)).await;
    assert_eq!(store.calls(), 1, "abandoned startup must not keep retrying");
}

#[tokio::test(start_paused = true)]
async fn test_start_until_reports_started_when_store_is_up() {
    let store = Arc::new(ScriptedStore::always(Step::up()));
    let mut lifecycle = Lifecycle::new(store, &connectivity(3, 0, 1000, 1000)).unwrap();

    let outcome = lifecycle.start_until(std::future::pending()).await.unwrap();

    assert_eq!(outcome, StartOutcome::Started);
    assert_eq!(lifecycle.current_status(), ConnectivityState::Connected);
    assert!(lifecycle.monitor_running());
    lifecycle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_startup_recovers_within_budget() {
    let store = Arc::new(ScriptedStore::new(vec![Step::down(), Step::down()], Step::up()));
    let mut lifecycle = Lifecycle::new(store.clone(), &connectivity(3, 2000, 5000, 5000)).unwrap();

    let started = Instant::now();
    lifecycle.start().await.unwrap();

    assert_eq!(store.calls(), 3);
    assert_eq!(started.elapsed(), Duration::from_millis(4000));
    assert_eq!(lifecycle.current_status(), ConnectivityState::Connected);
    assert!(lifecycle.monitor_running());

    lifecycle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_poll_sequence_reports_exactly_two_transitions() {
    let store = Arc::new(ScriptedStore::new(
        vec![Step::down(), Step::down(), Step::up(), Step::up(), Step::down()],
        Step::down(),
    ));
    let (monitor, state, mut rx) = monitor_on(store.clone(), ConnectivityState::Disconnected, 1000);
    let mut handle = monitor.start();

    // Polls land at 1s, 2s, 3s, 4s, 5s.
    time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(store.calls(), 2);
    assert!(drain(&mut rx).is_empty());

    time::sleep(Duration::from_secs(1)).await;
    assert_eq!(store.calls(), 3);
    assert_eq!(
        drain(&mut rx),
        vec![(ConnectivityState::Disconnected, ConnectivityState::Connected)]
    );
    assert_eq!(state.get(), ConnectivityState::Connected);

    time::sleep(Duration::from_secs(1)).await;
    assert_eq!(store.calls(), 4);
    assert!(drain(&mut rx).is_empty(), "success after success must be silent");

    time::sleep(Duration::from_secs(1)).await;
    assert_eq!(store.calls(), 5);
    assert_eq!(
        drain(&mut rx),
        vec![(ConnectivityState::Connected, ConnectivityState::Disconnected)]
    );
    assert_eq!(state.get(), ConnectivityState::Disconnected);

    handle.stop().await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_in_flight_probe_discards_result() {
    let store = Arc::new(ScriptedStore::new(vec![Step::down().taking(2000)], Step::down()));
    let (monitor, state, mut rx) = monitor_on(store.clone(), ConnectivityState::Connected, 1000);
    let mut handle = monitor.start();

    time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(store.calls(), 1, "first probe should be in flight");

    let stopping = Instant::now();
    handle.stop().await;

    // stop() waited for the in-flight probe (ends at t = 3s).
    assert_eq!(stopping.elapsed(), Duration::from_millis(1_500));
    assert!(!handle.is_running());
    assert!(drain(&mut rx).is_empty());
    assert_eq!(state.get(), ConnectivityState::Connected);

    time::sleep(Duration::from_secs(30)).await;
    assert_eq!(store.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_twice_is_harmless() {
    let store = Arc::new(ScriptedStore::new(vec![Step::down()], Step::up()));
    let (monitor, _state, mut rx) = monitor_on(store, ConnectivityState::Connected, 1000);
    let mut handle = monitor.start();

    time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(drain(&mut rx).len(), 1);

    handle.stop().await;
    handle.stop().await;
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_slow_polls_never_overlap() {
    let store = Arc::new(ScriptedStore::always(Step::up().taking(2_500)));
    let (monitor, _state, _rx) = monitor_on(store.clone(), ConnectivityState::Connected, 1000);
    let mut handle = monitor.start();

    time::sleep(Duration::from_millis(10_500)).await;
    handle.stop().await;

    assert_eq!(store.max_in_flight(), 1);
    let calls = store.calls();
    assert!((3..=4).contains(&calls), "ticks during a probe are dropped, got {calls} polls");
}

#[tokio::test(start_paused = true)]
async fn test_lifecycle_reports_outage_and_recovery() {
    let store = Arc::new(ScriptedStore::new(
        vec![Step::up(), Step::down(), Step::down(), Step::up()],
        Step::up(),
    ));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut lifecycle = Lifecycle::new(store.clone(), &connectivity(3, 0, 1000, 1000))
        .unwrap()
        .with_transition_events(tx);

    lifecycle.start().await.unwrap();
    time::sleep(Duration::from_millis(3_500)).await;
    lifecycle.shutdown().await;

    assert_eq!(
        drain(&mut rx),
        vec![
            (ConnectivityState::Connected, ConnectivityState::Disconnected),
            (ConnectivityState::Disconnected, ConnectivityState::Connected),
        ]
    );
    assert_eq!(lifecycle.current_status(), ConnectivityState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_monitor_before_releasing_store() {
    let store = Arc::new(ScriptedStore::always(Step::up()));
    let mut lifecycle = Lifecycle::new(store.clone(), &connectivity(3, 0, 1000, 1000)).unwrap();
    let server_signal = lifecycle.server_shutdown();
    let mut server_rx = server_signal.subscribe();

    lifecycle.start().await.unwrap();
    time::sleep(Duration::from_millis(2_500)).await;
    lifecycle.shutdown().await;

    assert!(!lifecycle.monitor_running());
    assert!(server_rx.try_recv().is_ok(), "HTTP server must be told to drain");
    assert!(store.is_closed());

    let calls = store.calls();
    time::sleep(Duration::from_secs(10)).await;
    assert_eq!(store.calls(), calls, "no probes after shutdown");

    // A second shutdown is a no-op.
    lifecycle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_without_start_is_safe() {
    let store = Arc::new(ScriptedStore::always(Step::up()));
    let mut lifecycle = Lifecycle::new(store.clone(), &connectivity(1, 0, 1000, 1000)).unwrap();

    lifecycle.shutdown().await;

    assert_eq!(store.calls(), 0);
    assert_eq!(lifecycle.current_status(), ConnectivityState::Unknown);
}

#[test]
fn test_invalid_policy_is_rejected() {
    let store = Arc::new(ScriptedStore::always(Step::up()));
    assert!(Lifecycle::new(store, &connectivity(0, 0, 1000, 1000)).is_err());
}
