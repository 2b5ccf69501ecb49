//! Background connectivity monitoring.
//!
//! # Responsibilities
//! - Periodically probe the store
//! - Update the shared connectivity state
//! - Report each state transition exactly once
//!
//! # Lifecycle
//! ```text
//! HealthMonitor::start() → RUNNING ──stop()──▶ STOPPED (terminal)
//! ```
//! A stopped handle cannot be restarted; build a new monitor instead.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::health::prober::Prober;
use crate::health::state::{ConnectivityState, SharedConnectivity};
use crate::health::types::{ProbeResult, TransitionEvent};
use crate::lifecycle::shutdown::Shutdown;
use crate::observability::metrics;

pub struct HealthMonitor {
    prober: Arc<Prober>,
    state: Arc<SharedConnectivity>,
    poll_interval: Duration,
    probe_timeout: Duration,
    events: Option<mpsc::UnboundedSender<TransitionEvent>>,
}

impl HealthMonitor {
    pub fn new(
        prober: Arc<Prober>,
        state: Arc<SharedConnectivity>,
        poll_interval: Duration,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            prober,
            state,
            poll_interval,
            probe_timeout,
            events: None,
        }
    }

    /// Also deliver transition events on `tx`.
    pub fn with_events(mut self, tx: mpsc::UnboundedSender<TransitionEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Spawn the polling task. The first poll happens one interval from now.
    pub fn start(self) -> MonitorHandle {
        let shutdown = Shutdown::new();
        let rx = shutdown.subscribe();
        let task = tokio::spawn(self.run(rx));
        MonitorHandle {
            shutdown,
            task: Some(task),
        }
    }

    async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            endpoint = %self.prober.endpoint(),
            interval_ms = self.poll_interval.as_millis() as u64,
            timeout_ms = self.probe_timeout.as_millis() as u64,
            "Health monitor starting"
        );

        // Seeded from the shared state, so a startup-established Connected
        // is not re-reported by the first successful poll.
        let mut previous = self.state.get();

        let mut ticker = time::interval_at(Instant::now() + self.poll_interval, self.poll_interval);
        // A poll that overruns the interval swallows the ticks it covered.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {}
            }

            let result = self.prober.probe(self.probe_timeout).await;

            if stop_requested(&mut shutdown) {
                tracing::debug!(
                    success = result.success,
                    "Health monitor stopped during probe, discarding result"
                );
                break;
            }

            previous = self.observe(previous, &result);
        }

        tracing::info!("Health monitor stopped");
    }

    /// Fold one probe result into the state; returns the new "previous".
    fn observe(&self, previous: ConnectivityState, result: &ProbeResult) -> ConnectivityState {
        let current = result.state();
        self.state.touch();

        if current == previous {
            if !result.success {
                tracing::debug!(
                    error = result.message.as_deref().unwrap_or_default(),
                    "Database still unreachable"
                );
            }
            return current;
        }

        self.state.set(current);

        if previous == ConnectivityState::Unknown {
            tracing::info!(state = %current, "Initial database connectivity observed");
            return current;
        }

        let event = TransitionEvent::now(previous, current);
        match current {
            ConnectivityState::Connected => tracing::info!(
                from = %event.from,
                to = %event.to,
                elapsed_ms = result.elapsed.as_millis() as u64,
                "Database connection recovered"
            ),
            _ => tracing::error!(
                from = %event.from,
                to = %event.to,
                kind = ?result.error,
                error = result.message.as_deref().unwrap_or_default(),
                "Database connection lost"
            ),
        }
        metrics::record_transition(current);

        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
        current
    }
}

fn stop_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    !matches!(shutdown.try_recv(), Err(broadcast::error::TryRecvError::Empty))
}

/// Handle to a running (or never-started) monitor.
///
/// Dropping the handle also stops the monitor, without waiting for it.
pub struct MonitorHandle {
    shutdown: Shutdown,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// A handle with no task behind it; `stop()` is a no-op.
    pub fn inactive() -> Self {
        Self {
            shutdown: Shutdown::new(),
            task: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop polling and wait for the task to exit.
    ///
    /// An in-flight probe is allowed to finish (it is bounded by the probe
    /// timeout) and its result is discarded. Safe to call repeatedly.
    pub async fn stop(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        self.shutdown.trigger();
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Health monitor task ended abnormally");
        }
    }
}

impl Default for MonitorHandle {
    fn default() -> Self {
        Self::inactive()
    }
}
