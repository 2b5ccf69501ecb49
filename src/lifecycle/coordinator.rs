//! Lifecycle coordinator.
//!
//! Owns the connectivity state and the monitor handle. Startup sequencing
//! guarantees the initializer finishes before the monitor's first probe, so
//! the state has a single writer at any time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;

use crate::config::ConnectivityConfig;
use crate::health::monitor::{HealthMonitor, MonitorHandle};
use crate::health::prober::Prober;
use crate::health::state::{ConnectivityState, SharedConnectivity};
use crate::health::types::TransitionEvent;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::startup::{establish, StartupError};
use crate::resilience::{PolicyError, RetryPolicy};
use crate::store::ConnectivityCheck;

/// How an interruptible startup ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Connectivity established and the monitor is running.
    Started,
    /// `interrupt` fired first; the in-flight attempt was abandoned.
    Interrupted,
}

pub struct Lifecycle {
    prober: Arc<Prober>,
    state: Arc<SharedConnectivity>,
    policy: RetryPolicy,
    poll_interval: Duration,
    health_check_timeout: Duration,
    shutdown_timeout: Duration,
    monitor: MonitorHandle,
    events: Option<mpsc::UnboundedSender<TransitionEvent>>,
    /// Fired after the monitor has stopped; the HTTP server drains on it.
    server_shutdown: Shutdown,
    store_closed: bool,
}

impl Lifecycle {
    pub fn new(
        store: Arc<dyn ConnectivityCheck>,
        config: &ConnectivityConfig,
    ) -> Result<Self, PolicyError> {
        Ok(Self {
            prober: Arc::new(Prober::new(store)),
            state: Arc::new(SharedConnectivity::new()),
            policy: config.retry_policy()?,
            poll_interval: config.poll_interval(),
            health_check_timeout: config.health_check_timeout(),
            shutdown_timeout: config.shutdown_timeout(),
            monitor: MonitorHandle::inactive(),
            events: None,
            server_shutdown: Shutdown::new(),
            store_closed: false,
        })
    }

    /// Forward monitor transition events to `tx`.
    pub fn with_transition_events(mut self, tx: mpsc::UnboundedSender<TransitionEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    /// Read handle for the HTTP health surface.
    pub fn state(&self) -> Arc<SharedConnectivity> {
        self.state.clone()
    }

    /// Last known connectivity. Never probes.
    pub fn current_status(&self) -> ConnectivityState {
        self.state.get()
    }

    /// Signal the HTTP server subscribes to.
    pub fn server_shutdown(&self) -> Shutdown {
        self.server_shutdown.clone()
    }

    pub fn monitor_running(&self) -> bool {
        self.monitor.is_running()
    }

    /// Establish connectivity, then start the background monitor.
    ///
    /// An error is fatal: the process must not begin serving.
    pub async fn start(&mut self) -> Result<(), StartupError> {
        if self.monitor.is_running() {
            tracing::warn!("Lifecycle already started");
            return Ok(());
        }

        establish(&self.prober, &self.state, &self.policy).await?;

        let mut monitor = HealthMonitor::new(
            self.prober.clone(),
            self.state.clone(),
            self.poll_interval,
            self.health_check_timeout,
        );
        if let Some(tx) = &self.events {
            monitor = monitor.with_events(tx.clone());
        }
        self.monitor = monitor.start();
        Ok(())
    }

    /// Like [`start`](Self::start), but gives up as soon as `interrupt`
    /// resolves (e.g. a termination signal during startup retries).
    ///
    /// The caller still owns cleanup and should call `shutdown()`.
    pub async fn start_until<F>(&mut self, interrupt: F) -> Result<StartOutcome, StartupError>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            res = self.start() => res.map(|()| StartOutcome::Started),
            () = interrupt => {
                tracing::warn!("Startup interrupted before connectivity was established");
                Ok(StartOutcome::Interrupted)
            }
        }
    }

    /// Stop the monitor, then release everything else.
    ///
    /// Order: monitor (waits for an in-flight probe) → HTTP server signal →
    /// store pool. Each step is bounded by the shutdown timeout.
    pub async fn shutdown(&mut self) {
        tracing::info!("Lifecycle shutdown started");

        if time::timeout(self.shutdown_timeout, self.monitor.stop())
            .await
            .is_err()
        {
            tracing::warn!(
                timeout_ms = self.shutdown_timeout.as_millis() as u64,
                "Health monitor did not stop in time, abandoning it"
            );
        }

        self.server_shutdown.trigger();

        if !self.store_closed {
            self.store_closed = true;
            if time::timeout(self.shutdown_timeout, self.prober.store().close())
                .await
                .is_err()
            {
                tracing::warn!("Store did not close in time");
            }
        }

        tracing::info!("Lifecycle shutdown complete");
    }
}
