//! Connectivity prober.
//!
//! # Responsibilities
//! - Run one store connectivity check under a deadline
//! - Classify the outcome into a `ProbeResult`
//! - Serialize checks: at most one in flight against the store
//!
//! Both the startup initializer and the background monitor probe through
//! here; nothing else calls the store's check directly.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::health::types::{ErrorKind, ProbeResult};
use crate::observability::metrics;
use crate::resilience::race;
use crate::store::ConnectivityCheck;

pub struct Prober {
    store: Arc<dyn ConnectivityCheck>,
    /// Single probe slot.
    slot: Mutex<()>,
}

impl Prober {
    pub fn new(store: Arc<dyn ConnectivityCheck>) -> Self {
        Self {
            store,
            slot: Mutex::new(()),
        }
    }

    /// Check connectivity once, giving up after `timeout`.
    pub async fn probe(&self, timeout: Duration) -> ProbeResult {
        let _slot = self.slot.lock().await;
        let started = Instant::now();

        let result = match race(timeout, self.store.check_connectivity()).await {
            Ok(Ok(())) => ProbeResult::succeeded(started.elapsed()),
            Ok(Err(e)) => ProbeResult::failed(ErrorKind::from(&e), e.to_string(), started.elapsed()),
            Err(e) => ProbeResult::failed(ErrorKind::Timeout, e.to_string(), started.elapsed()),
        };

        tracing::trace!(
            endpoint = %self.store.endpoint(),
            success = result.success,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "Probe finished"
        );
        metrics::record_probe(&result);
        result
    }

    pub fn store(&self) -> &Arc<dyn ConnectivityCheck> {
        &self.store
    }

    pub fn endpoint(&self) -> String {
        self.store.endpoint()
    }
}
