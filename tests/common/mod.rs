//! Shared fakes for integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use admin_backend::store::{ConnectionError, ConnectivityCheck};
use async_trait::async_trait;

/// One scripted connectivity check.
#[derive(Clone, Debug)]
pub struct Step {
    pub delay: Duration,
    pub outcome: Result<(), ConnectionError>,
}

impl Step {
    pub fn up() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(()),
        }
    }

    pub fn down() -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err(ConnectionError::Refused("127.0.0.1:3306".into())),
        }
    }

    /// Never answers within any sane deadline.
    pub fn hang() -> Self {
        Self {
            delay: Duration::from_secs(3600),
            outcome: Ok(()),
        }
    }

    pub fn taking(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }
}

/// Store fake that plays back `steps`, then repeats `fallback` forever.
pub struct ScriptedStore {
    steps: Mutex<VecDeque<Step>>,
    fallback: Step,
    calls: AtomicU32,
    in_flight: AtomicU32,
    max_in_flight: AtomicU32,
    closed: AtomicBool,
}

impl ScriptedStore {
    pub fn new(steps: Vec<Step>, fallback: Step) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            fallback,
            calls: AtomicU32::new(0),
            in_flight: AtomicU32::new(0),
            max_in_flight: AtomicU32::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub fn always(step: Step) -> Self {
        Self::new(Vec::new(), step)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> u32 {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicU32);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectivityCheck for ScriptedStore {
    async fn check_connectivity(&self) -> Result<(), ConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }
        step.outcome
    }

    fn endpoint(&self) -> String {
        "scripted:3306".to_string()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
