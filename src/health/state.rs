//! Process-wide connectivity state.
//!
//! # States
//! - Unknown: nothing observed yet (process start)
//! - Connected: last probe succeeded
//! - Disconnected: last probe failed
//!
//! # Design Decisions
//! - One writer at a time (initializer, then monitor), many readers
//! - Atomics so the HTTP path reads without locking

use std::fmt;
use std::sync::atomic::{AtomicI64, AtomicU8, Ordering};

use chrono::{DateTime, TimeZone, Utc};

use crate::observability::metrics;

/// Connectivity to the store.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectivityState {
    Unknown = 0,
    Connected = 1,
    Disconnected = 2,
}

impl From<u8> for ConnectivityState {
    fn from(val: u8) -> Self {
        match val {
            1 => ConnectivityState::Connected,
            2 => ConnectivityState::Disconnected,
            _ => ConnectivityState::Unknown,
        }
    }
}

impl ConnectivityState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectivityState::Unknown => "Unknown",
            ConnectivityState::Connected => "Connected",
            ConnectivityState::Disconnected => "Disconnected",
        }
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared connectivity state plus the time of the last completed check.
#[derive(Debug)]
pub struct SharedConnectivity {
    state: AtomicU8,
    /// Unix milliseconds of the last check; 0 when never checked.
    last_checked_ms: AtomicI64,
}

impl SharedConnectivity {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectivityState::Unknown as u8),
            last_checked_ms: AtomicI64::new(0),
        }
    }

    pub fn get(&self) -> ConnectivityState {
        ConnectivityState::from(self.state.load(Ordering::Acquire))
    }

    /// Store `next` and return the previous value.
    pub fn set(&self, next: ConnectivityState) -> ConnectivityState {
        let prev = self.state.swap(next as u8, Ordering::AcqRel);
        metrics::record_connectivity(next);
        ConnectivityState::from(prev)
    }

    /// Mark that a check just completed.
    pub fn touch(&self) {
        self.last_checked_ms
            .store(Utc::now().timestamp_millis(), Ordering::Release);
    }

    pub fn last_checked(&self) -> Option<DateTime<Utc>> {
        match self.last_checked_ms.load(Ordering::Acquire) {
            0 => None,
            ms => Utc.timestamp_millis_opt(ms).single(),
        }
    }
}

impl Default for SharedConnectivity {
    fn default() -> Self {
        Self::new()
    }
}
