//! Probe results, transition events and the connectivity error taxonomy.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::health::state::ConnectivityState;
use crate::store::ConnectionError;

/// Coarse classification of connectivity failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Timeout,
    ConnectionRefused,
    RetryExhausted,
    Unknown,
}

impl ErrorKind {
    /// Stable label for metrics.
    pub fn as_label(self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::ConnectionRefused => "refused",
            ErrorKind::RetryExhausted => "retry_exhausted",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::ConnectionRefused => "connection refused",
            ErrorKind::RetryExhausted => "retries exhausted",
            ErrorKind::Unknown => "unknown error",
        };
        f.write_str(s)
    }
}

impl From<&ConnectionError> for ErrorKind {
    fn from(err: &ConnectionError) -> Self {
        match err {
            ConnectionError::Refused(_) => ErrorKind::ConnectionRefused,
            ConnectionError::Other(_) => ErrorKind::Unknown,
        }
    }
}

/// Outcome of a single probe. Produced per attempt, consumed immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub success: bool,
    pub error: Option<ErrorKind>,
    /// Original failure message, kept for logs only.
    pub message: Option<String>,
    pub elapsed: Duration,
}

impl ProbeResult {
    pub fn succeeded(elapsed: Duration) -> Self {
        Self {
            success: true,
            error: None,
            message: None,
            elapsed,
        }
    }

    pub fn failed(kind: ErrorKind, message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            success: false,
            error: Some(kind),
            message: Some(message.into()),
            elapsed,
        }
    }

    /// The state this result implies.
    pub fn state(&self) -> ConnectivityState {
        if self.success {
            ConnectivityState::Connected
        } else {
            ConnectivityState::Disconnected
        }
    }

    /// Convert to a `Result`, for callers that retry on failure.
    pub fn into_result(self) -> Result<Duration, ProbeError> {
        if self.success {
            return Ok(self.elapsed);
        }
        Err(ProbeError {
            kind: self.error.unwrap_or(ErrorKind::Unknown),
            message: self.message.unwrap_or_default(),
        })
    }
}

/// A failed probe, as an error value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ProbeError {
    pub kind: ErrorKind,
    pub message: String,
}

/// A reported change of connectivity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionEvent {
    pub from: ConnectivityState,
    pub to: ConnectivityState,
    pub at: DateTime<Utc>,
}

impl TransitionEvent {
    pub fn now(from: ConnectivityState, to: ConnectivityState) -> Self {
        Self {
            from,
            to,
            at: Utc::now(),
        }
    }
}
