//! Retry logic.
//!
//! # Responsibilities
//! - Hold the immutable retry policy (attempts, delay, per-attempt timeout)
//! - Execute an operation up to `max_attempts` times with a fixed delay
//! - Surface the last failure once every attempt is spent
//!
//! # Design Decisions
//! - Fixed inter-attempt delay, no backoff growth
//! - No delay after a success or after the final failure
//! - `max_attempts = 1` means a single attempt and no retries

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{self, Instant};

/// Rejected retry policy parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("per-attempt timeout must be greater than zero")]
    ZeroTimeout,
}

/// Immutable retry policy, configured once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    inter_attempt_delay: Duration,
    per_attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        inter_attempt_delay: Duration,
        per_attempt_timeout: Duration,
    ) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        if per_attempt_timeout.is_zero() {
            return Err(PolicyError::ZeroTimeout);
        }
        Ok(Self {
            max_attempts,
            inter_attempt_delay,
            per_attempt_timeout,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn inter_attempt_delay(&self) -> Duration {
        self.inter_attempt_delay
    }

    pub fn per_attempt_timeout(&self) -> Duration {
        self.per_attempt_timeout
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            inter_attempt_delay: Duration::from_millis(2000),
            per_attempt_timeout: Duration::from_millis(5000),
        }
    }
}

/// Every attempt failed.
#[derive(Debug, Error)]
#[error("all {attempts} attempts failed, last error: {last}")]
pub struct RetryExhausted<E: fmt::Debug + fmt::Display> {
    /// Number of attempts made (always the policy's `max_attempts`).
    pub attempts: u32,
    /// Failure of the final attempt.
    pub last: E,
}

/// Outcome of a single attempt, handed to the observer.
#[derive(Debug)]
pub struct Attempt<'a, T, E> {
    /// 1-based attempt index.
    pub index: u32,
    pub max_attempts: u32,
    pub outcome: &'a Result<T, E>,
    pub elapsed: Duration,
}

impl<T, E> Attempt<'_, T, E> {
    pub fn is_final(&self) -> bool {
        self.outcome.is_ok() || self.index >= self.max_attempts
    }
}

/// Run `operation` under `policy`.
///
/// `operation` receives the 1-based attempt index. `observe` is called once
/// per attempt, after it completes and before any delay.
pub async fn retry<T, E, F, Fut, O>(
    policy: &RetryPolicy,
    mut operation: F,
    mut observe: O,
) -> Result<T, RetryExhausted<E>>
where
    E: fmt::Debug + fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    O: FnMut(&Attempt<'_, T, E>),
{
    let mut index = 0;
    loop {
        index += 1;
        let started = Instant::now();
        let outcome = operation(index).await;

        observe(&Attempt {
            index,
            max_attempts: policy.max_attempts,
            outcome: &outcome,
            elapsed: started.elapsed(),
        });

        match outcome {
            Ok(value) => return Ok(value),
            Err(last) if index >= policy.max_attempts => {
                return Err(RetryExhausted {
                    attempts: index,
                    last,
                });
            }
            Err(_) => {
                if !policy.inter_attempt_delay.is_zero() {
                    time::sleep(policy.inter_attempt_delay).await;
                }
            }
        }
    }
}
