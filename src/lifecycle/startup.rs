//! Startup connection establishment.
//!
//! # Responsibilities
//! - Drive the bounded retry loop over the prober
//! - Publish the outcome to the shared connectivity state
//! - Log every attempt (index, outcome, elapsed)
//!
//! # States
//! ```text
//! INIT → probing → READY  (state = Connected)
//!                → FATAL  (state = Disconnected, caller must not serve)
//! ```

use thiserror::Error;

use crate::health::prober::Prober;
use crate::health::state::{ConnectivityState, SharedConnectivity};
use crate::health::types::{ErrorKind, ProbeError};
use crate::resilience::{retry, RetryPolicy};

/// Startup could not reach the store. Always fatal.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database unreachable after {attempts} attempts")]
    RetryExhausted {
        attempts: u32,
        #[source]
        last: ProbeError,
    },
}

impl StartupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StartupError::RetryExhausted { .. } => ErrorKind::RetryExhausted,
        }
    }
}

/// Establish initial connectivity under `policy`.
pub async fn establish(
    prober: &Prober,
    state: &SharedConnectivity,
    policy: &RetryPolicy,
) -> Result<(), StartupError> {
    let endpoint = prober.endpoint();
    tracing::info!(
        endpoint = %endpoint,
        max_attempts = policy.max_attempts(),
        timeout_ms = policy.per_attempt_timeout().as_millis() as u64,
        "Connecting to database"
    );

    let outcome = retry(
        policy,
        move |_| async move { prober.probe(policy.per_attempt_timeout()).await.into_result() },
        |attempt| match attempt.outcome {
            Ok(_) => tracing::info!(
                endpoint = %endpoint,
                attempt = attempt.index,
                max_attempts = attempt.max_attempts,
                elapsed_ms = attempt.elapsed.as_millis() as u64,
                "Database connection established"
            ),
            Err(e) if attempt.is_final() => tracing::warn!(
                endpoint = %endpoint,
                attempt = attempt.index,
                max_attempts = attempt.max_attempts,
                elapsed_ms = attempt.elapsed.as_millis() as u64,
                kind = ?e.kind,
                error = %e.message,
                "Database connection attempt failed, no attempts left"
            ),
            Err(e) => tracing::warn!(
                endpoint = %endpoint,
                attempt = attempt.index,
                max_attempts = attempt.max_attempts,
                elapsed_ms = attempt.elapsed.as_millis() as u64,
                retry_in_ms = policy.inter_attempt_delay().as_millis() as u64,
                kind = ?e.kind,
                error = %e.message,
                "Database connection attempt failed, retrying"
            ),
        },
    )
    .await;

    state.touch();
    match outcome {
        Ok(_) => {
            state.set(ConnectivityState::Connected);
            Ok(())
        }
        Err(exhausted) => {
            state.set(ConnectivityState::Disconnected);
            tracing::error!(
                endpoint = %endpoint,
                attempts = exhausted.attempts,
                error = %exhausted.last,
                "Unable to connect to the database"
            );
            Err(StartupError::RetryExhausted {
                attempts: exhausted.attempts,
                last: exhausted.last,
            })
        }
    }
}
