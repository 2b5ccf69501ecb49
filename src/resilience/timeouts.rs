//! Timeout enforcement.
//!
//! # Responsibilities
//! - Race an operation against a hard deadline
//! - Hand back exactly one of: the operation's output, or a timeout
//! - Drop the losing side (timer or operation) before returning
//!
//! # Design Decisions
//! - Uses Tokio's timer facilities
//! - The deadline wins a tie: an operation must finish strictly before it
//! - A timed-out operation is abandoned by dropping it, never awaited again

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time;

/// The deadline elapsed before the operation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation timed out after {}ms", .after.as_millis())]
pub struct TimeoutError {
    /// The deadline that was exceeded.
    pub after: Duration,
}

/// Run `operation` with a hard deadline.
///
/// One timer is armed per call. Both the timer and the operation live on this
/// function's stack, so whichever loses the race is dropped when it returns.
pub async fn race<F>(deadline: Duration, operation: F) -> Result<F::Output, TimeoutError>
where
    F: Future,
{
    let timer = time::sleep(deadline);
    tokio::pin!(timer);
    tokio::pin!(operation);

    tokio::select! {
        biased;
        _ = &mut timer => Err(TimeoutError { after: deadline }),
        output = &mut operation => Ok(output),
    }
}
