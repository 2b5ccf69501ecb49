//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the store:
//!     → timeouts.rs (race the call against a hard deadline)
//!     → On failure: retries.rs (fixed delay, bounded attempts)
//!     → RetryExhausted carries the last failure to the caller
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - Attempts are strictly sequential, never concurrent
//! - A success ends the sequence immediately, with no trailing delay

pub mod retries;
pub mod timeouts;

pub use retries::{retry, Attempt, PolicyError, RetryExhausted, RetryPolicy};
pub use timeouts::{race, TimeoutError};
