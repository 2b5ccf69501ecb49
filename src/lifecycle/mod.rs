//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (coordinator.rs → startup.rs):
//!     Load config → Validate → Establish store connectivity (retries)
//!     → Start health monitor → Bind listener
//!
//! Shutdown (coordinator.rs → shutdown.rs):
//!     Signal received → Stop health monitor → Drain HTTP server
//!     → Close store pool → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then store, then listeners
//! - Startup failure to reach the store is fatal (non-zero exit)
//! - Shutdown has timeout: forced exit after deadline

pub mod coordinator;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use coordinator::{Lifecycle, StartOutcome};
pub use shutdown::Shutdown;
pub use startup::StartupError;
