//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (lifecycle::startup):
//!     Retry loop
//!     → prober.rs (one deadline-bounded store check)
//!     → state.rs (Connected / Disconnected)
//!
//! Background (monitor.rs):
//!     Periodic tick (skipped while a probe is in flight)
//!     → prober.rs
//!     → Compare with previous state
//!     → On change: update state.rs, emit one TransitionEvent
//!
//! HTTP /health:
//!     → state.rs (read only, never probes)
//! ```

pub mod monitor;
pub mod prober;
pub mod state;
pub mod types;

pub use monitor::{HealthMonitor, MonitorHandle};
pub use prober::Prober;
pub use state::{ConnectivityState, SharedConnectivity};
pub use types::{ErrorKind, ProbeError, ProbeResult, TransitionEvent};
