//! Data-store collaborator.
//!
//! # Responsibilities
//! - Define the one capability the connectivity core needs from the store
//! - Provide the MySQL implementation used in production
//!
//! # Design Decisions
//! - The check is idempotent and never touches stored data
//! - Only the prober calls `check_connectivity`; everything else goes through it

pub mod mysql;

use async_trait::async_trait;
use thiserror::Error;

pub use mysql::MySqlStore;

/// A failed attempt to reach the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The store actively refused the connection.
    #[error("connection refused: {0}")]
    Refused(String),

    /// Any other failure (auth, protocol, pool, DNS...).
    #[error("{0}")]
    Other(String),
}

/// Capability to verify that the store is reachable.
#[async_trait]
pub trait ConnectivityCheck: Send + Sync {
    /// Attempt one connection check.
    async fn check_connectivity(&self) -> Result<(), ConnectionError>;

    /// Human-readable endpoint for logs (never includes credentials).
    fn endpoint(&self) -> String {
        "store".to_string()
    }

    /// Release held connections. Called once during shutdown.
    async fn close(&self) {}
}
