//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the backend.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resilience::{PolicyError, RetryPolicy};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Store connection settings.
    pub database: DatabaseConfig,

    /// Retry, timeout and polling settings for the connectivity core.
    pub connectivity: ConnectivityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Allowed CORS origin. `None` allows any origin.
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
            request_timeout_secs: 30,
            cors_origin: None,
        }
    }
}

/// MySQL connection configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,

    /// Pool size ceiling.
    pub max_connections: u32,

    /// How long the pool waits for a free connection, in milliseconds.
    pub acquire_timeout_ms: u64,

    /// Idle connections are closed after this many milliseconds.
    pub idle_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            username: "root".to_string(),
            password: String::new(),
            database: "admin".to_string(),
            max_connections: 5,
            acquire_timeout_ms: 30_000,
            idle_timeout_ms: 10_000,
        }
    }
}

// Hand-written so the password never reaches a log line.
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_ms", &self.acquire_timeout_ms)
            .field("idle_timeout_ms", &self.idle_timeout_ms)
            .finish()
    }
}

/// Connectivity core configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Startup connection attempts before giving up.
    pub max_attempts: u32,

    /// Delay between startup attempts in milliseconds.
    pub inter_attempt_delay_ms: u64,

    /// Deadline for a single startup attempt in milliseconds.
    pub per_attempt_timeout_ms: u64,

    /// Interval between background health polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Deadline for a single background health poll in milliseconds.
    pub health_check_timeout_ms: u64,

    /// Upper bound on graceful shutdown in milliseconds.
    pub shutdown_timeout_ms: u64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            inter_attempt_delay_ms: 2000,
            per_attempt_timeout_ms: 5000,
            poll_interval_ms: 5000,
            health_check_timeout_ms: 5000,
            shutdown_timeout_ms: 10_000,
        }
    }
}

impl ConnectivityConfig {
    pub fn retry_policy(&self) -> Result<RetryPolicy, PolicyError> {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.inter_attempt_delay_ms),
            Duration::from_millis(self.per_attempt_timeout_ms),
        )
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn health_check_timeout(&self) -> Duration {
        Duration::from_millis(self.health_check_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter when `RUST_LOG` is unset (e.g. "info", "admin_backend=debug").
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "admin_backend=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
