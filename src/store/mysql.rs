//! MySQL connectivity via an sqlx pool.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::Connection;

use crate::config::DatabaseConfig;
use crate::store::{ConnectionError, ConnectivityCheck};

/// Lazily-connected MySQL pool.
///
/// Construction never touches the network; the first connection is opened
/// by the first probe.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
    endpoint: String,
}

impl MySqlStore {
    /// Build the pool from configuration. Must be called inside a Tokio runtime.
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database)
            .charset("utf8mb4");

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(0)
            .acquire_timeout(Duration::from_millis(config.acquire_timeout_ms))
            .idle_timeout(Duration::from_millis(config.idle_timeout_ms))
            .connect_lazy_with(options);

        Self {
            pool,
            endpoint: format!("{}:{}", config.host, config.port),
        }
    }

    /// The underlying pool, for query code outside the connectivity core.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

#[async_trait]
impl ConnectivityCheck for MySqlStore {
    async fn check_connectivity(&self) -> Result<(), ConnectionError> {
        let mut conn = self.pool.acquire().await.map_err(classify)?;
        conn.ping().await.map_err(classify)
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!(endpoint = %self.endpoint, "Database pool closed");
    }
}

fn classify(err: sqlx::Error) -> ConnectionError {
    match &err {
        sqlx::Error::Io(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
            ConnectionError::Refused(err.to_string())
        }
        _ => ConnectionError::Other(err.to_string()),
    }
}
