//! Environment overrides.
//!
//! `APP_ENV` (or `NODE_ENV`) picks a profile; `<PROFILE>_DB_*` variables then
//! override the database section. Connectivity knobs and the listen port have
//! unprefixed variables.
//!
//! ```text
//! APP_ENV=PRODUCTION
//! PRODUCTION_DB_HOST=db.internal   → database.host
//! PRODUCTION_DB_PORT=3307          → database.port
//! PORT=8080                        → server.bind_address port
//! DB_MAX_ATTEMPTS=5                → connectivity.max_attempts
//! ```

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::config::schema::AppConfig;

/// Deployment profile selecting which `<PROFILE>_DB_*` variables apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Development,
    Production,
}

impl Profile {
    fn prefix(self) -> &'static str {
        match self {
            Profile::Development => "DEVELOPMENT",
            Profile::Production => "PRODUCTION",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEVELOPMENT" | "DEV" => Ok(Profile::Development),
            "PRODUCTION" | "PROD" => Ok(Profile::Production),
            other => Err(format!("unknown profile '{other}'")),
        }
    }
}

/// An override variable was set but could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {var}: {reason}")]
pub struct EnvError {
    pub var: String,
    pub reason: String,
}

/// Resolve the active profile from `APP_ENV`, falling back to `NODE_ENV`.
pub fn profile<F>(lookup: &F) -> Result<Profile, EnvError>
where
    F: Fn(&str) -> Option<String>,
{
    for var in ["APP_ENV", "NODE_ENV"] {
        if let Some(value) = lookup(var) {
            return value.parse().map_err(|reason| EnvError {
                var: var.to_string(),
                reason,
            });
        }
    }
    Ok(Profile::default())
}

/// Apply overrides from `lookup` on top of `config`.
///
/// `lookup` is `std::env::var(..).ok()` in production and a map in tests.
pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<Profile, EnvError>
where
    F: Fn(&str) -> Option<String>,
{
    let profile = profile(&lookup)?;
    let db_var = |suffix: &str| format!("{}_DB_{}", profile.prefix(), suffix);

    let db = &mut config.database;
    if let Some(host) = lookup(&db_var("HOST")) {
        db.host = host;
    }
    if let Some(port) = parsed(&lookup, &db_var("PORT"))? {
        db.port = port;
    }
    if let Some(user) = lookup(&db_var("USER")) {
        db.username = user;
    }
    if let Some(password) = lookup(&db_var("PASSWORD")) {
        db.password = password;
    }
    if let Some(name) = lookup(&db_var("NAME")) {
        db.database = name;
    }

    if let Some(port) = parsed::<u16, _>(&lookup, "PORT")? {
        config.server.bind_address = with_port(&config.server.bind_address, port);
    }
    if let Some(origin) = lookup("CORS_ORIGIN") {
        config.server.cors_origin = Some(origin).filter(|o| o != "*");
    }

    let conn = &mut config.connectivity;
    if let Some(v) = parsed(&lookup, "DB_MAX_ATTEMPTS")? {
        conn.max_attempts = v;
    }
    if let Some(v) = parsed(&lookup, "DB_RETRY_DELAY_MS")? {
        conn.inter_attempt_delay_ms = v;
    }
    if let Some(v) = parsed(&lookup, "DB_CONNECT_TIMEOUT_MS")? {
        conn.per_attempt_timeout_ms = v;
    }
    if let Some(v) = parsed(&lookup, "DB_POLL_INTERVAL_MS")? {
        conn.poll_interval_ms = v;
    }

    Ok(profile)
}

fn parsed<T, F>(lookup: &F, var: &str) -> Result<Option<T>, EnvError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| EnvError {
            var: var.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn with_port(bind_address: &str, port: u16) -> String {
    match bind_address.parse::<SocketAddr>() {
        Ok(mut addr) => {
            addr.set_port(port);
            addr.to_string()
        }
        Err(_) => format!("0.0.0.0:{port}"),
    }
}
