//! Admin backend library: store connectivity, health monitoring and the
//! health-check HTTP surface.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod store;

pub use config::schema::AppConfig;
pub use health::state::{ConnectivityState, SharedConnectivity};
pub use http::HttpServer;
pub use lifecycle::{Lifecycle, Shutdown};
