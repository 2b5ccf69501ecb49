//! HTTP health surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → handlers.rs (read shared connectivity state)
//!     → JSON response
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
