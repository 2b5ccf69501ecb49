//! Health surface handlers.
//!
//! Handlers only read the shared state; none of them ever probes the store.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::health::state::ConnectivityState;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// "Connected" or "Disconnected"; Unknown is reported as Disconnected.
    pub database: &'static str,
    /// Seconds since the process started.
    pub uptime: f64,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: &'static str,
}

pub async fn get_info() -> Json<InfoResponse> {
    Json(InfoResponse {
        message: "API Server is running",
        status: "OK",
        timestamp: now_rfc3339(),
    })
}

pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match state.connectivity.get() {
        ConnectivityState::Connected => "Connected",
        ConnectivityState::Disconnected | ConnectivityState::Unknown => "Disconnected",
    };

    Json(HealthResponse {
        status: "OK",
        database,
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: now_rfc3339(),
    })
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            success: false,
            message: "Not found",
        }),
    )
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
