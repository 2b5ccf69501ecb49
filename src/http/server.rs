//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the health surface handlers
//! - Wire up middleware (tracing, timeout, CORS, request ID, metrics,
//!   security response headers)
//! - Bind server to listener
//! - Drain in-flight requests on the shutdown signal

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_DNS_PREFETCH_CONTROL, X_FRAME_OPTIONS},
        HeaderName, HeaderValue, Request, StatusCode,
    },
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::health::state::SharedConnectivity;
use crate::http::handlers::{get_health, get_info, not_found};
use crate::lifecycle::shutdown::wait_for;
use crate::observability::metrics;

const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub connectivity: Arc<SharedConnectivity>,
    pub started_at: Instant,
}

/// HTTP server for the health surface.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// `started_at` is the process start; `/health` reports uptime from it.
    pub fn new(
        config: &ServerConfig,
        connectivity: Arc<SharedConnectivity>,
        started_at: Instant,
    ) -> Self {
        let state = AppState {
            connectivity,
            started_at,
        };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let cors = match config
            .cors_origin
            .as_deref()
            .and_then(|o| HeaderValue::from_str(o).ok())
        {
            Some(origin) => CorsLayer::new().allow_origin(origin),
            None => CorsLayer::new().allow_origin(Any),
        };

        Router::new()
            .route("/", get(get_info))
            .route("/health", get(get_health))
            .fallback(not_found)
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
                    .layer(cors)
                    .layer(security_header(X_CONTENT_TYPE_OPTIONS, "nosniff"))
                    .layer(security_header(X_FRAME_OPTIONS, "SAMEORIGIN"))
                    .layer(security_header(REFERRER_POLICY, "no-referrer"))
                    .layer(security_header(X_DNS_PREFETCH_CONTROL, "off")),
            )
    }

    /// Serve until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");
        tracing::info!("Health check: http://{}/health", addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn security_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(name, HeaderValue::from_static(value))
}

async fn track_metrics(request: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;
    let status: StatusCode = response.status();
    metrics::record_request(&path, status.as_u16(), started.elapsed());
    response
}
