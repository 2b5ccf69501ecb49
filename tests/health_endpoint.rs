//! HTTP health surface tests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use admin_backend::config::ServerConfig;
use admin_backend::health::{ConnectivityState, SharedConnectivity};
use admin_backend::http::HttpServer;
use admin_backend::lifecycle::Shutdown;
use serde_json::Value;
use tokio::net::TcpListener;

async fn serve(
    state: Arc<SharedConnectivity>,
    started_at: Instant,
) -> (String, Shutdown, tokio::task::JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(&ServerConfig::default(), state, started_at);
    let rx = shutdown.subscribe();

    let task = tokio::spawn(async move {
        server.run(listener, rx).await.unwrap();
    });
    (format!("http://{}", addr), shutdown, task)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

#[tokio::test]
async fn test_health_reports_last_known_state() {
    let state = Arc::new(SharedConnectivity::new());
    let (base, shutdown, task) = serve(state.clone(), Instant::now()).await;
    let client = client();

    let body: Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["database"], "Disconnected", "Unknown is reported as Disconnected");
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));

    state.set(ConnectivityState::Connected);
    let res = client.get(format!("{}/health", base)).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["database"], "Connected");

    state.set(ConnectivityState::Disconnected);
    let body: Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["database"], "Disconnected");
    assert_eq!(body.as_object().unwrap().len(), 4, "no internal detail leaks");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_root_and_unknown_routes() {
    let (base, shutdown, task) = serve(Arc::new(SharedConnectivity::new()), Instant::now()).await;
    let client = client();

    let body: Value = client.get(&base).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["message"], "API Server is running");
    assert_eq!(body["status"], "OK");

    let res = client.get(format!("{}/admin/secret", base)).send().await.unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_uptime_counts_from_process_start() {
    let process_start = Instant::now();
    // Startup retries happen before the server exists.
    tokio::time::sleep(Duration::from_millis(1_500)).await;

    let (base, shutdown, task) = serve(Arc::new(SharedConnectivity::new()), process_start).await;

    let body: Value = client()
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let uptime = body["uptime"].as_f64().unwrap();
    assert!(uptime >= 1.5, "uptime {uptime} must include time spent before serving");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
}

#[tokio::test]
async fn test_security_headers_on_every_response() {
    let (base, shutdown, task) = serve(Arc::new(SharedConnectivity::new()), Instant::now()).await;
    let client = client();

    for path in ["/", "/health", "/missing"] {
        let res = client.get(format!("{}{}", base, path)).send().await.unwrap();
        let headers = res.headers();
        assert_eq!(headers["x-content-type-options"], "nosniff", "{path}");
        assert_eq!(headers["x-frame-options"], "SAMEORIGIN", "{path}");
        assert_eq!(headers["referrer-policy"], "no-referrer", "{path}");
        assert_eq!(headers["x-dns-prefetch-control"], "off", "{path}");
    }

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
}
