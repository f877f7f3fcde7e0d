#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{Json, Router, http::StatusCode, routing::get};
use sagip_backend::{AppState, config::Config, db::Db};
use sagip_client::{Backend, ClientConfig, Stores};
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{address}")
}

/// The real API over a fresh in-memory database.
pub async fn spawn_backend() -> String {
    init_logging();
    let state = AppState::new(Db::in_memory().unwrap(), Config::default());
    serve(sagip_backend::app(state)).await
}

pub async fn stores() -> Arc<Stores> {
    let url = spawn_backend().await;
    Arc::new(Stores::connect(ClientConfig::new(url)).unwrap())
}

/// A base URL nothing listens on.
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{address}")
}

pub fn backend(url: String) -> Backend {
    let config = ClientConfig::new(url).with_health_timeout(Duration::from_millis(500));
    Backend::new(config).unwrap()
}

/// Health endpoint that counts how often it is hit.
pub async fn counting_server() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/api/health",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Json(json!({ "status": "ok", "db": "ok", "now": "" }))
            }
        }),
    );
    (serve(router).await, hits)
}

/// Serves one alert until `broken` is set, then answers 500.
pub async fn flaky_alerts_server() -> (String, Arc<AtomicBool>) {
    let broken = Arc::new(AtomicBool::new(false));
    let flag = broken.clone();
    let router = Router::new()
        .route(
            "/api/health",
            get(|| async { Json(json!({ "status": "ok", "db": "ok", "now": "" })) }),
        )
        .route(
            "/api/alerts",
            get(move || {
                let flag = flag.clone();
                async move {
                    if flag.load(Ordering::SeqCst) {
                        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "boom" })))
                    } else {
                        let alerts: Value = json!([{
                            "id": 1,
                            "title": "Storm",
                            "message": "Signal no. 1",
                            "level": "Low",
                            "status": "Active",
                            "createdAt": "2024-11-02T08:00:00.000Z"
                        }]);
                        (StatusCode::OK, Json(alerts))
                    }
                }
            }),
        );
    (serve(router).await, broken)
}

/// Health answers 503 while `down` is set. Alerts are always an empty list.
pub async fn switchable_health_server() -> (String, Arc<AtomicBool>) {
    let down = Arc::new(AtomicBool::new(false));
    let flag = down.clone();
    let router = Router::new()
        .route(
            "/api/health",
            get(move || {
                let flag = flag.clone();
                async move {
                    if flag.load(Ordering::SeqCst) {
                        let body = json!({ "status": "error", "db": "error", "now": "" });
                        (StatusCode::SERVICE_UNAVAILABLE, Json(body))
                    } else {
                        (StatusCode::OK, Json(json!({ "status": "ok", "db": "ok", "now": "" })))
                    }
                }
            }),
        )
        .route("/api/alerts", get(|| async { Json(json!([])) }));
    (serve(router).await, down)
}
