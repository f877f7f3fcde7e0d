mod common;

use std::{sync::atomic::Ordering, time::Duration};

use futures::future::join_all;
use sagip_client::{Availability, ClientError};
use serde_json::Value;

const TIMEOUT: Duration = Duration::from_millis(500);

#[tokio::test]
async fn test_cached_check_issues_one_request() {
    let (url, hits) = common::counting_server().await;
    let backend = common::backend(url);

    assert!(backend.check_backend(TIMEOUT).await);
    assert!(backend.check_backend(TIMEOUT).await);
    assert!(backend.check_backend(TIMEOUT).await);

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(backend.availability(), Availability::Available);
}

#[tokio::test]
async fn test_invalidate_then_check_issues_exactly_one_request() {
    let (url, hits) = common::counting_server().await;
    let backend = common::backend(url);

    assert!(backend.check_backend(TIMEOUT).await);
    backend.invalidate_backend_cache();
    assert_eq!(backend.availability(), Availability::Unknown);

    assert!(backend.check_backend(TIMEOUT).await);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_concurrent_checks_share_one_probe() {
    let (url, hits) = common::counting_server().await;
    let backend = common::backend(url);

    let answers = join_all((0..8).map(|_| backend.check_backend(TIMEOUT))).await;
    assert!(answers.into_iter().all(|available| available));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_probe_once_bypasses_cache() {
    let (url, hits) = common::counting_server().await;
    let backend = common::backend(url);

    assert!(backend.probe_backend_once(TIMEOUT).await);
    assert!(backend.probe_backend_once(TIMEOUT).await);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert_eq!(backend.availability(), Availability::Available);

    // A fresh probe already answered, so the cached check makes no request.
    assert!(backend.check_backend(TIMEOUT).await);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unreachable_backend() {
    let backend = common::backend(common::closed_port().await);

    assert!(!backend.check_backend(TIMEOUT).await);
    assert_eq!(backend.availability(), Availability::Unavailable);

    let err = backend.api_get::<Value>("/api/alerts").await.unwrap_err();
    assert!(matches!(err, ClientError::BackendNotAvailable));
    assert_eq!(err.to_string(), "backend-not-available");
}

#[tokio::test]
async fn test_http_errors_carry_the_server_message() {
    let backend = common::backend(common::spawn_backend().await);

    let err = backend
        .api_delete("/api/incident-reports/999")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    match err {
        ClientError::Http { message, .. } => assert_eq!(message, "Report not found"),
        other => panic!("expected an HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_recovers_once_health_passes_again() {
    let (url, down) = common::switchable_health_server().await;
    let backend = common::backend(url);

    down.store(true, Ordering::SeqCst);
    assert!(!backend.check_backend(TIMEOUT).await);
    assert_eq!(backend.availability(), Availability::Unavailable);

    down.store(false, Ordering::SeqCst);
    let alerts: Vec<Value> = backend.api_get("/api/alerts").await.unwrap();
    assert!(alerts.is_empty());
    assert_eq!(backend.availability(), Availability::Available);
}
