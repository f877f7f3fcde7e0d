use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use sagip_backend::{AppState, app, config::Config, db::Db};
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_app() -> Router {
    let db = Db::in_memory().unwrap();
    app(AppState::new(db, Config::default()))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    send_raw(app, method, uri, body.map(|body| body.to_string())).await
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body)),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health_reports_ok() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "ok");
}

#[tokio::test]
async fn test_incident_report_defaults() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/incident-reports",
        Some(json!({ "description": "flood", "type": "Flood" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["reporterName"], "Anonymous");
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["type"], "Flood");
}

#[tokio::test]
async fn test_incident_report_missing_fields() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/incident-reports",
        Some(json!({ "type": "Flood" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Missing required fields: description, type" })
    );
}

#[tokio::test]
async fn test_incident_reports_filter_by_barangay() {
    let app = test_app();
    for barangay in ["b1", "b2", "b1"] {
        send(
            &app,
            Method::POST,
            "/api/incident-reports",
            Some(json!({
                "description": "fire",
                "type": "Fire",
                "barangayId": barangay
            })),
        )
        .await;
    }

    let (status, body) = send(&app, Method::GET, "/api/incident-reports?barangayId=b1", None).await;
    assert_eq!(status, StatusCode::OK);
    let reports = body.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|r| r["barangayId"] == "b1"));
}

#[tokio::test]
async fn test_evac_center_services_round_trip() {
    let app = test_app();
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/evac-centers",
        Some(json!({ "name": "Gym", "capacity": 100 })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["services"], json!([]));

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/evac-centers/{id}"),
        Some(json!({ "services": ["Water", "Medical"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, fetched) = send(&app, Method::GET, &format!("/api/evac-centers/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["services"], json!(["Water", "Medical"]));
    assert_eq!(fetched["name"], "Gym");
    assert_eq!(fetched["capacity"], 100);
}

#[tokio::test]
async fn test_delete_unknown_report_is_not_found() {
    let app = test_app();
    let (status, body) = send(&app, Method::DELETE, "/api/incident-reports/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Report not found" }));
}

#[tokio::test]
async fn test_update_and_delete_unknown_ids_are_not_found() {
    let app = test_app();
    let collections = [
        "/api/alerts",
        "/api/contacts",
        "/api/evac-centers",
        "/api/news",
        "/api/users",
        "/api/barangay/affected-people",
    ];

    for collection in collections {
        let uri = format!("{collection}/4242");
        let (status, body) = send(&app, Method::PUT, &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "PUT {uri}");
        assert!(body["error"].is_string());

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {uri}");
    }
}

#[tokio::test]
async fn test_news_aliases_share_one_collection() {
    let app = test_app();
    let (status, created) = send(
        &app,
        Method::POST,
        "/admin/news",
        Some(json!({
            "title": "Typhoon update",
            "videoUrl": "https://v/1",
            "category": ["weather"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["category"], "[\"weather\"]");

    let (_, listed) = send(&app, Method::GET, "/api/news", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    let (_, listed) = send(&app, Method::GET, "/api/admin/news", None).await;
    assert_eq!(listed[0]["title"], "Typhoon update");
}

#[tokio::test]
async fn test_login_lookup_order() {
    let app = test_app();
    send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({ "username": "admin", "password": "pw", "role": "admin" })),
    )
    .await;
    send(
        &app,
        Method::POST,
        "/api/users",
        Some(json!({
            "username": "kap",
            "email": "kapitan@sagip.ph",
            "password": "secret",
            "role": "barangay",
            "barangayId": "b1"
        })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "username": "kapitan@sagip.ph", "password": "secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "kap");
    assert!(body["user"].get("password").is_none());

    // Falls back to the email prefix as a username.
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "username": "admin@elsewhere.ph", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "admin");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "username": "nobody@sagip.ph", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Invalid username or password" }));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "username": "kap", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_username_is_bad_request() {
    let app = test_app();
    let user = json!({ "username": "kap", "password": "secret" });
    send(&app, Method::POST, "/api/users", Some(user.clone())).await;

    let (status, body) = send(&app, Method::POST, "/api/users", Some(user)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username or email already exists");
}

#[tokio::test]
async fn test_messages_get_conversation_ids() {
    let app = test_app();
    let (status, first) = send(
        &app,
        Method::POST,
        "/api/messages",
        Some(json!({ "sender": "guest", "body": "Need water", "recipientRole": "barangay" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let conversation = first["conversationId"].as_str().unwrap().to_string();
    assert!(!conversation.is_empty());

    send(
        &app,
        Method::POST,
        "/api/messages",
        Some(json!({ "conversationId": conversation, "sender": "kap", "body": "On our way" })),
    )
    .await;

    let (_, thread) = send(
        &app,
        Method::GET,
        &format!("/api/messages?conversationId={conversation}"),
        None,
    )
    .await;
    assert_eq!(thread.as_array().unwrap().len(), 2);
    assert_eq!(thread[0]["body"], "Need water");

    let (_, inbox) = send(&app, Method::GET, "/api/messages?recipientRole=barangay", None).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);

    let (_, inbox) = send(&app, Method::GET, "/api/messages?recipientRole=LGU", None).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["body"], "Need water");
}

#[tokio::test]
async fn test_log_message_resolution_and_limit() {
    let app = test_app();
    let (status, log) = send(
        &app,
        Method::POST,
        "/api/logs",
        Some(json!({ "details": { "title": "Alert broadcast" }, "user": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(log["message"], "Alert broadcast");
    assert_eq!(log["level"], "info");

    send(&app, Method::POST, "/api/logs", Some(json!({ "purpose": "Export" }))).await;
    send(&app, Method::POST, "/api/logs", Some(json!({}))).await;

    let (_, logs) = send(&app, Method::GET, "/api/logs?limit=2", None).await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["message"], "Unspecified activity");
    assert_eq!(logs[1]["message"], "Export");
}

#[tokio::test]
async fn test_affected_people_scoped_by_barangay() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/barangay/affected-people",
        Some(json!({ "name": "Juan" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: name, barangayId");

    let (_, juan) = send(
        &app,
        Method::POST,
        "/api/barangay/affected-people",
        Some(json!({ "name": "Juan", "barangayId": "b1", "birthday": "1990-04-02" })),
    )
    .await;
    assert_eq!(juan["affected"], true);
    assert_eq!(juan["evacuated"], false);

    send(
        &app,
        Method::POST,
        "/api/barangay/affected-people",
        Some(json!({ "name": "Maria", "barangayId": "b2" })),
    )
    .await;

    let (_, people) = send(
        &app,
        Method::GET,
        "/api/barangay/affected-people?barangayId=b1",
        None,
    )
    .await;
    assert_eq!(people.as_array().unwrap().len(), 1);

    let id = juan["id"].as_i64().unwrap();
    let (_, updated) = send(
        &app,
        Method::PUT,
        &format!("/api/barangay/affected-people/{id}"),
        Some(json!({ "evacuated": true })),
    )
    .await;
    assert_eq!(updated["evacuated"], true);
    assert_eq!(updated["birthday"], "1990-04-02");
}

#[tokio::test]
async fn test_alert_update() {
    let app = test_app();
    let (_, alert) = send(
        &app,
        Method::POST,
        "/api/alerts",
        Some(json!({ "title": "Storm", "message": "Signal no. 2", "level": "medium" })),
    )
    .await;
    assert_eq!(alert["level"], "Moderate");
    assert_eq!(alert["status"], "Active");

    let id = alert["id"].as_i64().unwrap();
    let (status, resolved) = send(
        &app,
        Method::PUT,
        &format!("/api/alerts/{id}"),
        Some(json!({ "status": "resolved" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "Resolved");
    assert_eq!(resolved["title"], "Storm");
}

#[tokio::test]
async fn test_wrongly_typed_body_is_bad_request() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/incident-reports",
        Some(json!({ "description": 5, "type": "Flood" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app();
    let (status, body) = send_raw(
        &app,
        Method::POST,
        "/api/incident-reports",
        Some("{not json".to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_non_numeric_id_is_bad_request() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/incident-reports/abc", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_evac_center_update_rejects_negative_counts() {
    let app = test_app();
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/evac-centers",
        Some(json!({ "name": "Gym", "capacity": 100 })),
    )
    .await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/evac-centers/{id}"),
        Some(json!({ "capacity": -5, "currentOccupancy": -3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Capacity and occupancy must not be negative");

    let (_, fetched) = send(&app, Method::GET, &format!("/api/evac-centers/{id}"), None).await;
    assert_eq!(fetched["capacity"], 100);
    assert_eq!(fetched["currentOccupancy"], 0);
}
