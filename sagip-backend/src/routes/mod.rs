use axum::{
    Router,
    routing::{get, post},
};
use serde::Serialize;

use crate::AppState;

pub mod affected_people;
pub mod alerts;
pub mod auth;
pub mod contacts;
pub mod evac_centers;
pub mod extract;
pub mod health;
pub mod incident_reports;
pub mod logs;
pub mod messages;
pub mod news;
pub mod users;

/// Body returned by every `DELETE`.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
    pub id: i64,
}

impl Deleted {
    pub fn new(id: i64) -> Self {
        Self { success: true, id }
    }
}

/// Older admin screens post news to these prefixes.
const NEWS_PREFIXES: [&str; 3] = ["/api/news", "/api/admin/news", "/admin/news"];

pub fn router() -> Router<AppState> {
    let router = Router::new()
        .route("/api/health", get(health::check))
        .route(
            "/api/incident-reports",
            get(incident_reports::list).post(incident_reports::create),
        )
        .route(
            "/api/incident-reports/{id}",
            get(incident_reports::get_one)
                .put(incident_reports::update)
                .delete(incident_reports::remove),
        )
        .route(
            "/api/evac-centers",
            get(evac_centers::list).post(evac_centers::create),
        )
        .route(
            "/api/evac-centers/{id}",
            get(evac_centers::get_one)
                .put(evac_centers::update)
                .delete(evac_centers::remove),
        )
        .route("/api/alerts", get(alerts::list).post(alerts::create))
        .route(
            "/api/alerts/{id}",
            get(alerts::get_one)
                .put(alerts::update)
                .delete(alerts::remove),
        )
        .route("/api/contacts", get(contacts::list).post(contacts::create))
        .route(
            "/api/contacts/{id}",
            get(contacts::get_one)
                .put(contacts::update)
                .delete(contacts::remove),
        )
        .route("/api/users", get(users::list).post(users::create))
        .route(
            "/api/users/{id}",
            get(users::get_one).put(users::update).delete(users::remove),
        )
        .route("/api/auth/login", post(auth::login))
        .route("/api/messages", get(messages::list).post(messages::create))
        .route("/api/logs", get(logs::list).post(logs::create))
        .route(
            "/api/barangay/affected-people",
            get(affected_people::list).post(affected_people::create),
        )
        .route(
            "/api/barangay/affected-people/{id}",
            get(affected_people::get_one)
                .put(affected_people::update)
                .delete(affected_people::remove),
        );

    NEWS_PREFIXES.into_iter().fold(router, |router, prefix| {
        router
            .route(prefix, get(news::list).post(news::create))
            .route(
                &format!("{prefix}/{{id}}"),
                get(news::get_one).put(news::update).delete(news::remove),
            )
    })
}
