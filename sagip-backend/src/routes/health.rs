use axum::{Json, extract::State, http::StatusCode};
use sagip_types::HealthStatus;

use crate::{AppState, db};

pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let db_ok = state.db.ping();

    let status = HealthStatus {
        status: if db_ok { "ok" } else { "error" }.to_string(),
        db: if db_ok { "ok" } else { "error" }.to_string(),
        now: db::now(),
    };
    let code = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(status))
}
