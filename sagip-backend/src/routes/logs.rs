use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{OptionalExtension, Row, params};
use sagip_types::LogInput;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extract::{Payload, Query};
use crate::{AppState, db, error::ApiError};

const UNSPECIFIED: &str = "Unspecified activity";
const DEFAULT_LIMIT: u32 = 500;

const COLUMNS: &str = "id, level, message, user_name, action, details, created_at";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    pub id: i64,
    pub level: String,
    pub message: String,
    pub user: Option<String>,
    pub action: Option<String>,
    /// JSON-encoded object, returned as stored.
    pub details: Option<String>,
    pub created_at: String,
}

impl AuditLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            level: row.get(1)?,
            message: row.get(2)?,
            user: row.get(3)?,
            action: row.get(4)?,
            details: row.get(5)?,
            created_at: row.get(6)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<AuditLog>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let logs = state.db.with(|conn| {
        let mut statement = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM logs ORDER BY created_at DESC, id DESC LIMIT ?1"
        ))?;
        let rows = statement
            .query_map([limit], AuditLog::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    Ok(Json(logs))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(input): Payload<LogInput>,
) -> Result<(StatusCode, Json<AuditLog>), ApiError> {
    let message = input
        .resolved_message()
        .unwrap_or_else(|| UNSPECIFIED.to_string());
    let details = match &input.details {
        None | Some(Value::Null) => None,
        Some(details) => Some(
            serde_json::to_string(details).map_err(|e| ApiError::Internal(e.to_string()))?,
        ),
    };

    let log = state.db.with(|conn| {
        conn.execute(
            "INSERT INTO logs (level, message, user_name, action, details, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                input.level.unwrap_or_default().as_str(),
                message,
                input.user,
                input.action,
                details,
                db::now(),
            ],
        )?;
        conn.query_row(
            &format!("SELECT {COLUMNS} FROM logs WHERE id = ?1"),
            [conn.last_insert_rowid()],
            AuditLog::from_row,
        )
        .optional()?
        .ok_or_else(|| ApiError::Internal("inserted log vanished".to_string()))
    })?;

    Ok((StatusCode::CREATED, Json(log)))
}
