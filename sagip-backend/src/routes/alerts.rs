use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, OptionalExtension, Row, params};
use sagip_types::AlertInput;
use serde::Serialize;

use super::{
    Deleted,
    extract::{Path, Payload},
};
use crate::{
    AppState,
    db::{self, non_blank},
    error::ApiError,
};

const NOT_FOUND: &str = "Alert not found";

const COLUMNS: &str = "id, title, message, level, area_affected, status, created_at, updated_at";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub level: String,
    pub area_affected: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Alert {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            message: row.get(2)?,
            level: row.get(3)?,
            area_affected: row.get(4)?,
            status: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

fn fetch(conn: &Connection, id: i64) -> Result<Alert, ApiError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM alerts WHERE id = ?1"),
        [id],
        Alert::from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Alert>>, ApiError> {
    let alerts = state.db.with(|conn| {
        let mut statement = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM alerts ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = statement
            .query_map([], Alert::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    Ok(Json(alerts))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Alert>, ApiError> {
    Ok(Json(state.db.with(|conn| fetch(conn, id))?))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(input): Payload<AlertInput>,
) -> Result<(StatusCode, Json<Alert>), ApiError> {
    let (Some(title), Some(message)) = (non_blank(input.title), non_blank(input.message)) else {
        return Err(ApiError::missing_fields(&["title", "message"]));
    };
    let now = db::now();

    let alert = state.db.with(|conn| {
        conn.execute(
            "INSERT INTO alerts (title, message, level, area_affected, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                title,
                message,
                input.level.unwrap_or_default().as_str(),
                input.area_affected,
                input.status.unwrap_or_default().as_str(),
                now,
            ],
        )?;
        fetch(conn, conn.last_insert_rowid())
    })?;

    log::info!("Alert {} broadcast at level {}", alert.id, alert.level);
    Ok((StatusCode::CREATED, Json(alert)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Payload(input): Payload<AlertInput>,
) -> Result<Json<Alert>, ApiError> {
    let alert = state.db.with(|conn| {
        let current = fetch(conn, id)?;
        conn.execute(
            "UPDATE alerts SET title = ?1, message = ?2, level = ?3, area_affected = ?4,
                 status = ?5, updated_at = ?6
             WHERE id = ?7",
            params![
                non_blank(input.title).unwrap_or(current.title),
                non_blank(input.message).unwrap_or(current.message),
                input
                    .level
                    .map(|l| l.as_str().to_string())
                    .unwrap_or(current.level),
                input.area_affected.or(current.area_affected),
                input
                    .status
                    .map(|s| s.as_str().to_string())
                    .unwrap_or(current.status),
                db::now(),
                id,
            ],
        )?;
        fetch(conn, id)
    })?;

    Ok(Json(alert))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    state.db.with(|conn| {
        if conn.execute("DELETE FROM alerts WHERE id = ?1", [id])? == 0 {
            return Err(ApiError::NotFound(NOT_FOUND.to_string()));
        }
        Ok(())
    })?;

    Ok(Json(Deleted::new(id)))
}
