use axum::{Json, extract::State, http::StatusCode};
use rusqlite::{Connection, OptionalExtension, Row, params};
use sagip_types::UserInput;
use serde::Serialize;

use super::{
    Deleted,
    extract::{Path, Payload},
};
use crate::{
    AppState,
    db::{self, is_unique_violation, non_blank},
    error::ApiError,
};

const NOT_FOUND: &str = "User not found";
const DUPLICATE: &str = "Username or email already exists";

pub(crate) const COLUMNS: &str = "id, username, email, role, barangay_id, created_at";

/// A user account as returned to clients. The password column is never read into it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
    pub barangay_id: Option<String>,
    pub created_at: String,
}

impl User {
    pub(crate) fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            role: row.get(3)?,
            barangay_id: row.get(4)?,
            created_at: row.get(5)?,
        })
    }
}

fn fetch(conn: &Connection, id: i64) -> Result<User, ApiError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM users WHERE id = ?1"),
        [id],
        User::from_row,
    )
    .optional()?
    .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
}

fn duplicate_to_bad_request(e: rusqlite::Error) -> ApiError {
    if is_unique_violation(&e) {
        ApiError::BadRequest(DUPLICATE.to_string())
    } else {
        ApiError::Database(e)
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state.db.with(|conn| {
        let mut statement = conn.prepare(&format!("SELECT {COLUMNS} FROM users ORDER BY id"))?;
        let rows = statement
            .query_map([], User::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    })?;

    Ok(Json(users))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.db.with(|conn| fetch(conn, id))?))
}

pub async fn create(
    State(state): State<AppState>,
    Payload(input): Payload<UserInput>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let (Some(username), Some(password)) = (non_blank(input.username), non_blank(input.password))
    else {
        return Err(ApiError::missing_fields(&["username", "password"]));
    };

    let user = state.db.with(|conn| {
        conn.execute(
            "INSERT INTO users (username, email, password, role, barangay_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                username,
                non_blank(input.email),
                password,
                input.role.unwrap_or_default().as_str(),
                input.barangay_id,
                db::now(),
            ],
        )
        .map_err(duplicate_to_bad_request)?;
        fetch(conn, conn.last_insert_rowid())
    })?;

    log::info!("Created {} account {}", user.role, user.username);
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Payload(input): Payload<UserInput>,
) -> Result<Json<User>, ApiError> {
    let user = state.db.with(|conn| {
        let current = fetch(conn, id)?;
        conn.execute(
            "UPDATE users SET username = ?1, email = ?2, role = ?3, barangay_id = ?4,
                 password = COALESCE(?5, password)
             WHERE id = ?6",
            params![
                non_blank(input.username).unwrap_or(current.username),
                non_blank(input.email).or(current.email),
                input
                    .role
                    .map(|r| r.as_str().to_string())
                    .unwrap_or(current.role),
                input.barangay_id.or(current.barangay_id),
                non_blank(input.password),
                id,
            ],
        )
        .map_err(duplicate_to_bad_request)?;
        fetch(conn, id)
    })?;

    Ok(Json(user))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, ApiError> {
    state.db.with(|conn| {
        if conn.execute("DELETE FROM users WHERE id = ?1", [id])? == 0 {
            return Err(ApiError::NotFound(NOT_FOUND.to_string()));
        }
        Ok(())
    })?;

    Ok(Json(Deleted::new(id)))
}
