use axum::{Json, extract::State};
use rusqlite::{Connection, OptionalExtension};
use sagip_types::LoginRequest;
use serde::Serialize;

use super::{
    extract::Payload,
    users::{COLUMNS, User},
};
use crate::{AppState, error::ApiError};

const INVALID: &str = "Invalid username or password";

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: User,
}

/// Finds the account a login identifier refers to.
///
/// The identifier is tried as a username first. If it looks like an email it is
/// then tried against the email column and finally its local part is tried as a
/// username, since accounts are often created with the email prefix.
fn lookup(conn: &Connection, identifier: &str) -> Result<Option<(User, String)>, ApiError> {
    let by = |column: &str, value: &str| -> Result<Option<(User, String)>, ApiError> {
        let found = conn
            .query_row(
                &format!("SELECT {COLUMNS}, password FROM users WHERE {column} = ?1"),
                [value],
                |row| Ok((User::from_row(row)?, row.get::<_, String>(6)?)),
            )
            .optional()?;
        Ok(found)
    };

    if let Some(found) = by("username", identifier)? {
        return Ok(Some(found));
    }
    let Some((prefix, _)) = identifier.split_once('@') else {
        return Ok(None);
    };
    if let Some(found) = by("email", identifier)? {
        return Ok(Some(found));
    }
    by("username", prefix)
}

pub async fn login(
    State(state): State<AppState>,
    Payload(request): Payload<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let identifier = request.username.trim();
    if identifier.is_empty() || request.password.is_empty() {
        return Err(ApiError::missing_fields(&["username", "password"]));
    }

    let found = state.db.with(|conn| lookup(conn, identifier))?;
    match found {
        Some((user, password)) if password == request.password => {
            log::info!("{} signed in as {}", user.username, user.role);
            Ok(Json(LoginResponse { user }))
        }
        _ => {
            log::warn!("Failed sign-in for {identifier}");
            Err(ApiError::Unauthorized(INVALID.to_string()))
        }
    }
}
